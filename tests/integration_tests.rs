//! End-to-end composition over real template trees and the MiniJinja engine

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use site_composer::{
    Component, Composer, Context, EngineAdapter, MiniJinjaEngine, RequestScope,
};

fn write(path: PathBuf, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn new_composer(templates: &Path) -> Composer {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Composer::new(templates, Arc::new(EngineAdapter::new(MiniJinjaEngine::new())))
}

/// An application tree mirroring a small two-component site:
///
/// ```text
/// templates/              test.html, included.html, test_with_include.html
/// components/shop/        its own test.html, included.html, include page,
///                         parts.html with a header part
/// components/blog/        parts.html with a header part, no other templates
/// ```
fn build_site(dir: &TempDir) -> (Composer, Arc<Component>, Arc<Component>) {
    let root = dir.path();
    write(root.join("templates/test.html"), "<h1>global test.html</h1>");
    write(
        root.join("templates/included.html"),
        "<h1>global included.html</h1>",
    );
    write(
        root.join("templates/test_with_include.html"),
        "{% include \"included.html\" %}",
    );

    write(
        root.join("components/shop/templates/test.html"),
        "<h1>shop test.html</h1>",
    );
    write(
        root.join("components/shop/templates/included.html"),
        "<h1>local shop included.html</h1>",
    );
    write(
        root.join("components/shop/templates/test_with_include.html"),
        "{% include \"included.html\" %}",
    );
    write(
        root.join("components/shop/templates/parts.html"),
        "{% block header %}<h1>shop.header</h1>{% endblock %}",
    );

    write(
        root.join("components/blog/templates/parts.html"),
        "{% block header %}<h1>blog.header</h1>{% endblock %}",
    );

    let mut composer = new_composer(&root.join("templates"));
    let shop = Arc::new(Component::new("shop", root.join("components/shop")));
    let blog = Arc::new(Component::new("blog", root.join("components/blog")));
    composer.register_component(Arc::clone(&shop)).unwrap();
    composer.register_component(Arc::clone(&blog)).unwrap();
    (composer, shop, blog)
}

#[test]
fn test_render_component_template() {
    let dir = TempDir::new().unwrap();
    let (_composer, shop, _blog) = build_site(&dir);

    let html = shop.render_template("test.html", &Context::new()).unwrap();
    assert_eq!(html, "<h1>shop test.html</h1>");
}

#[test]
fn test_render_global_template() {
    let dir = TempDir::new().unwrap();
    let (composer, _shop, _blog) = build_site(&dir);

    let html = composer
        .render_template("test.html", &Context::new())
        .unwrap();
    assert_eq!(html, "<h1>global test.html</h1>");
}

#[test]
fn test_component_without_own_template_inherits_global() {
    let dir = TempDir::new().unwrap();
    let (_composer, _shop, blog) = build_site(&dir);

    // blog ships no test.html, so resolution falls back to the global tree.
    let html = blog.render_template("test.html", &Context::new()).unwrap();
    assert_eq!(html, "<h1>global test.html</h1>");
}

#[test]
fn test_include_from_global_takes_global() {
    let dir = TempDir::new().unwrap();
    let (composer, _shop, _blog) = build_site(&dir);

    let html = composer
        .render_template("test_with_include.html", &Context::new())
        .unwrap();
    assert_eq!(html, "<h1>global included.html</h1>");
}

#[test]
fn test_include_from_component_takes_local() {
    let dir = TempDir::new().unwrap();
    let (_composer, shop, _blog) = build_site(&dir);

    let html = shop
        .render_template("test_with_include.html", &Context::new())
        .unwrap();
    assert_eq!(html, "<h1>local shop included.html</h1>");
}

#[test]
fn test_parts_aggregated_in_registration_order() {
    let dir = TempDir::new().unwrap();
    let (composer, _shop, _blog) = build_site(&dir);

    let mut scope = RequestScope::new();
    let parts = composer.aggregate_parts(&mut scope, "header").unwrap();
    assert_eq!(
        parts,
        vec![
            "<h1>shop.header</h1>".to_string(),
            "<h1>blog.header</h1>".to_string(),
        ]
    );
}

#[test]
fn test_part_absent_everywhere_yields_empty_sequence() {
    let dir = TempDir::new().unwrap();
    let (composer, _shop, _blog) = build_site(&dir);

    let mut scope = RequestScope::new();
    let parts = composer.aggregate_parts(&mut scope, "sidebar").unwrap();
    assert!(parts.is_empty());
}

#[test]
fn test_missing_template_renders_empty_at_both_levels() {
    let dir = TempDir::new().unwrap();
    let (composer, shop, _blog) = build_site(&dir);

    let ctx = Context::new();
    assert_eq!(composer.render_template("absent.html", &ctx).unwrap(), "");
    assert_eq!(shop.render_template("absent.html", &ctx).unwrap(), "");
}

#[test]
fn test_default_context_reaches_component_renders() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path().join("components/shop/templates/greeting.html"),
        "{{ site_name }}: hello {{ who }}",
    );

    let mut composer = new_composer(&dir.path().join("templates"));
    let shop = Arc::new(Component::new("shop", dir.path().join("components/shop")));
    composer.register_component(Arc::clone(&shop)).unwrap();
    composer.add_context(Context::new().with("site_name", "demo").with("who", "world"));

    // The explicit context overrides the default on collision.
    let html = shop
        .render_template("greeting.html", &Context::new().with("who", "shoppers"))
        .unwrap();
    assert_eq!(html, "demo: hello shoppers");
}

// The container scenario from the composition contract: a global base.html
// defines a header part, and a single component overrides it with its own
// template. Aggregation yields exactly the component's render; dropping the
// block yields an empty sequence, never an error.
#[test]
fn test_header_slot_contract() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path().join("app/templates/base.html"),
        "{% block header %}<h1>global header</h1>{% endblock %}",
    );
    write(
        dir.path().join("app/shop/templates/shop.html"),
        "{% block header %}<h1>shop header</h1>{% endblock %}",
    );

    let mut composer = new_composer(&dir.path().join("app/templates"));
    let shop = Arc::new(
        Component::new("shop", dir.path().join("app/shop"))
            .with_parts_templates(["shop.html"]),
    );
    composer.register_component(shop).unwrap();

    let mut scope = RequestScope::new();
    let parts = composer.aggregate_parts(&mut scope, "header").unwrap();
    assert_eq!(parts, vec!["<h1>shop header</h1>".to_string()]);

    // Same layout, but shop.html no longer defines the block.
    let dir = TempDir::new().unwrap();
    write(
        dir.path().join("app/templates/base.html"),
        "{% block header %}<h1>global header</h1>{% endblock %}",
    );
    write(
        dir.path().join("app/shop/templates/shop.html"),
        "<p>no header here</p>",
    );

    let mut composer = new_composer(&dir.path().join("app/templates"));
    let shop = Arc::new(
        Component::new("shop", dir.path().join("app/shop"))
            .with_parts_templates(["shop.html"]),
    );
    composer.register_component(shop).unwrap();

    let mut scope = RequestScope::new();
    let parts = composer.aggregate_parts(&mut scope, "header").unwrap();
    assert!(parts.is_empty());
}

#[test]
fn test_scope_survives_failing_component_render() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path().join("components/alpha/templates/parts.html"),
        "{% block header %}alpha{% endblock %}",
    );
    // beta's parts template does not even compile.
    write(
        dir.path().join("components/beta/templates/parts.html"),
        "{% block header %}unterminated",
    );

    let mut composer = new_composer(&dir.path().join("templates"));
    let alpha = Arc::new(Component::new("alpha", dir.path().join("components/alpha")));
    let beta = Arc::new(Component::new("beta", dir.path().join("components/beta")));
    composer.register_component(Arc::clone(&alpha)).unwrap();
    composer.register_component(beta).unwrap();

    let mut scope = composer.begin_request("/alpha/page");
    assert_eq!(scope.current().unwrap().name(), "alpha");

    assert!(composer.aggregate_parts(&mut scope, "header").is_err());
    assert_eq!(scope.current().unwrap().name(), "alpha");
}

#[test]
fn test_composed_page_snapshot() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path().join("templates/nav.html"),
        "<nav>shop | blog</nav>",
    );
    write(
        dir.path().join("templates/page.html"),
        "<html>\n  <head><title>{{ title }}</title></head>\n  <body>\n    {% include \"nav.html\" %}\n    <main>{{ title }} body</main>\n  </body>\n</html>",
    );

    let composer = new_composer(&dir.path().join("templates"));
    let html = composer
        .render_template("page.html", &Context::new().with("title", "Home"))
        .unwrap();

    insta::assert_snapshot!(html, @r#"
<html>
  <head><title>Home</title></head>
  <body>
    <nav>shop | blog</nav>
    <main>Home body</main>
  </body>
</html>
"#);
}
