//! Site Composer - compose web applications from self-contained UI components
//!
//! Each component owns its templates, static assets, and URL namespace.
//! Template lookups fall back from a component's own directory to the
//! application-wide one, and any page can aggregate named "parts"
//! contributed by every registered component.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use site_composer::{Component, Composer, Context, EngineAdapter, MiniJinjaEngine};
//!
//! let adapter = Arc::new(EngineAdapter::new(MiniJinjaEngine::new()));
//! let mut composer = Composer::new("templates", adapter);
//! composer
//!     .register_component(Arc::new(Component::new("shop", "components/shop")))
//!     .unwrap();
//!
//! // Missing templates are a soft miss, not an error: composition tolerates
//! // components that do not implement every optional slot.
//! let html = composer.render_template("index.html", &Context::new()).unwrap();
//! assert_eq!(html, "");
//! ```

pub mod adapter;
pub mod component;
pub mod composer;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod lookup;
pub mod manifest;

#[cfg(test)]
mod testutil;

pub use adapter::{EngineAdapter, RenderingAdapter};
pub use component::Component;
pub use composer::{ActiveComponent, Composer, RequestScope};
pub use config::{ComponentConfig, ComposerConfig, ConfigError};
pub use context::Context;
pub use engine::{CompiledTemplate, EngineError, MiniJinjaEngine, TemplateEngine};
pub use error::ComposeError;
pub use helpers::AssetHelper;
pub use lookup::{TemplateFactory, TemplatePathLookup};
pub use manifest::{ComponentDescriptor, ManifestError, ModuleManifest};

use std::path::Path;
use std::sync::Arc;

/// Build a fully registered composer from a TOML manifest, using the bundled
/// MiniJinja engine. Relative paths in the manifest are resolved against the
/// manifest's own directory.
pub fn compose_from_config(path: &Path) -> Result<Composer, ConfigError> {
    let config = ComposerConfig::from_file(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config
        .rebased(base)
        .build(Arc::new(EngineAdapter::new(MiniJinjaEngine::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn test_compose_from_config_end_to_end() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("templates")).unwrap();
        fs::write(
            dir.path().join("templates/index.html"),
            "{{ site_name }} index",
        )
        .unwrap();
        fs::write(
            dir.path().join("composer.toml"),
            r#"
templates = "templates"

[context]
site_name = "demo"

[[component]]
name = "shop"
root = "components/shop"
"#,
        )
        .unwrap();

        let composer = compose_from_config(&dir.path().join("composer.toml")).unwrap();
        assert_eq!(composer.components().len(), 1);
        assert_eq!(
            composer
                .render_template("index.html", &Context::new())
                .unwrap(),
            "demo index"
        );
    }
}
