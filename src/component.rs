//! A self-contained UI component: templates, static assets, URL namespace

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::composer::ComposerShared;
use crate::context::Context;
use crate::error::ComposeError;
use crate::lookup::TemplatePathLookup;
use crate::manifest::{ComponentDescriptor, ManifestError, ModuleManifest};

/// An independently packaged UI unit.
///
/// A component owns its own template lookup (parentless until registration),
/// a static-asset directory, a URL namespace derived from its name, and a
/// fixed ordered list of parts templates scanned during aggregation.
/// Registration into a [`Composer`](crate::Composer) happens exactly once
/// and is irreversible: the component adopts the composer's shared adapter
/// and default context, and its lookup gains the composer's lookup as
/// parent.
pub struct Component {
    name: String,
    url_prefix: String,
    root: PathBuf,
    template_dir: PathBuf,
    static_dir: PathBuf,
    parts_templates: Vec<String>,
    lookup: Arc<TemplatePathLookup>,
    manifest: ModuleManifest,
    registration: OnceLock<Arc<ComposerShared>>,
}

impl Component {
    /// Create a component rooted at `root`, with the conventional layout:
    /// templates under `root/templates`, static assets under `root/static`,
    /// parts contributed through `parts.html`.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let root = root.into();
        let template_dir = root.join("templates");
        let static_dir = root.join("static");
        Self {
            url_prefix: format!("/{}/", name),
            lookup: Arc::new(TemplatePathLookup::new([template_dir.clone()])),
            manifest: ModuleManifest::new(&static_dir),
            parts_templates: vec!["parts.html".to_string()],
            name,
            root,
            template_dir,
            static_dir,
            registration: OnceLock::new(),
        }
    }

    /// Replace the template folder name (default `templates`).
    pub fn with_template_folder(mut self, folder: impl AsRef<Path>) -> Self {
        self.template_dir = self.root.join(folder.as_ref());
        self.lookup = Arc::new(TemplatePathLookup::new([self.template_dir.clone()]));
        self
    }

    /// Replace the static-asset folder name (default `static`).
    pub fn with_static_folder(mut self, folder: impl AsRef<Path>) -> Self {
        self.static_dir = self.root.join(folder.as_ref());
        self.manifest = ModuleManifest::new(&self.static_dir);
        self
    }

    /// Replace the parts template list (default `["parts.html"]`). Order is
    /// the scan order during parts aggregation.
    pub fn with_parts_templates<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parts_templates = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The component's URL namespace, `/{name}/`. Leading and trailing
    /// slash; route matching also accepts the bare `/{name}`.
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn lookup(&self) -> &Arc<TemplatePathLookup> {
        &self.lookup
    }

    pub fn parts_templates(&self) -> &[String] {
        &self.parts_templates
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn is_registered(&self) -> bool {
        self.registration.get().is_some()
    }

    /// Render a template resolved through this component's lookup chain,
    /// with the composer's default context merged beneath `context`.
    pub fn render_template(&self, name: &str, context: &Context) -> Result<String, ComposeError> {
        let shared = self.shared()?;
        let merged = shared.context_for(context);
        Ok(shared.adapter.render_template(&self.lookup, name, &merged)?)
    }

    /// Render every definition named `part_name` found across this
    /// component's parts templates, in template-list order.
    pub fn render_parts(
        &self,
        part_name: &str,
        context: &Context,
    ) -> Result<Vec<String>, ComposeError> {
        let shared = self.shared()?;
        let merged = shared.context_for(context);
        Ok(shared.adapter.render_parts(
            &self.lookup,
            &self.parts_templates,
            part_name,
            &merged,
        )?)
    }

    /// Descriptor for external clients: name, static location, and the
    /// parsed `module.json` when the component ships one.
    pub fn descriptor(&self) -> Result<ComponentDescriptor, ManifestError> {
        Ok(ComponentDescriptor {
            name: self.name.clone(),
            static_location: self.static_dir.clone(),
            module: self.manifest.load()?,
        })
    }

    pub(crate) fn register(&self, shared: Arc<ComposerShared>) -> Result<(), ComposeError> {
        let parent = Arc::clone(&shared.lookup);
        self.registration
            .set(shared)
            .map_err(|_| ComposeError::AlreadyRegistered {
                component: self.name.clone(),
            })?;
        self.lookup.set_parent(parent);
        debug!(component = %self.name, "component registered");
        Ok(())
    }

    fn shared(&self) -> Result<&Arc<ComposerShared>, ComposeError> {
        self.registration
            .get()
            .ok_or_else(|| ComposeError::NotRegistered {
                component: self.name.clone(),
            })
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("url_prefix", &self.url_prefix)
            .field("template_dir", &self.template_dir)
            .field("registered", &self.is_registered())
            .finish()
    }
}
