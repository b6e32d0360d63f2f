//! Composer bootstrap configuration
//!
//! A small TOML manifest describing the application template directory, the
//! default context, and the component list, so a whole composition can be
//! assembled from one file (the CLI does exactly this).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::adapter::RenderingAdapter;
use crate::component::Component;
use crate::composer::Composer;
use crate::context::Context;
use crate::error::ComposeError;

/// Errors loading, parsing, or building from a composer config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read composer config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse composer config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unsupported context value for '{key}': {message}")]
    Context { key: String, message: String },

    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Top-level composer manifest.
///
/// ```toml
/// templates = "templates"
///
/// [context]
/// site_name = "demo"
///
/// [[component]]
/// name = "shop"
/// root = "components/shop"
/// parts_templates = ["parts.html"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ComposerConfig {
    /// Application-wide template directory
    #[serde(default = "default_templates")]
    pub templates: PathBuf,

    /// Default context merged into every render
    #[serde(default)]
    pub context: BTreeMap<String, toml::Value>,

    /// Components in registration (and therefore aggregation) order
    #[serde(default, rename = "component")]
    pub components: Vec<ComponentConfig>,
}

/// One `[[component]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    pub root: PathBuf,
    #[serde(default)]
    pub template_folder: Option<String>,
    #[serde(default)]
    pub static_folder: Option<String>,
    #[serde(default)]
    pub parts_templates: Option<Vec<String>>,
}

fn default_templates() -> PathBuf {
    PathBuf::from("templates")
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            templates: default_templates(),
            context: BTreeMap::new(),
            components: Vec::new(),
        }
    }
}

impl ComposerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve every relative path in the config against `base` (typically
    /// the directory containing the config file). Absolute paths are kept.
    pub fn rebased(mut self, base: &Path) -> Self {
        self.templates = base.join(&self.templates);
        for component in &mut self.components {
            component.root = base.join(&component.root);
        }
        self
    }

    /// Assemble a fully registered composer over `adapter`.
    pub fn build(&self, adapter: Arc<dyn RenderingAdapter>) -> Result<Composer, ConfigError> {
        let mut composer = Composer::new(&self.templates, adapter);

        let mut context = Context::new();
        for (key, value) in &self.context {
            let value =
                serde_json::to_value(value).map_err(|err| ConfigError::Context {
                    key: key.clone(),
                    message: err.to_string(),
                })?;
            context.insert(key.clone(), value);
        }
        composer.add_context(context);

        for entry in &self.components {
            let mut component = Component::new(&entry.name, &entry.root);
            if let Some(folder) = &entry.template_folder {
                component = component.with_template_folder(folder);
            }
            if let Some(folder) = &entry.static_folder {
                component = component.with_static_folder(folder);
            }
            if let Some(parts) = &entry.parts_templates {
                component = component.with_parts_templates(parts.iter().cloned());
            }
            composer.register_component(Arc::new(component))?;
        }

        Ok(composer)
    }
}
