//! Template engine capability
//!
//! The composition core never talks to a templating technology directly; it
//! consumes the two traits defined here. `TemplateEngine` turns a resolved
//! filesystem path into a `CompiledTemplate`, and a compiled template can be
//! rendered whole or queried for a named definition (a block a template
//! exposes as a composable part). The `minijinja` submodule provides the
//! bundled implementation.

mod minijinja;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::context::Context;
use crate::lookup::TemplatePathLookup;

pub use self::minijinja::MiniJinjaEngine;

/// Errors surfaced by a template engine. The composition core propagates
/// these unchanged; it never catches or translates them.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Error reading a template source file
    #[error("error reading template file {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Template source failed to compile
    #[error("error compiling template {path}: {message}")]
    Compile { path: PathBuf, message: String },

    /// Rendering failed (undefined access, failing include, ...)
    #[error("render error: {message}")]
    Render { message: String },
}

impl EngineError {
    pub fn read(path: &Path, err: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn compile(path: &Path, message: impl Into<String>) -> Self {
        Self::Compile {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

/// A template compiled from a filesystem path.
pub trait CompiledTemplate: Send + Sync {
    /// Render the whole template with the given context.
    fn render(&self, context: &Context) -> Result<String, EngineError>;

    /// Whether the template exposes a definition under `name`.
    fn has_definition(&self, name: &str) -> bool;

    /// Render just the named definition with the given context.
    fn render_definition(&self, name: &str, context: &Context) -> Result<String, EngineError>;
}

/// Compiles template files.
///
/// `lookup` is the lookup the resolution originated from; engines wire it
/// into their include/extends machinery so that templates referenced from
/// inside a template are resolved through the same hierarchical chain.
pub trait TemplateEngine: Send + Sync {
    fn compile(
        &self,
        path: &Path,
        lookup: &Arc<TemplatePathLookup>,
    ) -> Result<Arc<dyn CompiledTemplate>, EngineError>;
}
