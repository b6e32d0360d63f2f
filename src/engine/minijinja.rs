//! MiniJinja-backed template engine
//!
//! Each compiled template owns its own `Environment` whose loader routes
//! include/extends names through the lookup chain the compilation originated
//! from. A component template can therefore `{% include "nav.html" %}` and
//! receive its own `nav.html` when it ships one, or the application-wide one
//! otherwise, without the template knowing which is which.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use minijinja::value::Value;
use minijinja::{Environment, ErrorKind};

use super::{CompiledTemplate, EngineError, TemplateEngine};
use crate::context::Context;
use crate::lookup::TemplatePathLookup;

/// Template engine backed by [`minijinja`].
///
/// The base environment carries any globals, filters, or syntax settings
/// installed by the caller; every compiled template gets a clone of it.
#[derive(Default)]
pub struct MiniJinjaEngine {
    base: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build over a preconfigured environment (custom filters, globals, ...).
    pub fn with_environment(base: Environment<'static>) -> Self {
        Self { base }
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn compile(
        &self,
        path: &Path,
        lookup: &Arc<TemplatePathLookup>,
    ) -> Result<Arc<dyn CompiledTemplate>, EngineError> {
        let source = fs::read_to_string(path).map_err(|err| EngineError::read(path, err))?;

        let mut env = self.base.clone();
        let loader_lookup = Arc::clone(lookup);
        env.set_loader(move |name: &str| match loader_lookup.locate(name) {
            Some(found) => fs::read_to_string(&found).map(Some).map_err(|err| {
                minijinja::Error::new(
                    ErrorKind::TemplateNotFound,
                    format!("failed to read {}: {}", found.display(), err),
                )
            }),
            None => Ok(None),
        });

        let name = path.display().to_string();
        env.add_template_owned(name.clone(), source)
            .map_err(|err| EngineError::compile(path, err.to_string()))?;

        Ok(Arc::new(MiniJinjaTemplate { env, name }))
    }
}

struct MiniJinjaTemplate {
    env: Environment<'static>,
    name: String,
}

fn render_err(err: minijinja::Error) -> EngineError {
    EngineError::render(err.to_string())
}

impl CompiledTemplate for MiniJinjaTemplate {
    fn render(&self, context: &Context) -> Result<String, EngineError> {
        let template = self.env.get_template(&self.name).map_err(render_err)?;
        template
            .render(Value::from_serialize(context))
            .map_err(render_err)
    }

    fn has_definition(&self, name: &str) -> bool {
        let Ok(template) = self.env.get_template(&self.name) else {
            return false;
        };
        let Ok(mut state) = template.eval_to_state(Value::UNDEFINED) else {
            return false;
        };
        match state.render_block(name) {
            Ok(_) => true,
            // Any failure other than "no such block" means the block exists
            // but its render faulted; the real render surfaces that error.
            Err(err) => err.kind() != ErrorKind::UnknownBlock,
        }
    }

    fn render_definition(&self, name: &str, context: &Context) -> Result<String, EngineError> {
        let template = self.env.get_template(&self.name).map_err(render_err)?;
        let mut state = template
            .eval_to_state(Value::from_serialize(context))
            .map_err(render_err)?;
        state.render_block(name).map_err(render_err)
    }
}
