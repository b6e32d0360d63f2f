//! Rendering adapter: the single seam between composition and templating

use std::path::Path;
use std::sync::Arc;

use crate::context::Context;
use crate::engine::{CompiledTemplate, EngineError, TemplateEngine};
use crate::lookup::TemplatePathLookup;

/// The capability the composition core renders through.
///
/// Exactly two operations: render a whole template, and render zero-or-more
/// named definitions ("parts") out of a candidate template list. Alternate
/// templating backends are substituted here without touching lookup or
/// composer logic.
pub trait RenderingAdapter: Send + Sync {
    /// Render `name` resolved through `lookup`. An unresolvable name yields
    /// an empty string, not an error; missing optional templates are
    /// tolerated by design.
    fn render_template(
        &self,
        lookup: &Arc<TemplatePathLookup>,
        name: &str,
        context: &Context,
    ) -> Result<String, EngineError>;

    /// For each candidate template, in order: skip silently when the name
    /// does not resolve or the template has no definition named `part_name`;
    /// otherwise render just that definition and append its output.
    fn render_parts(
        &self,
        lookup: &Arc<TemplatePathLookup>,
        template_names: &[String],
        part_name: &str,
        context: &Context,
    ) -> Result<Vec<String>, EngineError>;
}

/// Adapter over any [`TemplateEngine`].
///
/// Carries adapter-level globals merged beneath every caller context, the
/// way an application installs template globals once and has them visible in
/// every render.
pub struct EngineAdapter<E> {
    engine: E,
    globals: Context,
}

impl<E: TemplateEngine> EngineAdapter<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            globals: Context::new(),
        }
    }

    pub fn with_globals(mut self, globals: Context) -> Self {
        self.globals = globals;
        self
    }

    fn get_template(
        &self,
        lookup: &Arc<TemplatePathLookup>,
        name: &str,
    ) -> Result<Option<Arc<dyn CompiledTemplate>>, EngineError> {
        // The factory closes over the originating lookup, so includes inside
        // a template found anywhere along the chain still resolve from the
        // perspective of the lookup this render started at.
        let factory = |path: &Path| self.engine.compile(path, lookup);
        lookup.resolve(name, &factory)
    }
}

impl<E: TemplateEngine> RenderingAdapter for EngineAdapter<E> {
    fn render_template(
        &self,
        lookup: &Arc<TemplatePathLookup>,
        name: &str,
        context: &Context,
    ) -> Result<String, EngineError> {
        match self.get_template(lookup, name)? {
            Some(template) => template.render(&self.globals.merged(context)),
            None => Ok(String::new()),
        }
    }

    fn render_parts(
        &self,
        lookup: &Arc<TemplatePathLookup>,
        template_names: &[String],
        part_name: &str,
        context: &Context,
    ) -> Result<Vec<String>, EngineError> {
        let merged = self.globals.merged(context);
        let mut parts = Vec::new();
        for name in template_names {
            let Some(template) = self.get_template(lookup, name)? else {
                continue;
            };
            if template.has_definition(part_name) {
                parts.push(template.render_definition(part_name, &merged)?);
            }
        }
        Ok(parts)
    }
}
