//! Test-only engine stub
//!
//! Compiles any file by reading it verbatim, counting compiles so cache
//! coherence is observable. Lines of the form `@def name: body` declare part
//! definitions; a body of `!boom` makes that definition fail to render, for
//! error-propagation tests. `{{key}}` occurrences are substituted from the
//! context.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::engine::{CompiledTemplate, EngineError, TemplateEngine};
use crate::lookup::TemplatePathLookup;

#[derive(Default)]
pub(crate) struct StubEngine {
    compiles: AtomicUsize,
}

impl StubEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }
}

impl TemplateEngine for StubEngine {
    fn compile(
        &self,
        path: &Path,
        _lookup: &Arc<TemplatePathLookup>,
    ) -> Result<Arc<dyn CompiledTemplate>, EngineError> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        let source = fs::read_to_string(path).map_err(|err| EngineError::read(path, err))?;
        Ok(Arc::new(StubTemplate { source }))
    }
}

pub(crate) struct StubTemplate {
    source: String,
}

impl StubTemplate {
    fn definition(&self, name: &str) -> Option<&str> {
        let marker = format!("@def {}:", name);
        self.source
            .lines()
            .find_map(|line| line.strip_prefix(marker.as_str()).map(str::trim))
    }
}

fn substitute(text: &str, context: &Context) -> String {
    let mut out = text.to_string();
    for (key, value) in context.iter() {
        let needle = format!("{{{{{}}}}}", key);
        if out.contains(&needle) {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out = out.replace(&needle, &rendered);
        }
    }
    out
}

impl CompiledTemplate for StubTemplate {
    fn render(&self, context: &Context) -> Result<String, EngineError> {
        Ok(substitute(self.source.trim_end(), context))
    }

    fn has_definition(&self, name: &str) -> bool {
        self.definition(name).is_some()
    }

    fn render_definition(&self, name: &str, context: &Context) -> Result<String, EngineError> {
        let body = self
            .definition(name)
            .ok_or_else(|| EngineError::render(format!("no definition named '{}'", name)))?;
        if body == "!boom" {
            return Err(EngineError::render(format!(
                "definition '{}' exploded",
                name
            )));
        }
        Ok(substitute(body, context))
    }
}
