//! The container: global template resolution, component registry, and
//! request-scoped parts aggregation

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::adapter::RenderingAdapter;
use crate::component::Component;
use crate::context::Context;
use crate::error::ComposeError;
use crate::lookup::TemplatePathLookup;

/// State shared between a composer and its registered components: the
/// top-level lookup, the rendering adapter, and the default context merged
/// into every render call. Owns no components, so the ownership graph stays
/// acyclic even though every component holds a handle to it.
pub(crate) struct ComposerShared {
    pub(crate) lookup: Arc<TemplatePathLookup>,
    pub(crate) adapter: Arc<dyn RenderingAdapter>,
    pub(crate) default_context: RwLock<Context>,
}

impl ComposerShared {
    pub(crate) fn context_for(&self, explicit: &Context) -> Context {
        self.default_context.read().unwrap().merged(explicit)
    }
}

/// The top-level container composing an application out of components.
///
/// Holds the application-wide template lookup (the root of every
/// component's fallback chain), the shared rendering adapter, and the
/// ordered component registry. Registration order is aggregation order.
pub struct Composer {
    shared: Arc<ComposerShared>,
    components: Vec<Arc<Component>>,
    by_name: HashMap<String, Arc<Component>>,
}

impl Composer {
    /// Create a composer whose global lookup is seeded from the
    /// application's own template directory.
    pub fn new(template_dir: impl Into<PathBuf>, adapter: Arc<dyn RenderingAdapter>) -> Self {
        Self {
            shared: Arc::new(ComposerShared {
                lookup: Arc::new(TemplatePathLookup::new([template_dir.into()])),
                adapter,
                default_context: RwLock::new(Context::new()),
            }),
            components: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Merge `context` into the default context layered under every render.
    pub fn add_context(&self, context: Context) {
        self.shared.default_context.write().unwrap().extend(&context);
    }

    /// Snapshot of the current default context.
    pub fn default_context(&self) -> Context {
        self.shared.default_context.read().unwrap().clone()
    }

    pub fn lookup(&self) -> &Arc<TemplatePathLookup> {
        &self.shared.lookup
    }

    /// Register a component. Appends it to the aggregation order, indexes it
    /// by name, and hands it the shared adapter, default context, and lookup
    /// parent. Duplicate names are rejected explicitly; registering an
    /// already-registered component fails and leaves this composer
    /// untouched.
    pub fn register_component(&mut self, component: Arc<Component>) -> Result<(), ComposeError> {
        if self.by_name.contains_key(component.name()) {
            return Err(ComposeError::DuplicateName {
                name: component.name().to_string(),
            });
        }
        component.register(Arc::clone(&self.shared))?;
        info!(component = %component.name(), "registered component");
        self.by_name
            .insert(component.name().to_string(), Arc::clone(&component));
        self.components.push(component);
        Ok(())
    }

    /// Registered components in registration order.
    pub fn components(&self) -> &[Arc<Component>] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&Arc<Component>> {
        self.by_name.get(name)
    }

    /// Render a template through the top-level lookup with the default
    /// context merged beneath `context`.
    pub fn render_template(&self, name: &str, context: &Context) -> Result<String, ComposeError> {
        let merged = self.shared.context_for(context);
        Ok(self
            .shared
            .adapter
            .render_template(&self.shared.lookup, name, &merged)?)
    }

    /// Aggregate every rendering of the part named `part_name` contributed
    /// by registered components, in registration order, preserving each
    /// component's own result order.
    ///
    /// While a component's parts render, it is the scope's active component;
    /// the previously active component (whatever the dispatch layer set for
    /// the in-flight request) is restored on every exit path, including when
    /// a component's render fails.
    pub fn aggregate_parts(
        &self,
        scope: &mut RequestScope,
        part_name: &str,
    ) -> Result<Vec<String>, ComposeError> {
        let mut parts = Vec::new();
        for component in &self.components {
            let _active = scope.activate(Some(Arc::clone(component)));
            parts.extend(component.render_parts(part_name, &Context::new())?);
        }
        debug!(part = part_name, count = parts.len(), "aggregated parts");
        Ok(parts)
    }

    /// The registered component owning `path`, matched by URL-namespace
    /// prefix (`/{name}/`, or the bare `/{name}`).
    pub fn route_owner(&self, path: &str) -> Option<&Arc<Component>> {
        self.components.iter().find(|component| {
            let prefix = component.url_prefix();
            path.starts_with(prefix) || path == prefix.trim_end_matches('/')
        })
    }

    /// Dispatch-boundary hook: called when a request is routed, before its
    /// handler runs. The returned scope carries the owning component (if
    /// any) as active; dropping the scope is the after-request clear, which
    /// holds on every exit path, the handler failing included.
    pub fn begin_request(&self, path: &str) -> RequestScope {
        RequestScope {
            current: self.route_owner(path).cloned(),
        }
    }
}

/// Request-scoped slot tracking the component that owns the in-flight
/// request.
///
/// One value per logical request, threaded explicitly through helper and
/// aggregation calls. Concurrent requests each own their scope, so none can
/// observe another's active component; the lookup caches stay shared.
#[derive(Debug, Default)]
pub struct RequestScope {
    current: Option<Arc<Component>>,
}

impl RequestScope {
    /// A scope with no active component (a request owned by no component,
    /// or a context outside request handling entirely).
    pub fn new() -> Self {
        Self::default()
    }

    /// The component currently considered active.
    pub fn current(&self) -> Option<&Arc<Component>> {
        self.current.as_ref()
    }

    /// Make `component` the active component until the returned guard drops,
    /// at which point the prior value is restored. Restoration happens on
    /// drop, so it holds across early returns and panics alike.
    pub fn activate(&mut self, component: Option<Arc<Component>>) -> ActiveComponent<'_> {
        let saved = std::mem::replace(&mut self.current, component);
        ActiveComponent { scope: self, saved }
    }
}

/// Guard restoring a [`RequestScope`]'s previously active component.
#[must_use = "dropping the guard restores the previous active component"]
pub struct ActiveComponent<'scope> {
    scope: &'scope mut RequestScope,
    saved: Option<Arc<Component>>,
}

impl Drop for ActiveComponent<'_> {
    fn drop(&mut self) {
        self.scope.current = self.saved.take();
    }
}
