//! Hierarchical template path lookup with per-lookup compile caching

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, trace};

use crate::engine::{CompiledTemplate, EngineError};

/// Factory invoked for the first resolution of a path. Receives the resolved
/// filesystem path and produces the compiled template; the engine adapter
/// builds it as a closure over the originating lookup so that includes and
/// extends inside the template are themselves resolved hierarchically.
pub type TemplateFactory<'a> =
    dyn Fn(&Path) -> Result<Arc<dyn CompiledTemplate>, EngineError> + 'a;

/// A tree node of candidate template directories.
///
/// Resolution searches this lookup's own directories in order (first
/// directory containing the requested file wins) and falls back to the parent
/// chain. Each lookup caches compiled templates keyed by the *resolved path*,
/// so two names that resolve to the same file share one compiled instance and
/// one compile cost. The cache grows monotonically and is never invalidated
/// during the lookup's lifetime; templates are assumed static for the life of
/// the process.
pub struct TemplatePathLookup {
    dirs: Vec<PathBuf>,
    parent: OnceLock<Arc<TemplatePathLookup>>,
    cache: Mutex<HashMap<PathBuf, Arc<CacheSlot>>>,
}

/// Per-path slot: holding the slot's mutex during the first compile
/// guarantees at most one compile per distinct resolved path, without
/// serializing compiles of unrelated paths.
struct CacheSlot(Mutex<Option<Arc<dyn CompiledTemplate>>>);

impl std::fmt::Debug for TemplatePathLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplatePathLookup")
            .field("dirs", &self.dirs)
            .field("has_parent", &self.has_parent())
            .finish()
    }
}

impl TemplatePathLookup {
    /// Create a parentless lookup over the given directories, in search order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            parent: OnceLock::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Whether this lookup delegates to a parent on local misses.
    pub fn has_parent(&self) -> bool {
        self.parent.get().is_some()
    }

    pub fn parent(&self) -> Option<&Arc<TemplatePathLookup>> {
        self.parent.get()
    }

    /// Attach the parent lookup. Set at most once, at component registration;
    /// guarded by the component's own registration check.
    pub(crate) fn set_parent(&self, parent: Arc<TemplatePathLookup>) {
        let _ = self.parent.set(parent);
    }

    /// This lookup's directories followed by the full parent chain's, order
    /// preserved. Duplicates are tolerated, not deduplicated; earlier entries
    /// always win ties during resolution.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs = self.dirs.clone();
        if let Some(parent) = self.parent.get() {
            dirs.extend(parent.directories());
        }
        dirs
    }

    /// Resolve `name` to a compiled template.
    ///
    /// Returns a cached instance when the resolved path was compiled before;
    /// otherwise searches the own directories in order, compiles the first
    /// hit via `factory`, and caches it. On a local miss, delegation moves to
    /// the parent chain with the same factory. `Ok(None)` means the name
    /// resolves nowhere in the chain; absence is a valid outcome, not an
    /// error.
    pub fn resolve(
        &self,
        name: &str,
        factory: &TemplateFactory<'_>,
    ) -> Result<Option<Arc<dyn CompiledTemplate>>, EngineError> {
        if let Some(path) = self.locate_local(name) {
            return self.compile_cached(&path, factory).map(Some);
        }
        if let Some(parent) = self.parent.get() {
            return parent.resolve(name, factory);
        }
        Ok(None)
    }

    /// Chain-wide path search without compiling. Used by engine loaders to
    /// source include/extends targets.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.locate_local(name)
            .or_else(|| self.parent.get().and_then(|p| p.locate(name)))
    }

    /// Adjust a template URI referenced relative to another template.
    ///
    /// Search order: `relative_to` first, then this lookup's own directories,
    /// then the parent chain. When nothing matches anywhere, the original URI
    /// is returned unchanged so the underlying engine raises its own
    /// not-found error instead of having it masked here.
    pub fn adjust_uri(&self, uri: &str, relative_to: Option<&Path>) -> PathBuf {
        if let Some(base) = relative_to {
            let candidate = base.join(uri);
            if candidate.is_file() {
                return candidate;
            }
        }
        match self.locate(uri) {
            Some(path) => path,
            None => PathBuf::from(uri),
        }
    }

    /// First own directory containing a file literally named `name`.
    fn locate_local(&self, name: &str) -> Option<PathBuf> {
        self.dirs.iter().find_map(|dir| {
            let path = dir.join(name);
            path.is_file().then_some(path)
        })
    }

    fn compile_cached(
        &self,
        path: &Path,
        factory: &TemplateFactory<'_>,
    ) -> Result<Arc<dyn CompiledTemplate>, EngineError> {
        let slot = {
            let mut cache = self.cache.lock().unwrap();
            cache
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(CacheSlot(Mutex::new(None))))
                .clone()
        };

        let mut compiled = slot.0.lock().unwrap();
        if let Some(template) = compiled.as_ref() {
            trace!(path = %path.display(), "template cache hit");
            return Ok(Arc::clone(template));
        }

        debug!(path = %path.display(), "compiling template");
        let template = factory(path)?;
        *compiled = Some(Arc::clone(&template));
        Ok(template)
    }
}
