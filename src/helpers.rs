//! Template helper utilities
//!
//! Host-side helpers handlers use while assembling a page: joining
//! aggregated parts into one fragment, and emitting `<script>`/`<link>` tags
//! whose URLs respect the active component's static namespace.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::composer::{Composer, RequestScope};
use crate::error::ComposeError;

/// Helper bundle for request handlers.
///
/// Asset URLs resolve against the active component first: when the component
/// owning the in-flight request ships the asset under its own static
/// directory, the tag points into the component's URL namespace; otherwise
/// it falls back to the application-wide `/static/`. Decisions are cached
/// per (component, path) since they depend only on the filesystem layout.
#[derive(Debug, Default)]
pub struct AssetHelper {
    endpoint_cache: Mutex<HashMap<String, String>>,
}

impl AssetHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate the named part across all components and join the results
    /// with newlines, ready to drop into a page context.
    pub fn parts(
        &self,
        composer: &Composer,
        scope: &mut RequestScope,
        name: &str,
    ) -> Result<String, ComposeError> {
        Ok(composer.aggregate_parts(scope, name)?.join("\n"))
    }

    /// A `<script>` tag for `path`, resolved against the active component.
    pub fn script(&self, scope: &RequestScope, path: &str) -> String {
        format!(
            "<script type=\"text/javascript\" src=\"{}\"></script>",
            self.asset_url(scope, path)
        )
    }

    /// A stylesheet `<link>` tag for `path`, resolved against the active
    /// component.
    pub fn styles(&self, scope: &RequestScope, path: &str) -> String {
        format!(
            "<link rel=\"stylesheet\" type=\"text/css\" media=\"all\" href=\"{}\"/>",
            self.asset_url(scope, path)
        )
    }

    fn asset_url(&self, scope: &RequestScope, path: &str) -> String {
        let key = match scope.current() {
            Some(component) => format!("{}@{}", component.name(), path),
            None => format!("@{}", path),
        };
        if let Some(url) = self.endpoint_cache.lock().unwrap().get(&key) {
            return url.clone();
        }

        let url = match scope.current() {
            Some(component) if component.static_dir().join(path).is_file() => {
                format!("{}static/{}", component.url_prefix(), path)
            }
            _ => format!("/static/{}", path),
        };
        self.endpoint_cache.lock().unwrap().insert(key, url.clone());
        url
    }
}
