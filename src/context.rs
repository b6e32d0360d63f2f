//! Render context: named template variables with merge-override semantics

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// An ordered map of template variable names to values.
///
/// Contexts are merged in layers around every render call: adapter globals
/// first, then the container's default context, then the caller's explicit
/// context, with later layers overriding earlier ones on key collision.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Merge `overrides` into this context in place; its values win.
    pub fn extend(&mut self, overrides: &Context) {
        for (key, value) in overrides.iter() {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// A copy of this context with `overrides` layered on top.
    pub fn merged(&self, overrides: &Context) -> Context {
        let mut merged = self.clone();
        merged.extend(overrides);
        merged
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
