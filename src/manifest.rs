//! Component module descriptors
//!
//! A component may ship a `module.json` next to its static assets describing
//! itself to external clients (navigation entries, capability flags, ...).
//! The file is parsed lazily and re-read only when its modification time
//! advances past the cached read; there is no polling loop.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors loading or parsing a `module.json`
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("error reading module manifest {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("error parsing module manifest {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// mtime-gated loader for a component's `module.json`.
#[derive(Debug)]
pub struct ModuleManifest {
    path: PathBuf,
    cached: Mutex<CachedModule>,
}

#[derive(Debug, Default)]
struct CachedModule {
    modified: Option<SystemTime>,
    value: Option<Value>,
}

impl ModuleManifest {
    /// Manifest loader for the `module.json` under `static_dir`.
    pub fn new(static_dir: &Path) -> Self {
        Self {
            path: static_dir.join("module.json"),
            cached: Mutex::new(CachedModule::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed manifest, or `None` when the component ships none.
    pub fn load(&self) -> Result<Option<Value>, ManifestError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(_) => return Ok(None),
        };
        let modified = metadata.modified().map_err(|err| ManifestError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        })?;

        let mut cached = self.cached.lock().unwrap();
        let stale = match cached.modified {
            Some(seen) => modified > seen,
            None => true,
        };
        if stale {
            let text = fs::read_to_string(&self.path).map_err(|err| ManifestError::Io {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
            let value = serde_json::from_str(&text).map_err(|err| ManifestError::Parse {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
            cached.value = Some(value);
            cached.modified = Some(modified);
        }
        Ok(cached.value.clone())
    }
}

/// Static descriptor a component exposes to external clients.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDescriptor {
    pub name: String,
    pub static_location: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<Value>,
}
