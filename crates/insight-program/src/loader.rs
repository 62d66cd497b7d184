//! Descriptor sources and raw loading.

use crate::error::LoadError;
use crate::paths::resolve_path;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Where a descriptor comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorSource {
    /// A file path, relative to the root path unless absolute.
    Path(String),
    /// An already parsed descriptor held in memory.
    Value(Value),
}

impl DescriptorSource {
    /// Path as given by the caller, `None` for in-memory sources.
    pub fn path(&self) -> Option<&str> {
        match self {
            DescriptorSource::Path(path) => Some(path.as_str()),
            DescriptorSource::Value(_) => None,
        }
    }
}

impl From<&str> for DescriptorSource {
    fn from(path: &str) -> Self {
        DescriptorSource::Path(path.to_string())
    }
}

impl From<String> for DescriptorSource {
    fn from(path: String) -> Self {
        DescriptorSource::Path(path)
    }
}

impl From<Value> for DescriptorSource {
    fn from(value: Value) -> Self {
        DescriptorSource::Value(value)
    }
}

/// Load the raw JSON for `source`.
///
/// Returns `Ok(None)` when a path source does not exist. Path sources cost
/// one existence check and at most one read; in-memory sources cost no I/O.
pub async fn load_raw(
    source: &DescriptorSource,
    root: Option<&Path>,
) -> Result<Option<Value>, LoadError> {
    let path = match source {
        DescriptorSource::Value(value) => return Ok(Some(value.clone())),
        DescriptorSource::Path(path) => path,
    };
    let resolved = resolve_path(root, Path::new(path));
    let exists = tokio::fs::try_exists(&resolved)
        .await
        .map_err(|source| LoadError::Read {
            path: resolved.display().to_string(),
            source,
        })?;
    if !exists {
        debug!(path = %resolved.display(), "descriptor source does not exist");
        return Ok(None);
    }
    let bytes = tokio::fs::read(&resolved)
        .await
        .map_err(|source| LoadError::Read {
            path: resolved.display().to_string(),
            source,
        })?;
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| LoadError::Parse {
            path: resolved.display().to_string(),
            source,
        })
}
