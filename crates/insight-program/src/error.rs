//! Error types for program resolution.
//!
//! Only [`InsightError`] aborts a resolve call. [`LoadError`] is turned into
//! a per-descriptor `Failure` by the caller and never crosses a source
//! boundary.

use thiserror::Error;

/// Fatal errors returned to the caller of `resolve_program`.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("path '{path}' does not exist")]
    ProgramNotFound { path: String },

    #[error("path '{path}' is not a directory")]
    NotADirectory { path: String },

    #[error("failed to inspect {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to resolve real path of package '{reference}': {source}")]
    Canonicalize {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure to turn a descriptor source into raw JSON.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read descriptor {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Stage label recorded in the descriptor's `errors`.
    pub fn stage(&self) -> &'static str {
        match self {
            LoadError::Read { .. } => "load",
            LoadError::Parse { .. } => "parse",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
