//! Error types for bundling operations.
//!
//! Covers the fatal failure modes: missing descriptors and script files,
//! malformed JSON, I/O, configuration problems, and requested schemas that
//! exist in neither store category. Non-fatal dependency problems are not
//! errors; they are logged and returned as warnings.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while inlining, bundling or writing artifacts.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The schema directory has no `schema.json`.
    #[error("schema descriptor not found: {}", path.display())]
    MissingDescriptor {
        /// Expected descriptor path.
        path: PathBuf,
    },

    /// A script reference points at a file that does not exist.
    #[error("script file '{reference}' referenced by {} not found at {}", schema_dir.display(), path.display())]
    MissingScript {
        /// Directory of the schema holding the reference.
        schema_dir: PathBuf,
        /// Reference as written in the descriptor.
        reference: String,
        /// Resolved path that was probed.
        path: PathBuf,
    },

    /// File I/O failure on a known path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A descriptor or artifact is not valid JSON for its type.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization failure while emitting an artifact.
    #[error("JSON error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// YAML configuration parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A requested schema exists in neither `types/` nor `functions/`.
    #[error(
        "schema '{identifier}' not found in types/ or functions/; use 'type:{identifier}' or 'function:{identifier}' to name it explicitly"
    )]
    UnknownSchema {
        /// Identifier as requested.
        identifier: String,
    },

    /// Configuration value is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BundleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`BundleError`].
pub type Result<T> = std::result::Result<T, BundleError>;
