//! Bundle and registry validation.
//!
//! Checks the guarantees downstream interpreters rely on: every entry has a
//! well-formed registry URI agreeing with its document kind, no schema
//! appears twice, and no script block is still a file reference. Function
//! requirements missing from the bundle are reported as non-fatal findings,
//! since dependency collection is best-effort.
//!
//! # Examples
//!
//! ```
//! use color_schema_core::*;
//!
//! let doc: SchemaDocument = serde_json::from_value(serde_json::json!({
//!     "type": "function",
//!     "name": "Invert",
//!     "keyword": "invert",
//!     "script": { "type": "colorscript", "script": "./invert.cs" }
//! })).unwrap();
//!
//! let mut bundle = Bundle::new(BundleMetadata {
//!     requested_schemas: vec!["invert".into()],
//!     resolved_dependencies: ResolvedDependencies::default(),
//!     generated_at: "2026-01-01T00:00:00Z".into(),
//!     generated_by: None,
//! });
//! bundle.schemas.push(BundledSchema {
//!     uri: "https://x.dev/api/v1/function/invert/0/".into(),
//!     schema: doc,
//! });
//!
//! let errors = validate_bundle(&bundle);
//! assert!(errors.iter().any(|e| matches!(e, ValidationError::UnresolvedScript { .. })));
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::package::{Bundle, BundledSchema, Registry};
use crate::reference::{RegistryUri, resolve_reference};
use crate::types::{SchemaDocument, SchemaKey};

/// Bundle/registry validation findings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Registry version string is empty.
    #[error("registry version cannot be empty")]
    EmptyVersion,
    /// An entry URI is not a registry URI.
    #[error("invalid registry URI: {0}")]
    InvalidUri(String),
    /// The URI category disagrees with the document type.
    #[error("URI {uri} does not match a {kind} document")]
    KindMismatch {
        /// Entry URI.
        uri: String,
        /// Kind of the document.
        kind: String,
    },
    /// Two entries share the same `kind:slug`.
    #[error("duplicate schema in bundle: {0}")]
    DuplicateSchema(String),
    /// A script block still references a file.
    #[error("script reference '{script}' was not inlined in {uri}")]
    UnresolvedScript {
        /// Entry URI.
        uri: String,
        /// Remaining reference.
        script: String,
    },
    /// A function requirement is not part of the bundle.
    #[error("requirement '{requirement}' of {uri} is not bundled")]
    MissingRequirement {
        /// Entry URI.
        uri: String,
        /// Unsatisfied requirement.
        requirement: String,
    },
}

impl ValidationError {
    /// Returns `false` for findings that do not make the bundle unusable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MissingRequirement { .. })
    }
}

/// Validates a selective bundle.
pub fn validate_bundle(bundle: &Bundle) -> Vec<ValidationError> {
    validate_entries(bundle.schemas.iter())
}

/// Validates a full registry.
pub fn validate_registry(registry: &Registry) -> Vec<ValidationError> {
    if registry.version.trim().is_empty() {
        return vec![ValidationError::EmptyVersion];
    }
    validate_entries(registry.entries())
}

fn validate_entries<'a>(entries: impl Iterator<Item = &'a BundledSchema>) -> Vec<ValidationError> {
    let entries: Vec<&BundledSchema> = entries.collect();
    let mut errors = Vec::new();
    let mut present: HashSet<SchemaKey> = HashSet::new();

    for entry in &entries {
        let kind = entry.schema.kind();
        let uri = match RegistryUri::parse(&entry.uri) {
            Ok(uri) => uri,
            Err(_) => {
                errors.push(ValidationError::InvalidUri(entry.uri.clone()));
                continue;
            }
        };
        if uri.kind() != kind {
            errors.push(ValidationError::KindMismatch {
                uri: entry.uri.clone(),
                kind: kind.to_string(),
            });
        }
        let key = SchemaKey::new(kind, uri.name);
        if !present.insert(key.clone()) {
            errors.push(ValidationError::DuplicateSchema(key.to_string()));
        }
        for script in entry.schema.unresolved_script_references() {
            errors.push(ValidationError::UnresolvedScript {
                uri: entry.uri.clone(),
                script: script.to_string(),
            });
        }
    }

    for entry in &entries {
        let SchemaDocument::Function(spec) = &entry.schema else {
            continue;
        };
        for requirement in spec.requirements.iter().flatten() {
            let satisfied = resolve_reference(requirement, "")
                .is_some_and(|r| present.contains(&SchemaKey::new(r.kind, r.slug)));
            if !satisfied {
                errors.push(ValidationError::MissingRequirement {
                    uri: entry.uri.clone(),
                    requirement: requirement.clone(),
                });
            }
        }
    }

    errors
}
