//! Script inlining.
//!
//! Loads a schema directory's descriptor and replaces every script file
//! reference with the trimmed content of that file, producing a
//! self-contained [`SchemaDocument`]. The on-disk descriptor is never
//! modified.
//!
//! When a base URL is supplied, registry URIs inside the document (script
//! language tags, conversion endpoints, function requirements) are rebuilt
//! against it so that a bundle produced for a custom registry host is
//! internally consistent.

use std::path::Path;

use color_schema_core::{ConversionEndpoint, RegistryUri, SchemaDocument, ScriptBody};
use tracing::debug;

use crate::error::{BundleError, Result};
use crate::store::DESCRIPTOR_FILE;

/// Options for [`inline_schema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineOptions<'a> {
    /// Registry base URL to rebase document URIs onto.
    pub base_url: Option<&'a str>,
}

impl<'a> InlineOptions<'a> {
    /// Options that rebase URIs onto `base_url`.
    pub fn with_base_url(base_url: &'a str) -> Self {
        Self {
            base_url: Some(base_url),
        }
    }
}

/// Reads and parses `schema.json` from `schema_dir` without inlining.
///
/// # Errors
///
/// Returns [`BundleError::MissingDescriptor`] when the descriptor does not
/// exist, [`BundleError::Io`] when it cannot be read, and
/// [`BundleError::Json`] when it is not a valid schema document.
pub fn load_descriptor(schema_dir: &Path) -> Result<SchemaDocument> {
    let path = schema_dir.join(DESCRIPTOR_FILE);
    if !path.is_file() {
        return Err(BundleError::MissingDescriptor { path });
    }
    let raw = std::fs::read_to_string(&path).map_err(|e| BundleError::io(&path, e))?;
    serde_json::from_str(&raw).map_err(|source| BundleError::Json { path, source })
}

/// Loads a schema directory and inlines every script file reference.
///
/// # Errors
///
/// Any [`load_descriptor`] error, or [`BundleError::MissingScript`] when a
/// referenced script file does not exist.
pub fn inline_schema(schema_dir: &Path, options: InlineOptions<'_>) -> Result<SchemaDocument> {
    let mut doc = load_descriptor(schema_dir)?;

    for block in doc.script_blocks_mut() {
        let ScriptBody::Reference(reference) = &block.script else {
            continue;
        };
        let path = schema_dir.join(reference);
        if !path.is_file() {
            return Err(BundleError::MissingScript {
                schema_dir: schema_dir.to_path_buf(),
                reference: reference.clone(),
                path,
            });
        }
        let content = std::fs::read_to_string(&path).map_err(|e| BundleError::io(&path, e))?;
        block.script = ScriptBody::Literal(content.trim().to_string());
    }

    if let Some(base_url) = options.base_url {
        rebase_document(&mut doc, base_url);
    }

    debug!(schema = doc.name(), dir = %schema_dir.display(), "inlined schema");
    Ok(doc)
}

fn rebase_document(doc: &mut SchemaDocument, base_url: &str) {
    for block in doc.script_blocks_mut() {
        rebase_in_place(&mut block.kind, base_url);
    }
    match doc {
        SchemaDocument::Color(spec) => {
            for conversion in &mut spec.conversions {
                for endpoint in [&mut conversion.source, &mut conversion.target] {
                    if let ConversionEndpoint::Other(reference) = endpoint {
                        rebase_in_place(reference, base_url);
                    }
                }
            }
        }
        SchemaDocument::Function(spec) => {
            for requirement in spec.requirements.iter_mut().flatten() {
                rebase_in_place(requirement, base_url);
            }
        }
    }
}

fn rebase_in_place(value: &mut String, base_url: &str) {
    if let Ok(uri) = RegistryUri::parse(value) {
        *value = uri.rebase(base_url).to_string();
    }
}
