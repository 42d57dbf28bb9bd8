//! Selective bundling.
//!
//! Bundles a caller-chosen list of schemas together with everything they
//! need at runtime. Requested identifiers may be `type:slug`,
//! `function:slug`, a registry URI, or a bare slug whose kind is detected
//! from the store. Requested schemas are fatal when missing or broken; their
//! dependencies are best-effort.
//!
//! ```no_run
//! use color_schema_bundler::{BundleRequest, BundlerConfig, SchemaStore, bundle_schemas};
//!
//! let config = BundlerConfig::default();
//! let store = SchemaStore::open(&config.schemas_dir).unwrap();
//! let outcome = bundle_schemas(&store, &config, &BundleRequest::new(["invert"])).unwrap();
//! println!("bundled {} schema(s)", outcome.bundle.schema_count());
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use color_schema_core::{
    Bundle, BundleMetadata, BundledSchema, ExtractOptions, RegistryUri, SchemaKey, SchemaKind,
    resolve_reference,
};
use tracing::info;

use crate::collect::DependencyCollector;
use crate::config::BundlerConfig;
use crate::error::{BundleError, Result};
use crate::inline::{InlineOptions, inline_schema};
use crate::manifest::now_iso8601;
use crate::store::SchemaStore;

/// What to bundle.
#[derive(Debug, Clone, Default)]
pub struct BundleRequest {
    /// Requested identifiers, in request order.
    pub schemas: Vec<String>,
    /// Invocation recorded as `generatedBy` (e.g. the CLI argument list).
    pub generated_by: Option<String>,
}

impl BundleRequest {
    /// Creates a request for `schemas`.
    pub fn new<I, S>(schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schemas: schemas.into_iter().map(Into::into).collect(),
            generated_by: None,
        }
    }

    /// Records the invocation that produced the bundle.
    pub fn with_generated_by(mut self, generated_by: impl Into<String>) -> Self {
        self.generated_by = Some(generated_by.into());
        self
    }
}

/// A selective bundle plus the non-fatal warnings met while building it.
#[derive(Debug, Clone)]
pub struct BundleOutcome {
    /// The bundle.
    pub bundle: Bundle,
    /// Dependency problems that did not abort bundling.
    pub warnings: Vec<String>,
}

/// Turns one requested identifier into a store key.
///
/// # Errors
///
/// Returns [`BundleError::UnknownSchema`] when the identifier has no explicit
/// kind and exists in neither `types/` nor `functions/`, or cannot be
/// resolved at all.
pub fn parse_requested(
    store: &SchemaStore,
    config: &BundlerConfig,
    identifier: &str,
) -> Result<SchemaKey> {
    let identifier = identifier.trim();
    if let Some(key) = SchemaKey::parse_prefixed(identifier) {
        return Ok(key);
    }
    if identifier.contains('/') {
        return resolve_reference(identifier, &config.base_url)
            .map(|reference| SchemaKey::new(reference.kind, reference.slug))
            .ok_or_else(|| BundleError::UnknownSchema {
                identifier: identifier.to_string(),
            });
    }
    store
        .detect_kind(identifier)
        .map(|kind| SchemaKey::new(kind, identifier))
        .ok_or_else(|| BundleError::UnknownSchema {
            identifier: identifier.to_string(),
        })
}

/// Bundles the requested schemas and their runtime dependencies.
///
/// Conversions of color types are always followed, so every type reachable
/// through a conversion chain is present. Output order is types then
/// functions; within each kind, requested schemas come first in request
/// order, followed by dependencies in traversal order.
///
/// # Errors
///
/// Fails on an unknown requested identifier, or when a requested schema
/// cannot be inlined (missing descriptor, missing script, malformed JSON).
pub fn bundle_schemas(
    store: &SchemaStore,
    config: &BundlerConfig,
    request: &BundleRequest,
) -> Result<BundleOutcome> {
    let mut seeds: Vec<SchemaKey> = Vec::new();
    for identifier in &request.schemas {
        let key = parse_requested(store, config, identifier)?;
        if !seeds.contains(&key) {
            seeds.push(key);
        }
    }

    let inline_options = InlineOptions::with_base_url(&config.base_url);
    let mut preloaded = BTreeMap::new();
    for seed in &seeds {
        let doc = inline_schema(&store.schema_dir(seed), inline_options)?;
        preloaded.insert(seed.clone(), doc);
    }

    let collector = DependencyCollector::new(store, config, ExtractOptions::with_conversions());
    let mut collected = collector.collect_preloaded(&seeds, preloaded);

    let mut ordered: Vec<SchemaKey> = Vec::new();
    let mut seen: HashSet<SchemaKey> = HashSet::new();
    for kind in SchemaKind::ALL {
        let requested = seeds.iter().filter(|key| key.kind == kind).cloned();
        let resolved = collected
            .dependencies
            .of_kind(kind)
            .iter()
            .map(|slug| SchemaKey::new(kind, slug.clone()));
        for key in requested.chain(resolved) {
            if seen.insert(key.clone()) {
                ordered.push(key);
            }
        }
    }

    let mut bundle = Bundle::new(BundleMetadata {
        requested_schemas: request.schemas.clone(),
        resolved_dependencies: collected.dependencies.clone(),
        generated_at: now_iso8601(),
        generated_by: request.generated_by.clone(),
    });

    // Seeds were preloaded and dependencies are only resolved once loaded,
    // so every ordered key has a document.
    for key in &ordered {
        let Some(schema) = collected.documents.remove(key) else {
            continue;
        };
        bundle
            .dependency_tree
            .push(collector.dependency_node(key, &schema));
        bundle.schemas.push(BundledSchema {
            uri: RegistryUri::canonical(&config.base_url, key.kind, &key.slug).to_string(),
            schema,
        });
    }

    info!(
        requested = seeds.len(),
        bundled = bundle.schema_count(),
        warnings = collected.warnings.len(),
        "bundled schemas"
    );

    Ok(BundleOutcome {
        bundle,
        warnings: collected.warnings,
    })
}

/// Writes a bundle as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`BundleError::Io`] or [`BundleError::Serialize`] on failure.
pub fn write_bundle(bundle: &Bundle, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| BundleError::io(parent, e))?;
        }
    }
    let raw = serde_json::to_string_pretty(bundle)?;
    std::fs::write(path, raw).map_err(|e| BundleError::io(path, e))
}
