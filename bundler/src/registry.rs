//! Full registry builds.
//!
//! Inlines every schema in the store, whether or not anything references it,
//! and assembles one [`Registry`]. A schema that fails to build is logged and
//! excluded; the rest of the build proceeds. Schemas are inlined in parallel
//! and sorted by slug afterwards, so the output does not depend on
//! scheduling.
//!
//! Artifacts written by [`write_registry`]:
//!
//! ```text
//! {output}/registry.json          {version, types[], functions[], metadata}
//! {output}/types.json             every type entry
//! {output}/functions.json         every function entry
//! {output}/types/{slug}.json      one type entry
//! {output}/functions/{slug}.json  one function entry
//! {output}/manifest.json          checksums, see crate::Manifest
//! ```

use std::path::Path;

use color_schema_core::{
    BundledSchema, Registry, RegistryMetadata, RegistryUri, SchemaKey, SchemaKind,
};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::BundlerConfig;
use crate::error::{BundleError, Result};
use crate::inline::{InlineOptions, inline_schema};
use crate::manifest::{Manifest, entry_slug, now_iso8601, schema_file_bytes, schema_file_path};
use crate::store::SchemaStore;

/// File name of the complete registry artifact.
pub const REGISTRY_FILE: &str = "registry.json";

/// File name of the registry manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// A schema excluded from a registry build.
#[derive(Debug, Clone)]
pub struct BuildFailure {
    /// Which schema failed.
    pub key: SchemaKey,
    /// Rendered error.
    pub error: String,
}

/// Result of a full registry build.
#[derive(Debug, Clone)]
pub struct RegistryBuild {
    /// The assembled registry.
    pub registry: Registry,
    /// Manifest of the per-schema artifacts.
    pub manifest: Manifest,
    /// Schemas that failed to build and were excluded.
    pub failures: Vec<BuildFailure>,
}

/// Builds a registry from every schema in the store.
///
/// # Errors
///
/// Returns [`BundleError::Io`] when a store category cannot be listed, or
/// [`BundleError::Serialize`] when the manifest cannot be computed.
/// Individual schema failures are not errors; see
/// [`RegistryBuild::failures`].
pub fn build_registry(
    store: &SchemaStore,
    config: &BundlerConfig,
    generated_by: Option<String>,
) -> Result<RegistryBuild> {
    let keys = store.keys()?;
    let inline_options = InlineOptions::with_base_url(&config.base_url);

    let mut results: Vec<(SchemaKey, Result<BundledSchema>)> = keys
        .into_par_iter()
        .map(|key| {
            let built = inline_schema(&store.schema_dir(&key), inline_options).map(|schema| {
                BundledSchema {
                    uri: RegistryUri::canonical(&config.base_url, key.kind, &key.slug).to_string(),
                    schema,
                }
            });
            (key, built)
        })
        .collect();
    results.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut types = Vec::new();
    let mut functions = Vec::new();
    let mut failures = Vec::new();
    for (key, built) in results {
        match built {
            Ok(entry) => match key.kind {
                SchemaKind::Type => types.push(entry),
                SchemaKind::Function => functions.push(entry),
            },
            Err(err) => {
                warn!(schema = %key, error = %err, "excluding schema from registry");
                failures.push(BuildFailure {
                    key,
                    error: err.to_string(),
                });
            }
        }
    }

    let mut registry = Registry {
        version: config.registry_version.clone(),
        metadata: RegistryMetadata {
            generated_at: now_iso8601(),
            generated_by,
            base_url: config.base_url.clone(),
            type_count: types.len(),
            function_count: functions.len(),
            bundle_hash: None,
            excluded: failures.iter().map(|f| f.key.to_string()).collect(),
        },
        types,
        functions,
    };
    let manifest = Manifest::from_registry(&registry)?;
    registry.metadata.bundle_hash = Some(manifest.bundle_hash.clone());

    info!(
        types = registry.metadata.type_count,
        functions = registry.metadata.function_count,
        excluded = failures.len(),
        "built registry"
    );

    Ok(RegistryBuild {
        registry,
        manifest,
        failures,
    })
}

/// Writes the registry, category-split, per-schema and manifest artifacts.
///
/// # Errors
///
/// Returns [`BundleError::Io`] or [`BundleError::Serialize`] on failure.
pub fn write_registry(build: &RegistryBuild, output_dir: impl AsRef<Path>) -> Result<()> {
    let output_dir = output_dir.as_ref();
    let registry = &build.registry;

    for kind in SchemaKind::ALL {
        let dir = output_dir.join(kind.dir_name());
        std::fs::create_dir_all(&dir).map_err(|e| BundleError::io(&dir, e))?;
    }

    write_json(&output_dir.join(REGISTRY_FILE), registry)?;
    write_json(&output_dir.join("types.json"), &registry.types)?;
    write_json(&output_dir.join("functions.json"), &registry.functions)?;

    for (kind, entries) in [
        (SchemaKind::Type, &registry.types),
        (SchemaKind::Function, &registry.functions),
    ] {
        for entry in entries {
            let path = output_dir.join(schema_file_path(kind, &entry_slug(entry)));
            let bytes = schema_file_bytes(entry)?;
            std::fs::write(&path, bytes).map_err(|e| BundleError::io(&path, e))?;
        }
    }

    build.manifest.save(output_dir.join(MANIFEST_FILE))?;
    info!(output = %output_dir.display(), "wrote registry artifacts");
    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value)?;
    std::fs::write(path, raw).map_err(|e| BundleError::io(path, e))
}
