//! Registry manifest: checksums of the per-schema artifacts.
//!
//! The manifest is written next to the registry artifacts and records, for
//! every bundled schema, its canonical URI, the relative path of its
//! per-schema file and the SHA-256 digest of that file's bytes. The
//! `bundle_hash` is the SHA-256 over the sorted `key checksum` lines, so two
//! builds of the same store produce the same hash regardless of traversal
//! order.
//!
//! Comparing manifests with [`Manifest::diff`] tells which schemas changed
//! between two builds.

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use color_schema_core::{BundledSchema, Registry, RegistryUri, SchemaKey, SchemaKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{BundleError, Result};

/// Per-schema manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Canonical registry URI.
    pub uri: String,
    /// Per-schema file, relative to the output directory.
    pub file: String,
    /// SHA-256 hex digest of the per-schema file.
    pub checksum: String,
}

/// Checksums of one registry build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Registry version the manifest describes.
    pub version: String,
    /// ISO-8601 timestamp of the build.
    pub generated_at: String,
    /// SHA-256 over the sorted entry checksums.
    pub bundle_hash: String,
    /// Entries keyed by `kind:slug`.
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Computes the manifest for a registry from the exact bytes that
    /// [`schema_file_bytes`] produces for each entry.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Serialize`] if an entry cannot be serialized.
    pub fn from_registry(registry: &Registry) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (kind, schemas) in [
            (SchemaKind::Type, &registry.types),
            (SchemaKind::Function, &registry.functions),
        ] {
            for entry in schemas {
                let slug = entry_slug(entry);
                let key = SchemaKey::new(kind, slug.clone());
                let bytes = schema_file_bytes(entry)?;
                entries.insert(
                    key.to_string(),
                    ManifestEntry {
                        uri: entry.uri.clone(),
                        file: schema_file_path(kind, &slug),
                        checksum: sha256_hex(&bytes),
                    },
                );
            }
        }

        Ok(Self {
            version: registry.version.clone(),
            generated_at: registry.metadata.generated_at.clone(),
            bundle_hash: bundle_hash(&entries),
            entries,
        })
    }

    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] if the file cannot be read, or
    /// [`BundleError::Json`] if it is not valid manifest JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| BundleError::io(path, e))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|source| BundleError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Saves the manifest as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] if the file cannot be written, or
    /// [`BundleError::Serialize`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| BundleError::io(path, e))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Computes the SHA-256 hex digest of a file.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] if the file cannot be read.
    pub fn calculate_checksum(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| BundleError::io(path, e))?;
        Ok(sha256_hex(&bytes))
    }

    /// Returns the sorted keys of entries that differ between `self` and
    /// `other`: present in only one of them, or with a different checksum.
    pub fn diff(&self, other: &Manifest) -> Vec<String> {
        let mut changed: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, entry)| {
                other
                    .entries
                    .get(*key)
                    .is_none_or(|theirs| theirs.checksum != entry.checksum)
            })
            .map(|(key, _)| key.clone())
            .collect();
        changed.extend(
            other
                .entries
                .keys()
                .filter(|key| !self.entries.contains_key(*key))
                .cloned(),
        );
        changed.sort();
        changed
    }

    /// Looks up the entry for a `kind:slug` key.
    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(key)
    }
}

/// Serialized bytes of a per-schema artifact file.
///
/// # Errors
///
/// Returns [`BundleError::Serialize`] if the entry cannot be serialized.
pub fn schema_file_bytes(entry: &BundledSchema) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(entry)?)
}

/// Path of a per-schema artifact, relative to the output directory.
pub(crate) fn schema_file_path(kind: SchemaKind, slug: &str) -> String {
    format!("{}/{slug}.json", kind.dir_name())
}

/// Returns the current UTC time as an ISO-8601 string (`YYYY-MM-DDThh:mm:ssZ`).
pub(crate) fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn entry_slug(entry: &BundledSchema) -> String {
    RegistryUri::parse(&entry.uri)
        .map(|uri| uri.name)
        .unwrap_or_else(|_| entry.schema.name().to_string())
}

fn bundle_hash(entries: &BTreeMap<String, ManifestEntry>) -> String {
    let mut hasher = Sha256::new();
    for (key, entry) in entries {
        hasher.update(key.as_bytes());
        hasher.update(b" ");
        hasher.update(entry.checksum.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
