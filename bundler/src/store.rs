//! Directory-based schema store.
//!
//! The store is laid out as `{root}/types/{slug}/schema.json` and
//! `{root}/functions/{slug}/schema.json`, each descriptor accompanied by the
//! script files it references. The bundler only ever reads the store.
//!
//! ```no_run
//! use color_schema_bundler::SchemaStore;
//! use color_schema_core::SchemaKind;
//!
//! let store = SchemaStore::open("schemas/").unwrap();
//! assert_eq!(store.detect_kind("invert"), Some(SchemaKind::Function));
//! for slug in store.list(SchemaKind::Type).unwrap() {
//!     println!("type {slug}");
//! }
//! ```

use std::path::{Path, PathBuf};

use color_schema_core::{SchemaKey, SchemaKind};

use crate::error::{BundleError, Result};

/// File name of the descriptor inside every schema directory.
pub const DESCRIPTOR_FILE: &str = "schema.json";

/// Read-only view of a schema store rooted at a directory.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    root: PathBuf,
}

impl SchemaStore {
    /// Creates a store view without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a store view, checking that the root is a directory.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] if the root is missing or not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let metadata = std::fs::metadata(&root).map_err(|e| BundleError::io(&root, e))?;
        if !metadata.is_dir() {
            return Err(BundleError::io(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "schema store root is not a directory"),
            ));
        }
        Ok(Self { root })
    }

    /// Returns the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the category directory for `kind`.
    pub fn kind_dir(&self, kind: SchemaKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Returns the directory of one schema.
    pub fn schema_dir(&self, key: &SchemaKey) -> PathBuf {
        self.kind_dir(key.kind).join(&key.slug)
    }

    /// Returns `true` if a directory exists for `slug` under `kind`.
    pub fn contains(&self, kind: SchemaKind, slug: &str) -> bool {
        self.kind_dir(kind).join(slug).is_dir()
    }

    /// Finds which category holds `slug`, checking `types/` then
    /// `functions/`. Returns `None` when neither does.
    pub fn detect_kind(&self, slug: &str) -> Option<SchemaKind> {
        if slug.is_empty() || slug.contains(['/', '\\']) {
            return None;
        }
        SchemaKind::ALL
            .into_iter()
            .find(|kind| self.contains(*kind, slug))
    }

    /// Lists the slugs of every schema directory of `kind`, sorted.
    ///
    /// A missing category directory yields an empty list. Hidden entries and
    /// plain files are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] if the category directory exists but
    /// cannot be read.
    pub fn list(&self, kind: SchemaKind) -> Result<Vec<String>> {
        let dir = self.kind_dir(kind);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut slugs = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| BundleError::io(&dir, e))? {
            let entry = entry.map_err(|e| BundleError::io(&dir, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !name.starts_with('.') {
                    slugs.push(name.to_string());
                }
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    /// Lists every schema in the store, types first.
    ///
    /// # Errors
    ///
    /// Propagates [`list`](Self::list) failures.
    pub fn keys(&self) -> Result<Vec<SchemaKey>> {
        let mut keys = Vec::new();
        for kind in SchemaKind::ALL {
            keys.extend(self.list(kind)?.into_iter().map(|slug| SchemaKey::new(kind, slug)));
        }
        Ok(keys)
    }
}
