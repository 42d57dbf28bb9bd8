use serde::{Deserialize, Serialize};

use crate::types::{SchemaDocument, SchemaKind};

/// Transitive dependencies found by one collection pass.
///
/// Both lists are deduplicated. Their order follows the traversal and is not
/// a stable contract; sort before hashing or diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependencies {
    /// Color type slugs.
    pub types: Vec<String>,
    /// Function slugs.
    pub functions: Vec<String>,
}

impl ResolvedDependencies {
    /// Returns the slugs of the given kind.
    pub fn of_kind(&self, kind: SchemaKind) -> &[String] {
        match kind {
            SchemaKind::Type => &self.types,
            SchemaKind::Function => &self.functions,
        }
    }

    /// Returns `true` when `slug` of `kind` was resolved.
    pub fn contains(&self, kind: SchemaKind, slug: &str) -> bool {
        self.of_kind(kind).iter().any(|s| s == slug)
    }

    /// Total number of resolved schemas.
    pub fn len(&self) -> usize {
        self.types.len() + self.functions.len()
    }

    /// Returns `true` when nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.functions.is_empty()
    }

    /// Sorts both lists in place.
    pub fn sort(&mut self) {
        self.types.sort();
        self.functions.sort();
    }
}

/// Direct (non-transitive) dependencies of one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    /// Schema slug.
    pub slug: String,
    /// Schema kind.
    pub kind: SchemaKind,
    /// Direct dependencies as `kind:slug` keys.
    pub dependencies: Vec<String>,
}

/// A self-contained schema together with its registry URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundledSchema {
    /// Canonical registry URI.
    pub uri: String,
    /// Inlined schema document.
    pub schema: SchemaDocument,
}

/// Provenance of a selective bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    /// Identifiers exactly as the caller requested them.
    pub requested_schemas: Vec<String>,
    /// Dependencies pulled in transitively.
    pub resolved_dependencies: ResolvedDependencies,
    /// ISO-8601 creation timestamp.
    pub generated_at: String,
    /// Invocation that produced the bundle, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
}

/// Output of selective bundling.
///
/// # Examples
///
/// ```
/// use color_schema_core::{Bundle, BundleMetadata, ResolvedDependencies};
///
/// let bundle = Bundle::new(BundleMetadata {
///     requested_schemas: vec!["hex-color".into()],
///     resolved_dependencies: ResolvedDependencies::default(),
///     generated_at: "2026-01-01T00:00:00Z".into(),
///     generated_by: None,
/// });
/// assert_eq!(bundle.schema_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Bundled schemas: types first, then functions.
    pub schemas: Vec<BundledSchema>,
    /// Request and resolution provenance.
    pub metadata: BundleMetadata,
    /// Direct dependencies of every bundled schema.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_tree: Vec<DependencyNode>,
}

impl Bundle {
    /// Creates an empty bundle with the given metadata.
    pub fn new(metadata: BundleMetadata) -> Self {
        Self {
            schemas: Vec::new(),
            metadata,
            dependency_tree: Vec::new(),
        }
    }

    /// Returns the number of bundled schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

/// Provenance and summary of a full registry build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryMetadata {
    /// ISO-8601 creation timestamp.
    pub generated_at: String,
    /// Tool that produced the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
    /// Registry base URL used for every URI.
    pub base_url: String,
    /// Number of bundled color types.
    pub type_count: usize,
    /// Number of bundled functions.
    pub function_count: usize,
    /// SHA-256 over the sorted per-schema checksums.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_hash: Option<String>,
    /// `kind:slug` keys of schemas that failed to build.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<String>,
}

/// Every schema in the store, bundled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    /// Artifact format version.
    pub version: String,
    /// Color types, sorted by slug.
    pub types: Vec<BundledSchema>,
    /// Functions, sorted by slug.
    pub functions: Vec<BundledSchema>,
    /// Build provenance.
    pub metadata: RegistryMetadata,
}

impl Registry {
    /// Iterates over all entries, types first.
    pub fn entries(&self) -> impl Iterator<Item = &BundledSchema> {
        self.types.iter().chain(self.functions.iter())
    }

    /// Returns the number of bundled schemas.
    pub fn schema_count(&self) -> usize {
        self.types.len() + self.functions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_metadata_uses_camel_case() {
        let metadata = BundleMetadata {
            requested_schemas: vec!["hex-color".into()],
            resolved_dependencies: ResolvedDependencies {
                types: vec!["rgb-color".into()],
                functions: Vec::new(),
            },
            generated_at: "2026-01-01T00:00:00Z".into(),
            generated_by: Some("color-schema bundle hex-color".into()),
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["requestedSchemas"][0], "hex-color");
        assert_eq!(value["resolvedDependencies"]["types"][0], "rgb-color");
        assert_eq!(value["generatedBy"], "color-schema bundle hex-color");
        assert!(value.get("generated_at").is_none());
    }

    #[test]
    fn test_resolved_dependencies_queries() {
        let mut deps = ResolvedDependencies {
            types: vec!["rgb-color".into(), "hex-color".into()],
            functions: vec!["invert".into()],
        };
        assert_eq!(deps.len(), 3);
        assert!(deps.contains(SchemaKind::Type, "hex-color"));
        assert!(!deps.contains(SchemaKind::Function, "hex-color"));
        deps.sort();
        assert_eq!(deps.types, vec!["hex-color", "rgb-color"]);
        assert!(ResolvedDependencies::default().is_empty());
    }
}
