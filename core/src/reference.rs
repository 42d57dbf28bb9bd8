//! Registry URIs and schema reference resolution.
//!
//! Schemas reference each other through registry URIs of the form
//! `{base_url}/api/v{N}/{category}/{name}/{version}/`. Authors also use
//! partial URIs and bare slugs, so every reference is normalized into a
//! [`SchemaReference`] before it is used.
//!
//! # Examples
//!
//! ```
//! use color_schema_core::{RegistryUri, SchemaKind, resolve_reference};
//!
//! let uri = "https://schemas.example.com/api/v1/function/invert/1.2/";
//! let parsed = RegistryUri::parse(uri).unwrap();
//! assert_eq!(parsed.name, "invert");
//! assert_eq!(parsed.to_string(), uri);
//!
//! let reference = resolve_reference("rgb-color", "https://schemas.example.com").unwrap();
//! assert_eq!(reference.kind, SchemaKind::Type);
//! assert_eq!(reference.uri, "https://schemas.example.com/api/v1/core/rgb-color/0/");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SchemaKind;

/// API version used for canonical URIs emitted in bundles.
pub const CANONICAL_API_VERSION: u32 = 1;

static REGISTRY_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<base>.+?)/api/v(?P<api>\d+)/(?P<category>[^/]+)/(?P<name>[^/]+)/(?P<version>[^/]+)/$")
        .expect("static regex must compile")
});

/// Errors produced while parsing registry URIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// The string does not have the registry URI shape.
    #[error("not a registry URI: {0}")]
    MalformedUri(String),
    /// The category segment is not `schema`, `core` or `function`.
    #[error("unknown registry category: {0}")]
    UnknownCategory(String),
    /// The version segment is neither `latest` nor 1-3 dotted integers.
    #[error("invalid schema version: {0}")]
    InvalidVersion(String),
}

/// Category segment of a registry URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryCategory {
    /// Legacy category for color types.
    Schema,
    /// Color types.
    Core,
    /// Functions.
    Function,
}

impl RegistryCategory {
    /// Returns the URI path segment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Core => "core",
            Self::Function => "function",
        }
    }

    /// Maps the category to a schema kind. Only `function` names functions.
    pub fn kind(self) -> SchemaKind {
        match self {
            Self::Function => SchemaKind::Function,
            Self::Schema | Self::Core => SchemaKind::Type,
        }
    }

    /// Canonical category used when emitting a URI for `kind`.
    pub fn for_kind(kind: SchemaKind) -> Self {
        match kind {
            SchemaKind::Type => Self::Core,
            SchemaKind::Function => Self::Function,
        }
    }
}

impl FromStr for RegistryCategory {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "schema" => Ok(Self::Schema),
            "core" => Ok(Self::Core),
            "function" => Ok(Self::Function),
            other => Err(ReferenceError::UnknownCategory(other.to_string())),
        }
    }
}

/// Version segment of a registry URI.
///
/// # Examples
///
/// ```
/// use color_schema_core::SchemaVersion;
///
/// assert_eq!("latest".parse::<SchemaVersion>(), Ok(SchemaVersion::Latest));
/// assert_eq!("2.1".parse::<SchemaVersion>().unwrap().to_string(), "2.1");
/// assert!("v2".parse::<SchemaVersion>().is_err());
/// assert!("1.2.3.4".parse::<SchemaVersion>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// The `latest` sentinel.
    Latest,
    /// One to three dotted numeric components.
    Numeric(Vec<u64>),
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Numeric(parts) => {
                let joined: Vec<String> = parts.iter().map(u64::to_string).collect();
                f.write_str(&joined.join("."))
            }
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "latest" {
            return Ok(Self::Latest);
        }
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() > 3 {
            return Err(ReferenceError::InvalidVersion(s.to_string()));
        }
        let mut numbers = Vec::with_capacity(parts.len());
        for part in parts {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ReferenceError::InvalidVersion(s.to_string()));
            }
            let number = part
                .parse::<u64>()
                .map_err(|_| ReferenceError::InvalidVersion(s.to_string()))?;
            numbers.push(number);
        }
        Ok(Self::Numeric(numbers))
    }
}

/// A fully parsed registry URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryUri {
    /// Scheme and host (and optional path prefix), without trailing slash.
    pub base_url: String,
    /// The `N` in `/api/vN/`.
    pub api_version: u32,
    /// Category segment.
    pub category: RegistryCategory,
    /// Schema name (slug).
    pub name: String,
    /// Version segment.
    pub version: SchemaVersion,
}

impl RegistryUri {
    /// Parses a full registry URI. The trailing slash is required.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::MalformedUri`] when the shape does not match,
    /// [`ReferenceError::UnknownCategory`] or
    /// [`ReferenceError::InvalidVersion`] when a segment fails validation.
    pub fn parse(uri: &str) -> Result<Self, ReferenceError> {
        let caps = REGISTRY_URI_RE
            .captures(uri)
            .ok_or_else(|| ReferenceError::MalformedUri(uri.to_string()))?;
        let api_version = caps["api"]
            .parse::<u32>()
            .map_err(|_| ReferenceError::MalformedUri(uri.to_string()))?;
        Ok(Self {
            base_url: caps["base"].to_string(),
            api_version,
            category: caps["category"].parse()?,
            name: caps["name"].to_string(),
            version: caps["version"].parse()?,
        })
    }

    /// Builds the canonical bundle URI for a schema:
    /// `{base_url}/api/v1/{core|function}/{slug}/0/`.
    pub fn canonical(base_url: &str, kind: SchemaKind, slug: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: CANONICAL_API_VERSION,
            category: RegistryCategory::for_kind(kind),
            name: slug.to_string(),
            version: SchemaVersion::Numeric(vec![0]),
        }
    }

    /// Schema kind implied by the category.
    pub fn kind(&self) -> SchemaKind {
        self.category.kind()
    }

    /// Returns a copy pointing at a different registry host.
    pub fn rebase(&self, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Display for RegistryUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/api/v{}/{}/{}/{}/",
            self.base_url,
            self.api_version,
            self.category.as_str(),
            self.name,
            self.version
        )
    }
}

/// A normalized reference to another schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaReference {
    /// Schema slug.
    pub slug: String,
    /// Schema kind.
    pub kind: SchemaKind,
    /// Registry URI (the original one when given, otherwise canonical).
    pub uri: String,
}

/// Normalizes a full URI, partial URI or bare slug into a [`SchemaReference`].
///
/// Attempts, in order: a full registry URI; the trailing name segment of a
/// URI-shaped string; a bare slug (no `/`), which defaults to
/// [`SchemaKind::Type`]. Returns `None` when nothing applies; the caller
/// decides how to report it.
pub fn resolve_reference(identifier: &str, base_url: &str) -> Option<SchemaReference> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return None;
    }

    if let Ok(uri) = RegistryUri::parse(identifier) {
        return Some(SchemaReference {
            kind: uri.kind(),
            slug: uri.name,
            uri: identifier.to_string(),
        });
    }

    if identifier.contains('/') {
        let (slug, kind) = trailing_name(identifier)?;
        return Some(SchemaReference {
            uri: RegistryUri::canonical(base_url, kind, &slug).to_string(),
            slug,
            kind,
        });
    }

    Some(SchemaReference {
        slug: identifier.to_string(),
        kind: SchemaKind::Type,
        uri: RegistryUri::canonical(base_url, SchemaKind::Type, identifier).to_string(),
    })
}

/// Like [`resolve_reference`], but the caller already knows the kind.
pub fn resolve_reference_as(
    identifier: &str,
    kind: SchemaKind,
    base_url: &str,
) -> Option<SchemaReference> {
    let mut reference = resolve_reference(identifier, base_url)?;
    if reference.kind != kind {
        reference.kind = kind;
        if RegistryUri::parse(identifier.trim()).is_err() {
            reference.uri = RegistryUri::canonical(base_url, kind, &reference.slug).to_string();
        }
    }
    Some(reference)
}

/// Extracts `(name, kind)` from a URI-shaped string that failed full parsing.
///
/// When the string carries an `api/v{N}/{category}/{name}` sequence, the name
/// and kind come from it whatever follows, so a bad version token never
/// stands in for the slug. Otherwise the name is the last path segment, or
/// the one before it when the last segment is a version token, and the kind
/// is `function` only when a `function` segment precedes the name.
fn trailing_name(identifier: &str) -> Option<(String, SchemaKind)> {
    let path = identifier
        .split_once("://")
        .map_or(identifier, |(_, rest)| rest);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if identifier.contains("://") && segments.len() < 2 {
        return None;
    }

    if let Some(found) = registry_path_name(&segments) {
        return found;
    }

    let mut name_index = segments.len().checked_sub(1)?;
    if name_index > 0 && segments[name_index].parse::<SchemaVersion>().is_ok() {
        name_index -= 1;
    }
    let name = segments[name_index];
    if name.contains(':') || name.parse::<SchemaVersion>().is_ok() {
        return None;
    }

    let kind = if segments[..name_index].contains(&"function") {
        SchemaKind::Function
    } else {
        SchemaKind::Type
    };
    Some((name.to_string(), kind))
}

/// Finds `api/v{N}/{category}/{name}` in `segments`. The outer `None` means
/// no such sequence; the inner one means the name segment is unusable.
fn registry_path_name(segments: &[&str]) -> Option<Option<(String, SchemaKind)>> {
    let api = segments.iter().position(|segment| *segment == "api")?;
    let [version, category, name, ..] = &segments[api + 1..] else {
        return None;
    };
    let versioned = version
        .strip_prefix('v')
        .is_some_and(|number| number.parse::<u32>().is_ok());
    if !versioned {
        return None;
    }
    let category = category.parse::<RegistryCategory>().ok()?;
    if name.contains(':') {
        return Some(None);
    }
    Some(Some((name.to_string(), category.kind())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://schemas.example.com";

    #[test]
    fn test_parse_full_uri() {
        let uri = RegistryUri::parse("https://schemas.example.com/api/v1/core/rgb-color/0/").unwrap();
        assert_eq!(uri.base_url, BASE);
        assert_eq!(uri.api_version, 1);
        assert_eq!(uri.category, RegistryCategory::Core);
        assert_eq!(uri.name, "rgb-color");
        assert_eq!(uri.version, SchemaVersion::Numeric(vec![0]));
        assert_eq!(uri.kind(), SchemaKind::Type);
    }

    #[test]
    fn test_parse_requires_trailing_slash() {
        assert!(matches!(
            RegistryUri::parse("https://schemas.example.com/api/v1/core/rgb-color/0"),
            Err(ReferenceError::MalformedUri(_))
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_category_and_bad_version() {
        assert!(matches!(
            RegistryUri::parse("https://x.dev/api/v1/widget/rgb/0/"),
            Err(ReferenceError::UnknownCategory(_))
        ));
        assert!(matches!(
            RegistryUri::parse("https://x.dev/api/v1/core/rgb/beta/"),
            Err(ReferenceError::InvalidVersion(_))
        ));
        assert!(matches!(
            RegistryUri::parse("https://x.dev/api/v1/core/rgb/1.2.3.4/"),
            Err(ReferenceError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_build_then_resolve_roundtrips_every_category_and_version() {
        let categories = [
            RegistryCategory::Schema,
            RegistryCategory::Core,
            RegistryCategory::Function,
        ];
        let versions = ["latest", "0", "1.2", "1.2.3"];
        for category in categories {
            for version in versions {
                let uri = RegistryUri {
                    base_url: BASE.to_string(),
                    api_version: 1,
                    category,
                    name: "oklch-color".to_string(),
                    version: version.parse().unwrap(),
                };
                let built = uri.to_string();
                let reference = resolve_reference(&built, BASE).unwrap();
                assert_eq!(reference.slug, "oklch-color", "uri {built}");
                assert_eq!(reference.kind, category.kind(), "uri {built}");
                assert_eq!(RegistryUri::parse(&built).unwrap(), uri);
            }
        }
    }

    #[test]
    fn test_resolve_bare_slug_defaults_to_type() {
        let reference = resolve_reference("hex-color", BASE).unwrap();
        assert_eq!(reference.slug, "hex-color");
        assert_eq!(reference.kind, SchemaKind::Type);
        assert_eq!(reference.uri, format!("{BASE}/api/v1/core/hex-color/0/"));
    }

    #[test]
    fn test_resolve_partial_uri_extracts_trailing_name() {
        let reference = resolve_reference("/api/v1/core/rgb-color/0/", BASE).unwrap();
        assert_eq!(reference.slug, "rgb-color");
        assert_eq!(reference.kind, SchemaKind::Type);

        let reference = resolve_reference("function/invert", BASE).unwrap();
        assert_eq!(reference.slug, "invert");
        assert_eq!(reference.kind, SchemaKind::Function);

        let reference = resolve_reference("https://other.dev/api/v2/core/lab-color/", BASE).unwrap();
        assert_eq!(reference.slug, "lab-color");
    }

    #[test]
    fn test_resolve_bad_version_keeps_name_segment() {
        let reference = resolve_reference("https://x.dev/api/v1/core/rgb-color/beta/", BASE).unwrap();
        assert_eq!(reference.slug, "rgb-color");
        assert_eq!(reference.kind, SchemaKind::Type);
        assert_eq!(reference.uri, format!("{BASE}/api/v1/core/rgb-color/0/"));

        let reference =
            resolve_reference("https://x.dev/api/v1/core/rgb-color/1.0.0-beta/", BASE).unwrap();
        assert_eq!(reference.slug, "rgb-color");

        let reference =
            resolve_reference("https://x.dev/api/v1/function/invert/1.2.3.4/", BASE).unwrap();
        assert_eq!(reference.slug, "invert");
        assert_eq!(reference.kind, SchemaKind::Function);
    }

    #[test]
    fn test_resolve_rejects_unusable_identifiers() {
        assert!(resolve_reference("", BASE).is_none());
        assert!(resolve_reference("https://", BASE).is_none());
        assert!(resolve_reference("https://host.only/", BASE).is_none());
    }

    #[test]
    fn test_resolve_as_overrides_kind() {
        let reference = resolve_reference_as("invert", SchemaKind::Function, BASE).unwrap();
        assert_eq!(reference.kind, SchemaKind::Function);
        assert_eq!(reference.uri, format!("{BASE}/api/v1/function/invert/0/"));
    }

    #[test]
    fn test_canonical_trims_base_slash_and_rebase() {
        let uri = RegistryUri::canonical("https://a.dev/", SchemaKind::Function, "mix");
        assert_eq!(uri.to_string(), "https://a.dev/api/v1/function/mix/0/");
        assert_eq!(
            uri.rebase("https://b.dev").to_string(),
            "https://b.dev/api/v1/function/mix/0/"
        );
    }
}
