//! Schema document model for color types and color functions.
//!
//! A schema document is the JSON descriptor (`schema.json`) found in each
//! schema directory of the store. Color types carry initializers and
//! conversions; functions carry a single script and optional requirements.
//! Every script block either holds literal source text or, before inlining,
//! a relative reference to a sibling script file.
//!
//! Fields that the bundler does not interpret (descriptions, titles, extra
//! authoring metadata) are kept verbatim in an `extra` map so that bundling
//! never drops information from the descriptor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Version of the bundle and registry artifact format (semver).
pub const BUNDLE_FORMAT_VERSION: &str = "1.0.0";

/// Prefix that marks a script body as a relative file reference.
pub const SCRIPT_REFERENCE_MARKER: &str = "./";

/// Sentinel used by conversions to name the declaring type itself.
pub const SELF_ENDPOINT: &str = "$self";

/// Whether a schema describes a color type or a color function.
///
/// # Examples
///
/// ```
/// use color_schema_core::SchemaKind;
///
/// assert_eq!("function".parse::<SchemaKind>(), Ok(SchemaKind::Function));
/// assert_eq!(SchemaKind::Type.dir_name(), "types");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// A color type (color space) definition.
    Type,
    /// A color-manipulating function.
    Function,
}

impl SchemaKind {
    /// Both kinds, types first.
    pub const ALL: [SchemaKind; 2] = [SchemaKind::Type, SchemaKind::Function];

    /// Returns the lowercase identifier used in `kind:slug` keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Function => "function",
        }
    }

    /// Returns the store subdirectory holding schemas of this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Type => "types",
            Self::Function => "functions",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type" => Ok(Self::Type),
            "function" => Ok(Self::Function),
            other => Err(format!("unknown schema kind '{other}'")),
        }
    }
}

/// Identity of a schema within one store: its kind and slug.
///
/// Displays as `kind:slug`, the form used for dependency-tree entries and
/// registry manifest keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaKey {
    /// Schema kind.
    pub kind: SchemaKind,
    /// Directory name / short identifier.
    pub slug: String,
}

impl SchemaKey {
    /// Creates a key from a kind and slug.
    pub fn new(kind: SchemaKind, slug: impl Into<String>) -> Self {
        Self {
            kind,
            slug: slug.into(),
        }
    }

    /// Parses an explicit `type:slug` or `function:slug` identifier.
    ///
    /// Returns `None` when the identifier carries no recognized kind prefix
    /// or the slug part is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use color_schema_core::{SchemaKey, SchemaKind};
    ///
    /// let key = SchemaKey::parse_prefixed("function:invert").unwrap();
    /// assert_eq!(key.kind, SchemaKind::Function);
    /// assert_eq!(key.slug, "invert");
    /// assert!(SchemaKey::parse_prefixed("invert").is_none());
    /// ```
    pub fn parse_prefixed(identifier: &str) -> Option<Self> {
        let (prefix, slug) = identifier.split_once(':')?;
        let kind = prefix.parse::<SchemaKind>().ok()?;
        let slug = slug.trim();
        if slug.is_empty() || slug.contains('/') {
            return None;
        }
        Some(Self::new(kind, slug))
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.slug)
    }
}

/// Body of a script block: literal source or a pending file reference.
///
/// Serialized as a plain JSON string. A string beginning with
/// [`SCRIPT_REFERENCE_MARKER`] deserializes to [`ScriptBody::Reference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptBody {
    /// Relative path (including the `./` marker) to a sibling script file.
    Reference(String),
    /// Literal script source.
    Literal(String),
}

impl ScriptBody {
    /// Classifies a raw script string.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with(SCRIPT_REFERENCE_MARKER) {
            Self::Reference(raw)
        } else {
            Self::Literal(raw)
        }
    }

    /// Returns the raw string as it appears in JSON.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Reference(path) | Self::Literal(path) => path,
        }
    }

    /// Returns `true` for a not-yet-inlined file reference.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }
}

impl Serialize for ScriptBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ScriptBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_raw(raw))
    }
}

/// A script fragment tagged with the script language URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptBlock {
    /// Script language identifier, usually a registry URI.
    #[serde(rename = "type")]
    pub kind: String,
    /// Literal body or file reference.
    pub script: ScriptBody,
}

impl ScriptBlock {
    /// Creates a block with a literal body.
    pub fn literal(kind: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            script: ScriptBody::Literal(script.into()),
        }
    }
}

/// One side of a conversion: the declaring type or another type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionEndpoint {
    /// The `$self` sentinel.
    SelfType,
    /// Reference to another color type (URI or slug).
    Other(String),
}

impl ConversionEndpoint {
    /// Returns the reference to the other type, or `None` for `$self`.
    pub fn other(&self) -> Option<&str> {
        match self {
            Self::SelfType => None,
            Self::Other(reference) => Some(reference),
        }
    }
}

impl Serialize for ConversionEndpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::SelfType => serializer.serialize_str(SELF_ENDPOINT),
            Self::Other(reference) => serializer.serialize_str(reference),
        }
    }
}

impl<'de> Deserialize<'de> for ConversionEndpoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == SELF_ENDPOINT {
            Ok(Self::SelfType)
        } else {
            Ok(Self::Other(raw))
        }
    }
}

/// A named constructor for a color type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    /// Keyword the interpreter binds the initializer to (e.g. `rgb`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Initializer implementation.
    pub script: ScriptBlock,
    /// Uninterpreted descriptor fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A conversion a color type offers to or from another type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    /// Source type of the conversion.
    pub source: ConversionEndpoint,
    /// Target type of the conversion.
    pub target: ConversionEndpoint,
    /// Conversion implementation.
    pub script: ScriptBlock,
    /// Uninterpreted descriptor fields (description, lossless, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Conversion {
    /// Returns the non-`$self` endpoints, source first.
    pub fn other_endpoints(&self) -> impl Iterator<Item = &str> {
        self.source.other().into_iter().chain(self.target.other())
    }
}

/// Declarative definition of a color type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSpecification {
    /// Display name of the type.
    pub name: String,
    /// Structural schema of the type's named properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Constructors.
    #[serde(default)]
    pub initializers: Vec<Initializer>,
    /// Conversions offered by the type.
    #[serde(default)]
    pub conversions: Vec<Conversion>,
    /// Uninterpreted descriptor fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Declarative definition of a color function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpecification {
    /// Display name of the function.
    pub name: String,
    /// Keyword the interpreter binds the function to.
    pub keyword: String,
    /// Shape of the function's input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Function implementation.
    pub script: ScriptBlock,
    /// References to the schemas this function needs at runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,
    /// Uninterpreted descriptor fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A schema descriptor, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SchemaDocument {
    /// A color type definition (`"type": "color"`).
    #[serde(rename = "color")]
    Color(ColorSpecification),
    /// A function definition (`"type": "function"`).
    #[serde(rename = "function")]
    Function(FunctionSpecification),
}

impl SchemaDocument {
    /// Returns the schema's display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Color(spec) => &spec.name,
            Self::Function(spec) => &spec.name,
        }
    }

    /// Returns the kind this document describes.
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Color(_) => SchemaKind::Type,
            Self::Function(_) => SchemaKind::Function,
        }
    }

    /// Returns every script block in the document.
    pub fn script_blocks(&self) -> Vec<&ScriptBlock> {
        match self {
            Self::Color(spec) => spec
                .initializers
                .iter()
                .map(|init| &init.script)
                .chain(spec.conversions.iter().map(|conv| &conv.script))
                .collect(),
            Self::Function(spec) => vec![&spec.script],
        }
    }

    /// Returns mutable references to every script block in the document.
    pub fn script_blocks_mut(&mut self) -> Vec<&mut ScriptBlock> {
        match self {
            Self::Color(spec) => spec
                .initializers
                .iter_mut()
                .map(|init| &mut init.script)
                .chain(spec.conversions.iter_mut().map(|conv| &mut conv.script))
                .collect(),
            Self::Function(spec) => vec![&mut spec.script],
        }
    }

    /// Returns the script file references that have not been inlined yet.
    pub fn unresolved_script_references(&self) -> Vec<&str> {
        self.script_blocks()
            .into_iter()
            .filter(|block| block.script.is_reference())
            .map(|block| block.script.as_str())
            .collect()
    }
}
