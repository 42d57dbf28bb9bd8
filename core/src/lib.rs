//! Core types and dependency rules for color schema bundles.
//!
//! This crate defines the model shared by the bundler and its consumers:
//!
//! - [`SchemaDocument`]: a color type ([`ColorSpecification`]) or color
//!   function ([`FunctionSpecification`]) descriptor, with its
//!   [`ScriptBlock`]s.
//! - [`RegistryUri`] and [`resolve_reference`]: parsing, building and
//!   normalizing schema references into [`SchemaReference`] values.
//! - [`extract_requirements`]: the direct dependencies of a document.
//! - [`Bundle`] and [`Registry`]: the emitted artifacts.
//!
//! Validation ([`validate_bundle`], [`validate_registry`]) catches entries
//! that would break a downstream interpreter, such as script references that
//! were never inlined.
//!
//! # Example
//!
//! ```
//! use color_schema_core::*;
//!
//! let doc: SchemaDocument = serde_json::from_value(serde_json::json!({
//!     "type": "function",
//!     "name": "Invert",
//!     "keyword": "invert",
//!     "script": { "type": "colorscript", "script": "return 1 - c;" },
//!     "requirements": ["https://schemas.example.com/api/v1/core/rgb-color/0/"]
//! })).unwrap();
//!
//! let requirement = &extract_requirements(&doc, ExtractOptions::default())[0];
//! let reference = resolve_reference(&requirement.identifier, "https://schemas.example.com").unwrap();
//! assert_eq!(reference.slug, "rgb-color");
//! assert_eq!(reference.kind, SchemaKind::Type);
//! ```

mod package;
mod reference;
mod requirements;
mod types;
mod validate;

pub use package::{
    Bundle, BundleMetadata, BundledSchema, DependencyNode, Registry, RegistryMetadata,
    ResolvedDependencies,
};
pub use reference::{
    CANONICAL_API_VERSION, ReferenceError, RegistryCategory, RegistryUri, SchemaReference,
    SchemaVersion, resolve_reference, resolve_reference_as,
};
pub use requirements::{ExtractOptions, Requirement, extract_requirements};
pub use types::*;
pub use validate::{ValidationError, validate_bundle, validate_registry};
