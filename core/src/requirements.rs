//! Direct dependency rules for schema documents.
//!
//! Functions depend on the schemas listed in `requirements`. Color types
//! depend on nothing by default: a conversion is a capability the type
//! offers, not a prerequisite. When a caller needs every type reachable
//! through conversions (runtime bundles where `.to.X()` chains must
//! resolve), [`ExtractOptions::include_color_type_dependencies`] adds both
//! non-`$self` conversion endpoints as dependencies.
//!
//! The options value is owned by one dependency walk and applied to every
//! document in it, so a single walk cannot mix rules.

use crate::types::{SchemaDocument, SchemaKind};

/// Options for [`extract_requirements`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Treat conversion endpoints of color types as dependencies.
    pub include_color_type_dependencies: bool,
}

impl ExtractOptions {
    /// Options that follow conversions (selective/runtime bundling).
    pub fn with_conversions() -> Self {
        Self {
            include_color_type_dependencies: true,
        }
    }
}

/// A raw dependency reference together with any kind the context implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Reference exactly as written in the document.
    pub identifier: String,
    /// Kind implied by where the reference appeared, overriding the
    /// resolver's default for bare slugs.
    pub kind_hint: Option<SchemaKind>,
}

/// Returns the direct dependencies declared by `doc`.
///
/// # Examples
///
/// ```
/// use color_schema_core::{ExtractOptions, SchemaDocument, extract_requirements};
///
/// let doc: SchemaDocument = serde_json::from_value(serde_json::json!({
///     "type": "color",
///     "name": "RGB",
///     "conversions": [{
///         "source": "$self",
///         "target": "hex-color",
///         "script": { "type": "colorscript", "script": "return 1;" }
///     }]
/// })).unwrap();
///
/// assert!(extract_requirements(&doc, ExtractOptions::default()).is_empty());
/// let deps = extract_requirements(&doc, ExtractOptions::with_conversions());
/// assert_eq!(deps[0].identifier, "hex-color");
/// ```
pub fn extract_requirements(doc: &SchemaDocument, options: ExtractOptions) -> Vec<Requirement> {
    match doc {
        SchemaDocument::Function(spec) => spec
            .requirements
            .iter()
            .flatten()
            .map(|identifier| Requirement {
                identifier: identifier.clone(),
                kind_hint: None,
            })
            .collect(),
        SchemaDocument::Color(spec) => {
            if !options.include_color_type_dependencies {
                return Vec::new();
            }
            spec.conversions
                .iter()
                .flat_map(|conversion| conversion.other_endpoints())
                .map(|identifier| Requirement {
                    identifier: identifier.to_string(),
                    kind_hint: Some(SchemaKind::Type),
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(conversions: serde_json::Value) -> SchemaDocument {
        serde_json::from_value(serde_json::json!({
            "type": "color",
            "name": "RGB",
            "initializers": [],
            "conversions": conversions
        }))
        .unwrap()
    }

    fn conversion(source: &str, target: &str) -> serde_json::Value {
        serde_json::json!({
            "source": source,
            "target": target,
            "script": { "type": "colorscript", "script": "return input;" }
        })
    }

    #[test]
    fn test_function_requirements_returned_verbatim() {
        let doc: SchemaDocument = serde_json::from_value(serde_json::json!({
            "type": "function",
            "name": "Mix",
            "keyword": "mix",
            "script": { "type": "colorscript", "script": "return a;" },
            "requirements": ["https://x.dev/api/v1/core/rgb-color/0/", "hsl-color"]
        }))
        .unwrap();

        for options in [ExtractOptions::default(), ExtractOptions::with_conversions()] {
            let reqs = extract_requirements(&doc, options);
            let ids: Vec<&str> = reqs.iter().map(|r| r.identifier.as_str()).collect();
            assert_eq!(ids, vec!["https://x.dev/api/v1/core/rgb-color/0/", "hsl-color"]);
            assert!(reqs.iter().all(|r| r.kind_hint.is_none()));
        }
    }

    #[test]
    fn test_function_without_requirements_has_none() {
        let doc: SchemaDocument = serde_json::from_value(serde_json::json!({
            "type": "function",
            "name": "Noop",
            "keyword": "noop",
            "script": { "type": "colorscript", "script": "return a;" }
        }))
        .unwrap();
        assert!(extract_requirements(&doc, ExtractOptions::with_conversions()).is_empty());
    }

    #[test]
    fn test_color_conversions_ignored_by_default() {
        let doc = color(serde_json::json!([
            conversion("$self", "hex-color"),
            conversion("hsl-color", "$self"),
        ]));
        assert!(extract_requirements(&doc, ExtractOptions::default()).is_empty());
    }

    #[test]
    fn test_color_conversions_included_when_requested() {
        let doc = color(serde_json::json!([
            conversion("$self", "hex-color"),
            conversion("hsl-color", "$self"),
            conversion("$self", "$self"),
        ]));
        let reqs = extract_requirements(&doc, ExtractOptions::with_conversions());
        let ids: Vec<&str> = reqs.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["hex-color", "hsl-color"]);
        assert!(reqs.iter().all(|r| r.kind_hint == Some(SchemaKind::Type)));
    }
}
