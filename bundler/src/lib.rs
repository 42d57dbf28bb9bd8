//! Script inlining, dependency resolution and bundling for color schema stores.
//!
//! A schema store is a directory with `types/{slug}/schema.json` and
//! `functions/{slug}/schema.json` descriptors plus the script files they
//! reference. This crate turns such a store into self-contained artifacts for
//! a downstream script interpreter:
//!
//! - [`inline_schema`] loads one schema and inlines its script files.
//! - [`DependencyCollector`] computes the transitive dependencies of a seed
//!   set.
//! - [`bundle_schemas`] produces a selective [`Bundle`](color_schema_core::Bundle)
//!   for requested schemas and everything they need at runtime.
//! - [`build_registry`] and [`write_registry`] bundle the whole store.
//!
//! # Quick start
//!
//! ```no_run
//! use color_schema_bundler::{BundleRequest, BundlerConfig, SchemaStore, bundle_schemas};
//!
//! let config = BundlerConfig::default().with_base_url("https://custom.example.com");
//! let store = SchemaStore::open(&config.schemas_dir).unwrap();
//!
//! let outcome = bundle_schemas(&store, &config, &BundleRequest::new(["invert", "hex-color"])).unwrap();
//! for warning in &outcome.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! ```

mod bundle;
mod collect;
mod config;
mod error;
mod inline;
mod manifest;
mod registry;
mod store;

pub use bundle::{BundleOutcome, BundleRequest, bundle_schemas, parse_requested, write_bundle};
pub use collect::{CollectOutcome, DependencyCollector};
pub use config::{BundlerConfig, DEFAULT_BASE_URL, DEFAULT_OUTPUT_DIR, DEFAULT_SCHEMAS_DIR};
pub use error::{BundleError, Result};
pub use inline::{InlineOptions, inline_schema, load_descriptor};
pub use manifest::{Manifest, ManifestEntry, schema_file_bytes};
pub use registry::{
    BuildFailure, MANIFEST_FILE, REGISTRY_FILE, RegistryBuild, build_registry, write_registry,
};
pub use store::{DESCRIPTOR_FILE, SchemaStore};
