//! Bundler configuration.
//!
//! A [`BundlerConfig`] is built once at the process entry point (defaults,
//! then an optional YAML file, then command-line overrides) and passed by
//! reference to every bundling operation.
//!
//! # Example YAML
//!
//! ```yaml
//! base_url: "https://schemas.example.com"
//! schemas_dir: "schemas"
//! output_dir: "dist"
//! registry_version: "1.0.0"
//! include_color_type_dependencies: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BundleError, Result};

/// Registry host used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://schemas.colorscript.dev";

/// Default schema store location, relative to the working directory.
pub const DEFAULT_SCHEMAS_DIR: &str = "schemas";

/// Default artifact output location, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Configuration shared by every bundling operation.
///
/// # Examples
///
/// ```
/// use color_schema_bundler::BundlerConfig;
///
/// let config = BundlerConfig::default().with_base_url("https://custom.example.com/");
/// assert_eq!(config.base_url, "https://custom.example.com");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    /// Registry base URL used in every emitted URI.
    pub base_url: String,
    /// Root of the schema store (`types/` and `functions/` live here).
    pub schemas_dir: PathBuf,
    /// Directory receiving full-registry artifacts.
    pub output_dir: PathBuf,
    /// Version string written into registry artifacts.
    pub registry_version: String,
    /// Whether ad-hoc dependency queries follow color type conversions.
    /// Selective bundling always follows them.
    pub include_color_type_dependencies: bool,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            schemas_dir: PathBuf::from(DEFAULT_SCHEMAS_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            registry_version: color_schema_core::BUNDLE_FORMAT_VERSION.to_string(),
            include_color_type_dependencies: false,
        }
    }
}

impl BundlerConfig {
    /// Loads configuration from a YAML file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] if the file cannot be read, or
    /// [`BundleError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| BundleError::io(path, e))?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        Ok(config.normalized())
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] if the file cannot be written, or
    /// [`BundleError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| BundleError::io(path, e))?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Replaces the base URL, dropping any trailing slash.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.normalized()
    }

    /// Replaces the schema store root.
    pub fn with_schemas_dir(mut self, schemas_dir: impl Into<PathBuf>) -> Self {
        self.schemas_dir = schemas_dir.into();
        self
    }

    /// Replaces the artifact output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Checks that the base URL can prefix registry URIs.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::InvalidConfig`] for an empty base URL, one
    /// without a scheme, or an empty registry version.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(BundleError::InvalidConfig("base_url cannot be empty".into()));
        }
        if !self.base_url.contains("://") {
            return Err(BundleError::InvalidConfig(format!(
                "base_url '{}' must include a scheme (e.g. https://)",
                self.base_url
            )));
        }
        if self.registry_version.trim().is_empty() {
            return Err(BundleError::InvalidConfig(
                "registry_version cannot be empty".into(),
            ));
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        self.base_url = trimmed;
        self
    }
}
