//! Configuration management for the DocType explorer
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (doctype-explorer.toml)
//! - Environment variables (DOCTYPE_EXPLORER__*)
//!
//! ## Example config file (doctype-explorer.toml):
//! ```toml
//! [store]
//! path = "./apps/erpnext/erpnext"
//!
//! [traversal]
//! default_level = 0
//!
//! [export]
//! public_dir = "./sites/site1.local/public/files"
//! docs_dir = "doctype_docs"
//! url_prefix = "/files"
//! html_max_level = 3
//! output_format = "pretty"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ExplorerError, Result};

/// Main configuration for the explorer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Schema store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Traversal settings
    #[serde(default)]
    pub traversal: TraversalConfig,

    /// Artifact export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Schema store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding DocType definition files
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Path prefixes (relative to `path`) to skip while loading
    #[serde(default)]
    pub skip_prefixes: Vec<String>,
}

/// Traversal configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Level used when a caller does not supply one (0 = unbounded)
    #[serde(default)]
    pub default_level: i64,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Public files directory artifacts are written under
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Subdirectory of `public_dir` holding the documentation artifacts
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    /// URL prefix under which `public_dir` is served
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,

    /// Depth limit for HTML exports (0 = unbounded)
    #[serde(default = "default_html_max_level")]
    pub html_max_level: i64,

    /// Output format for JSON artifacts
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

// Default value functions
fn default_store_path() -> PathBuf {
    PathBuf::from("./doctypes")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("./public/files")
}

fn default_docs_dir() -> String {
    "doctype_docs".to_string()
}

fn default_url_prefix() -> String {
    "/files".to_string()
}

fn default_html_max_level() -> i64 {
    3
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            skip_prefixes: Vec::new(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            docs_dir: default_docs_dir(),
            url_prefix: default_url_prefix(),
            html_max_level: default_html_max_level(),
            output_format: OutputFormat::Pretty,
        }
    }
}

impl ExportConfig {
    /// Directory the artifacts are written to
    pub fn docs_path(&self) -> PathBuf {
        self.public_dir.join(&self.docs_dir)
    }

    /// Public URL of an artifact file in the docs directory
    pub fn url_for(&self, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.url_prefix.trim_end_matches('/'),
            self.docs_dir.trim_matches('/'),
            file_name
        )
    }
}

impl ExplorerConfig {
    /// Load configuration from the default locations, then `config_path`
    /// when given, then the environment
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "doctype-explorer.toml",
            ".doctype-explorer.toml",
            "config/doctype-explorer.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "doctype-explorer", "doctype-explorer") {
            let xdg_config = config_dir.config_dir().join("doctype-explorer.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // DOCTYPE_EXPLORER__EXPORT__HTML_MAX_LEVEL=5
        builder = builder.add_source(
            Environment::with_prefix("DOCTYPE_EXPLORER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ExplorerError::Write {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        std::fs::write(path, content).map_err(|source| ExplorerError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Schema directory (resolves relative paths)
    pub fn store_path(&self) -> PathBuf {
        resolve(&self.store.path)
    }
}

fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExplorerConfig::default();
        assert_eq!(config.export.html_max_level, 3);
        assert_eq!(config.export.docs_dir, "doctype_docs");
        assert_eq!(config.traversal.default_level, 0);
        assert_eq!(config.export.output_format, OutputFormat::Pretty);
    }

    #[test]
    fn test_url_for() {
        let mut export = ExportConfig::default();
        assert_eq!(export.url_for("Sales_Order.html"), "/files/doctype_docs/Sales_Order.html");

        export.url_prefix = "/assets/".to_string();
        assert_eq!(export.url_for("A.json"), "/assets/doctype_docs/A.json");
    }

    #[test]
    fn test_serialize_config() {
        let config = ExplorerConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[export]"));
        assert!(toml_str.contains("html_max_level = 3"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explorer.toml");
        std::fs::write(&path, "[export]\nhtml_max_level = 5\noutput_format = \"compact\"\n").unwrap();

        let config = ExplorerConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.export.html_max_level, 5);
        assert_eq!(config.export.output_format, OutputFormat::Compact);
        assert_eq!(config.export.docs_dir, "doctype_docs");
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = ExplorerConfig::load_from(Some(path.to_str().unwrap())).unwrap_err();
        assert!(matches!(err, ExplorerError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = ExplorerConfig::default();
        config.export.html_max_level = 7;
        config.export.url_prefix = "/assets".to_string();
        config.save(&path).unwrap();

        let loaded = ExplorerConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.export.html_max_level, 7);
        assert_eq!(loaded.export.url_prefix, "/assets");
    }
}
