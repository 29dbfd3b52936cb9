//! DocType Definition Loading
//!
//! Loads exported DocType definition files from a directory tree, indexes
//! them by name and fingerprints the loaded content.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::SchemaStore;
use crate::doctype::DocType;
use crate::error::{ExplorerError, Result};

/// Configuration for definition loading
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Skip files matching these path prefixes
    pub skip_prefixes: Vec<String>,
    /// Only load files matching these path prefixes
    pub include_prefixes: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: vec![
                "node_modules/".to_string(),
                ".git/".to_string(),
                "public/".to_string(),
                "doctype_docs/".to_string(),
            ],
            include_prefixes: Vec::new(),
        }
    }
}

/// Schema store backed by a directory of DocType definition files
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    doctypes: HashMap<String, DocType>,
    by_path: HashMap<PathBuf, String>,
    fingerprint: String,
}

impl DirectoryStore {
    /// Load every DocType definition under `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(dir, &LoadConfig::default())
    }

    /// Load with explicit include/skip filters
    pub fn load_with(dir: impl AsRef<Path>, config: &LoadConfig) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ExplorerError::Load {
                path: root,
                message: "schema directory does not exist".to_string(),
            });
        }

        let mut doctypes = HashMap::new();
        let mut by_path = HashMap::new();
        let mut source_of: HashMap<String, PathBuf> = HashMap::new();
        let mut hasher = Sha256::new();

        for entry in WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }

            let relative_path = path.strip_prefix(&root).unwrap_or(path).to_path_buf();
            let relative_str = relative_path.to_string_lossy().replace('\\', "/");

            if !config.include_prefixes.is_empty()
                && !config.include_prefixes.iter().any(|p| relative_str.starts_with(p))
            {
                continue;
            }
            if config.skip_prefixes.iter().any(|p| relative_str.starts_with(p)) {
                continue;
            }

            let content = fs::read_to_string(path)?;
            let json: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| ExplorerError::Load {
                    path: relative_path.clone(),
                    message: e.to_string(),
                })?;

            if !is_doctype_definition(&json) {
                debug!(path = %relative_str, "skipping non-DocType JSON file");
                continue;
            }

            hasher.update(content.as_bytes());

            let doctype: DocType = serde_json::from_value(json).map_err(|e| ExplorerError::Load {
                path: relative_path.clone(),
                message: e.to_string(),
            })?;

            if let Some(previous) = source_of.insert(doctype.name.clone(), relative_path.clone()) {
                warn!(
                    doctype = %doctype.name,
                    previous = %previous.display(),
                    replacement = %relative_str,
                    "duplicate DocType definition, later file wins"
                );
                by_path.remove(&previous);
            }

            by_path.insert(relative_path, doctype.name.clone());
            doctypes.insert(doctype.name.clone(), doctype);
        }

        let fingerprint = format!("{:x}", hasher.finalize());
        info!(
            root = %root.display(),
            doctypes = doctypes.len(),
            fingerprint = %fingerprint,
            "loaded DocType definitions"
        );

        Ok(Self {
            doctypes,
            by_path,
            fingerprint,
        })
    }

    /// SHA-256 over the loaded definition files, in walk order
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Name of the DocType defined by a file (path relative to the root)
    pub fn name_for_path(&self, path: &Path) -> Option<&str> {
        self.by_path.get(path).map(String::as_str)
    }
}

impl SchemaStore for DirectoryStore {
    fn get(&self, name: &str) -> Option<DocType> {
        self.doctypes.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.doctypes.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Whether a JSON document is a DocType definition
fn is_doctype_definition(json: &serde_json::Value) -> bool {
    let Some(obj) = json.as_object() else {
        return false;
    };

    match obj.get("doctype").and_then(|v| v.as_str()) {
        Some(kind) => kind == "DocType",
        None => {
            obj.get("name").map(|v| v.is_string()).unwrap_or(false)
                && obj.get("fields").map(|v| v.is_array()).unwrap_or(false)
        }
    }
}
