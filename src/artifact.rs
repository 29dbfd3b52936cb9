//! Documentation artifacts on disk
//!
//! Every artifact for a DocType lives at
//! `<public_dir>/<docs_dir>/<stem>.<ext>` where the stem is the DocType name
//! with each whitespace run collapsed to a single underscore.

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::info;

use crate::checksum::Checksum;
use crate::config::ExportConfig;
use crate::error::{ExplorerError, Result};

static WHITESPACE: OnceLock<Regex> = OnceLock::new();

/// A written artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedArtifact {
    /// Filesystem path of the written file
    pub path: PathBuf,
    /// Server-relative URL the file is published under
    pub url: String,
    /// SHA256 of the written content
    pub checksum: Checksum,
}

/// File stem for a DocType name ("Sales Order" -> "Sales_Order")
pub fn artifact_stem(doctype_name: &str) -> String {
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
    whitespace
        .replace_all(doctype_name.trim(), "_")
        .replace(&['/', '\\'][..], "_")
}

/// File name for a DocType artifact with the given extension
pub fn artifact_file_name(doctype_name: &str, extension: &str) -> String {
    format!("{}.{}", artifact_stem(doctype_name), extension)
}

/// Write (or overwrite) an artifact, creating the docs directory if needed
pub fn write_artifact(
    export: &ExportConfig,
    doctype_name: &str,
    extension: &str,
    content: &str,
) -> Result<ExportedArtifact> {
    let dir = export.docs_path();
    fs::create_dir_all(&dir).map_err(|source| ExplorerError::Write {
        path: dir.clone(),
        source,
    })?;

    let file_name = artifact_file_name(doctype_name, extension);
    let path = dir.join(&file_name);
    fs::write(&path, content).map_err(|source| ExplorerError::Write {
        path: path.clone(),
        source,
    })?;

    let artifact = ExportedArtifact {
        url: export.url_for(&file_name),
        checksum: Checksum::of_text(content),
        path,
    };
    info!(
        doctype = doctype_name,
        path = %artifact.path.display(),
        checksum = %artifact.checksum,
        "wrote documentation artifact"
    );

    Ok(artifact)
}
