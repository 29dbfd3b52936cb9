//! Error types for the DocType explorer

use std::path::PathBuf;

use thiserror::Error;

/// Result type for explorer operations
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// DocType explorer errors
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("DocType '{name}' not found{}", format_suggestions(.suggestions))]
    NotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("DocType name must not be empty")]
    InvalidName,

    #[error("Cannot write documentation to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid DocType definition in {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl ExplorerError {
    /// Shorthand for a lookup miss without suggestions
    pub fn not_found(name: impl Into<String>) -> Self {
        ExplorerError::NotFound {
            name: name.into(),
            suggestions: Vec::new(),
        }
    }

    /// Whether this error means the requested DocType does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExplorerError::NotFound { .. })
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}
