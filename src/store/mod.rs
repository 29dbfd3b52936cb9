//! Schema Store Access
//!
//! The explorer never owns schema metadata. It reads DocType definitions
//! through the [`SchemaStore`] trait, so the same traversal runs against a
//! directory of exported definition files, an in-memory fixture, or any
//! other backend a host application provides.

pub mod loader;

pub use loader::{DirectoryStore, LoadConfig};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::collections::HashMap;
use tracing::debug;

use crate::doctype::DocType;
use crate::error::{ExplorerError, Result};

/// Maximum number of "did you mean" suggestions attached to a lookup miss
const MAX_SUGGESTIONS: usize = 3;

/// Read-only source of DocType metadata
pub trait SchemaStore: Send + Sync {
    /// Get a DocType definition by exact name
    fn get(&self, name: &str) -> Option<DocType>;

    /// All DocType names, sorted
    fn names(&self) -> Vec<String>;

    /// Names of all DocTypes belonging to `module`, sorted
    fn names_in_module(&self, module: &str) -> Vec<String> {
        self.names()
            .into_iter()
            .filter(|name| {
                self.get(name)
                    .map(|d| d.module.as_deref() == Some(module))
                    .unwrap_or(false)
            })
            .collect()
    }
}

/// In-memory schema store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    doctypes: HashMap<String, DocType>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a DocType, builder style
    pub fn with(mut self, doctype: DocType) -> Self {
        self.insert(doctype);
        self
    }

    /// Add (or replace) a DocType
    pub fn insert(&mut self, doctype: DocType) {
        self.doctypes.insert(doctype.name.clone(), doctype);
    }
}

impl SchemaStore for MemoryStore {
    fn get(&self, name: &str) -> Option<DocType> {
        self.doctypes.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.doctypes.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Metadata accessor over a schema store
///
/// Validates names and turns lookup misses into [`ExplorerError::NotFound`]
/// with fuzzy-matched suggestions.
#[derive(Clone, Copy)]
pub struct MetadataAccessor<'a> {
    store: &'a dyn SchemaStore,
}

impl<'a> MetadataAccessor<'a> {
    pub fn new(store: &'a dyn SchemaStore) -> Self {
        Self { store }
    }

    /// Fetch a DocType definition (fields in declared order)
    pub fn fetch(&self, name: &str) -> Result<DocType> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ExplorerError::InvalidName);
        }

        match self.store.get(name) {
            Some(doctype) => {
                debug!(doctype = name, fields = doctype.fields.len(), "fetched DocType metadata");
                Ok(doctype)
            }
            None => Err(ExplorerError::NotFound {
                name: name.to_string(),
                suggestions: self.suggest(name),
            }),
        }
    }

    /// Closest existing DocType names, best match first
    pub fn suggest(&self, query: &str) -> Vec<String> {
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, String)> = self
            .store
            .names()
            .into_iter()
            .filter_map(|name| matcher.fuzzy_match(&name, query).map(|score| (score, name)))
            .collect();

        // Names are pre-sorted, so equal scores keep alphabetical order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, name)| name)
            .collect()
    }
}
