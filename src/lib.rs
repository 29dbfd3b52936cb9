//! DocType Explorer
//!
//! Documents the schema of a DocType-based data-modeling platform. Starting
//! from one DocType it follows `Link` and `Table` fields through the schema
//! store and produces a documentation tree, which can be returned as JSON or
//! exported as a static HTML report.
//!
//! ## Features
//!
//! - **Bounded traversal**: caller-supplied depth limit, 0 for unbounded
//! - **Cycle safe**: back-references to an ancestor become `cycle` markers
//! - **Resilient**: broken references become `unresolved` markers instead of errors
//! - **Deterministic output**: stable JSON key order and byte-identical HTML exports
//!
//! ## Architecture
//!
//! ```text
//! SchemaStore ──► MetadataAccessor ──► Explorer ──► DocTypeNode
//!                                          │             │
//!                                      resolver     ┌────┴─────┐
//!                                                assemble    render
//!                                                (JSON)      (HTML) ──► doctype_docs/<Name>.html
//! ```

pub mod api;
pub mod artifact;
pub mod checksum;
pub mod config;
pub mod doctype;
pub mod document;
pub mod error;
pub mod explore;
pub mod html;
pub mod resolver;
pub mod store;

pub use api::{ApiResponse, DocumentationService};
pub use artifact::ExportedArtifact;
pub use checksum::Checksum;
pub use config::ExplorerConfig;
pub use doctype::{DocPermission, DocType, FieldDefinition, FieldKind};
pub use document::assemble;
pub use error::{ExplorerError, Result};
pub use explore::{explore, DocTypeNode, Explorer, MaxLevel, NodeKind, TreeStats};
pub use store::{DirectoryStore, MemoryStore, MetadataAccessor, SchemaStore};
