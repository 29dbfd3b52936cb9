//! DocType Reference Traversal
//!
//! Walks the graph of DocTypes reachable through `Link` and `Table` fields,
//! depth-first from a root, and produces a tree. Truncated branches stay in
//! the tree as marker leaves:
//!
//! - **cut**: the depth limit was reached, nothing was fetched
//! - **cycle**: the target is already on the current root-to-node path
//! - **unresolved**: the target could not be fetched from the store
//!
//! Cycle detection is path-scoped. A DocType reached again through a
//! different, non-ancestor branch is expanded again.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::doctype::{DocType, FieldDefinition};
use crate::error::Result;
use crate::resolver;
use crate::store::{MetadataAccessor, SchemaStore};

/// Traversal depth limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaxLevel {
    Unbounded,
    /// Number of child levels to expand below the root
    Levels(usize),
}

impl MaxLevel {
    /// Interpret a caller-supplied level, where zero or less means unbounded
    pub fn from_level(level: i64) -> Self {
        if level <= 0 {
            MaxLevel::Unbounded
        } else {
            MaxLevel::Levels(level as usize)
        }
    }

    /// Whether a node at `depth` must be emitted as a cut leaf
    pub fn reached(&self, depth: usize) -> bool {
        matches!(self, MaxLevel::Levels(limit) if depth >= *limit)
    }
}

impl Default for MaxLevel {
    fn default() -> Self {
        MaxLevel::Unbounded
    }
}

/// What a tree node holds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Fetched and expanded
    Expanded(DocType),
    /// Depth limit reached
    Cut,
    /// Back-reference to the ancestor first entered at `ancestor_depth`
    Cycle { ancestor_depth: usize },
    /// Target could not be fetched
    Unresolved { reason: String },
}

/// One occurrence of a DocType in the documentation tree
#[derive(Debug, Clone, PartialEq)]
pub struct DocTypeNode {
    pub name: String,
    pub depth: usize,
    /// Field names on the parent that reference this DocType (empty for the root)
    pub referenced_by: Vec<String>,
    pub kind: NodeKind,
    /// Children in order of first reference; always empty for marker leaves
    pub children: Vec<DocTypeNode>,
}

impl DocTypeNode {
    fn leaf(name: String, depth: usize, referenced_by: Vec<String>, kind: NodeKind) -> Self {
        Self {
            name,
            depth,
            referenced_by,
            kind,
            children: Vec::new(),
        }
    }

    /// The fetched definition, for expanded nodes
    pub fn doctype(&self) -> Option<&DocType> {
        match &self.kind {
            NodeKind::Expanded(doctype) => Some(doctype),
            _ => None,
        }
    }

    /// Field definitions in declared order (empty for marker leaves)
    pub fn fields(&self) -> &[FieldDefinition] {
        self.doctype().map(|d| d.fields.as_slice()).unwrap_or(&[])
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.kind, NodeKind::Expanded(_))
    }

    pub fn is_cut(&self) -> bool {
        matches!(self.kind, NodeKind::Cut)
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self.kind, NodeKind::Cycle { .. })
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self.kind, NodeKind::Unresolved { .. })
    }

    /// Direct child for a target DocType
    pub fn child(&self, name: &str) -> Option<&DocTypeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Visit every node in pre-order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DocTypeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Node counts per kind
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.walk(&mut |node| {
            match node.kind {
                NodeKind::Expanded(_) => stats.expanded += 1,
                NodeKind::Cut => stats.cut += 1,
                NodeKind::Cycle { .. } => stats.cycle += 1,
                NodeKind::Unresolved { .. } => stats.unresolved += 1,
            }
            stats.max_depth = stats.max_depth.max(node.depth);
        });
        stats
    }
}

/// Summary of a documentation tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub expanded: usize,
    pub cut: usize,
    pub cycle: usize,
    pub unresolved: usize,
    pub max_depth: usize,
}

impl TreeStats {
    pub fn total(&self) -> usize {
        self.expanded + self.cut + self.cycle + self.unresolved
    }
}

/// Depth-first explorer over a schema store
pub struct Explorer<'a> {
    accessor: MetadataAccessor<'a>,
    max_level: MaxLevel,
}

impl<'a> Explorer<'a> {
    pub fn new(store: &'a dyn SchemaStore, max_level: MaxLevel) -> Self {
        Self {
            accessor: MetadataAccessor::new(store),
            max_level,
        }
    }

    /// Build the documentation tree rooted at `root_name`.
    ///
    /// Fails only when the root itself cannot be fetched; broken references
    /// further down become unresolved leaves.
    pub fn explore(&self, root_name: &str) -> Result<DocTypeNode> {
        let doctype = self.accessor.fetch(root_name)?;

        // Ancestors on the current path, name -> depth entered
        let mut path: HashMap<String, usize> = HashMap::new();
        let root = self.expand(doctype, 0, Vec::new(), &mut path);

        let stats = root.stats();
        info!(
            doctype = %root.name,
            max_level = ?self.max_level,
            expanded = stats.expanded,
            cut = stats.cut,
            cycle = stats.cycle,
            unresolved = stats.unresolved,
            "explored DocType references"
        );

        Ok(root)
    }

    fn expand(
        &self,
        doctype: DocType,
        depth: usize,
        referenced_by: Vec<String>,
        path: &mut HashMap<String, usize>,
    ) -> DocTypeNode {
        debug!(doctype = %doctype.name, depth, "expanding DocType");
        path.insert(doctype.name.clone(), depth);

        let children: Vec<DocTypeNode> = reference_targets(&doctype.fields)
            .into_iter()
            .map(|(target, fields)| self.visit(target, depth + 1, fields, path))
            .collect();

        path.remove(&doctype.name);

        DocTypeNode {
            name: doctype.name.clone(),
            depth,
            referenced_by,
            kind: NodeKind::Expanded(doctype),
            children,
        }
    }

    fn visit(
        &self,
        target: String,
        depth: usize,
        referenced_by: Vec<String>,
        path: &mut HashMap<String, usize>,
    ) -> DocTypeNode {
        if self.max_level.reached(depth) {
            return DocTypeNode::leaf(target, depth, referenced_by, NodeKind::Cut);
        }

        if let Some(&ancestor_depth) = path.get(&target) {
            debug!(doctype = %target, depth, ancestor_depth, "cycle back to ancestor");
            return DocTypeNode::leaf(target, depth, referenced_by, NodeKind::Cycle { ancestor_depth });
        }

        match self.accessor.fetch(&target) {
            Ok(doctype) => self.expand(doctype, depth, referenced_by, path),
            Err(err) => {
                warn!(doctype = %target, depth, error = %err, "unresolved DocType reference");
                DocTypeNode::leaf(
                    target,
                    depth,
                    referenced_by,
                    NodeKind::Unresolved {
                        reason: err.to_string(),
                    },
                )
            }
        }
    }
}

/// Explore with a one-off explorer
pub fn explore(store: &dyn SchemaStore, root_name: &str, max_level: MaxLevel) -> Result<DocTypeNode> {
    Explorer::new(store, max_level).explore(root_name)
}

/// Distinct reference targets in order of first appearance, each with the
/// field names that reference it
fn reference_targets(fields: &[FieldDefinition]) -> Vec<(String, Vec<String>)> {
    let mut targets: Vec<(String, Vec<String>)> = Vec::new();

    for field in fields {
        let Some(target) = resolver::resolve(field) else {
            continue;
        };

        match targets.iter_mut().find(|(name, _)| name == target) {
            Some((_, referencing)) => referencing.push(field.fieldname.clone()),
            None => targets.push((target.to_string(), vec![field.fieldname.clone()])),
        }
    }

    targets
}
