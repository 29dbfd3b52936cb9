//! Explorer Tests Against Exported DocType Definitions
//!
//! Loads the fixture definitions under `tests/fixtures/doctypes` the way a
//! deployment loads an app's DocType directory, then checks traversal,
//! assembly and export behaviour end to end.

use std::path::{Path, PathBuf};

use serde_json::json;

use doctype_explorer::{
    assemble, explore, DirectoryStore, DocTypeNode, DocumentationService, ExplorerConfig,
    ExplorerError, MaxLevel, NodeKind, SchemaStore,
};

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/doctypes")
}

fn load_store() -> DirectoryStore {
    DirectoryStore::load(fixtures_path()).unwrap()
}

fn service_in(public_dir: &Path) -> DocumentationService<DirectoryStore> {
    let mut config = ExplorerConfig::default();
    config.export.public_dir = public_dir.to_path_buf();
    DocumentationService::new(load_store(), config)
}

fn nodes_at_depth(tree: &DocTypeNode, depth: usize) -> Vec<&DocTypeNode> {
    let mut found = Vec::new();
    tree.walk(&mut |node| {
        if node.depth == depth {
            found.push(node);
        }
    });
    found
}

// =============================================================================
// Store Loading
// =============================================================================

#[test]
fn test_fixture_store_contents() {
    let store = load_store();
    assert_eq!(
        store.names(),
        vec![
            "Address",
            "Customer",
            "Department",
            "Employee",
            "Invoice",
            "Sales Order",
            "Sales Order Item",
        ]
    );
    assert_eq!(store.names_in_module("HR"), vec!["Department", "Employee"]);
    assert!(store.get("Sales Order Item").unwrap().istable);
}

// =============================================================================
// Traversal
// =============================================================================

#[test]
fn test_leaf_doctype_has_no_children_at_any_level() {
    let store = load_store();
    for level in [0, 1, 2, 5] {
        let tree = explore(&store, "Address", MaxLevel::from_level(level)).unwrap();
        assert!(tree.is_expanded());
        assert!(tree.children.is_empty(), "level {}", level);
        assert_eq!(tree.fields().len(), 3);
    }
}

#[test]
fn test_deep_enough_limit_matches_unbounded() {
    let store = load_store();
    let unbounded = explore(&store, "Invoice", MaxLevel::Unbounded).unwrap();

    assert_eq!(explore(&store, "Invoice", MaxLevel::Levels(3)).unwrap(), unbounded);
    assert_eq!(explore(&store, "Invoice", MaxLevel::Levels(10)).unwrap(), unbounded);
    assert_ne!(explore(&store, "Invoice", MaxLevel::Levels(2)).unwrap(), unbounded);
}

#[test]
fn test_nodes_at_limit_are_cut() {
    let store = load_store();
    for root in ["Invoice", "Employee", "Sales Order"] {
        for limit in 1..=4usize {
            let tree = explore(&store, root, MaxLevel::Levels(limit)).unwrap();
            for node in nodes_at_depth(&tree, limit) {
                assert!(node.is_cut(), "{} at depth {} under {}", node.name, limit, root);
                assert!(node.children.is_empty());
            }
            assert!(tree.stats().max_depth <= limit);
        }
    }
}

#[test]
fn test_self_reference_terminates_with_cycle() {
    let store = load_store();
    let tree = explore(&store, "Employee", MaxLevel::Unbounded).unwrap();

    let reports_to = tree.child("Employee").unwrap();
    assert_eq!(reports_to.kind, NodeKind::Cycle { ancestor_depth: 0 });
    assert_eq!(reports_to.referenced_by, vec!["reports_to"]);

    let department = tree.child("Department").unwrap();
    assert!(department.is_expanded());
    assert!(department.child("Department").unwrap().is_cycle());
    assert!(department.child("Company").unwrap().is_unresolved());
    assert_eq!(
        department.child("Employee").unwrap().kind,
        NodeKind::Cycle { ancestor_depth: 0 }
    );
}

#[test]
fn test_child_order_and_sibling_dedup() {
    let store = load_store();
    let tree = explore(&store, "Sales Order", MaxLevel::Unbounded).unwrap();

    let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Customer", "Sales Order Item", "Address"]);
    assert_eq!(
        tree.child("Address").unwrap().referenced_by,
        vec!["billing_address", "shipping_address"]
    );

    // Address again under Customer: a different branch, so expanded again
    assert!(tree.child("Customer").unwrap().child("Address").unwrap().is_expanded());
    assert!(tree.child("Sales Order Item").unwrap().child("Item").unwrap().is_unresolved());
}

#[test]
fn test_missing_root() {
    let store = load_store();
    match explore(&store, "Ghost", MaxLevel::Unbounded) {
        Err(ExplorerError::NotFound { name, .. }) => assert_eq!(name, "Ghost"),
        other => panic!("Expected NotFound, got {:?}", other.map(|t| t.name)),
    }
}

// =============================================================================
// Assembly
// =============================================================================

#[test]
fn test_invoice_document_unbounded() {
    let store = load_store();
    let doc = assemble(&explore(&store, "Invoice", MaxLevel::Unbounded).unwrap());

    assert_eq!(doc["name"], "Invoice");
    assert_eq!(doc["is_submittable"], true);
    assert_eq!(doc["naming_rule"], "naming_series:");
    assert_eq!(doc["permissions"].as_array().unwrap().len(), 2);
    assert_eq!(doc["fields"][1]["attributes"], json!({"precision": "2"}));

    let customer = &doc["children"]["Customer"];
    assert_eq!(customer["name"], "Customer");
    assert_eq!(doc["children"].as_object().unwrap().len(), 1);

    let address = &customer["children"]["Address"];
    assert_eq!(address["name"], "Address");
    assert_eq!(address["children"], json!({}));
}

#[test]
fn test_invoice_document_level_one() {
    let store = load_store();
    let doc = assemble(&explore(&store, "Invoice", MaxLevel::Levels(1)).unwrap());
    assert_eq!(doc["name"], "Invoice");
    assert_eq!(doc["children"], json!({"Customer": {"cut": true}}));
}

#[test]
fn test_field_options_pass_through() {
    let store = load_store();
    let address = assemble(&explore(&store, "Address", MaxLevel::Unbounded).unwrap());
    let address_type = &address["fields"][2];
    assert_eq!(address_type["name"], "address_type");
    assert_eq!(address_type["target"], serde_json::Value::Null);
    assert_eq!(address_type["options"], "Billing\nShipping");

    let order = assemble(&explore(&store, "Sales Order", MaxLevel::Levels(1)).unwrap());
    let party = order["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "party")
        .unwrap();
    assert_eq!(party["type"], "Dynamic Link");
    assert_eq!(party["target"], serde_json::Value::Null);
    assert_eq!(party["options"], "party_type");
}

#[test]
fn test_doctype_attributes_pass_through() {
    let store = load_store();
    let department = assemble(&explore(&store, "Department", MaxLevel::Unbounded).unwrap());
    assert_eq!(department["attributes"]["is_tree"], 1);

    let keys: Vec<&str> = department.as_object().unwrap().keys().map(String::as_str).collect();
    let attributes_at = keys.iter().position(|k| *k == "attributes").unwrap();
    assert_eq!(keys[attributes_at - 1], "description");
    assert_eq!(keys[attributes_at + 1], "meta_info");

    let employee = assemble(&explore(&store, "Employee", MaxLevel::Unbounded).unwrap());
    assert_eq!(employee["children"]["Department"]["attributes"]["is_tree"], 1);
}

#[test]
fn test_assembled_json_is_stable() {
    let first_store = load_store();
    let second_store = load_store();

    let first = serde_json::to_string(&assemble(&explore(&first_store, "Sales Order", MaxLevel::Levels(3)).unwrap())).unwrap();
    let again = serde_json::to_string(&assemble(&explore(&first_store, "Sales Order", MaxLevel::Levels(3)).unwrap())).unwrap();
    let reloaded = serde_json::to_string(&assemble(&explore(&second_store, "Sales Order", MaxLevel::Levels(3)).unwrap())).unwrap();

    assert_eq!(first, again);
    assert_eq!(first, reloaded);
}

// =============================================================================
// Service Operations
// =============================================================================

#[test]
fn test_generate_for_missing_doctype() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path());

    let response = service.generate_doctype_documentation("Ghost", true, 0);
    assert!(!response.success);
    assert!(response.data.is_none());
    assert!(!response.message.is_empty());
    assert!(response.message.contains("not found"));
}

#[test]
fn test_export_html_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path());

    let first = service.export_html("Sales Order").unwrap();
    let first_bytes = std::fs::read(&first.path).unwrap();
    let second = service.export_html("Sales Order").unwrap();
    let second_bytes = std::fs::read(&second.path).unwrap();

    assert_eq!(first.path, second.path);
    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first.checksum, second.checksum);
    assert_eq!(first.path, dir.path().join("doctype_docs").join("Sales_Order.html"));
    assert_eq!(
        service.export_to_html("Sales Order").unwrap(),
        "/files/doctype_docs/Sales_Order.html"
    );
}

#[test]
fn test_export_html_uses_its_own_depth() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ExplorerConfig::default();
    config.export.public_dir = dir.path().to_path_buf();
    config.export.html_max_level = 1;
    let service = DocumentationService::new(load_store(), config);

    let artifact = service.export_html("Invoice").unwrap();
    let html = std::fs::read_to_string(artifact.path).unwrap();
    assert!(html.contains("Depth limit reached"));
    assert!(!html.contains("Primary Address"));
}

#[test]
fn test_export_missing_doctype_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path());

    let err = service.export_to_html("Ghost").unwrap_err();
    assert!(err.is_not_found());
    assert!(!dir.path().join("doctype_docs").join("Ghost.html").exists());
}
