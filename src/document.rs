//! JSON assembly of documentation trees

use serde_json::{json, Map, Value};

use crate::doctype::{DocPermission, DocType, FieldDefinition};
use crate::explore::{DocTypeNode, NodeKind};
use crate::resolver;

/// Assemble a documentation tree into its JSON document.
///
/// Keys are emitted in a fixed order and children keep their traversal
/// order, so serializing the same tree always yields the same text.
pub fn assemble(tree: &DocTypeNode) -> Value {
    match &tree.kind {
        NodeKind::Expanded(doctype) => assemble_expanded(tree, doctype),
        NodeKind::Cut => json!({ "cut": true }),
        NodeKind::Cycle { .. } => json!({ "cycle": true }),
        NodeKind::Unresolved { .. } => json!({ "unresolved": true }),
    }
}

fn assemble_expanded(node: &DocTypeNode, doctype: &DocType) -> Value {
    let mut doc = Map::new();
    doc.insert("name".into(), Value::String(node.name.clone()));
    doc.insert("depth".into(), json!(node.depth));
    if node.depth > 0 {
        doc.insert("referenced_by".into(), json!(node.referenced_by));
    }
    doc.insert("module".into(), json!(doctype.module));
    doc.insert("is_submittable".into(), Value::Bool(doctype.is_submittable));
    doc.insert("is_child_table".into(), Value::Bool(doctype.istable));
    doc.insert("naming_rule".into(), Value::String(doctype.naming_rule().to_string()));
    doc.insert(
        "description".into(),
        Value::String(doctype.description.clone().unwrap_or_default()),
    );
    doc.insert("attributes".into(), Value::Object(doctype.attributes.clone()));
    doc.insert(
        "meta_info".into(),
        json!({
            "total_fields": doctype.fields.len(),
            "link_fields_count": doctype.link_field_count(),
            "child_table_count": doctype.child_table_count(),
            "required_fields_count": doctype.required_field_count(),
        }),
    );
    doc.insert(
        "fields".into(),
        Value::Array(doctype.fields.iter().map(field_descriptor).collect()),
    );
    doc.insert(
        "permissions".into(),
        Value::Array(doctype.permissions.iter().map(permission_descriptor).collect()),
    );

    let mut children = Map::new();
    for child in &node.children {
        children.insert(child.name.clone(), assemble(child));
    }
    doc.insert("children".into(), Value::Object(children));

    Value::Object(doc)
}

/// Descriptor for one field: name, type, target, raw options, label,
/// required, attributes
pub fn field_descriptor(field: &FieldDefinition) -> Value {
    json!({
        "name": field.fieldname,
        "type": field.fieldtype.as_str(),
        "target": resolver::resolve(field),
        "options": field.options,
        "label": field.label,
        "required": field.reqd,
        "attributes": Value::Object(field.attributes.clone()),
    })
}

fn permission_descriptor(permission: &DocPermission) -> Value {
    json!({
        "role": permission.role,
        "read": permission.read,
        "write": permission.write,
        "create": permission.create,
        "delete": permission.delete,
        "submit": permission.submit,
        "cancel": permission.cancel,
        "amend": permission.amend,
    })
}
