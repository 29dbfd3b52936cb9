//! DocType metadata types
//!
//! These mirror the definition files the platform exports for every DocType.
//! Only the attributes the explorer reasons about are typed; everything else
//! is carried through untouched in `attributes` so newer schema keys survive
//! into the generated documentation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of a DocType field
///
/// `Link` and `Table` point at another DocType through the field's `options`.
/// Every other field type is plain and carried by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    /// Foreign-key style reference to another DocType
    Link,
    /// Child table whose rows are instances of another DocType
    Table,
    /// Any non-reference field type ("Data", "Currency", "Dynamic Link", ...)
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Link => "Link",
            FieldKind::Table => "Table",
            FieldKind::Other(name) => name,
        }
    }

    /// Whether fields of this kind name a target DocType in `options`
    pub fn is_reference(&self) -> bool {
        matches!(self, FieldKind::Link | FieldKind::Table)
    }
}

impl Default for FieldKind {
    fn default() -> Self {
        FieldKind::Other("Data".to_string())
    }
}

impl From<String> for FieldKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Link" => FieldKind::Link,
            "Table" => FieldKind::Table,
            _ => FieldKind::Other(s),
        }
    }
}

impl From<&str> for FieldKind {
    fn from(s: &str) -> Self {
        FieldKind::from(s.to_string())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field of a DocType
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(default)]
    pub fieldname: String,
    #[serde(default)]
    pub fieldtype: FieldKind,
    /// Target DocType for reference kinds, free-form otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Mandatory flag
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub reqd: bool,
    /// Every other attribute, in declaration order
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl FieldDefinition {
    pub fn new(fieldname: impl Into<String>, fieldtype: impl Into<FieldKind>) -> Self {
        Self {
            fieldname: fieldname.into(),
            fieldtype: fieldtype.into(),
            options: None,
            label: None,
            reqd: false,
            attributes: Map::new(),
        }
    }

    /// A `Link` field pointing at `target`
    pub fn link(fieldname: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(fieldname, FieldKind::Link).with_options(target)
    }

    /// A `Table` field whose rows are `target` documents
    pub fn table(fieldname: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(fieldname, FieldKind::Table).with_options(target)
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.reqd = true;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Role permission row of a DocType
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocPermission {
    #[serde(default)]
    pub role: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub read: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub write: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub create: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub delete: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub submit: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub cancel: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub amend: bool,
}

/// A DocType definition as held by the schema store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_submittable: bool,
    /// Child table flag
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub istable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoname: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub permissions: Vec<DocPermission>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DocType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            is_submittable: false,
            istable: false,
            description: None,
            autoname: None,
            fields: Vec::new(),
            permissions: Vec::new(),
            attributes: Map::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn child_table(mut self) -> Self {
        self.istable = true;
        self
    }

    /// Naming rule, falling back to the platform default
    pub fn naming_rule(&self) -> &str {
        self.autoname.as_deref().unwrap_or("Prompt")
    }

    pub fn required_field_count(&self) -> usize {
        self.fields.iter().filter(|f| f.reqd).count()
    }

    /// Link fields that actually name a target
    pub fn link_field_count(&self) -> usize {
        self.count_references(&FieldKind::Link)
    }

    /// Table fields that actually name a target
    pub fn child_table_count(&self) -> usize {
        self.count_references(&FieldKind::Table)
    }

    fn count_references(&self, kind: &FieldKind) -> usize {
        self.fields
            .iter()
            .filter(|f| &f.fieldtype == kind && crate::resolver::resolve(f).is_some())
            .count()
    }
}

/// Accepts `true`/`false`, `0`/`1`, `"0"`/`"1"` and null for boolean flags
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "True"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_kind_from_string() {
        assert_eq!(FieldKind::from("Link"), FieldKind::Link);
        assert_eq!(FieldKind::from("Table"), FieldKind::Table);
        assert_eq!(
            FieldKind::from("Dynamic Link"),
            FieldKind::Other("Dynamic Link".to_string())
        );
        assert!(!FieldKind::from("Dynamic Link").is_reference());
        assert_eq!(String::from(FieldKind::Table), "Table");
    }

    #[test]
    fn test_parse_platform_definition() {
        let raw = json!({
            "doctype": "DocType",
            "name": "Sales Invoice",
            "module": "Accounts",
            "is_submittable": 1,
            "autoname": "naming_series:",
            "fields": [
                {"fieldname": "customer", "fieldtype": "Link", "options": "Customer", "reqd": 1, "in_list_view": 1},
                {"fieldname": "items", "fieldtype": "Table", "options": "Sales Invoice Item", "reqd": "1"},
                {"fieldname": "remarks", "fieldtype": "Small Text", "reqd": null}
            ],
            "permissions": [{"role": "Accounts User", "read": 1, "write": 1, "submit": 0}]
        });

        let doctype: DocType = serde_json::from_value(raw).unwrap();
        assert_eq!(doctype.name, "Sales Invoice");
        assert!(doctype.is_submittable);
        assert!(!doctype.istable);
        assert_eq!(doctype.naming_rule(), "naming_series:");
        assert_eq!(doctype.fields.len(), 3);
        assert_eq!(doctype.fields[0].fieldtype, FieldKind::Link);
        assert!(doctype.fields[1].reqd);
        assert!(!doctype.fields[2].reqd);
        assert_eq!(doctype.fields[0].attributes.get("in_list_view"), Some(&json!(1)));
        assert_eq!(doctype.attributes.get("doctype"), Some(&json!("DocType")));
        assert!(doctype.permissions[0].write);
        assert!(!doctype.permissions[0].submit);
        assert_eq!(doctype.required_field_count(), 2);
        assert_eq!(doctype.link_field_count(), 1);
        assert_eq!(doctype.child_table_count(), 1);
    }

    #[test]
    fn test_missing_fieldtype_defaults_to_data() {
        let field: FieldDefinition = serde_json::from_value(json!({"fieldname": "title"})).unwrap();
        assert_eq!(field.fieldtype.as_str(), "Data");
    }
}
