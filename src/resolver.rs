//! Reference resolution for field definitions

use crate::doctype::FieldDefinition;

/// Target DocType of a reference field, if any.
///
/// A reference-kind field without a usable target is treated as a plain
/// field rather than an error.
pub fn resolve(field: &FieldDefinition) -> Option<&str> {
    if !field.fieldtype.is_reference() {
        return None;
    }

    field
        .options
        .as_deref()
        .map(str::trim)
        .filter(|target| !target.is_empty())
}
