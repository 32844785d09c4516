//! Completeness of the required fields that are currently in play.
//!
//! A group's own `required` flag is ignored: only its children decide. A
//! branching field is checked through its selected subtree only; when nothing
//! (or a key that no longer exists) is selected it blocks completeness only if
//! it is itself required.

use formtree_core::{Field, FieldBody, FieldId, FieldValue};

pub fn is_complete(fields: &[Field]) -> bool {
    fields.iter().all(field_complete)
}

fn field_complete(field: &Field) -> bool {
    match &field.body {
        FieldBody::Leaf { value, .. } => !field.required || is_filled(value),
        FieldBody::Group { children, .. } => is_complete(children),
        FieldBody::Branch { .. } => match field.selected_subtree() {
            Some(subtree) => is_complete(subtree),
            None => !field.required,
        },
    }
}

/// Whether a leaf value counts as answered.
pub fn is_filled(value: &FieldValue) -> bool {
    match value {
        FieldValue::Empty => false,
        FieldValue::Text(s) => !s.trim().is_empty(),
        FieldValue::Number(n) => !n.is_nan(),
        FieldValue::Choices(items) => !items.is_empty(),
        FieldValue::File(_) => true,
        FieldValue::Files(files) => !files.is_empty(),
    }
}

/// Ids of every field blocking completeness, in document order.
pub fn missing_required(fields: &[Field]) -> Vec<FieldId> {
    let mut missing = Vec::new();
    collect_missing(fields, &mut missing);
    missing
}

fn collect_missing(fields: &[Field], missing: &mut Vec<FieldId>) {
    for field in fields {
        match &field.body {
            FieldBody::Leaf { value, .. } => {
                if field.required && !is_filled(value) {
                    missing.push(field.id.clone());
                }
            }
            FieldBody::Group { children, .. } => collect_missing(children, missing),
            FieldBody::Branch { .. } => match field.selected_subtree() {
                Some(subtree) => collect_missing(subtree, missing),
                None if field.required => missing.push(field.id.clone()),
                None => {}
            },
        }
    }
}
