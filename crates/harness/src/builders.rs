//! Terse constructors for hand-built field trees.

use formtree_core::{BranchOption, Field, FieldBody, FieldKind, FieldValue, FormDocument, field::collect_ids};

pub fn leaf(id: &str, kind: FieldKind) -> Field {
    Field::new(
        id.into(),
        id,
        FieldBody::Leaf {
            kind,
            value: FieldValue::default_for(kind.shape()),
            options: Vec::new(),
        },
    )
}

pub fn text(id: &str) -> Field {
    leaf(id, FieldKind::Text)
}

pub fn number(id: &str) -> Field {
    leaf(id, FieldKind::Number)
}

pub fn image(id: &str) -> Field {
    leaf(id, FieldKind::Image)
}

pub fn attachment(id: &str) -> Field {
    leaf(id, FieldKind::Attachment)
}

pub fn choice(id: &str, kind: FieldKind, options: &[&str]) -> Field {
    let mut field = leaf(id, kind);
    if let FieldBody::Leaf { options: slot, .. } = &mut field.body {
        *slot = options.iter().map(|o| o.to_string()).collect();
    }
    field
}

pub fn required(mut field: Field) -> Field {
    field.required = true;
    field
}

pub fn span(mut field: Field, col_span: u32) -> Field {
    field.col_span = col_span;
    field
}

pub fn with_value(mut field: Field, value: FieldValue) -> Field {
    if let FieldBody::Leaf { value: slot, .. } = &mut field.body {
        *slot = value;
    }
    field
}

fn as_children(fields: Vec<Field>) -> Vec<Field> {
    fields
        .into_iter()
        .map(|mut f| {
            f.is_child = true;
            f
        })
        .collect()
}

pub fn group(id: &str, columns: u32, children: Vec<Field>) -> Field {
    Field::new(
        id.into(),
        id,
        FieldBody::Group {
            columns,
            children: as_children(children),
        },
    )
}

pub fn branch(id: &str, columns: u32, options: Vec<(&str, Vec<Field>)>) -> Field {
    Field::new(
        id.into(),
        id,
        FieldBody::Branch {
            columns,
            selected: None,
            options: options
                .into_iter()
                .map(|(key, subtree)| BranchOption {
                    key: key.to_string(),
                    subtree: as_children(subtree),
                })
                .collect(),
        },
    )
}

pub fn selected(mut field: Field, key: &str) -> Field {
    if let FieldBody::Branch { selected, .. } = &mut field.body {
        *selected = Some(key.to_string());
    }
    field
}

pub fn document(columns: u32, fields: Vec<Field>) -> FormDocument {
    let mut doc = FormDocument::new("Test form", columns);
    doc.fields = fields;
    doc
}

/// Every id in the tree, pre-order, branch subtrees included.
pub fn all_ids(fields: &[Field]) -> Vec<String> {
    collect_ids(fields).into_iter().map(|id| id.to_string()).collect()
}

pub fn ids_unique(fields: &[Field]) -> bool {
    let mut ids = all_ids(fields);
    let total = ids.len();
    ids.sort();
    ids.dedup();
    ids.len() == total
}
