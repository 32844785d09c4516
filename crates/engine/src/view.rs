use formtree_core::{Field, FieldBody, FieldId, FieldKind, FieldValue};

/// One line of a read-only rendering of a filled form.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRow {
    pub id: FieldId,
    pub label: String,
    pub kind: FieldKind,
    /// Nesting depth; top-level fields are 0.
    pub depth: usize,
    pub display: String,
}

/// Flatten the visible tree: groups always, branches through the selected
/// subtree only.
pub fn view_values(fields: &[Field]) -> Vec<ValueRow> {
    let mut rows = Vec::new();
    push_rows(fields, 0, &mut rows);
    rows
}

fn push_rows(fields: &[Field], depth: usize, rows: &mut Vec<ValueRow>) {
    for field in fields {
        let display = match &field.body {
            FieldBody::Leaf { value, .. } => display_value(value),
            FieldBody::Group { .. } => String::new(),
            FieldBody::Branch { selected, .. } => match (selected, field.selected_subtree()) {
                (Some(key), Some(_)) => key.clone(),
                _ => String::new(),
            },
        };
        rows.push(ValueRow {
            id: field.id.clone(),
            label: field.label.clone(),
            kind: field.kind(),
            depth,
            display,
        });
        match &field.body {
            FieldBody::Group { children, .. } => push_rows(children, depth + 1, rows),
            FieldBody::Branch { .. } => {
                if let Some(subtree) = field.selected_subtree() {
                    push_rows(subtree, depth + 1, rows);
                }
            }
            FieldBody::Leaf { .. } => {}
        }
    }
}

pub fn display_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Empty => String::new(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Number(n) if n.is_nan() => String::new(),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Choices(items) => items.join(", "),
        FieldValue::File(file) => file.display_name().to_string(),
        FieldValue::Files(files) => files
            .iter()
            .map(|f| f.display_name())
            .collect::<Vec<_>>()
            .join(", "),
    }
}
