use formtree_core::{DocumentId, Field, FormDocument};
use serde::Serialize;

use crate::validator::is_complete;

/// Strip editor-only metadata from every field, branch subtrees included.
/// Performs no validation.
pub fn to_submission(fields: &[Field]) -> Vec<Field> {
    fields.iter().map(strip).collect()
}

fn strip(field: &Field) -> Field {
    let mut out = field.clone();
    out.is_child = false;
    for list in out.child_lists_mut() {
        *list = to_submission(list);
    }
    out
}

/// Re-derive editor nesting flags from tree position: top-level fields are
/// not children, everything inside a group or branch subtree is.
pub fn restore_nesting(fields: &mut [Field]) {
    mark(fields, false);
}

fn mark(fields: &mut [Field], nested: bool) {
    for field in fields {
        field.is_child = nested;
        for list in field.child_lists_mut() {
            mark(list, true);
        }
    }
}

/// What the engine hands to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub document_id: DocumentId,
    pub name: String,
    pub columns: u32,
    pub fields: Vec<Field>,
    pub complete: bool,
}

impl Submission {
    pub fn from_document(document: &FormDocument) -> Self {
        Self {
            document_id: document.id.clone(),
            name: document.name.clone(),
            columns: document.columns,
            fields: to_submission(&document.fields),
            complete: is_complete(&document.fields),
        }
    }

    /// The submitted shape as a document, e.g. for re-opening what was sent.
    pub fn to_document(&self) -> FormDocument {
        FormDocument {
            id: self.document_id.clone(),
            name: self.name.clone(),
            columns: self.columns,
            fields: self.fields.clone(),
        }
    }
}
