use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field::{Field, FieldBody, walk};
use crate::ids::DocumentId;

/// Top-level column count for a document that does not declare one.
pub const DEFAULT_COLUMNS: u32 = 2;

fn default_columns() -> u32 {
    DEFAULT_COLUMNS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDocument {
    pub id: DocumentId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_columns")]
    pub columns: u32,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl FormDocument {
    pub fn new(name: impl Into<String>, columns: u32) -> Self {
        Self {
            id: DocumentId::generate(),
            name: name.into(),
            columns,
            fields: Vec::new(),
        }
    }

    /// Parse a persisted document and check its structural invariants.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let doc: FormDocument = serde_json::from_str(json)?;
        doc.check_structure()?;
        Ok(doc)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, CoreError> {
        let doc: FormDocument = serde_json::from_value(value)?;
        doc.check_structure()?;
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Ids unique over the whole tree, nonzero column counts, every span
    /// within its direct container's column count, and branch keys and
    /// choice options that are non-blank and unique per field.
    pub fn check_structure(&self) -> Result<(), CoreError> {
        if self.columns == 0 {
            return Err(CoreError::InvalidData(format!("document {} has zero columns", self.id)));
        }
        check_spans(&self.fields, self.columns)?;

        let mut seen = HashSet::new();
        let mut problem = None;
        walk(&self.fields, &mut |f| {
            if problem.is_some() {
                return;
            }
            if !seen.insert(&f.id) {
                problem = Some(format!("duplicate field id: {}", f.id));
            } else {
                problem = check_keys(f);
            }
        });
        match problem {
            Some(reason) => Err(CoreError::InvalidData(reason)),
            None => Ok(()),
        }
    }

    /// BLAKE3 digest of the MessagePack encoding of the document.
    pub fn fingerprint(&self) -> Result<Fingerprint, CoreError> {
        let bytes = rmp_serde::to_vec(self).map_err(|e| CoreError::Serialization(e.to_string()))?;
        Ok(Fingerprint(*blake3::hash(&bytes).as_bytes()))
    }
}

fn check_spans(fields: &[Field], columns: u32) -> Result<(), CoreError> {
    for field in fields {
        if field.col_span > columns {
            return Err(CoreError::InvalidData(format!(
                "field {} spans {} of {} columns",
                field.id, field.col_span, columns
            )));
        }
        if let Some(inner) = field.container_columns() {
            for list in field.child_lists() {
                check_spans(list, inner)?;
            }
        }
    }
    Ok(())
}

/// Branch keys, or choice option labels, that are blank or repeated.
fn check_keys(field: &Field) -> Option<String> {
    let (what, keys): (&str, Vec<&str>) = match &field.body {
        FieldBody::Branch { options, .. } => ("branch key", options.iter().map(|o| o.key.as_str()).collect()),
        FieldBody::Leaf { options, .. } => ("option", options.iter().map(String::as_str).collect()),
        FieldBody::Group { .. } => return None,
    };
    let mut seen = HashSet::new();
    for key in keys {
        if key.trim().is_empty() {
            return Some(format!("field {} has a blank {what}", field.id));
        }
        if !seen.insert(key) {
            return Some(format!("field {} repeats {what} {key:?}", field.id));
        }
    }
    None
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:02x}{:02x}...)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_document_with_defaults() -> Result<(), CoreError> {
        let doc = FormDocument::from_json(r#"{"id": "incident", "fields": []}"#)?;
        assert_eq!(doc.columns, DEFAULT_COLUMNS);
        assert_eq!(doc.name, "");
        Ok(())
    }

    #[test]
    fn rejects_duplicate_ids_across_branches() {
        let value = json!({
            "id": "d", "columns": 2,
            "fields": [
                {"id": "x", "type": "text"},
                {"id": "b", "type": "branch", "options": [
                    {"key": "k", "subtree": [{"id": "x", "type": "text", "isChild": true}]}
                ]}
            ]
        });
        let err = FormDocument::from_value(value).unwrap_err();
        assert!(err.to_string().contains("duplicate field id: x"));
    }

    #[test]
    fn rejects_span_overflow_inside_container() {
        let value = json!({
            "id": "d", "columns": 4,
            "fields": [
                {"id": "g", "type": "group", "groupColumns": 2, "colSpan": 4, "value": [
                    {"id": "a", "type": "text", "colSpan": 3}
                ]}
            ]
        });
        assert!(FormDocument::from_value(value).is_err());
    }

    #[test]
    fn rejects_repeated_branch_key() {
        let value = json!({
            "id": "d", "columns": 2,
            "fields": [
                {"id": "b", "type": "branch", "options": [
                    {"key": "a", "subtree": [{"id": "x", "type": "text", "isChild": true}]},
                    {"key": "a", "subtree": [{"id": "y", "type": "text", "isChild": true}]}
                ]}
            ]
        });
        let err = FormDocument::from_value(value).unwrap_err();
        assert!(err.to_string().contains("repeats branch key \"a\""));
    }

    #[test]
    fn rejects_blank_branch_key() {
        let value = json!({
            "id": "d", "columns": 2,
            "fields": [{"id": "b", "type": "branch", "options": [{"key": "  ", "subtree": []}]}]
        });
        let err = FormDocument::from_value(value).unwrap_err();
        assert!(err.to_string().contains("blank branch key"));
    }

    #[test]
    fn rejects_repeated_choice_option() {
        let value = json!({
            "id": "d", "columns": 2,
            "fields": [{"id": "s", "type": "select", "options": ["low", "high", "low"]}]
        });
        let err = FormDocument::from_value(value).unwrap_err();
        assert!(err.to_string().contains("repeats option \"low\""));
    }

    #[test]
    fn fingerprint_tracks_content() -> Result<(), CoreError> {
        let mut doc = FormDocument::new("Intake", 2);
        let before = doc.fingerprint()?;
        assert_eq!(before, doc.clone().fingerprint()?);
        doc.name = "Intake v2".into();
        assert_ne!(before, doc.fingerprint()?);
        Ok(())
    }
}
