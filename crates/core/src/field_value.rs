use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::kind::ValueShape;

/// Opaque handle to file content owned by the host. Never dereferenced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            name: None,
            mime_type: None,
            size: None,
        }
    }

    pub fn named(handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(handle)
        }
    }

    /// Name to show in read-only views; falls back to the handle.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.handle)
    }
}

/// Value held by a leaf field. Containers keep their state in [`crate::FieldBody`].
#[derive(Debug, Clone, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Choices(Vec<String>),
    File(FileRef),
    Files(Vec<FileRef>),
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b).is_eq(),
            (Self::Choices(a), Self::Choices(b)) => a == b,
            (Self::File(a), Self::File(b)) => a == b,
            (Self::Files(a), Self::Files(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl FieldValue {
    /// Unset value for a leaf shape. Multi-valued shapes start as empty lists.
    pub fn default_for(shape: ValueShape) -> Self {
        match shape {
            ValueShape::Choices => FieldValue::Choices(Vec::new()),
            ValueShape::Files => FieldValue::Files(Vec::new()),
            _ => FieldValue::Empty,
        }
    }

    /// Whether this value may be stored in a leaf of the given shape.
    /// `Empty` fits every leaf shape.
    pub fn fits(&self, shape: ValueShape) -> bool {
        matches!(
            (self, shape),
            (FieldValue::Empty, ValueShape::Text | ValueShape::Number | ValueShape::Choices)
                | (FieldValue::Empty, ValueShape::File | ValueShape::Files)
                | (FieldValue::Text(_), ValueShape::Text)
                | (FieldValue::Number(_), ValueShape::Number)
                | (FieldValue::Choices(_), ValueShape::Choices)
                | (FieldValue::File(_), ValueShape::File)
                | (FieldValue::Files(_), ValueShape::Files)
        )
    }

    /// Bring `Empty` into the canonical unset form of a list shape.
    pub fn normalized_for(self, shape: ValueShape) -> Self {
        match self {
            FieldValue::Empty => FieldValue::default_for(shape),
            other => other,
        }
    }

    pub fn from_json(shape: ValueShape, value: &Value) -> Result<Self, CoreError> {
        let parsed = match (shape, value) {
            (_, Value::Null) => FieldValue::default_for(shape),
            (ValueShape::Text, Value::String(s)) => FieldValue::Text(s.clone()),
            (ValueShape::Number, Value::Number(n)) => match n.as_f64() {
                Some(f) => FieldValue::Number(f),
                None => return Err(CoreError::InvalidData(format!("number out of range: {n}"))),
            },
            (ValueShape::Choices, Value::Array(_)) => {
                FieldValue::Choices(serde_json::from_value(value.clone())?)
            }
            (ValueShape::File, Value::Object(_)) => FieldValue::File(serde_json::from_value(value.clone())?),
            (ValueShape::Files, Value::Array(_)) => FieldValue::Files(serde_json::from_value(value.clone())?),
            (shape, other) => {
                return Err(CoreError::InvalidData(format!(
                    "value {other} does not fit a {shape:?} field"
                )));
            }
        };
        Ok(parsed)
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Empty => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            // NaN and infinities have no JSON form; they travel as null.
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Choices(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FieldValue::File(file) => serde_json::to_value(file).unwrap_or(Value::Null),
            FieldValue::Files(files) => serde_json::to_value(files).unwrap_or(Value::Null),
        }
    }
}
