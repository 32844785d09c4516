use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;
use crate::field_value::FieldValue;
use crate::ids::FieldId;
use crate::kind::{FieldKind, ValueShape};

/// Column count used when a persisted container omits its own.
pub const DEFAULT_CONTAINER_COLUMNS: u32 = 2;

/// One node of the form tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawField")]
pub struct Field {
    pub id: FieldId,
    pub label: String,
    pub show_label: bool,
    pub required: bool,
    pub col_span: u32,
    /// Editor-only: set while the field sits inside a container.
    pub is_child: bool,
    pub body: FieldBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldBody {
    Leaf {
        kind: FieldKind,
        value: FieldValue,
        /// Option labels; only populated for plain choice kinds.
        options: Vec<String>,
    },
    Group {
        columns: u32,
        children: Vec<Field>,
    },
    Branch {
        columns: u32,
        selected: Option<String>,
        options: Vec<BranchOption>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchOption {
    pub key: String,
    #[serde(default)]
    pub subtree: Vec<Field>,
}

impl BranchOption {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            subtree: Vec::new(),
        }
    }
}

impl Field {
    pub fn new(id: FieldId, label: impl Into<String>, body: FieldBody) -> Self {
        Self {
            id,
            label: label.into(),
            show_label: true,
            required: false,
            col_span: 1,
            is_child: false,
            body,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match &self.body {
            FieldBody::Leaf { kind, .. } => *kind,
            FieldBody::Group { .. } => FieldKind::Group,
            FieldBody::Branch { .. } => FieldKind::Branch,
        }
    }

    pub fn is_container(&self) -> bool {
        !matches!(self.body, FieldBody::Leaf { .. })
    }

    /// Leaf value, `None` for containers.
    pub fn value(&self) -> Option<&FieldValue> {
        match &self.body {
            FieldBody::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Grid column count governing this container's own children.
    pub fn container_columns(&self) -> Option<u32> {
        match &self.body {
            FieldBody::Group { columns, .. } | FieldBody::Branch { columns, .. } => Some(*columns),
            FieldBody::Leaf { .. } => None,
        }
    }

    /// Every child array this field owns: one for a group, one per option for a branch.
    pub fn child_lists(&self) -> Vec<&[Field]> {
        match &self.body {
            FieldBody::Leaf { .. } => Vec::new(),
            FieldBody::Group { children, .. } => vec![children.as_slice()],
            FieldBody::Branch { options, .. } => options.iter().map(|o| o.subtree.as_slice()).collect(),
        }
    }

    pub fn child_lists_mut(&mut self) -> Vec<&mut Vec<Field>> {
        match &mut self.body {
            FieldBody::Leaf { .. } => Vec::new(),
            FieldBody::Group { children, .. } => vec![children],
            FieldBody::Branch { options, .. } => options.iter_mut().map(|o| &mut o.subtree).collect(),
        }
    }

    pub fn branch_option(&self, key: &str) -> Option<&BranchOption> {
        match &self.body {
            FieldBody::Branch { options, .. } => options.iter().find(|o| o.key == key),
            _ => None,
        }
    }

    /// Subtree of the currently selected branch. A selection naming a key that
    /// no longer exists counts as no selection.
    pub fn selected_subtree(&self) -> Option<&[Field]> {
        match &self.body {
            FieldBody::Branch {
                selected: Some(key),
                options,
                ..
            } => options.iter().find(|o| &o.key == key).map(|o| o.subtree.as_slice()),
            _ => None,
        }
    }
}

/// Pre-order walk over every field reachable from `fields`, descending into
/// group children and into every branch subtree.
pub fn walk<'a>(fields: &'a [Field], visit: &mut impl FnMut(&'a Field)) {
    for field in fields {
        visit(field);
        for list in field.child_lists() {
            walk(list, visit);
        }
    }
}

pub fn collect_ids(fields: &[Field]) -> Vec<&FieldId> {
    let mut ids = Vec::new();
    walk(fields, &mut |f| ids.push(&f.id));
    ids
}

pub fn contains_id(fields: &[Field], id: &FieldId) -> bool {
    fields
        .iter()
        .any(|f| &f.id == id || f.child_lists().into_iter().any(|list| contains_id(list, id)))
}

// ============================================================================
// Wire shape
// ============================================================================

fn default_true() -> bool {
    true
}

fn default_span() -> u32 {
    1
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    id: FieldId,
    #[serde(default)]
    label: String,
    #[serde(default = "default_true")]
    show_label: bool,
    #[serde(rename = "type")]
    kind: FieldKind,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    options: Option<Value>,
    #[serde(default)]
    required: bool,
    #[serde(default = "default_span")]
    col_span: u32,
    #[serde(default)]
    is_child: bool,
    #[serde(default)]
    group_columns: Option<u32>,
    #[serde(default)]
    branch_columns: Option<u32>,
}

fn checked_columns(columns: Option<u32>, id: &FieldId) -> Result<u32, CoreError> {
    match columns.unwrap_or(DEFAULT_CONTAINER_COLUMNS) {
        0 => Err(CoreError::InvalidData(format!("container {id} has zero columns"))),
        n => Ok(n),
    }
}

impl TryFrom<RawField> for Field {
    type Error = CoreError;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        if raw.col_span == 0 {
            return Err(CoreError::InvalidData(format!("field {} has colSpan 0", raw.id)));
        }
        let body = match raw.kind.shape() {
            ValueShape::Children => FieldBody::Group {
                columns: checked_columns(raw.group_columns, &raw.id)?,
                children: match raw.value {
                    Value::Null => Vec::new(),
                    v => serde_json::from_value(v)?,
                },
            },
            ValueShape::BranchKey => FieldBody::Branch {
                columns: checked_columns(raw.branch_columns, &raw.id)?,
                selected: match raw.value {
                    Value::Null => None,
                    Value::String(s) if s.is_empty() => None,
                    Value::String(s) => Some(s),
                    other => {
                        return Err(CoreError::InvalidData(format!(
                            "branch {} has non-string value {other}",
                            raw.id
                        )));
                    }
                },
                options: match raw.options {
                    None | Some(Value::Null) => Vec::new(),
                    Some(v) => serde_json::from_value(v)?,
                },
            },
            shape => FieldBody::Leaf {
                kind: raw.kind,
                value: FieldValue::from_json(shape, &raw.value)?,
                options: match raw.options {
                    Some(v) if raw.kind.has_choice_options() && !v.is_null() => serde_json::from_value(v)?,
                    _ => Vec::new(),
                },
            },
        };
        Ok(Field {
            id: raw.id,
            label: raw.label,
            show_label: raw.show_label,
            required: raw.required,
            col_span: raw.col_span,
            is_child: raw.is_child,
            body,
        })
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ValueOut<'a> {
    Leaf(&'a FieldValue),
    Children(&'a [Field]),
    Key(Option<&'a str>),
}

#[derive(Serialize)]
#[serde(untagged)]
enum OptionsOut<'a> {
    Choices(&'a [String]),
    Branches(&'a [BranchOption]),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldOut<'a> {
    id: &'a FieldId,
    label: &'a str,
    show_label: bool,
    #[serde(rename = "type")]
    kind: FieldKind,
    value: ValueOut<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OptionsOut<'a>>,
    required: bool,
    col_span: u32,
    #[serde(skip_serializing_if = "is_false")]
    is_child: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_columns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch_columns: Option<u32>,
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (value, options, group_columns, branch_columns) = match &self.body {
            FieldBody::Leaf { kind, value, options } => (
                ValueOut::Leaf(value),
                kind.has_choice_options().then_some(OptionsOut::Choices(options)),
                None,
                None,
            ),
            FieldBody::Group { columns, children } => {
                (ValueOut::Children(children), None, Some(*columns), None)
            }
            FieldBody::Branch {
                columns,
                selected,
                options,
            } => (
                ValueOut::Key(selected.as_deref()),
                Some(OptionsOut::Branches(options)),
                None,
                Some(*columns),
            ),
        };
        FieldOut {
            id: &self.id,
            label: &self.label,
            show_label: self.show_label,
            kind: self.kind(),
            value,
            options,
            required: self.required,
            col_span: self.col_span,
            is_child: self.is_child,
            group_columns,
            branch_columns,
        }
        .serialize(serializer)
    }
}
