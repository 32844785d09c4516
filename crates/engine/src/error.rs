use formtree_core::{CoreError, FieldId, FieldKind};
use thiserror::Error;

use crate::controller::EditorMode;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("unknown field type: {0}")]
    UnknownType(String),

    #[error("field type not allowed as a child: {0}")]
    TypeNotAllowedAsChild(FieldKind),

    #[error("field id must not be empty")]
    EmptyId,

    #[error("duplicate field id: {0}")]
    DuplicateId(FieldId),

    #[error("container not found: {0}")]
    ContainerNotFound(FieldId),

    #[error("branch {key:?} not found on {container}")]
    BranchNotFound { container: FieldId, key: String },

    #[error("cannot move {moved} next to {target}: different containers")]
    CrossContainerMove { moved: FieldId, target: FieldId },

    #[error("field not found: {0}")]
    NotFound(FieldId),

    #[error("invalid column count {requested} (max {max})")]
    InvalidColumnCount { requested: u32, max: u32 },

    #[error("branch key must not be empty")]
    EmptyBranchKey,

    #[error("branch {key:?} already exists on {container}")]
    DuplicateBranchKey { container: FieldId, key: String },

    #[error("option label must not be empty")]
    EmptyOption,

    #[error("option {option:?} listed twice on {field}")]
    DuplicateOption { field: FieldId, option: String },

    #[error("field {0} has no choice options")]
    NotAChoiceField(FieldId),

    #[error("value does not fit {field} ({expected} field)")]
    ValueMismatch { field: FieldId, expected: FieldKind },

    #[error("{operation} not permitted in {mode:?} mode")]
    ModeViolation { mode: EditorMode, operation: &'static str },

    #[error("required fields are not filled")]
    Incomplete,

    #[error("persistence error: {0}")]
    Persistence(String),
}
