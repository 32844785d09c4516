pub mod document;
pub mod error;
pub mod field;
pub mod field_value;
pub mod ids;
pub mod kind;
pub mod path;

pub use document::{Fingerprint, FormDocument};
pub use error::CoreError;
pub use field::{BranchOption, Field, FieldBody};
pub use field_value::{FieldValue, FileRef};
pub use ids::*;
pub use kind::{FieldCatalog, FieldCatalogEntry, FieldKind, ValueShape};
pub use path::{ContainerPath, Segment};
