pub mod config;
pub mod controller;
pub mod error;
pub mod factory;
pub mod locator;
pub mod mutator;
pub mod submission;
pub mod traits;
pub mod validator;
pub mod view;

pub use config::EngineConfig;
pub use controller::{ChangeNotice, EditorMode, FormController, Placement, Revision};
pub use error::EngineError;
pub use factory::FieldFactory;
pub use locator::{Location, locate};
pub use submission::{Submission, restore_nesting, to_submission};
pub use traits::{DocumentSource, SubmissionSink};
pub use validator::{is_complete, missing_required};
pub use view::{ValueRow, view_values};
