use formtree_core::{DocumentId, FormDocument};

use crate::error::EngineError;
use crate::submission::Submission;

/// Supplies previously saved documents. Implemented by the host's
/// persistence layer; the engine never performs I/O itself.
pub trait DocumentSource {
    fn load_document(&self, id: &DocumentId) -> Result<Option<FormDocument>, EngineError>;
}

/// Receives finished submissions.
pub trait SubmissionSink {
    fn accept(&mut self, submission: Submission) -> Result<(), EngineError>;
}
