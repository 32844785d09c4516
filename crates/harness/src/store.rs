use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use formtree_core::{DocumentId, FormDocument};
use formtree_engine::{DocumentSource, EngineError, Submission, SubmissionSink};

/// In-memory stand-in for the persistence collaborator.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<DocumentId, FormDocument>,
    submissions: Vec<Submission>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, document: FormDocument) {
        self.documents.insert(document.id.clone(), document);
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }
}

impl DocumentSource for MemoryStore {
    fn load_document(&self, id: &DocumentId) -> Result<Option<FormDocument>, EngineError> {
        Ok(self.documents.get(id).cloned())
    }
}

impl SubmissionSink for MemoryStore {
    fn accept(&mut self, submission: Submission) -> Result<(), EngineError> {
        self.insert(submission.to_document());
        self.submissions.push(submission);
        Ok(())
    }
}

/// Stores each document as `<id>.json` under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

fn io_error(path: &Path, e: std::io::Error) -> EngineError {
    EngineError::Persistence(format!("{}: {e}", path.display()))
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File for `id`. Ids that could name a path outside `dir` are refused.
    fn path(&self, id: &DocumentId) -> Result<PathBuf, EngineError> {
        let name = id.as_str();
        if id.is_blank() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(EngineError::Persistence(format!("unusable document id: {name:?}")));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    pub fn save(&self, document: &FormDocument) -> Result<(), EngineError> {
        let path = self.path(&document.id)?;
        fs::write(&path, document.to_json_pretty()?).map_err(|e| io_error(&path, e))
    }
}

impl DocumentSource for FileStore {
    fn load_document(&self, id: &DocumentId) -> Result<Option<FormDocument>, EngineError> {
        let path = self.path(id)?;
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(FormDocument::from_json(&json)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

impl SubmissionSink for FileStore {
    fn accept(&mut self, submission: Submission) -> Result<(), EngineError> {
        self.save(&submission.to_document())
    }
}
