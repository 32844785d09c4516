use std::num::NonZeroU32;

use formtree_core::{DocumentId, Field, FieldCatalog, FieldId, FieldValue, Fingerprint, FormDocument};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::factory::FieldFactory;
use crate::locator::find;
use crate::mutator;
use crate::submission::{Submission, restore_nesting};
use crate::traits::{DocumentSource, SubmissionSink};
use crate::validator::{is_complete, missing_required};
use crate::view::{ValueRow, view_values};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Form authoring: structure and values may change.
    Define,
    /// Filling in an instance: only values may change.
    Fill,
    /// Read-only.
    View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(u64);

impl Revision {
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Sent to listeners after every applied edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    pub revision: Revision,
    pub operation: &'static str,
    pub complete: bool,
}

/// Where a new field goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    TopLevel,
    Group(FieldId),
    Branch(FieldId, String),
}

type Listener = Box<dyn FnMut(&ChangeNotice)>;

/// Owns one document and applies every edit to it. Each edit goes through a
/// single mutator call, then completeness is recomputed before listeners hear
/// about it.
pub struct FormController {
    config: EngineConfig,
    factory: FieldFactory,
    document: FormDocument,
    mode: EditorMode,
    complete: bool,
    revision: Revision,
    saved: Fingerprint,
    listeners: Vec<Listener>,
}

fn fingerprint(document: &FormDocument) -> Result<Fingerprint, EngineError> {
    Ok(Submission::from_document(document).to_document().fingerprint()?)
}

impl FormController {
    /// Start an empty document in `Define` mode.
    pub fn new(config: EngineConfig, name: &str) -> Result<Self, EngineError> {
        let document = FormDocument::new(name, config.default_columns);
        Self::from_owned(config, document, EditorMode::Define)
    }

    /// Open a deep copy of an existing document.
    pub fn open(config: EngineConfig, document: &FormDocument, mode: EditorMode) -> Result<Self, EngineError> {
        document.check_structure()?;
        info!(document_id = %document.id, ?mode, "document opened");
        Self::from_owned(config, document.clone(), mode)
    }

    pub fn load(
        config: EngineConfig,
        source: &dyn DocumentSource,
        id: &DocumentId,
        mode: EditorMode,
    ) -> Result<Self, EngineError> {
        let document = source
            .load_document(id)?
            .ok_or_else(|| EngineError::Persistence(format!("document not found: {id}")))?;
        Self::open(config, &document, mode)
    }

    fn from_owned(config: EngineConfig, mut document: FormDocument, mode: EditorMode) -> Result<Self, EngineError> {
        restore_nesting(&mut document.fields);
        let factory = FieldFactory::new(FieldCatalog::standard(), &config);
        let saved = fingerprint(&document)?;
        let complete = is_complete(&document.fields);
        Ok(Self {
            config,
            factory,
            document,
            mode,
            complete,
            revision: Revision::default(),
            saved,
            listeners: Vec::new(),
        })
    }

    /// Offer authors only the kinds in `catalog`.
    pub fn with_catalog(mut self, catalog: FieldCatalog) -> Self {
        self.factory = FieldFactory::new(catalog, &self.config);
        self
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn fields(&self) -> &[Field] {
        &self.document.fields
    }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        find(&self.document.fields, id)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FieldCatalog {
        self.factory.catalog()
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeNotice) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn ensure_structural(&self, operation: &'static str) -> Result<(), EngineError> {
        match self.mode {
            EditorMode::Define => Ok(()),
            mode => Err(EngineError::ModeViolation { mode, operation }),
        }
    }

    fn ensure_writable(&self, operation: &'static str) -> Result<(), EngineError> {
        match self.mode {
            EditorMode::Define | EditorMode::Fill => Ok(()),
            mode => Err(EngineError::ModeViolation { mode, operation }),
        }
    }

    /// Install an edited tree, recompute completeness, and notify listeners.
    fn commit(&mut self, operation: &'static str, fields: Vec<Field>) -> Revision {
        self.document.fields = fields;
        self.complete = is_complete(&self.document.fields);
        self.revision = Revision(self.revision.0 + 1);
        debug!(operation, revision = self.revision.0, complete = self.complete, "edit applied");

        let notice = ChangeNotice {
            revision: self.revision,
            operation,
            complete: self.complete,
        };
        for listener in &mut self.listeners {
            listener(&notice);
        }
        self.revision
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Create a field of `type_name` and place it. Returns the new field's id.
    pub fn add_field(&mut self, type_name: &str, placement: Placement) -> Result<FieldId, EngineError> {
        self.ensure_structural("add_field")?;
        let is_child = placement != Placement::TopLevel;
        let field = self.factory.create(type_name, is_child)?;
        let id = field.id.clone();
        let fields = &self.document.fields;
        let next = match &placement {
            Placement::TopLevel => mutator::append_top_level(fields, self.document.columns, field)?,
            Placement::Group(container) => mutator::insert_into_container(fields, container, field, None)?,
            Placement::Branch(container, key) => {
                mutator::insert_into_container(fields, container, field, Some(key.as_str()))?
            }
        };
        debug!(field_id = %id, type_name, ?placement, "field added");
        self.commit("add_field", next);
        Ok(id)
    }

    pub fn remove_field(&mut self, id: &FieldId) -> Result<Revision, EngineError> {
        self.ensure_structural("remove_field")?;
        let next = mutator::remove_by_id(&self.document.fields, id)?;
        debug!(field_id = %id, "field removed");
        Ok(self.commit("remove_field", next))
    }

    pub fn rename_field(&mut self, old_id: &FieldId, new_id: &FieldId) -> Result<Revision, EngineError> {
        self.ensure_structural("rename_field")?;
        let next = mutator::rename_id(&self.document.fields, old_id, new_id)?;
        debug!(field_id = %old_id, new_id = %new_id, "field renamed");
        Ok(self.commit("rename_field", next))
    }

    pub fn relabel_field(&mut self, id: &FieldId, label: &str) -> Result<Revision, EngineError> {
        self.ensure_structural("relabel_field")?;
        let next = mutator::update_by_id(&self.document.fields, id, |mut f| {
            f.label = label.to_string();
            f
        })?;
        debug!(field_id = %id, label, "field relabeled");
        Ok(self.commit("relabel_field", next))
    }

    pub fn set_show_label(&mut self, id: &FieldId, show: bool) -> Result<Revision, EngineError> {
        self.ensure_structural("set_show_label")?;
        let next = mutator::update_by_id(&self.document.fields, id, |mut f| {
            f.show_label = show;
            f
        })?;
        debug!(field_id = %id, show, "label visibility changed");
        Ok(self.commit("set_show_label", next))
    }

    pub fn toggle_required(&mut self, id: &FieldId) -> Result<Revision, EngineError> {
        self.ensure_structural("toggle_required")?;
        let next = mutator::update_by_id(&self.document.fields, id, |mut f| {
            f.required = !f.required;
            f
        })?;
        debug!(field_id = %id, "required toggled");
        Ok(self.commit("toggle_required", next))
    }

    /// Set a field's span; out-of-range requests are clamped to its container.
    pub fn change_col_span(&mut self, id: &FieldId, span: u32) -> Result<Revision, EngineError> {
        self.ensure_structural("change_col_span")?;
        let next = mutator::set_col_span(&self.document.fields, self.document.columns, id, span)?;
        debug!(field_id = %id, span, "column span changed");
        Ok(self.commit("change_col_span", next))
    }

    pub fn change_container_columns(&mut self, id: &FieldId, columns: u32) -> Result<Revision, EngineError> {
        self.ensure_structural("change_container_columns")?;
        let columns = self.checked_columns(columns)?;
        let next = mutator::set_container_columns(&self.document.fields, id, columns)?;
        debug!(container = %id, columns = columns.get(), "container columns changed");
        Ok(self.commit("change_container_columns", next))
    }

    pub fn change_document_columns(&mut self, columns: u32) -> Result<Revision, EngineError> {
        self.ensure_structural("change_document_columns")?;
        let columns = self.checked_columns(columns)?;
        let next = mutator::clamp_top_level(&self.document.fields, columns);
        self.document.columns = columns.get();
        debug!(document_id = %self.document.id, columns = columns.get(), "document columns changed");
        Ok(self.commit("change_document_columns", next))
    }

    fn checked_columns(&self, columns: u32) -> Result<NonZeroU32, EngineError> {
        let checked = self.config.check_columns(columns)?;
        NonZeroU32::new(checked).ok_or(EngineError::InvalidColumnCount {
            requested: columns,
            max: self.config.max_columns,
        })
    }

    /// Moving a field onto itself is accepted but is not an edit: the
    /// revision stays put and listeners are not called.
    pub fn reorder_fields(&mut self, moved: &FieldId, target: &FieldId) -> Result<Revision, EngineError> {
        self.ensure_structural("reorder_fields")?;
        let next = mutator::reorder(&self.document.fields, moved, target)?;
        if moved == target {
            return Ok(self.revision);
        }
        debug!(field_id = %moved, target = %target, "field reordered");
        Ok(self.commit("reorder_fields", next))
    }

    pub fn add_branch_option(&mut self, id: &FieldId, key: &str) -> Result<Revision, EngineError> {
        self.ensure_structural("add_branch_option")?;
        let next = mutator::add_branch_option(&self.document.fields, id, key)?;
        debug!(container = %id, key, "branch added");
        Ok(self.commit("add_branch_option", next))
    }

    pub fn remove_branch_option(&mut self, id: &FieldId, key: &str) -> Result<Revision, EngineError> {
        self.ensure_structural("remove_branch_option")?;
        let next = mutator::remove_branch_option(&self.document.fields, id, key)?;
        debug!(container = %id, key, "branch removed");
        Ok(self.commit("remove_branch_option", next))
    }

    pub fn rename_branch_option(&mut self, id: &FieldId, old_key: &str, new_key: &str) -> Result<Revision, EngineError> {
        self.ensure_structural("rename_branch_option")?;
        let next = mutator::rename_branch_option(&self.document.fields, id, old_key, new_key)?;
        debug!(container = %id, old_key, new_key, "branch renamed");
        Ok(self.commit("rename_branch_option", next))
    }

    pub fn set_choice_options(&mut self, id: &FieldId, options: Vec<String>) -> Result<Revision, EngineError> {
        self.ensure_structural("set_choice_options")?;
        let count = options.len();
        let next = mutator::set_choice_options(&self.document.fields, id, options)?;
        debug!(field_id = %id, count, "choice options replaced");
        Ok(self.commit("set_choice_options", next))
    }

    // ========================================================================
    // Values
    // ========================================================================

    pub fn set_field_value(&mut self, id: &FieldId, value: FieldValue) -> Result<Revision, EngineError> {
        self.ensure_writable("set_field_value")?;
        let next = mutator::set_value(&self.document.fields, id, value)?;
        debug!(field_id = %id, "value set");
        Ok(self.commit("set_field_value", next))
    }

    pub fn missing_required(&self) -> Vec<FieldId> {
        missing_required(&self.document.fields)
    }

    pub fn view_values(&self) -> Vec<ValueRow> {
        view_values(&self.document.fields)
    }

    // ========================================================================
    // Saving
    // ========================================================================

    pub fn submission(&self) -> Submission {
        Submission::from_document(&self.document)
    }

    /// Hand a complete document to `sink`. Incomplete documents are refused.
    #[tracing::instrument(skip(self, sink), fields(document_id = %self.document.id))]
    pub fn submit(&mut self, sink: &mut dyn SubmissionSink) -> Result<Submission, EngineError> {
        self.ensure_writable("submit")?;
        if !self.complete {
            warn!(missing = self.missing_required().len(), "submission refused");
            return Err(EngineError::Incomplete);
        }
        let submission = self.submission();
        sink.accept(submission.clone())?;
        self.mark_saved()?;
        info!(revision = self.revision.0, "document submitted");
        Ok(submission)
    }

    /// Whether the submitted shape differs from the last save (or from load).
    pub fn is_dirty(&self) -> Result<bool, EngineError> {
        Ok(fingerprint(&self.document)? != self.saved)
    }

    pub fn mark_saved(&mut self) -> Result<(), EngineError> {
        self.saved = fingerprint(&self.document)?;
        Ok(())
    }
}
