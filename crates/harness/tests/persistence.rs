use formtree_core::{CoreError, DocumentId, FieldId, FieldValue, FormDocument};
use formtree_engine::{
    EditorMode, EngineConfig, EngineError, FormController, Placement, Submission, to_submission,
};
use formtree_harness::fixtures::incident_report;
use formtree_harness::{FileStore, MemoryStore, init_tracing};
use serde_json::json;

fn id(s: &str) -> FieldId {
    FieldId::from(s)
}

fn fill_minimum(form: &mut FormController) -> Result<(), EngineError> {
    form.set_field_value(&id("summary"), FieldValue::Text("Alarm sounding".into()))?;
    form.set_field_value(&id("caller_name"), FieldValue::Text("J. Silva".into()))?;
    form.set_field_value(&id("incident_type"), FieldValue::Text("noise".into()))?;
    Ok(())
}

// ============================================================================
// JSON shape
// ============================================================================

#[test]
fn document_json_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let doc = incident_report();
    let json = doc.to_json()?;
    let back = FormDocument::from_json(&json)?;
    assert_eq!(back, doc);
    Ok(())
}

#[test]
fn persisted_shape_uses_camel_case_keys() -> Result<(), Box<dyn std::error::Error>> {
    let value = serde_json::to_value(incident_report())?;
    let caller = &value["fields"][1];
    assert_eq!(caller["type"], json!("group"));
    assert_eq!(caller["groupColumns"], json!(2));
    assert_eq!(caller["value"][2]["colSpan"], json!(2));
    assert_eq!(caller["value"][0]["isChild"], json!(true));

    let incident = &value["fields"][2];
    assert_eq!(incident["branchColumns"], json!(2));
    assert_eq!(incident["value"], json!(null));
    assert_eq!(incident["options"][1]["key"], json!("medical"));
    assert_eq!(value["fields"][3]["options"], json!(["low", "normal", "high"]));
    Ok(())
}

#[test]
fn malformed_document_is_rejected() {
    let result = FormDocument::from_value(json!({
        "id": "bad",
        "fields": [{"id": "n", "type": "number", "value": "seven"}]
    }));
    assert!(result.is_err());
}

fn branch_with_keys(first: &str, second: &str) -> serde_json::Value {
    json!({
        "id": "dup-branches", "columns": 2,
        "fields": [
            {"id": "b", "type": "branch", "options": [
                {"key": first, "subtree": [{"id": "x", "type": "text", "isChild": true}]},
                {"key": second, "subtree": [
                    {"id": "y1", "type": "text", "isChild": true},
                    {"id": "y2", "type": "text", "isChild": true},
                    {"id": "y3", "type": "text", "isChild": true}
                ]}
            ]}
        ]
    })
}

#[test]
fn branch_key_rules_hold_on_load() -> Result<(), Box<dyn std::error::Error>> {
    for (first, second) in [("a", "a"), ("a", ""), ("   ", "b")] {
        let result = FormDocument::from_value(branch_with_keys(first, second));
        assert!(matches!(result, Err(CoreError::InvalidData(_))), "keys {first:?}/{second:?} accepted");

        // A document that skipped the checks still cannot be opened.
        let unchecked: FormDocument = serde_json::from_value(branch_with_keys(first, second))?;
        let opened = FormController::open(EngineConfig::default(), &unchecked, EditorMode::Define);
        assert!(matches!(opened, Err(EngineError::Core(CoreError::InvalidData(_)))));
    }

    let doc = FormDocument::from_value(branch_with_keys("a", "b"))?;
    let mut form = FormController::open(EngineConfig::default(), &doc, EditorMode::Define)?;
    form.reorder_fields(&id("y3"), &id("y1"))?;
    form.remove_field(&id("y1"))?;
    assert!(form.field(&id("x")).is_some());
    assert!(form.field(&id("y1")).is_none());
    Ok(())
}

#[test]
fn repeated_choice_options_are_rejected_on_load() {
    let result = FormDocument::from_value(json!({
        "id": "dup-options",
        "fields": [{"id": "p", "type": "radio", "options": ["yes", "no", "yes"]}]
    }));
    assert!(matches!(result, Err(CoreError::InvalidData(_))));
}

// ============================================================================
// Submission
// ============================================================================

#[test]
fn submission_stripping_is_idempotent() {
    let doc = incident_report();
    let once = to_submission(&doc.fields);
    let twice = to_submission(&once);
    assert_eq!(once, twice);
}

#[test]
fn incomplete_document_is_not_submitted() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let mut store = MemoryStore::new();
    let mut form = FormController::open(EngineConfig::default(), &incident_report(), EditorMode::Fill)?;

    assert!(matches!(form.submit(&mut store), Err(EngineError::Incomplete)));
    assert!(store.submissions().is_empty());
    Ok(())
}

#[test]
fn complete_document_is_submitted() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let mut store = MemoryStore::new();
    let mut form = FormController::open(EngineConfig::default(), &incident_report(), EditorMode::Fill)?;
    fill_minimum(&mut form)?;
    assert!(form.is_dirty()?);

    let submission = form.submit(&mut store)?;
    assert!(submission.complete);
    assert!(!form.is_dirty()?);
    assert_eq!(store.submissions(), [submission.clone()]);

    let json = serde_json::to_string(&submission)?;
    assert!(!json.contains("isChild"));
    assert!(json.contains("\"documentId\":\"incident-report\""));
    Ok(())
}

#[test]
fn view_mode_is_read_only() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = MemoryStore::new();
    store.insert(incident_report());
    let mut form = FormController::load(
        EngineConfig::default(),
        &store,
        &DocumentId::from("incident-report"),
        EditorMode::View,
    )?;
    assert!(matches!(
        form.set_field_value(&id("summary"), FieldValue::Text("x".into())),
        Err(EngineError::ModeViolation { mode: EditorMode::View, .. })
    ));
    assert!(matches!(form.submit(&mut store), Err(EngineError::ModeViolation { .. })));
    assert!(!form.view_values().is_empty());
    Ok(())
}

// ============================================================================
// File-backed collaborator
// ============================================================================

#[test]
fn file_store_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let mut store = FileStore::new(dir.path());
    store.save(&incident_report())?;

    let doc_id = DocumentId::from("incident-report");
    let mut author = FormController::load(EngineConfig::default(), &store, &doc_id, EditorMode::Define)?;
    let added = author.add_field("text", Placement::Group(id("caller")))?;
    author.relabel_field(&added, "Unit callsign")?;
    store.save(author.document())?;

    let mut form = FormController::load(EngineConfig::default(), &store, &doc_id, EditorMode::Fill)?;
    assert_eq!(form.field(&added).map(|f| f.label.as_str()), Some("Unit callsign"));
    fill_minimum(&mut form)?;
    let submission: Submission = form.submit(&mut store)?;

    let reloaded = FormController::load(EngineConfig::default(), &store, &doc_id, EditorMode::View)?;
    assert!(reloaded.is_complete());
    assert_eq!(reloaded.submission().fields, submission.fields);
    assert_eq!(
        reloaded.field(&id("summary")).and_then(|f| f.value()),
        Some(&FieldValue::Text("Alarm sounding".into()))
    );
    Ok(())
}

#[test]
fn reloaded_document_regains_nesting_flags() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut store = FileStore::new(dir.path());
    let mut form = FormController::open(EngineConfig::default(), &incident_report(), EditorMode::Fill)?;
    fill_minimum(&mut form)?;
    form.submit(&mut store)?;

    let raw = std::fs::read_to_string(dir.path().join("incident-report.json"))?;
    assert!(!raw.contains("isChild"));

    let doc_id = DocumentId::from("incident-report");
    let author = FormController::load(EngineConfig::default(), &store, &doc_id, EditorMode::Define)?;
    assert_eq!(author.field(&id("caller_name")).map(|f| f.is_child), Some(true));
    assert_eq!(author.field(&id("floors")).map(|f| f.is_child), Some(true));
    assert_eq!(author.field(&id("caller")).map(|f| f.is_child), Some(false));
    assert!(!author.is_dirty()?);
    Ok(())
}

#[test]
fn file_store_refuses_ids_outside_its_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = FileStore::new(dir.path().join("forms"));
    std::fs::create_dir(dir.path().join("forms"))?;

    for bad in ["../escape", "nested/doc", "..", ""] {
        let mut doc = incident_report();
        doc.id = DocumentId::from(bad);
        assert!(matches!(store.save(&doc), Err(EngineError::Persistence(_))), "{bad:?} accepted");
    }
    assert!(!dir.path().join("escape.json").exists());
    assert!(matches!(
        FormController::load(EngineConfig::default(), &store, &DocumentId::from("../escape"), EditorMode::View),
        Err(EngineError::Persistence(_))
    ));
    Ok(())
}

#[test]
fn missing_document_reports_persistence_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = FileStore::new(dir.path());
    let result = FormController::load(
        EngineConfig::default(),
        &store,
        &DocumentId::from("nowhere"),
        EditorMode::Fill,
    );
    assert!(matches!(result, Err(EngineError::Persistence(_))));
    Ok(())
}
