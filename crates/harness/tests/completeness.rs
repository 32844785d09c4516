use formtree_core::{FieldId, FieldKind, FieldValue, FileRef, FormDocument};
use formtree_engine::{EditorMode, EngineConfig, FormController, is_complete, missing_required, view_values};
use formtree_harness::builders::*;
use formtree_harness::fixtures::incident_report;
use serde_json::json;

fn id(s: &str) -> FieldId {
    FieldId::from(s)
}

fn fill(doc: &FormDocument) -> Result<FormController, Box<dyn std::error::Error>> {
    Ok(FormController::open(EngineConfig::default(), doc, EditorMode::Fill)?)
}

#[test]
fn single_required_text() -> Result<(), Box<dyn std::error::Error>> {
    let doc = document(1, vec![required(text("name"))]);
    let mut form = fill(&doc)?;
    assert!(!form.is_complete());
    form.set_field_value(&id("name"), FieldValue::Text("abc".into()))?;
    assert!(form.is_complete());
    form.set_field_value(&id("name"), FieldValue::Text("  ".into()))?;
    assert!(!form.is_complete());
    Ok(())
}

#[test]
fn branch_selection_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let doc = document(
        2,
        vec![required(branch("kind", 2, vec![("A", vec![required(text("a_text"))]), ("B", vec![])]))],
    );
    let mut form = fill(&doc)?;
    assert!(!form.is_complete());

    form.set_field_value(&id("kind"), FieldValue::Text("B".into()))?;
    assert!(form.is_complete(), "unselected branch A must not block");

    form.set_field_value(&id("kind"), FieldValue::Text("A".into()))?;
    assert!(!form.is_complete());

    form.set_field_value(&id("a_text"), FieldValue::Text("filled".into()))?;
    assert!(form.is_complete());
    Ok(())
}

#[test]
fn filling_the_incident_report() -> Result<(), Box<dyn std::error::Error>> {
    let mut form = fill(&incident_report())?;
    assert_eq!(form.missing_required(), [id("summary"), id("caller_name"), id("incident_type")]);

    form.set_field_value(&id("summary"), FieldValue::Text("Smoke from basement".into()))?;
    form.set_field_value(&id("caller_name"), FieldValue::Text("R. Okafor".into()))?;
    form.set_field_value(&id("incident_type"), FieldValue::Text("medical".into()))?;
    assert_eq!(form.missing_required(), [id("patients")]);

    form.set_field_value(&id("patients"), FieldValue::Number(0.0))?;
    assert!(form.is_complete());

    // Switching branches re-evaluates against the newly selected subtree.
    form.set_field_value(&id("incident_type"), FieldValue::Text("fire".into()))?;
    assert_eq!(form.missing_required(), [id("floors")]);
    form.set_field_value(&id("floors"), FieldValue::Number(3.0))?;
    form.set_field_value(&id("hazards"), FieldValue::Choices(vec!["gas".into()]))?;
    form.set_field_value(&id("scene_photo"), FieldValue::File(FileRef::named("blob:7", "front.jpg")))?;
    assert!(form.is_complete());

    let rows = view_values(form.fields());
    let hazards = rows.iter().find(|r| r.id == "hazards").expect("hazards row");
    assert_eq!(hazards.display, "gas");
    assert_eq!(hazards.depth, 1);
    assert!(rows.iter().all(|r| r.id != "patients"), "unselected branch is hidden");
    Ok(())
}

#[test]
fn group_required_flag_does_not_count() {
    // The group itself is marked required but has only optional children:
    // completeness is decided by the children alone.
    let fields = vec![required(group("g", 2, vec![text("optional")]))];
    assert!(is_complete(&fields));
    assert!(missing_required(&fields).is_empty());
}

#[test]
fn stale_branch_value_from_storage_counts_as_unset() -> Result<(), Box<dyn std::error::Error>> {
    let doc = FormDocument::from_value(json!({
        "id": "stale",
        "columns": 2,
        "fields": [
            {"id": "kind", "label": "Kind", "type": "branch", "required": true, "value": "removed",
             "options": [{"key": "kept", "subtree": []}]}
        ]
    }))?;
    let form = fill(&doc)?;
    assert!(!form.is_complete());
    assert_eq!(form.missing_required(), [id("kind")]);
    // The stale key is preserved, not silently rewritten.
    let stored = serde_json::to_value(form.document())?;
    assert_eq!(stored["fields"][0]["value"], json!("removed"));
    Ok(())
}

#[test]
fn value_shapes_are_enforced() -> Result<(), Box<dyn std::error::Error>> {
    let doc = document(
        2,
        vec![
            number("n"),
            choice("c", FieldKind::Checkbox, &["a", "b"]),
            attachment("files"),
        ],
    );
    let mut form = fill(&doc)?;
    assert!(form.set_field_value(&id("n"), FieldValue::Text("12".into())).is_err());
    assert!(form.set_field_value(&id("c"), FieldValue::Text("a".into())).is_err());
    form.set_field_value(&id("files"), FieldValue::Files(vec![FileRef::new("h1"), FileRef::new("h2")]))?;
    assert_eq!(form.revision().get(), 1);
    Ok(())
}
