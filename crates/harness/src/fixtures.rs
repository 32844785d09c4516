use formtree_core::{FieldKind, FormDocument};

use crate::builders::*;

/// A dispatch intake form: caller details in a group, and an incident-type
/// branch whose subtrees ask different questions.
pub fn incident_report() -> FormDocument {
    let mut doc = document(
        4,
        vec![
            span(required(text("summary")), 4),
            group(
                "caller",
                2,
                vec![
                    required(text("caller_name")),
                    text("caller_phone"),
                    span(text("caller_address"), 2),
                ],
            ),
            required(branch(
                "incident_type",
                2,
                vec![
                    (
                        "fire",
                        vec![required(number("floors")), choice("hazards", FieldKind::Checkbox, &["gas", "chemicals"])],
                    ),
                    ("medical", vec![required(number("patients")), attachment("medical_notes")]),
                    ("noise", vec![]),
                ],
            )),
            choice("priority", FieldKind::Select, &["low", "normal", "high"]),
            image("scene_photo"),
        ],
    );
    doc.id = "incident-report".into();
    doc.name = "Incident report".into();
    doc
}
