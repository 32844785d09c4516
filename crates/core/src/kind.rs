use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The closed set of field kinds a form may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Date,
    /// Multi-choice checkbox group.
    Checkbox,
    Radio,
    Select,
    /// Single file reference.
    Image,
    /// List of file references.
    Attachment,
    /// Fixed-list container.
    Group,
    /// Value-keyed branching container.
    Branch,
}

/// The shape a kind's `value` takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    Number,
    Choices,
    File,
    Files,
    Children,
    BranchKey,
}

impl FieldKind {
    pub const ALL: [FieldKind; 11] = [
        FieldKind::Text,
        FieldKind::Textarea,
        FieldKind::Number,
        FieldKind::Date,
        FieldKind::Checkbox,
        FieldKind::Radio,
        FieldKind::Select,
        FieldKind::Image,
        FieldKind::Attachment,
        FieldKind::Group,
        FieldKind::Branch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Image => "image",
            Self::Attachment => "attachment",
            Self::Group => "group",
            Self::Branch => "branch",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::InvalidData(format!("unknown field type: {s}")))
    }

    pub fn shape(&self) -> ValueShape {
        match self {
            Self::Text | Self::Textarea | Self::Date | Self::Radio | Self::Select => ValueShape::Text,
            Self::Number => ValueShape::Number,
            Self::Checkbox => ValueShape::Choices,
            Self::Image => ValueShape::File,
            Self::Attachment => ValueShape::Files,
            Self::Group => ValueShape::Children,
            Self::Branch => ValueShape::BranchKey,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Group | Self::Branch)
    }

    /// Plain choice kinds carry a list of option labels.
    pub fn has_choice_options(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio | Self::Select)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCatalogEntry {
    pub kind: FieldKind,
    /// Default label given to a freshly created field.
    pub label: &'static str,
    pub allowed_as_child: bool,
}

const STANDARD_ENTRIES: [FieldCatalogEntry; 11] = [
    FieldCatalogEntry { kind: FieldKind::Text, label: "Text", allowed_as_child: true },
    FieldCatalogEntry { kind: FieldKind::Textarea, label: "Paragraph", allowed_as_child: true },
    FieldCatalogEntry { kind: FieldKind::Number, label: "Number", allowed_as_child: true },
    FieldCatalogEntry { kind: FieldKind::Date, label: "Date", allowed_as_child: true },
    FieldCatalogEntry { kind: FieldKind::Checkbox, label: "Checkboxes", allowed_as_child: true },
    FieldCatalogEntry { kind: FieldKind::Radio, label: "Single choice", allowed_as_child: true },
    FieldCatalogEntry { kind: FieldKind::Select, label: "Dropdown", allowed_as_child: true },
    FieldCatalogEntry { kind: FieldKind::Image, label: "Image", allowed_as_child: true },
    FieldCatalogEntry { kind: FieldKind::Attachment, label: "Attachments", allowed_as_child: true },
    FieldCatalogEntry { kind: FieldKind::Group, label: "Group", allowed_as_child: true },
    FieldCatalogEntry { kind: FieldKind::Branch, label: "Conditional", allowed_as_child: false },
];

/// Lookup table of the field kinds a host offers to form authors.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    entries: Vec<FieldCatalogEntry>,
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl FieldCatalog {
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_ENTRIES.to_vec(),
        }
    }

    /// Standard catalog narrowed to `kinds`.
    pub fn restricted(kinds: &[FieldKind]) -> Self {
        Self {
            entries: STANDARD_ENTRIES
                .iter()
                .filter(|e| kinds.contains(&e.kind))
                .copied()
                .collect(),
        }
    }

    pub fn entries(&self) -> &[FieldCatalogEntry] {
        &self.entries
    }

    pub fn lookup(&self, type_name: &str) -> Option<&FieldCatalogEntry> {
        self.entries.iter().find(|e| e.kind.as_str() == type_name)
    }

    pub fn get(&self, kind: FieldKind) -> Option<&FieldCatalogEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }
}
