use formtree_core::{BranchOption, Field, FieldBody, FieldCatalog, FieldId, FieldValue, ValueShape};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Mints new fields from a catalog of allowed kinds.
#[derive(Debug, Clone)]
pub struct FieldFactory {
    catalog: FieldCatalog,
    container_columns: u32,
    choice_options: Vec<String>,
}

impl Default for FieldFactory {
    fn default() -> Self {
        Self::new(FieldCatalog::standard(), &EngineConfig::default())
    }
}

impl FieldFactory {
    pub fn new(catalog: FieldCatalog, config: &EngineConfig) -> Self {
        Self {
            catalog,
            container_columns: config.default_container_columns,
            choice_options: config.default_choice_options.clone(),
        }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Create a field of `type_name` with a fresh id and the kind's default value.
    pub fn create(&self, type_name: &str, is_child: bool) -> Result<Field, EngineError> {
        let entry = self
            .catalog
            .lookup(type_name)
            .ok_or_else(|| EngineError::UnknownType(type_name.to_string()))?;
        if is_child && !entry.allowed_as_child {
            return Err(EngineError::TypeNotAllowedAsChild(entry.kind));
        }

        let body = match entry.kind.shape() {
            ValueShape::Children => FieldBody::Group {
                columns: self.container_columns,
                children: Vec::new(),
            },
            ValueShape::BranchKey => FieldBody::Branch {
                columns: self.container_columns,
                selected: None,
                options: Vec::<BranchOption>::new(),
            },
            shape => FieldBody::Leaf {
                kind: entry.kind,
                value: FieldValue::default_for(shape),
                options: if entry.kind.has_choice_options() {
                    self.choice_options.clone()
                } else {
                    Vec::new()
                },
            },
        };

        let mut field = Field::new(FieldId::generate(), entry.label, body);
        field.is_child = is_child;
        Ok(field)
    }
}
