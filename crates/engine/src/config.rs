use formtree_core::{CoreError, document::DEFAULT_COLUMNS, field::DEFAULT_CONTAINER_COLUMNS};
use serde::Deserialize;

use crate::error::EngineError;

const DEFAULT_MAX_COLUMNS: u32 = 12;

/// Host-tunable engine settings. Every field has a default, so an empty JSON
/// object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub default_columns: u32,
    pub default_container_columns: u32,
    pub max_columns: u32,
    pub default_choice_options: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_columns: DEFAULT_COLUMNS,
            default_container_columns: DEFAULT_CONTAINER_COLUMNS,
            max_columns: DEFAULT_MAX_COLUMNS,
            default_choice_options: vec!["Option 1".to_string(), "Option 2".to_string()],
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| EngineError::Core(CoreError::from(e)))?;
        config.check_columns(config.default_columns)?;
        config.check_columns(config.default_container_columns)?;
        Ok(config)
    }

    /// Accept a column count in `1..=max_columns`.
    pub fn check_columns(&self, requested: u32) -> Result<u32, EngineError> {
        if requested == 0 || requested > self.max_columns {
            return Err(EngineError::InvalidColumnCount {
                requested,
                max: self.max_columns,
            });
        }
        Ok(requested)
    }
}
