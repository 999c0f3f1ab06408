use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ElementType;

/// Editor settings. Every field has a default, so a partial JSON object is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum number of undo batches kept
    pub history_limit: usize,
    /// Block type used when normalization has to create a block
    pub default_block: ElementType,
    /// Normalization gives up after this many fixes per node in the value
    pub normalize_iterations_per_node: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            default_block: ElementType::Paragraph,
            normalize_iterations_per_node: 42,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = EditorConfig::from_json(r#"{ "historyLimit": 5 }"#).unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.default_block, ElementType::Paragraph);
        assert_eq!(config.normalize_iterations_per_node, 42);
    }

    #[test]
    fn test_custom_default_block() {
        let config = EditorConfig::from_json(r#"{ "defaultBlock": "code" }"#).unwrap();
        assert_eq!(config.default_block, ElementType::Code);
    }
}
