//! Structured data formats backed by serde

use crate::formats::registry::{FormatError, Formatter};
use crate::tree::TreeNode;

/// Pretty-printed JSON: nodes as `{"tag", "children"}`, text as strings
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, node: &TreeNode) -> Result<String, FormatError> {
        serde_json::to_string_pretty(node).map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "JSON document"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, node: &TreeNode) -> Result<String, FormatError> {
        serde_yaml::to_string(node).map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "YAML document"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::with_children(
            "label",
            vec![TreeNode::with_children("word", vec!["this stuff".into()]).into()],
        )
    }

    #[test]
    fn test_json_round_trips() {
        let json = JsonFormatter.serialize(&sample()).unwrap();
        let back: TreeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_yaml_contains_tags_and_text() {
        let yaml = YamlFormatter.serialize(&sample()).unwrap();
        assert!(yaml.contains("tag: label"));
        assert!(yaml.contains("this stuff"));
    }
}
