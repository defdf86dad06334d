//! Treeviz formatter for rule trees

use crate::formats::registry::{FormatError, Formatter};
use crate::tree::{Child, TreeNode};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(node: &TreeNode) -> String {
    let mut result = format!("{}\n", node.tag());
    append_children(&mut result, node.children(), "");
    result
}

fn append_children(result: &mut String, children: &[Child], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let connector = if is_last { "└─" } else { "├─" };

        match child {
            Child::Text(text) => {
                result.push_str(&format!("{}{} {:?}\n", prefix, connector, truncate(text, 30)));
            }
            Child::Node(node) => {
                result.push_str(&format!("{}{} {}\n", prefix, connector, node.tag()));
                let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
                append_children(result, node.children(), &new_prefix);
            }
        }
    }
}

/// Box-drawing outline of the tree
pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, node: &TreeNode) -> Result<String, FormatError> {
        Ok(to_treeviz_str(node))
    }

    fn description(&self) -> &str {
        "Indented outline with box-drawing connectors"
    }
}
