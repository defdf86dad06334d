//! Rule tree nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A child of a [`TreeNode`]: either a nested node or literal matched text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child {
    Text(String),
    Node(TreeNode),
}

impl Child {
    pub fn as_node(&self) -> Option<&TreeNode> {
        match self {
            Child::Node(node) => Some(node),
            Child::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Child::Text(text) => Some(text),
            Child::Node(_) => None,
        }
    }
}

impl From<TreeNode> for Child {
    fn from(node: TreeNode) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

/// One matched grammar rule
///
/// `tag` is the name of the rule that produced the node. Children keep the
/// order in which they matched. Nodes are not modified once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    tag: String,
    children: Vec<Child>,
}

impl TreeNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_children(tag, Vec::new())
    }

    pub fn with_children(tag: impl Into<String>, children: Vec<Child>) -> Self {
        Self {
            tag: tag.into(),
            children,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Node children only, skipping text leaves
    pub fn child_nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.iter().filter_map(Child::as_node)
    }

    /// All leaf text below this node, depth-first
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Node(node) => node.collect_text(out),
            }
        }
    }

    /// First node tagged `tag`, searching this node then its descendants
    pub fn find(&self, tag: &str) -> Option<&TreeNode> {
        if self.tag == tag {
            return Some(self);
        }
        self.child_nodes().find_map(|child| child.find(tag))
    }

    /// Compact tag serialization: `<tag>child...</tag>`
    pub fn serialize(&self) -> String {
        crate::formats::tag::serialize(self)
    }

    pub(crate) fn push(&mut self, child: Child) {
        self.children.push(child);
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
