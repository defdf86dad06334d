//! XML-like tag serialization
//!
//! Every node becomes `<tag>...</tag>` with its children inline, in order.
//! Text leaves are written as escaped character data.
//!
//! ## Example
//!
//! ```text
//! <line><word>this</word><label>this stuff</label></line>
//! ```
//!
//! The pretty variant puts every child on its own line, indented by depth:
//!
//! ```text
//! <parmlist>
//!   (
//!   <option>is</option>
//!   )
//! </parmlist>
//! ```
//!
//! Nodes whose only child is text stay on one line in pretty output.

use crate::formats::registry::{FormatError, Formatter};
use crate::tree::{Child, TreeNode};

/// Serialize a node compactly
pub fn serialize(node: &TreeNode) -> String {
    let mut output = String::new();
    write_compact(node, &mut output);
    output
}

fn write_compact(node: &TreeNode, output: &mut String) {
    output.push('<');
    output.push_str(node.tag());
    output.push('>');
    for child in node.children() {
        match child {
            Child::Text(text) => output.push_str(&escape_xml(text)),
            Child::Node(child) => write_compact(child, output),
        }
    }
    output.push_str("</");
    output.push_str(node.tag());
    output.push('>');
}

/// Serialize a node with one child per line
pub fn serialize_pretty(node: &TreeNode, indent: &str) -> String {
    let mut output = String::new();
    write_pretty(node, 0, indent, &mut output);
    output
}

fn write_pretty(node: &TreeNode, level: usize, indent: &str, output: &mut String) {
    let pad = indent.repeat(level);

    if let [Child::Text(text)] = node.children() {
        output.push_str(&format!(
            "{}<{}>{}</{}>\n",
            pad,
            node.tag(),
            escape_xml(text),
            node.tag()
        ));
        return;
    }

    if node.children().is_empty() {
        output.push_str(&format!("{}<{}></{}>\n", pad, node.tag(), node.tag()));
        return;
    }

    output.push_str(&format!("{}<{}>\n", pad, node.tag()));
    for child in node.children() {
        match child {
            Child::Text(text) => {
                output.push_str(&format!("{}{}{}\n", pad, indent, escape_xml(text)));
            }
            Child::Node(child) => write_pretty(child, level + 1, indent, output),
        }
    }
    output.push_str(&format!("{}</{}>\n", pad, node.tag()));
}

/// Escape XML special characters
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Compact tag format
pub struct TagFormatter;

impl Formatter for TagFormatter {
    fn name(&self) -> &str {
        "tag"
    }

    fn serialize(&self, node: &TreeNode) -> Result<String, FormatError> {
        Ok(serialize(node))
    }

    fn description(&self) -> &str {
        "XML-like tags, one line"
    }
}

/// Indented tag format
pub struct PrettyTagFormatter {
    pub indent: String,
}

impl Default for PrettyTagFormatter {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

impl Formatter for PrettyTagFormatter {
    fn name(&self) -> &str {
        "tag-pretty"
    }

    fn serialize(&self, node: &TreeNode) -> Result<String, FormatError> {
        Ok(serialize_pretty(node, &self.indent))
    }

    fn description(&self) -> &str {
        "XML-like tags, one child per line"
    }
}
