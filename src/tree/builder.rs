//! Tree Builder - reduces one matched rule to one [`TreeNode`]
//!
//! This is the reduction callback handed to the grammar engine. It runs once
//! per matched rule, after all of the rule's subrules have already been
//! reduced, and decides how the matched items become a node:
//!
//! 1. A rule whose only item is an already built node passes that node
//!    through unchanged, so alias rules add no wrapper layer
//! 2. A rule whose only item is a quote-like match shape (`["", open, body,
//!    close, ...]`) becomes a node with the body as its single text leaf
//! 3. Everything else becomes a node tagged with the rule name; groups are
//!    flattened in order, nodes are appended, text becomes leaves
//!
//! Which alternative of the rule matched is not recorded anywhere.
//!
//! Shape detection in step 2 is positional. Any single group that happens to
//! start with an empty string and has text in third position is read as a
//! literal, whatever produced it.

use crate::grammar::Item;
use crate::tree::node::{Child, TreeNode};

/// Build the node for rule `tag` from its matched `items`
pub fn build(tag: &str, mut items: Vec<Item<TreeNode>>) -> TreeNode {
    if items.len() == 1 {
        match items.pop() {
            Some(Item::Node(node)) => return node,
            Some(Item::Group(group)) => {
                if let Some(value) = literal_value(&group) {
                    return TreeNode::with_children(tag, vec![Child::Text(value.to_string())]);
                }
                items.push(Item::Group(group));
            }
            Some(item) => items.push(item),
            None => {}
        }
    }

    let mut node = TreeNode::new(tag);
    for item in items {
        append(&mut node, item);
    }
    node
}

/// The literal carried by a quote-like match shape, if `group` is one
fn literal_value(group: &[Item<TreeNode>]) -> Option<&str> {
    if group.len() < 3 {
        return None;
    }
    match (&group[0], &group[2]) {
        (Item::Text(first), Item::Text(value)) if first.is_empty() => Some(value),
        _ => None,
    }
}

fn append(node: &mut TreeNode, item: Item<TreeNode>) {
    match item {
        Item::Group(items) => {
            for item in items {
                append(node, item);
            }
        }
        Item::Node(child) => node.push(Child::Node(child)),
        Item::Text(text) => node.push(Child::Text(text)),
    }
}
