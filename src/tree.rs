//! Uniform rule tree built from grammar matches

pub mod builder;
pub mod node;

pub use builder::build;
pub use node::{Child, TreeNode};
