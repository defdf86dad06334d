//! Output format implementations for rule trees
//!
//! - tag / tag-pretty: XML-like tags (the canonical serialization)
//! - treeviz: box-drawing outline
//! - json / yaml: serde data formats

use crate::tree::TreeNode;
use once_cell::sync::Lazy;

pub mod data;
pub mod registry;
pub mod tag;
pub mod treeviz;

pub use data::{JsonFormatter, YamlFormatter};
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use tag::{serialize as serialize_tag, serialize_pretty as serialize_tag_pretty};
pub use tag::{PrettyTagFormatter, TagFormatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};

/// Registry holding every built-in format
pub static DEFAULT_FORMATS: Lazy<FormatRegistry> = Lazy::new(FormatRegistry::with_defaults);

/// Serialize `node` with a built-in format
pub fn serialize(node: &TreeNode, format: &str) -> Result<String, FormatError> {
    DEFAULT_FORMATS.serialize(node, format)
}
