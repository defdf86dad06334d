//! Named output formats for rule trees
//!
//! `rdtree parse --format <name>` looks the name up here. The built-in set is
//! `tag`, `tag-pretty`, `treeviz`, `json` and `yaml`; callers can add their own
//! [`Formatter`] or replace a built-in one under the same name, which is how
//! the CLI applies the configured `tag-pretty` indent.

use crate::tree::TreeNode;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// No formatter is registered under this name
    FormatNotFound(String),
    /// The formatter could not render the tree (JSON/YAML encoder failures)
    SerializationError(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "Unknown output format '{name}'"),
            FormatError::SerializationError(msg) => write!(f, "Cannot render tree: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Renders a whole rule tree as text
pub trait Formatter: Send + Sync {
    /// Name used on the command line and in `[output] format`
    fn name(&self) -> &str;

    fn serialize(&self, node: &TreeNode) -> Result<String, FormatError>;

    /// One-line summary shown by `rdtree list-formats`
    fn description(&self) -> &str {
        ""
    }
}

pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    /// A registry with no formats at all
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    /// Add `formatter`, replacing any format already registered under its name
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Render `node` with the format called `format`
    pub fn serialize(&self, node: &TreeNode, format: &str) -> Result<String, FormatError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| FormatError::FormatNotFound(format.to_string()))?;
        formatter.serialize(node)
    }

    /// Registered names in alphabetical order
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    /// The five built-in formats, `tag-pretty` with a two-space indent
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(super::TagFormatter);
        registry.register(super::PrettyTagFormatter::default());
        registry.register(super::TreevizFormatter);
        registry.register(super::JsonFormatter);
        registry.register(super::YamlFormatter);

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
