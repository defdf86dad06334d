//! # rdtree
//!
//! Compile a recursive-descent grammar and get back a uniform rule tree.
//!
//! Every rule that matches becomes a [`TreeNode`] tagged with the rule's
//! name. Its children are the nodes of the subrules it matched and the text
//! its terminals matched, in input order. Rules that only wrap a single
//! subrule collapse into it, and quoted literals become plain text leaves.
//!
//! ```text
//! use rdtree::{Parser, ParserOptions};
//!
//! let parser = Parser::new(
//!     r#"
//!     parse: line
//!     line: word label
//!     word: /[A-Za-z0-9_\-]+/
//!     label: <quotelike>
//!     "#,
//!     ParserOptions::default(),
//! )?;
//! let tree = parser.parse(r#"this "this stuff""#)?;
//! assert_eq!(
//!     tree.to_string(),
//!     "<line><word>this</word><label>this stuff</label></line>"
//! );
//! ```
//!
//! ## Layout
//!
//! - [`grammar`]: grammar text → compiled grammar → matching engine
//! - [`tree`]: the node type and the builder the engine reduces into
//! - [`parser`]: the facade tying the two together
//! - [`formats`]: tag, treeviz, JSON and YAML output
//! - [`config`]: layered TOML configuration

pub mod config;
pub mod formats;
pub mod grammar;
pub mod parser;
pub mod tree;

pub use grammar::{GrammarError, ParseError};
pub use parser::{Parser, ParserOptions};
pub use tree::{Child, TreeNode};
