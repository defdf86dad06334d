//! Grammar Engine
//!
//! Compiles a textual recursive-descent grammar and matches input against it.
//! The pipeline is:
//!
//! 1. [`lexer`]: logos tokenization of the grammar text
//! 2. [`parser`]: chumsky combinators producing rule definitions ([`ast`])
//! 3. [`compile`]: name resolution, pattern compilation, left recursion check
//! 4. [`engine`]: backtracking matcher that reduces every matched rule through
//!    a single callback
//!
//! ## Grammar syntax
//!
//! ```text
//! # comments run to end of line
//! line:     word parmlist(?) label(?)
//! parmlist: "(" option(s /,\s*|\s+/) ")"
//! label:    <quotelike>
//! word:     /[A-Za-z0-9_\-]+/
//! option:   /[A-Za-z0-9_\- ]+/
//!         | <quotelike>
//! ```
//!
//! Repetitions attach directly to a subrule or group: `(?)`, `(s)`, `(s?)`,
//! `(N)`, `(N..)`, `(..M)`, `(N..M)`, optionally with a separator terminal.
//! Directives: `<quotelike>`, `<skip: /re/>`, `<commit>`, `<uncommit>`,
//! `<reject>`.

pub mod ast;
pub mod compile;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod quotelike;

pub use compile::{compile, CompiledGrammar, Pattern, RuleId};
pub use engine::{Engine, Item};
pub use error::{GrammarError, ParseError};
pub use parser::parse_grammar;
