//! Grammar definitions as written in the grammar text
//!
//! This is the direct output of the grammar parser. Names are still
//! unresolved and patterns uncompiled; see [`crate::grammar::compile`].

use crate::grammar::lexer::PatternSource;
use std::fmt;

/// A whole grammar: rules in order of their first definition
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub rules: Vec<RuleDef>,
}

/// One `name: production | production ...` definition
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDef {
    pub name: String,
    pub productions: Vec<Production>,
}

/// A sequence of elements that must all match, left to right
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Production {
    pub elements: Vec<Element>,
}

impl Production {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }
}

/// A terminal matched directly against the input
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    Literal(String),
    Pattern(PatternSource),
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Literal(text) => write!(f, "{:?}", text),
            Terminal::Pattern(p) => write!(f, "/{}/{}", p.source, p.flags),
        }
    }
}

/// How many times an element may match
#[derive(Debug, Clone, PartialEq)]
pub enum Repetition {
    /// Exactly once; the element's own value is used
    Once,
    /// Bounded repetition; always yields a group of values
    Repeat {
        min: usize,
        max: Option<usize>,
        separator: Option<Terminal>,
    },
}

impl Repetition {
    pub fn at_least(min: usize) -> Self {
        Repetition::Repeat {
            min,
            max: None,
            separator: None,
        }
    }
}

/// Engine directives written as `<name>`
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Quote-like literal: `'...'`, `"..."`, `q{...}`, `qq{...}`
    Quotelike,
    /// Replace the skip pattern for the rest of the production
    Skip(PatternSource),
    Commit,
    Uncommit,
    Reject,
    /// Anything else; rejected when the grammar is compiled
    Unknown(String),
}

impl Directive {
    pub fn from_name(name: &str) -> Self {
        match name {
            "quotelike" | "perl_quotelike" => Directive::Quotelike,
            "commit" => Directive::Commit,
            "uncommit" => Directive::Uncommit,
            "reject" => Directive::Reject,
            other => Directive::Unknown(other.to_string()),
        }
    }
}

/// One element of a production
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Subrule {
        name: String,
        repetition: Repetition,
    },
    Terminal(Terminal),
    /// Parenthesised alternatives: `( a | b )`
    Group {
        productions: Vec<Production>,
        repetition: Repetition,
    },
    Directive(Directive),
}
