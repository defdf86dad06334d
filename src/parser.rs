//! Parser facade
//!
//! Compiles a grammar once and turns input text into a [`TreeNode`] whose
//! nodes are tagged with the rules that matched.
//!
//! ```text
//! let parser = Parser::new(r#"parse: word(s)
//!                             word: /\w+/"#, ParserOptions::default())?;
//! let tree = parser.parse("hello world")?;
//! assert_eq!(tree.serialize(), "<parse><word>hello</word><word>world</word></parse>");
//! ```

use crate::grammar::engine::DEFAULT_MAX_DEPTH;
use crate::grammar::{compile, CompiledGrammar, Engine, Item};
use crate::tree::{build, TreeNode};
use serde::Deserialize;

pub use crate::grammar::{GrammarError, ParseError};

pub const DEFAULT_START_RULE: &str = "parse";
pub const DEFAULT_SKIP: &str = r"\s*";

/// Options that control how a grammar is compiled and applied
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Rule that `parse` starts from
    pub start_rule: String,
    /// Pattern skipped before every terminal
    pub skip: String,
    /// Require the start rule to match the whole input
    pub consume_all: bool,
    /// Deepest nesting of rule calls before parsing gives up
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            start_rule: DEFAULT_START_RULE.to_string(),
            skip: DEFAULT_SKIP.to_string(),
            consume_all: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserOptions {
    /// Build options from a string map
    ///
    /// Unknown keys are ignored. `consume_all` accepts `true`/`false`,
    /// `yes`/`no` and `1`/`0`; any other value, like an unparsable
    /// `max_depth`, leaves the default in place.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            match key {
                "start_rule" | "start" => options.start_rule = value.to_string(),
                "skip" => options.skip = value.to_string(),
                "consume_all" => match value.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" => options.consume_all = true,
                    "false" | "no" | "0" => options.consume_all = false,
                    other => tracing::warn!("ignoring consume_all value '{}'", other),
                },
                "max_depth" => match value.parse() {
                    Ok(depth) => options.max_depth = depth,
                    Err(_) => tracing::warn!("ignoring max_depth value '{}'", value),
                },
                other => tracing::warn!("ignoring unknown parser option '{}'", other),
            }
        }
        options
    }

    pub fn with_start_rule(mut self, rule: impl Into<String>) -> Self {
        self.start_rule = rule.into();
        self
    }
}

type Reduce = fn(&str, Vec<Item<TreeNode>>) -> TreeNode;

/// A compiled grammar that produces rule trees
///
/// Immutable once built; `parse` may be called any number of times.
pub struct Parser {
    engine: Engine<TreeNode, Reduce>,
    options: ParserOptions,
}

impl Parser {
    /// Compile `grammar` with the given options
    pub fn new(grammar: &str, options: ParserOptions) -> Result<Self, GrammarError> {
        let compiled = compile(grammar, &options.start_rule, &options.skip)?;
        Ok(Self {
            engine: Engine::new(compiled, build as Reduce).with_max_depth(options.max_depth),
            options,
        })
    }

    /// Compile `grammar` with [`ParserOptions::default`]
    pub fn with_defaults(grammar: &str) -> Result<Self, GrammarError> {
        Self::new(grammar, ParserOptions::default())
    }

    /// Parse `text` from the start rule
    pub fn parse(&self, text: &str) -> Result<TreeNode, ParseError> {
        self.parse_rule(&self.options.start_rule, text)
    }

    /// Parse `text` from any rule of the grammar
    pub fn parse_rule(&self, rule: &str, text: &str) -> Result<TreeNode, ParseError> {
        self.engine.parse(rule, text, self.options.consume_all)
    }

    pub fn grammar(&self) -> &CompiledGrammar {
        self.engine.grammar()
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDS: &str = r"
        parse: word(s)
        word: /\w+/
    ";

    #[test]
    fn test_parse_words() {
        let parser = Parser::with_defaults(WORDS).unwrap();
        let tree = parser.parse("hello world").unwrap();
        assert_eq!(
            tree.serialize(),
            "<parse><word>hello</word><word>world</word></parse>"
        );
    }

    #[test]
    fn test_parser_is_reusable() {
        let parser = Parser::with_defaults(WORDS).unwrap();
        let first = parser.parse("a b").unwrap();
        let second = parser.parse("a b").unwrap();
        assert_eq!(first, second);
        assert!(parser.parse("!").is_err());
        assert_eq!(parser.parse("c").unwrap().text(), "c");
    }

    #[test]
    fn test_custom_start_rule() {
        let options = ParserOptions::default().with_start_rule("word");
        let parser = Parser::new(WORDS, options).unwrap();
        assert_eq!(parser.parse("x").unwrap().serialize(), "<word>x</word>");
        assert!(parser.parse("x y").is_err());
    }

    #[test]
    fn test_missing_start_rule() {
        let result = Parser::with_defaults("word: /\\w+/");
        assert!(matches!(result, Err(GrammarError::MissingStartRule(name)) if name == "parse"));
    }

    #[test]
    fn test_parse_rule() {
        let parser = Parser::with_defaults(WORDS).unwrap();
        assert_eq!(parser.parse_rule("word", "abc").unwrap().serialize(), "<word>abc</word>");
        assert_eq!(
            parser.parse_rule("nope", "abc"),
            Err(ParseError::UnknownRule("nope".to_string()))
        );
    }

    #[test]
    fn test_prefix_match_without_consume_all() {
        let options = ParserOptions {
            consume_all: false,
            ..ParserOptions::default()
        };
        let parser = Parser::new("parse: /a/", options).unwrap();
        assert_eq!(parser.parse("a!!").unwrap().serialize(), "<parse>a</parse>");
    }

    #[test]
    fn test_options_from_pairs() {
        let options = ParserOptions::from_pairs([
            ("start", "line"),
            ("skip", "[ \\t]*"),
            ("consume_all", "no"),
            ("max_depth", "32"),
            ("colour", "blue"),
        ]);
        assert_eq!(options.start_rule, "line");
        assert_eq!(options.skip, "[ \\t]*");
        assert!(!options.consume_all);
        assert_eq!(options.max_depth, 32);
        assert_eq!(
            ParserOptions::from_pairs([("max_depth", "deep")]).max_depth,
            DEFAULT_MAX_DEPTH
        );
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ParserOptions = serde_json::from_str(r#"{"start_rule": "line"}"#).unwrap();
        assert_eq!(options.start_rule, "line");
        assert_eq!(options.skip, DEFAULT_SKIP);
        assert!(options.consume_all);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_max_depth_limits_nesting() {
        let grammar = "parse: expr\nexpr: '(' expr ')' | 'x'";
        let options = ParserOptions {
            max_depth: 3,
            ..ParserOptions::default()
        };
        let parser = Parser::new(grammar, options).unwrap();
        assert_eq!(parser.parse("(x)").unwrap().text(), "(x)");
        let err = parser.parse("((x))").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse aborted in rule 'expr' at 1:3: more than 3 nested rule calls"
        );
    }

    #[test]
    fn test_custom_skip_pattern() {
        let options = ParserOptions {
            skip: "[ ]*".to_string(),
            ..ParserOptions::default()
        };
        let parser = Parser::new(WORDS, options).unwrap();
        assert!(parser.parse("a b").is_ok());
        assert!(parser.parse("a\nb").is_err());
    }

    #[test]
    fn test_invalid_skip_pattern() {
        let options = ParserOptions {
            skip: "(".to_string(),
            ..ParserOptions::default()
        };
        assert!(matches!(
            Parser::new(WORDS, options),
            Err(GrammarError::InvalidPattern { .. })
        ));
    }
}
