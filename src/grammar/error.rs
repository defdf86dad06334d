//! Errors raised while compiling a grammar or matching input against it

use std::fmt;

/// Line and column (both 1-based) of a byte offset in `source`
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Errors that can occur when compiling a grammar
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// The grammar text could not be tokenized or parsed
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    /// A `<name>` directive the engine does not support
    UnknownDirective { name: String, rule: String },
    /// A production refers to a rule that is never defined
    UndefinedRule { name: String, referenced_in: String },
    /// The configured start rule is not part of the grammar
    MissingStartRule(String),
    /// A terminal, separator or skip pattern failed to compile
    InvalidPattern { pattern: String, message: String },
    /// A rule can reach itself without consuming input
    LeftRecursion { rule: String, path: Vec<String> },
    /// The grammar text contains no rules at all
    EmptyGrammar,
}

impl GrammarError {
    pub(crate) fn syntax(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(source, offset);
        GrammarError::Syntax {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::Syntax {
                message,
                line,
                column,
            } => write!(f, "Grammar syntax error at {}:{}: {}", line, column, message),
            GrammarError::UnknownDirective { name, rule } => {
                write!(f, "Unknown directive <{}> in rule '{}'", name, rule)
            }
            GrammarError::UndefinedRule {
                name,
                referenced_in,
            } => write!(
                f,
                "Rule '{}' referenced in '{}' is not defined",
                name, referenced_in
            ),
            GrammarError::MissingStartRule(name) => {
                write!(f, "Start rule '{}' is not defined", name)
            }
            GrammarError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid pattern /{}/: {}", pattern, message)
            }
            GrammarError::LeftRecursion { rule, path } => write!(
                f,
                "Left recursion detected in rule '{}' ({})",
                rule,
                path.join(" -> ")
            ),
            GrammarError::EmptyGrammar => write!(f, "Grammar defines no rules"),
        }
    }
}

impl std::error::Error for GrammarError {}

/// Errors that can occur when matching input
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The rule did not match the input; no tree is produced
    ParseFailure {
        rule: String,
        /// Byte offset of the furthest position the engine reached
        offset: usize,
        line: usize,
        column: usize,
        /// Terminals that would have allowed matching to continue there
        expected: Vec<String>,
    },
    /// Rule calls nested deeper than the engine allows
    TooDeep {
        /// Rule whose call would have exceeded the limit
        rule: String,
        offset: usize,
        line: usize,
        column: usize,
        limit: usize,
    },
    /// Matching was requested from a rule the grammar does not define
    UnknownRule(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ParseFailure {
                rule,
                line,
                column,
                expected,
                ..
            } => {
                write!(f, "Parse failed in rule '{}' at {}:{}", rule, line, column)?;
                if !expected.is_empty() {
                    write!(f, ": expected {}", expected.join(" or "))?;
                }
                Ok(())
            }
            ParseError::TooDeep {
                rule,
                line,
                column,
                limit,
                ..
            } => write!(
                f,
                "Parse aborted in rule '{}' at {}:{}: more than {} nested rule calls",
                rule, line, column, limit
            ),
            ParseError::UnknownRule(name) => write!(f, "Rule '{}' not found", name),
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column() {
        let source = "a: b\nc: d\n";
        assert_eq!(line_column(source, 0), (1, 1));
        assert_eq!(line_column(source, 3), (1, 4));
        assert_eq!(line_column(source, 5), (2, 1));
        assert_eq!(line_column(source, 100), (3, 1));
    }

    #[test]
    fn test_display_left_recursion() {
        let err = GrammarError::LeftRecursion {
            rule: "expr".to_string(),
            path: vec!["expr".to_string(), "term".to_string(), "expr".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Left recursion detected in rule 'expr' (expr -> term -> expr)"
        );
    }
}
