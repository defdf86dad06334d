//! Tokenizer for grammar specifications
//!
//! Grammar text is tokenized by logos in a single pass. Whitespace and `#`
//! comments are skipped. Two passes over the token list follow:
//!
//! - [`mark_rule_starts`] folds an identifier followed by `:` into a single
//!   rule header, so productions end where the next rule begins
//! - [`attach_repetitions`] marks every `(` that directly touches the
//!   preceding identifier or group as the start of a repetition specifier, so
//!   `option(s)` and `option (s)` stay distinct

use crate::grammar::error::GrammarError;
use logos::Logos;
use std::ops::Range;

/// Type alias for token with span
pub type TokenSpan = (Token, Range<usize>);

/// Source of a `/.../flags` pattern as written in the grammar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternSource {
    pub source: String,
    pub flags: String,
}

impl PatternSource {
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: flags.into(),
        }
    }
}

/// All tokens of the grammar specification language
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<usize>().ok())]
    Number(usize),

    #[regex(r#""([^"\\]|\\.)*""#, unquote)]
    #[regex(r"'([^'\\]|\\.)*'", unquote)]
    Literal(String),

    #[regex(r"/([^/\\\n]|\\.)*/[imsx]*", pattern)]
    Pattern(PatternSource),

    #[regex(r"<[A-Za-z_]+>", directive_name)]
    Directive(String),

    #[token("<skip:")]
    SkipOpen,

    #[token(":")]
    Colon,

    #[token(">")]
    Gt,

    #[token("|")]
    Pipe,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("?")]
    Question,

    #[token("..")]
    DotDot,

    // `name:` opening a rule definition, produced by `mark_rule_starts`
    RuleStart(String),

    // Produced by `attach_repetitions`, never by logos directly
    RepOpen,
}

impl Token {
    /// Short human-readable description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Token::RuleStart(name) => format!("rule definition '{}:'", name),
            Token::Ident(name) => format!("'{}'", name),
            Token::Number(n) => format!("'{}'", n),
            Token::Literal(text) => format!("literal {:?}", text),
            Token::Pattern(p) => format!("pattern /{}/", p.source),
            Token::Directive(name) => format!("<{}>", name),
            Token::SkipOpen => "'<skip:'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Pipe => "'|'".to_string(),
            Token::LParen | Token::RepOpen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Question => "'?'".to_string(),
            Token::DotDot => "'..'".to_string(),
        }
    }
}

fn directive_name(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}

fn unquote(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1])
}

fn pattern(lex: &mut logos::Lexer<Token>) -> PatternSource {
    let slice = lex.slice();
    // the closing slash is the last '/' in the token; flags follow it
    let close = slice.rfind('/').unwrap_or(slice.len());
    let body = &slice[1..close];
    let flags = &slice[close + 1..];
    PatternSource::new(body.replace("\\/", "/"), flags)
}

/// Resolve backslash escapes in a quoted literal
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Tokenize a grammar specification, keeping byte spans
pub fn tokenize(source: &str) -> Result<Vec<TokenSpan>, GrammarError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                return Err(GrammarError::syntax(
                    source,
                    lexer.span().start,
                    format!("unexpected input {:?}", lexer.slice()),
                ))
            }
        }
    }

    Ok(attach_repetitions(mark_rule_starts(tokens)))
}

/// Fold each `Ident` directly followed by `Colon` into a `RuleStart`
///
/// Whitespace and comments may sit between the name and the colon. A colon
/// anywhere else is left alone for the parser to reject.
pub fn mark_rule_starts(tokens: Vec<TokenSpan>) -> Vec<TokenSpan> {
    let mut out: Vec<TokenSpan> = Vec::with_capacity(tokens.len());
    let mut tokens = tokens.into_iter().peekable();
    while let Some((token, span)) = tokens.next() {
        match token {
            Token::Ident(name) if matches!(tokens.peek(), Some((Token::Colon, _))) => {
                let end = tokens.next().map_or(span.end, |(_, colon)| colon.end);
                out.push((Token::RuleStart(name), span.start..end));
            }
            token => out.push((token, span)),
        }
    }
    out
}

/// Turn each `(` that touches the previous identifier or `)` into `RepOpen`
pub fn attach_repetitions(tokens: Vec<TokenSpan>) -> Vec<TokenSpan> {
    let mut out: Vec<TokenSpan> = Vec::with_capacity(tokens.len());
    for (token, span) in tokens {
        let attached = matches!(token, Token::LParen)
            && matches!(
                out.last(),
                Some((Token::Ident(_) | Token::RParen, prev)) if prev.end == span.start
            );
        if attached {
            out.push((Token::RepOpen, span));
        } else {
            out.push((token, span));
        }
    }
    out
}
