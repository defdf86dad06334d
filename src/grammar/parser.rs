//! Parser combinators turning grammar tokens into [`Grammar`] definitions.

use chumsky::error::SimpleReason;
use chumsky::prelude::*;

use crate::grammar::ast::{Directive, Element, Grammar, Production, Repetition, RuleDef, Terminal};
use crate::grammar::error::GrammarError;
use crate::grammar::lexer::{tokenize, Token, TokenSpan};

/// Type alias for parser error
type ParserError = Simple<TokenSpan>;

/// Helper: match a specific token type, ignoring the span
fn token(t: Token) -> impl Parser<TokenSpan, (), Error = ParserError> + Clone {
    filter(move |(tok, _): &TokenSpan| tok == &t).ignored()
}

fn terminal() -> impl Parser<TokenSpan, Terminal, Error = ParserError> + Clone {
    select! {
        (Token::Literal(text), _) => Terminal::Literal(text),
        (Token::Pattern(pattern), _) => Terminal::Pattern(pattern),
    }
}

fn number() -> impl Parser<TokenSpan, usize, Error = ParserError> + Clone {
    select! { (Token::Number(n), _) => n }
}

/// Repetition specifier attached to a subrule or group: `(?)`, `(s /,/)`, `(2..)`
fn repetition() -> impl Parser<TokenSpan, Repetition, Error = ParserError> + Clone {
    let many = filter(|(t, _): &TokenSpan| matches!(t, Token::Ident(s) if s == "s"))
        .ignore_then(token(Token::Question).or_not())
        .map(|question| if question.is_some() { (0, None) } else { (1, None) });

    let range = number()
        .then(token(Token::DotDot).ignore_then(number().or_not()).or_not())
        .map(|(min, rest)| match rest {
            None => (min, Some(min)),
            Some(max) => (min, max),
        });

    let up_to = token(Token::DotDot)
        .ignore_then(number())
        .map(|max| (0, Some(max)));

    let bounds = choice((
        token(Token::Question).to((0, Some(1))),
        many,
        range,
        up_to,
    ));

    token(Token::RepOpen)
        .ignore_then(bounds)
        .then(terminal().or_not())
        .then_ignore(token(Token::RParen))
        .try_map(|((min, max), separator), span| match max {
            Some(max) if max < min => Err(Simple::custom(
                span,
                format!("repetition range {}..{} is empty", min, max),
            )),
            _ => Ok(Repetition::Repeat {
                min,
                max,
                separator,
            }),
        })
}

/// Alternatives separated by `|`; recursive through parenthesised groups
fn alternatives() -> impl Parser<TokenSpan, Vec<Production>, Error = ParserError> + Clone {
    recursive(|alternatives| {
        let subrule = select! { (Token::Ident(name), _) => name }
            .then(repetition().or_not())
            .map(|(name, repetition)| Element::Subrule {
                name,
                repetition: repetition.unwrap_or(Repetition::Once),
            });

        let group = token(Token::LParen)
            .ignore_then(alternatives)
            .then_ignore(token(Token::RParen))
            .then(repetition().or_not())
            .map(|(productions, repetition)| Element::Group {
                productions,
                repetition: repetition.unwrap_or(Repetition::Once),
            });

        let directive = select! {
            (Token::Directive(name), _) => Element::Directive(Directive::from_name(&name)),
        };

        let skip = token(Token::SkipOpen)
            .ignore_then(select! { (Token::Pattern(pattern), _) => pattern })
            .then_ignore(token(Token::Gt))
            .map(|pattern| Element::Directive(Directive::Skip(pattern)));

        let element = choice((
            subrule,
            terminal().map(Element::Terminal),
            group,
            directive,
            skip,
        ));

        element
            .repeated()
            .at_least(1)
            .map(Production::new)
            .separated_by(token(Token::Pipe))
            .at_least(1)
    })
}

fn rule() -> impl Parser<TokenSpan, RuleDef, Error = ParserError> + Clone {
    select! { (Token::RuleStart(name), _) => name }
        .then(alternatives())
        .map(|(name, productions)| RuleDef { name, productions })
}

/// The whole grammar: one or more rule definitions
pub fn grammar() -> impl Parser<TokenSpan, Grammar, Error = ParserError> {
    rule()
        .repeated()
        .then_ignore(end())
        .map(|rules| Grammar { rules })
}

/// Parse grammar specification text into rule definitions
///
/// Rules are returned as written; merging duplicates and name resolution
/// happen in [`crate::grammar::compile`].
pub fn parse_grammar(source: &str) -> Result<Grammar, GrammarError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(GrammarError::EmptyGrammar);
    }

    grammar()
        .parse(tokens.clone())
        .map_err(|errors| to_grammar_error(source, &tokens, errors))
}

fn to_grammar_error(source: &str, tokens: &[TokenSpan], errors: Vec<ParserError>) -> GrammarError {
    let Some(error) = errors.into_iter().next() else {
        return GrammarError::syntax(source, source.len(), "invalid grammar");
    };

    // chumsky spans over a token vector are token indices
    let offset = tokens
        .get(error.span().start)
        .map(|(_, span)| span.start)
        .unwrap_or(source.len());

    let message = match error.reason() {
        SimpleReason::Custom(message) => message.clone(),
        _ => match error.found() {
            Some((found, _)) => format!("unexpected {}", found.describe()),
            None => "unexpected end of grammar".to_string(),
        },
    };

    GrammarError::syntax(source, offset, message)
}
