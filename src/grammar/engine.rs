//! Grammar Engine - matches input against a compiled grammar
//!
//! The engine knows nothing about trees. Every time a rule matches, it hands
//! the rule name and the ordered list of matched [`Item`]s to a single
//! reduction callback supplied at construction, and uses the returned value
//! as that rule's result.
//!
//! Matching semantics:
//! - alternatives are tried in order, the first one that matches wins
//! - repetition is greedy and never gives back matches
//! - the skip pattern is applied before every terminal
//! - `<commit>` stops a failing rule from trying later alternatives
//! - rule calls nest at most [`Engine::max_depth`] deep; past that the whole
//!   match is abandoned with [`ParseError::TooDeep`]
//!
//! Because alternatives backtrack, the callback may run for matches that are
//! later abandoned. It must be free of side effects that matter.

use crate::grammar::compile::{CompiledGrammar, Matcher, Op, Pattern, Rep, RuleId};
use crate::grammar::error::{line_column, ParseError};
use crate::grammar::quotelike;
use std::collections::BTreeSet;
use std::marker::PhantomData;

/// Nesting limit for rule calls unless overridden with [`Engine::with_max_depth`]
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// One matched element handed to the reduction callback
#[derive(Debug, Clone, PartialEq)]
pub enum Item<N> {
    /// Text matched by a literal or pattern terminal
    Text(String),
    /// The value a subrule reduced to
    Node(N),
    /// Values of a repeated, optional or parenthesised sub-pattern
    Group(Vec<Item<N>>),
}

/// A compiled grammar paired with its reduction callback
pub struct Engine<N, F> {
    grammar: CompiledGrammar,
    reduce: F,
    max_depth: usize,
    _node: PhantomData<fn() -> N>,
}

impl<N, F> Engine<N, F>
where
    F: Fn(&str, Vec<Item<N>>) -> N,
{
    pub fn new(grammar: CompiledGrammar, reduce: F) -> Self {
        Self {
            grammar,
            reduce,
            max_depth: DEFAULT_MAX_DEPTH,
            _node: PhantomData,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn grammar(&self) -> &CompiledGrammar {
        &self.grammar
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Match `rule` against `text`
    ///
    /// With `consume_all`, anything but skippable input left after the rule
    /// matched is a failure.
    pub fn parse(&self, rule: &str, text: &str, consume_all: bool) -> Result<N, ParseError> {
        let id = self
            .grammar
            .rule_id(rule)
            .ok_or_else(|| ParseError::UnknownRule(rule.to_string()))?;

        tracing::debug!("parsing {} bytes from rule '{}'", text.len(), rule);

        let mut run = Run::new(self, text);
        let skip = self.grammar.skip();
        let matched = run.rule(id, 0, skip);
        if let Some((name, offset)) = run.too_deep.take() {
            let (line, column) = line_column(text, offset);
            tracing::debug!("gave up in rule '{}' at {}:{}: nesting too deep", name, line, column);
            return Err(ParseError::TooDeep {
                rule: name.to_string(),
                offset,
                line,
                column,
                limit: self.max_depth,
            });
        }
        match matched {
            Some((value, end)) => {
                if !consume_all {
                    return Ok(value);
                }
                let end = run.skip(end, skip);
                if end == text.len() {
                    tracing::debug!("rule '{}' matched all input", rule);
                    Ok(value)
                } else {
                    run.fail(end, "end of input".to_string());
                    Err(run.failure(rule))
                }
            }
            None => Err(run.failure(rule)),
        }
    }
}

/// Outcome of matching one production
enum Sequence<N> {
    Matched(Vec<Item<N>>, usize),
    Failed { committed: bool },
}

/// State of a single `parse` call
struct Run<'e, 't, N, F> {
    engine: &'e Engine<N, F>,
    text: &'t str,
    furthest: usize,
    expected: BTreeSet<String>,
    depth: usize,
    /// Rule and offset where the nesting limit was hit
    too_deep: Option<(&'e str, usize)>,
}

impl<'e, 't, N, F> Run<'e, 't, N, F>
where
    F: Fn(&str, Vec<Item<N>>) -> N,
{
    fn new(engine: &'e Engine<N, F>, text: &'t str) -> Self {
        Self {
            engine,
            text,
            furthest: 0,
            expected: BTreeSet::new(),
            depth: 0,
            too_deep: None,
        }
    }

    fn rule(&mut self, id: RuleId, pos: usize, skip: &'e Pattern) -> Option<(N, usize)> {
        let engine = self.engine;
        let rule = engine.grammar.rule(id);
        if self.depth >= engine.max_depth {
            if self.too_deep.is_none() {
                self.too_deep = Some((rule.name.as_str(), pos));
            }
            return None;
        }
        tracing::trace!("trying rule '{}' at {}", rule.name, pos);

        self.depth += 1;
        let mut result = None;
        for production in &rule.productions {
            match self.sequence(production, pos, skip) {
                Sequence::Matched(items, end) => {
                    result = Some(((engine.reduce)(&rule.name, items), end));
                    break;
                }
                Sequence::Failed { committed: true } => break,
                Sequence::Failed { committed: false } => {}
            }
        }
        self.depth -= 1;
        result
    }

    fn sequence(&mut self, ops: &'e [Op], pos: usize, skip: &'e Pattern) -> Sequence<N> {
        let mut skip = skip;
        let mut committed = false;
        let mut items = Vec::new();
        let mut cur = pos;

        for op in ops {
            if self.too_deep.is_some() {
                return Sequence::Failed { committed: true };
            }
            let matched = match op {
                Op::Skip(pattern) => {
                    skip = pattern;
                    continue;
                }
                Op::Commit => {
                    committed = true;
                    continue;
                }
                Op::Uncommit => {
                    committed = false;
                    continue;
                }
                Op::Reject => return Sequence::Failed { committed },
                Op::Call { rule, rep } => {
                    let rule = *rule;
                    self.repeat(rep, cur, skip, |run, at| {
                        run.rule(rule, at, skip).map(|(n, end)| (Item::Node(n), end))
                    })
                }
                Op::Group { alternatives, rep } => self.repeat(rep, cur, skip, |run, at| {
                    run.alternatives(alternatives, at, skip)
                        .map(|(items, end)| (Item::Group(items), end))
                }),
                Op::Terminal(matcher) => self
                    .terminal(matcher, cur, skip)
                    .map(|(text, end)| (Item::Text(text), end)),
                Op::Quotelike => self.quotelike(cur, skip),
            };

            match matched {
                Some((item, end)) => {
                    items.push(item);
                    cur = end;
                }
                None if self.too_deep.is_some() => return Sequence::Failed { committed: true },
                None => return Sequence::Failed { committed },
            }
        }

        if self.too_deep.is_some() {
            return Sequence::Failed { committed: true };
        }
        Sequence::Matched(items, cur)
    }

    fn alternatives(
        &mut self,
        alternatives: &'e [Vec<Op>],
        pos: usize,
        skip: &'e Pattern,
    ) -> Option<(Vec<Item<N>>, usize)> {
        for alternative in alternatives {
            match self.sequence(alternative, pos, skip) {
                Sequence::Matched(items, end) => return Some((items, end)),
                Sequence::Failed { committed: true } => return None,
                Sequence::Failed { committed: false } => {}
            }
        }
        None
    }

    /// Apply a repetition around `one`, which matches a single occurrence
    fn repeat(
        &mut self,
        rep: &'e Rep,
        pos: usize,
        skip: &'e Pattern,
        mut one: impl FnMut(&mut Self, usize) -> Option<(Item<N>, usize)>,
    ) -> Option<(Item<N>, usize)> {
        let (min, max, separator) = match rep {
            Rep::Once => return one(self, pos),
            Rep::Repeat {
                min,
                max,
                separator,
            } => (*min, *max, separator.as_ref()),
        };

        let mut values = Vec::new();
        let mut cur = pos;
        while max.map_or(true, |max| values.len() < max) {
            let mut at = cur;
            if !values.is_empty() {
                if let Some(separator) = separator {
                    match self.terminal(separator, cur, skip) {
                        Some((_, end)) => at = end,
                        None => break,
                    }
                }
            }
            match one(self, at) {
                Some((value, end)) => {
                    values.push(value);
                    let progressed = end > cur;
                    cur = end;
                    if !progressed {
                        break;
                    }
                }
                None => break,
            }
        }

        if values.len() < min {
            return None;
        }
        Some((Item::Group(values), cur))
    }

    fn terminal(&mut self, matcher: &Matcher, pos: usize, skip: &Pattern) -> Option<(String, usize)> {
        let start = self.skip(pos, skip);
        match matcher.match_at(self.text, start) {
            Some(end) => Some((self.text[start..end].to_string(), end)),
            None => {
                self.fail(start, matcher.describe());
                None
            }
        }
    }

    /// Quote-like literals yield `[operator, open, body, close]`
    fn quotelike(&mut self, pos: usize, skip: &Pattern) -> Option<(Item<N>, usize)> {
        let start = self.skip(pos, skip);
        match quotelike::scan(&self.text[start..]) {
            Some(quote) => {
                let parts = [quote.operator, quote.open, quote.body, quote.close];
                let group = parts
                    .iter()
                    .map(|part| Item::Text(part.to_string()))
                    .collect();
                Some((Item::Group(group), start + quote.len))
            }
            None => {
                self.fail(start, "quote-like literal".to_string());
                None
            }
        }
    }

    fn skip(&self, pos: usize, skip: &Pattern) -> usize {
        skip.match_at(self.text, pos).unwrap_or(pos)
    }

    fn fail(&mut self, pos: usize, expected: String) {
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
        }
        if pos == self.furthest {
            self.expected.insert(expected);
        }
    }

    fn failure(self, rule: &str) -> ParseError {
        let (line, column) = line_column(self.text, self.furthest);
        tracing::debug!(
            "rule '{}' failed at {}:{} (offset {})",
            rule,
            line,
            column,
            self.furthest
        );
        ParseError::ParseFailure {
            rule: rule.to_string(),
            offset: self.furthest,
            line,
            column,
            expected: self.expected.into_iter().collect(),
        }
    }
}
