//! Grammar compilation
//!
//! Lowers parsed [`RuleDef`]s into an executable form:
//! 1. Merges repeated definitions of a rule (later productions are appended)
//! 2. Resolves subrule names to rule ids
//! 3. Compiles every pattern, separator and skip pattern; patterns only match
//!    at the current position but still see the text before it
//! 4. Rejects left recursion, including recursion through nullable prefixes

use crate::grammar::ast::{Directive, Element, Production, Repetition, RuleDef, Terminal};
use crate::grammar::error::GrammarError;
use crate::grammar::lexer::PatternSource;
use crate::grammar::parser::parse_grammar;
use regex_automata::meta;
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input};
use std::collections::HashMap;

/// Index of a rule inside a [`CompiledGrammar`]
pub type RuleId = usize;

/// A compiled `/.../flags` pattern
///
/// Searches are anchored at the requested offset but run over the whole
/// input, so `\b`, `\B` and `^` under `m` see the preceding text.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: meta::Regex,
}

impl Pattern {
    pub fn new(pattern: &PatternSource) -> Result<Self, GrammarError> {
        let flags = &pattern.flags;
        if let Some(flag) = flags.chars().find(|c| !"imsx".contains(*c)) {
            return Err(GrammarError::InvalidPattern {
                pattern: pattern.source.clone(),
                message: format!("unknown flag '{}'", flag),
            });
        }
        let config = syntax::Config::new()
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(flags.contains('x'));
        let regex = meta::Regex::builder()
            .syntax(config)
            .build(&pattern.source)
            .map_err(|e| GrammarError::InvalidPattern {
                pattern: pattern.source.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            source: pattern.source.clone(),
            regex,
        })
    }

    /// Byte offset where a match starting exactly at `pos` ends
    pub fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        if pos > text.len() {
            return None;
        }
        let input = Input::new(text).range(pos..).anchored(Anchored::Yes);
        self.regex.search(&input).map(|m| m.end())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn is_nullable(&self) -> bool {
        self.regex.is_match("")
    }
}

/// A terminal ready to be matched at a byte offset
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(String),
    Pattern(Pattern),
}

impl Matcher {
    /// Byte offset where a match starting at `pos` ends
    pub fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        match self {
            Matcher::Literal(literal) => {
                let rest = text.get(pos..)?;
                rest.starts_with(literal.as_str()).then(|| pos + literal.len())
            }
            Matcher::Pattern(pattern) => pattern.match_at(text, pos),
        }
    }

    /// Whether the terminal can match without consuming input
    pub fn is_nullable(&self) -> bool {
        match self {
            Matcher::Literal(literal) => literal.is_empty(),
            Matcher::Pattern(pattern) => pattern.is_nullable(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Matcher::Literal(literal) => format!("{:?}", literal),
            Matcher::Pattern(pattern) => format!("/{}/", pattern.source()),
        }
    }
}

/// Compiled repetition bounds
#[derive(Debug, Clone)]
pub enum Rep {
    Once,
    Repeat {
        min: usize,
        max: Option<usize>,
        separator: Option<Matcher>,
    },
}

impl Rep {
    fn min(&self) -> usize {
        match self {
            Rep::Once => 1,
            Rep::Repeat { min, .. } => *min,
        }
    }
}

/// One executable step of a production
#[derive(Debug, Clone)]
pub enum Op {
    Call { rule: RuleId, rep: Rep },
    Terminal(Matcher),
    Group { alternatives: Vec<Vec<Op>>, rep: Rep },
    Quotelike,
    Skip(Pattern),
    Commit,
    Uncommit,
    Reject,
}

/// A rule with its alternatives in declaration order
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub productions: Vec<Vec<Op>>,
}

/// A grammar ready for matching
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    rules: Vec<CompiledRule>,
    index: HashMap<String, RuleId>,
    start: RuleId,
    skip: Pattern,
}

impl CompiledGrammar {
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> &CompiledRule {
        &self.rules[id]
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.index.get(name).copied()
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn start_rule(&self) -> &str {
        &self.rules[self.start].name
    }

    /// Default skip pattern applied before every terminal
    pub fn skip(&self) -> &Pattern {
        &self.skip
    }
}

/// Parse and compile grammar text
pub fn compile(source: &str, start_rule: &str, skip: &str) -> Result<CompiledGrammar, GrammarError> {
    let grammar = parse_grammar(source)?;
    compile_rules(grammar.rules, start_rule, skip)
}

/// Compile already parsed rule definitions
pub fn compile_rules(
    defs: Vec<RuleDef>,
    start_rule: &str,
    skip: &str,
) -> Result<CompiledGrammar, GrammarError> {
    if defs.is_empty() {
        return Err(GrammarError::EmptyGrammar);
    }

    // merge duplicate definitions, keeping first-definition order
    let mut index: HashMap<String, RuleId> = HashMap::new();
    let mut merged: Vec<(String, Vec<Production>)> = Vec::new();
    for def in defs {
        match index.get(&def.name) {
            Some(&id) => merged[id].1.extend(def.productions),
            None => {
                index.insert(def.name.clone(), merged.len());
                merged.push((def.name, def.productions));
            }
        }
    }

    let start = *index
        .get(start_rule)
        .ok_or_else(|| GrammarError::MissingStartRule(start_rule.to_string()))?;

    let lowering = Lowering { index: &index };
    let rules = merged
        .iter()
        .map(|(name, productions)| {
            Ok(CompiledRule {
                name: name.clone(),
                productions: lowering.productions(name, productions)?,
            })
        })
        .collect::<Result<Vec<_>, GrammarError>>()?;

    check_left_recursion(&rules)?;

    let skip = Pattern::new(&PatternSource::new(skip, ""))?;

    tracing::debug!(
        "compiled grammar: {} rules, start rule '{}'",
        rules.len(),
        start_rule
    );

    Ok(CompiledGrammar {
        rules,
        index,
        start,
        skip,
    })
}

struct Lowering<'a> {
    index: &'a HashMap<String, RuleId>,
}

impl Lowering<'_> {
    fn productions(&self, rule: &str, productions: &[Production]) -> Result<Vec<Vec<Op>>, GrammarError> {
        productions
            .iter()
            .map(|p| {
                p.elements
                    .iter()
                    .map(|e| self.element(rule, e))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }

    fn element(&self, rule: &str, element: &Element) -> Result<Op, GrammarError> {
        match element {
            Element::Subrule { name, repetition } => {
                let id = *self.index.get(name).ok_or_else(|| GrammarError::UndefinedRule {
                    name: name.clone(),
                    referenced_in: rule.to_string(),
                })?;
                Ok(Op::Call {
                    rule: id,
                    rep: self.repetition(repetition)?,
                })
            }
            Element::Terminal(terminal) => Ok(Op::Terminal(self.terminal(terminal)?)),
            Element::Group {
                productions,
                repetition,
            } => Ok(Op::Group {
                alternatives: self.productions(rule, productions)?,
                rep: self.repetition(repetition)?,
            }),
            Element::Directive(directive) => match directive {
                Directive::Quotelike => Ok(Op::Quotelike),
                Directive::Skip(pattern) => Ok(Op::Skip(Pattern::new(pattern)?)),
                Directive::Commit => Ok(Op::Commit),
                Directive::Uncommit => Ok(Op::Uncommit),
                Directive::Reject => Ok(Op::Reject),
                Directive::Unknown(name) => Err(GrammarError::UnknownDirective {
                    name: name.clone(),
                    rule: rule.to_string(),
                }),
            },
        }
    }

    fn terminal(&self, terminal: &Terminal) -> Result<Matcher, GrammarError> {
        match terminal {
            Terminal::Literal(text) => Ok(Matcher::Literal(text.clone())),
            Terminal::Pattern(pattern) => Ok(Matcher::Pattern(Pattern::new(pattern)?)),
        }
    }

    fn repetition(&self, repetition: &Repetition) -> Result<Rep, GrammarError> {
        match repetition {
            Repetition::Once => Ok(Rep::Once),
            Repetition::Repeat {
                min,
                max,
                separator,
            } => Ok(Rep::Repeat {
                min: *min,
                max: *max,
                separator: separator.as_ref().map(|s| self.terminal(s)).transpose()?,
            }),
        }
    }
}

/// Collect rules reachable before any input is consumed.
///
/// Returns whether the whole sequence can match empty.
fn leftmost_calls(ops: &[Op], nullable: &[bool], out: &mut Vec<RuleId>) -> bool {
    for op in ops {
        let op_nullable = match op {
            Op::Call { rule, rep } => {
                out.push(*rule);
                nullable[*rule] || rep.min() == 0
            }
            Op::Group { alternatives, rep } => {
                let mut any = false;
                for alternative in alternatives {
                    any |= leftmost_calls(alternative, nullable, out);
                }
                any || rep.min() == 0
            }
            Op::Terminal(matcher) => matcher.is_nullable(),
            Op::Quotelike => false,
            Op::Skip(_) | Op::Commit | Op::Uncommit | Op::Reject => true,
        };
        if !op_nullable {
            return false;
        }
    }
    true
}

fn nullable_rules(rules: &[CompiledRule]) -> Vec<bool> {
    let mut nullable = vec![false; rules.len()];
    let mut scratch = Vec::new();
    loop {
        let mut changed = false;
        for (id, rule) in rules.iter().enumerate() {
            if nullable[id] {
                continue;
            }
            if rule
                .productions
                .iter()
                .any(|p| leftmost_calls(p, &nullable, &mut scratch))
            {
                nullable[id] = true;
                changed = true;
            }
            scratch.clear();
        }
        if !changed {
            return nullable;
        }
    }
}

fn check_left_recursion(rules: &[CompiledRule]) -> Result<(), GrammarError> {
    let nullable = nullable_rules(rules);
    let edges: Vec<Vec<RuleId>> = rules
        .iter()
        .map(|rule| {
            let mut calls = Vec::new();
            for production in &rule.productions {
                leftmost_calls(production, &nullable, &mut calls);
            }
            calls.sort_unstable();
            calls.dedup();
            calls
        })
        .collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    fn visit(
        id: RuleId,
        edges: &[Vec<RuleId>],
        marks: &mut [Mark],
        stack: &mut Vec<RuleId>,
    ) -> Option<Vec<RuleId>> {
        marks[id] = Mark::Active;
        stack.push(id);
        for &next in &edges[id] {
            match marks[next] {
                Mark::Active => {
                    let start = stack.iter().position(|&r| r == next).unwrap_or(0);
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Mark::New => {
                    if let Some(cycle) = visit(next, edges, marks, stack) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }
        stack.pop();
        marks[id] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::New; rules.len()];
    for id in 0..rules.len() {
        if marks[id] != Mark::New {
            continue;
        }
        let mut stack = Vec::new();
        if let Some(cycle) = visit(id, &edges, &mut marks, &mut stack) {
            let path: Vec<String> = cycle.iter().map(|&r| rules[r].name.clone()).collect();
            return Err(GrammarError::LeftRecursion {
                rule: path[0].clone(),
                path,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WS: &str = r"\s*";

    #[test]
    fn test_compiles_and_indexes_rules() {
        let grammar = compile("parse: word\nword: /[a-z]+/", "parse", WS).unwrap();
        assert_eq!(grammar.rule_names().collect::<Vec<_>>(), vec!["parse", "word"]);
        assert_eq!(grammar.rule_id("word"), Some(1));
        assert_eq!(grammar.start_rule(), "parse");
    }

    #[test]
    fn test_duplicate_definitions_append_productions() {
        let grammar = compile("a: 'x'\nb: 'y'\na: 'z'", "a", WS).unwrap();
        assert_eq!(grammar.rules().len(), 2);
        assert_eq!(grammar.rule(0).productions.len(), 2);
    }

    #[test]
    fn test_undefined_rule() {
        let err = compile("parse: line", "parse", WS).unwrap_err();
        assert_eq!(
            err,
            GrammarError::UndefinedRule {
                name: "line".to_string(),
                referenced_in: "parse".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_start_rule() {
        let err = compile("word: /x/", "parse", WS).unwrap_err();
        assert_eq!(err, GrammarError::MissingStartRule("parse".to_string()));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = compile("parse: /(unclosed/", "parse", WS).unwrap_err();
        match err {
            GrammarError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected invalid pattern, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_skip_pattern() {
        assert!(matches!(
            compile("parse: 'x'", "parse", "(["),
            Err(GrammarError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_unknown_directive() {
        let err = compile("parse: <autoaction>", "parse", WS).unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnknownDirective {
                name: "autoaction".to_string(),
                rule: "parse".to_string(),
            }
        );
    }

    #[test]
    fn test_direct_left_recursion() {
        let err = compile("parse: parse '+' 'x' | 'x'", "parse", WS).unwrap_err();
        assert_eq!(
            err,
            GrammarError::LeftRecursion {
                rule: "parse".to_string(),
                path: vec!["parse".to_string(), "parse".to_string()],
            }
        );
    }

    #[test]
    fn test_indirect_left_recursion_through_nullable_prefix() {
        let source = "parse: opt expr\nopt: ('a')(?)\nexpr: parse 'b' | 'c'";
        let err = compile(source, "parse", WS).unwrap_err();
        match err {
            GrammarError::LeftRecursion { path, .. } => {
                assert_eq!(path.first(), path.last());
                assert!(path.contains(&"expr".to_string()));
            }
            other => panic!("expected left recursion, got {:?}", other),
        }
    }

    #[test]
    fn test_right_recursion_is_fine() {
        assert!(compile("parse: 'x' parse | 'x'", "parse", WS).is_ok());
    }

    #[test]
    fn test_matcher_is_anchored() {
        let grammar = compile("parse: /b+/", "parse", WS).unwrap();
        let matcher = match &grammar.rule(0).productions[0][0] {
            Op::Terminal(m) => m.clone(),
            other => panic!("expected terminal, got {:?}", other),
        };
        assert_eq!(matcher.match_at("abb", 0), None);
        assert_eq!(matcher.match_at("abb", 1), Some(3));
        assert_eq!(matcher.describe(), "/b+/");
    }

    fn pattern(source: &str, flags: &str) -> Pattern {
        Pattern::new(&PatternSource::new(source, flags)).unwrap()
    }

    #[test]
    fn test_pattern_sees_preceding_text() {
        let boundary = pattern(r"\bc", "");
        assert_eq!(boundary.match_at("abc", 2), None);
        assert_eq!(boundary.match_at("ab c", 3), Some(4));
        assert_eq!(pattern(r"\Bc", "").match_at("abc", 2), Some(3));
        assert_eq!(pattern("^b", "m").match_at("a\nb", 2), Some(3));
        assert_eq!(pattern("^b", "").match_at("ab", 1), None);
    }

    #[test]
    fn test_extended_pattern_with_comment() {
        let grammar = compile("parse: /a+ # letters/x", "parse", WS).unwrap();
        let matcher = match &grammar.rule(0).productions[0][0] {
            Op::Terminal(m) => m.clone(),
            other => panic!("expected terminal, got {:?}", other),
        };
        assert_eq!(matcher.match_at("aab", 0), Some(2));
    }

    #[test]
    fn test_pattern_flags() {
        assert_eq!(pattern("abc", "i").match_at("xABC", 1), Some(4));
        assert_eq!(pattern("a.b", "s").match_at("a\nb", 0), Some(3));
        assert_eq!(pattern("a.b", "").match_at("a\nb", 0), None);
        assert_eq!(pattern("a b", "x").match_at("ab", 0), Some(2));
    }

    #[test]
    fn test_unknown_pattern_flag() {
        let err = Pattern::new(&PatternSource::new("a", "ig")).unwrap_err();
        assert!(err.to_string().contains("unknown flag 'g'"), "{}", err);
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let alternatives = pattern(r",\s*|\s+", "");
        assert_eq!(alternatives.match_at("x, y", 1), Some(3));
        assert_eq!(alternatives.match_at("xy ,", 1), None);
    }

    #[test]
    fn test_literal_matcher() {
        let matcher = Matcher::Literal("(".to_string());
        assert_eq!(matcher.match_at("x(", 1), Some(2));
        assert_eq!(matcher.match_at("x(", 0), None);
        assert_eq!(matcher.match_at("x(", 5), None);
        assert!(!matcher.is_nullable());
    }
}
