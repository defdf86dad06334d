//! Grammars that must be rejected at construction time

use rdtree::{GrammarError, Parser};
use rstest::rstest;

fn compile_error(grammar: &str) -> GrammarError {
    match Parser::with_defaults(grammar) {
        Ok(_) => panic!("grammar should not compile:\n{}", grammar),
        Err(err) => err,
    }
}

#[rstest]
#[case::empty("")]
#[case::only_comments("# nothing here\n   # or here\n")]
fn test_empty_grammar(#[case] grammar: &str) {
    assert_eq!(compile_error(grammar), GrammarError::EmptyGrammar);
}

#[test]
fn test_undefined_rule() {
    assert_eq!(
        compile_error("parse: line\nline: word colon"),
        GrammarError::UndefinedRule {
            name: "word".to_string(),
            referenced_in: "line".to_string(),
        }
    );
}

#[test]
fn test_missing_start_rule() {
    assert_eq!(
        compile_error("line: /\\w+/"),
        GrammarError::MissingStartRule("parse".to_string())
    );
}

#[test]
fn test_unknown_directive() {
    assert!(matches!(
        compile_error("parse: <frobnicate> /x/"),
        GrammarError::UnknownDirective { name, rule } if name == "frobnicate" && rule == "parse"
    ));
}

#[rstest]
#[case::terminal("parse: /(/")]
#[case::separator("parse: word(s /[/)\nword: /\\w+/")]
fn test_invalid_pattern(#[case] grammar: &str) {
    assert!(matches!(
        compile_error(grammar),
        GrammarError::InvalidPattern { .. }
    ));
}

#[rstest]
#[case::direct("parse: parse \"x\" | \"y\"", "parse")]
#[case::indirect("parse: a\na: b \"x\"\nb: parse | \"y\"", "parse")]
#[case::through_optional("parse: a(?) parse \"x\" | \"y\"\na: \"z\"", "parse")]
fn test_left_recursion(#[case] grammar: &str, #[case] rule: &str) {
    match compile_error(grammar) {
        GrammarError::LeftRecursion { rule: found, path } => {
            assert_eq!(found, rule);
            assert_eq!(path.first(), path.last());
        }
        other => panic!("expected left recursion, got {:?}", other),
    }
}

#[test]
fn test_right_recursion_is_fine() {
    // the innermost list is a bare alias for its item and collapses into it
    let parser = Parser::with_defaults("parse: list\nlist: item list | item\nitem: /\\d/").unwrap();
    assert_eq!(
        parser.parse("1 2").unwrap().serialize(),
        "<list><item>1</item><item>2</item></list>"
    );
}

#[rstest]
#[case::unterminated_literal("parse: \"open")]
#[case::missing_production("parse: | \"x\"")]
#[case::empty_range("parse: word(3..1)\nword: /\\w/")]
#[case::stray_token("parse: \"x\" )")]
fn test_syntax_errors(#[case] grammar: &str) {
    let err = compile_error(grammar);
    assert!(
        matches!(err, GrammarError::Syntax { line: 1, .. }),
        "unexpected error {:?}",
        err
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        compile_error("line: /x/").to_string(),
        "Start rule 'parse' is not defined"
    );
    assert_eq!(
        compile_error("parse: nope").to_string(),
        "Rule 'nope' referenced in 'parse' is not defined"
    );
}
