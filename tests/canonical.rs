//! End-to-end parsing of the option-list grammar
//!
//! A command line with a bare word, an optional parenthesised parameter
//! list, an optional bracketed option list and an optional quoted label.

use rdtree::formats::{serialize, serialize_tag_pretty};
use rdtree::{Parser, ParserOptions};

const GRAMMAR: &str = r#"
    parse: line
    line: word parmlist(?) optionlist(?) label(?) colon(?)
    colon: ":"
    parmlist: "(" option(s /,\s*|\s+/) ")"
    optionlist: "[" option(s /,\s*|\s+/) "]"
    label: <quotelike>
    word: /[A-Za-z0-9_\-]+/
    option: /[A-Za-z0-9_\- ]+/ | <quotelike>
"#;

const INPUT: &str = r#"this (is, a) ['test, ing', of all] "this stuff""#;

fn parser() -> Parser {
    Parser::new(GRAMMAR, ParserOptions::default()).expect("grammar to compile")
}

#[test]
fn test_canonical_line() {
    let tree = parser().parse(INPUT).expect("input to parse");
    assert_eq!(
        tree.serialize(),
        "<line><word>this</word><parmlist>(<option>is</option><option>a</option>)</parmlist>\
         <optionlist>[<option>test, ing</option><option>of all</option>]</optionlist>\
         <label>this stuff</label></line>"
    );
}

#[test]
fn test_canonical_line_pretty() {
    let tree = parser().parse(INPUT).expect("input to parse");
    let pretty = serialize_tag_pretty(&tree, "  ");
    insta::assert_snapshot!(pretty.trim_end(), @r###"
    <line>
      <word>this</word>
      <parmlist>
        (
        <option>is</option>
        <option>a</option>
        )
      </parmlist>
      <optionlist>
        [
        <option>test, ing</option>
        <option>of all</option>
        ]
      </optionlist>
      <label>this stuff</label>
    </line>
    "###);
}

#[test]
fn test_canonical_line_treeviz() {
    let tree = parser().parse(INPUT).expect("input to parse");
    let outline = serialize(&tree, "treeviz").expect("treeviz to be registered");
    insta::assert_snapshot!(outline.trim_end(), @r###"
    line
    ├─ word
    │ └─ "this"
    ├─ parmlist
    │ ├─ "("
    │ ├─ option
    │ │ └─ "is"
    │ ├─ option
    │ │ └─ "a"
    │ └─ ")"
    ├─ optionlist
    │ ├─ "["
    │ ├─ option
    │ │ └─ "test, ing"
    │ ├─ option
    │ │ └─ "of all"
    │ └─ "]"
    └─ label
      └─ "this stuff"
    "###);
}

#[test]
fn test_optional_parts_may_be_absent() {
    let parser = parser();
    assert_eq!(
        parser.parse("this").unwrap().serialize(),
        "<line><word>this</word></line>"
    );
    assert_eq!(
        parser.parse("go :").unwrap().serialize(),
        "<line><word>go</word><colon>:</colon></line>"
    );
    assert_eq!(
        parser.parse(r#"go "there""#).unwrap().serialize(),
        "<line><word>go</word><label>there</label></line>"
    );
}

#[test]
fn test_tree_navigation() {
    let tree = parser().parse(INPUT).unwrap();
    let options: Vec<String> = tree
        .find("optionlist")
        .expect("optionlist node")
        .child_nodes()
        .map(|node| node.text())
        .collect();
    assert_eq!(options, vec!["test, ing", "of all"]);
    assert_eq!(tree.find("label").map(|n| n.text()), Some("this stuff".to_string()));
}

#[test]
fn test_trailing_garbage_fails() {
    let err = parser().parse("this (is) ;").unwrap_err();
    assert!(err.to_string().starts_with("Parse failed in rule 'parse' at 1:"));
}
