//! Integration tests for arborize and flatten

use purify_dom::{Attributes, Node, Position, Token, TokenKind, arborize, flatten};
use quickcheck_macros::quickcheck;

fn names(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(ToString::to_string).collect()
}

#[test]
fn test_arborize_nests_children() {
    let tokens = vec![
        Token::start("p", Attributes::new()),
        Token::text("a"),
        Token::start("b", Attributes::new()),
        Token::text("c"),
        Token::end("b"),
        Token::end("p"),
        Token::empty("br", Attributes::new()),
    ];
    let root = arborize(tokens, "div");
    assert_eq!(root.name, "div");
    assert_eq!(root.children.len(), 2);
    match &root.children[0] {
        Node::Element(p) => {
            assert_eq!(p.name, "p");
            assert_eq!(p.children.len(), 2);
            assert_eq!(p.children[1].name(), Some("b"));
        }
        other => panic!("Expected element, got {other:?}"),
    }
    match &root.children[1] {
        Node::Element(br) => assert!(br.empty),
        other => panic!("Expected element, got {other:?}"),
    }
}

#[test]
fn test_arborize_records_end_position() {
    let tokens = vec![
        Token::start("em", Attributes::new()).with_position(Position::at(1, 1)),
        Token::text("x"),
        Token::end("em").with_position(Position::at(2, 5)),
    ];
    let root = arborize(tokens, "div");
    let em = root.children[0].as_element().unwrap();
    assert_eq!(em.start, Position::at(1, 1));
    assert_eq!(em.end, Position::at(2, 5));
}

#[test]
fn test_arborize_tolerates_stray_end_and_unclosed_start() {
    let tokens = vec![
        Token::end("p"),
        Token::start("i", Attributes::new()),
        Token::text("open"),
    ];
    let root = arborize(tokens, "div");
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].as_element().unwrap().children.len(), 1);
}

#[test]
fn test_flatten_round_trip() {
    let attrs: Attributes = [("href", "/x")].into_iter().collect();
    let tokens = vec![
        Token::start("ul", Attributes::new()),
        Token::text("\n"),
        Token::start("li", Attributes::new()),
        Token::start("a", attrs),
        Token::text("link"),
        Token::end("a"),
        Token::end("li"),
        Token::comment(" note "),
        Token::end("ul"),
        Token::empty("hr", Attributes::new()),
        Token::text("tail"),
    ];
    let flattened = flatten(arborize(tokens.clone(), "div"));
    assert_eq!(names(&flattened), names(&tokens));
}

#[test]
fn test_flatten_omits_root() {
    let root = arborize(vec![Token::text("only")], "div");
    let tokens = flatten(root);
    assert_eq!(tokens.len(), 1);
    match &tokens[0].kind {
        TokenKind::Text { data, .. } => assert_eq!(data, "only"),
        other => panic!("Expected text, got {other:?}"),
    }
}

#[test]
fn test_deep_nesting_does_not_recurse() {
    let depth = 2_000;
    let mut tokens = Vec::new();
    for _ in 0..depth {
        tokens.push(Token::start("span", Attributes::new()));
    }
    tokens.push(Token::text("deep"));
    for _ in 0..depth {
        tokens.push(Token::end("span"));
    }
    let flattened = flatten(arborize(tokens, "div"));
    assert_eq!(flattened.len(), depth * 2 + 1);
    assert!(flattened[depth].is_text());
}

#[test]
fn test_whitespace_flag() {
    assert!(Token::text(" \n\t").is_whitespace());
    assert!(!Token::text("").is_whitespace());
    assert!(!Token::text(" a ").is_whitespace());
    assert!(Node::text("  ").is_whitespace());
}

#[test]
fn test_attributes_keep_first_duplicate() {
    let attrs: Attributes = [("id", "a"), ("class", "b"), ("id", "c")].into_iter().collect();
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs.get("id"), Some("a"));
    assert_eq!(attrs.names().collect::<Vec<_>>(), vec!["id", "class"]);
}

#[test]
fn test_dump_outline() {
    let root = arborize(
        vec![
            Token::start("p", Attributes::new()),
            Token::text("a b"),
            Token::end("p"),
        ],
        "div",
    );
    assert_eq!(Node::Element(root).dump(), "<div>\n  <p>\n    \"a\u{00B7}b\"\n");
}

/// Build a balanced stream from arbitrary bytes: even bytes open, odd bytes
/// close, multiples of three add text.
fn balanced(ops: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut open = Vec::new();
    for (i, op) in ops.iter().enumerate() {
        if op % 3 == 0 {
            tokens.push(Token::text(format!("t{i}")));
        } else if op % 2 == 0 {
            let name = ["b", "i", "p"][usize::from(*op) % 3].to_string();
            tokens.push(Token::start(name.clone(), Attributes::new()));
            open.push(name);
        } else if let Some(name) = open.pop() {
            tokens.push(Token::end(name));
        } else {
            tokens.push(Token::empty("br", Attributes::new()));
        }
    }
    while let Some(name) = open.pop() {
        tokens.push(Token::end(name));
    }
    tokens
}

#[quickcheck]
fn prop_flatten_inverts_arborize(ops: Vec<u8>) -> bool {
    let tokens = balanced(&ops);
    names(&flatten(arborize(tokens.clone(), "div"))) == names(&tokens)
}
