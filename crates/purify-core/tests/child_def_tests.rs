//! Integration tests for content models

use purify_common::{CollectedErrors, NullCollector};
use purify_core::child_def::{
    ChildContext, ChildDef, ChildResult, CustomModel, ElementSet, PCDATA, StrictBlockquote,
};
use purify_dom::Node;

fn set(names: &[&str]) -> ElementSet {
    names.iter().map(ToString::to_string).collect()
}

fn el(name: &str, children: Vec<Node>) -> Node {
    Node::element(name, children)
}

fn text(data: &str) -> Node {
    Node::text(data)
}

fn validate(def: &ChildDef, children: Vec<Node>) -> ChildResult {
    let mut errors = NullCollector;
    let mut cx = ChildContext {
        is_inline: false,
        errors: &mut errors,
    };
    def.validate_children(children, &mut cx)
}

// ========== List ==========

#[test]
fn test_list_folds_nested_list_into_preceding_item() {
    let list = ChildDef::List { li_allowed: true };
    let children = vec![
        text("\n  "),
        el("li", vec![text("1")]),
        el("ul", vec![el("li", vec![text("1.1")])]),
        el("li", vec![text("2")]),
    ];
    let expected = vec![
        text("\n  "),
        el(
            "li",
            vec![text("1"), el("ul", vec![el("li", vec![text("1.1")])])],
        ),
        el("li", vec![text("2")]),
    ];
    assert_eq!(validate(&list, children), ChildResult::Replace(expected));
}

#[test]
fn test_list_of_bare_text_is_dropped() {
    let list = ChildDef::List { li_allowed: true };
    assert_eq!(validate(&list, vec![text("hello")]), ChildResult::Drop);
}

#[test]
fn test_list_text_after_item_joins_that_item() {
    let list = ChildDef::List { li_allowed: true };
    let children = vec![el("li", vec![text("foo")]), text("bar")];
    let expected = vec![el("li", vec![text("foo"), text("bar")])];
    assert_eq!(validate(&list, children), ChildResult::Replace(expected));

    let children = vec![text("lost"), el("li", vec![text("a")])];
    let expected = vec![el("li", vec![text("a")])];
    assert_eq!(validate(&list, children), ChildResult::Replace(expected));
}

#[test]
fn test_list_of_whitespace_is_dropped() {
    let list = ChildDef::List { li_allowed: true };
    assert_eq!(validate(&list, vec![text("  ")]), ChildResult::Drop);
    assert_eq!(validate(&list, Vec::new()), ChildResult::Drop);
}

#[test]
fn test_list_keeps_well_formed_items() {
    let list = ChildDef::List { li_allowed: true };
    let children = vec![el("li", vec![text("a")]), el("li", vec![text("b")])];
    assert_eq!(
        validate(&list, children.clone()),
        ChildResult::Keep(children)
    );
}

#[test]
fn test_list_folds_foreign_elements_into_synthetic_item() {
    // Anything that is not an li is folded as-is, even content that has no
    // business in a list item; this pins the current behavior.
    let list = ChildDef::List { li_allowed: true };
    let children = vec![el("b", vec![text("x")]), el("li", vec![text("y")])];
    let expected = vec![
        el("li", vec![el("b", vec![text("x")])]),
        el("li", vec![text("y")]),
    ];
    assert_eq!(validate(&list, children), ChildResult::Replace(expected));

    let children = vec![el("li", vec![text("a")]), el("table", Vec::new())];
    let expected = vec![el("li", vec![text("a"), el("table", Vec::new())])];
    assert_eq!(validate(&list, children), ChildResult::Replace(expected));
}

#[test]
fn test_list_without_li_reports_and_drops() {
    let list = ChildDef::List { li_allowed: false };
    let mut errors = CollectedErrors::new();
    let mut cx = ChildContext {
        is_inline: false,
        errors: &mut errors,
    };
    let result = list.validate_children(vec![el("li", vec![text("a")])], &mut cx);
    assert_eq!(result, ChildResult::Drop);
    assert!(errors.contains_key("ChildDef_List: li not allowed"));
}

// ========== Required / Optional / Empty ==========

#[test]
fn test_required_spills_disallowed_wrapper() {
    let required = ChildDef::Required(set(&["td", "th"]));
    let children = vec![el("span", vec![el("td", vec![text("1")])])];
    assert_eq!(
        validate(&required, children),
        ChildResult::Replace(vec![el("td", vec![text("1")])])
    );
}

#[test]
fn test_required_with_nothing_left_drops() {
    let required = ChildDef::Required(set(&["tr"]));
    assert_eq!(validate(&required, vec![text("stray")]), ChildResult::Drop);
    assert_eq!(validate(&required, Vec::new()), ChildResult::Drop);
}

#[test]
fn test_optional_accepts_nothing_and_whitespace() {
    let optional = ChildDef::Optional(set(&[PCDATA, "b"]));
    assert_eq!(validate(&optional, Vec::new()), ChildResult::Keep(Vec::new()));
    assert_eq!(
        validate(&optional, vec![text(" ")]),
        ChildResult::Keep(vec![text(" ")])
    );
}

#[test]
fn test_optional_drops_text_when_pcdata_missing() {
    let optional = ChildDef::Optional(set(&["li"]));
    let children = vec![text("x"), el("li", Vec::new())];
    assert_eq!(
        validate(&optional, children),
        ChildResult::Replace(vec![el("li", Vec::new())])
    );
}

#[test]
fn test_empty_model_clears_children() {
    assert_eq!(
        validate(&ChildDef::Empty, vec![text("x")]),
        ChildResult::Replace(Vec::new())
    );
    assert_eq!(
        validate(&ChildDef::Empty, Vec::new()),
        ChildResult::Keep(Vec::new())
    );
}

// ========== Chameleon ==========

#[test]
fn test_chameleon_follows_context() {
    let chameleon = ChildDef::Chameleon {
        inline: set(&[PCDATA, "b"]),
        block: set(&[PCDATA, "b", "p"]),
    };
    let children = vec![el("p", vec![text("x")])];

    let mut errors = NullCollector;
    let mut inline_cx = ChildContext {
        is_inline: true,
        errors: &mut errors,
    };
    assert_eq!(
        chameleon.validate_children(children.clone(), &mut inline_cx),
        ChildResult::Replace(vec![text("x")])
    );
    assert_eq!(
        validate(&chameleon, children.clone()),
        ChildResult::Keep(children)
    );
}

// ========== Custom ==========

#[test]
fn test_custom_model_keeps_or_drops_whole() {
    let custom = ChildDef::Custom(CustomModel::compile("caption?, tr+").unwrap());
    let good = vec![
        el("caption", Vec::new()),
        text(" "),
        el("tr", Vec::new()),
        el("tr", Vec::new()),
    ];
    assert_eq!(validate(&custom, good.clone()), ChildResult::Keep(good));
    assert_eq!(
        validate(&custom, vec![el("tr", Vec::new()), el("caption", Vec::new())]),
        ChildResult::Drop
    );
    assert_eq!(validate(&custom, vec![text("x")]), ChildResult::Drop);
}

#[test]
fn test_custom_model_reports_its_elements() {
    let model = CustomModel::compile("(col*|colgroup*), tr+").unwrap();
    let def = ChildDef::Custom(model);
    assert!(def.allows("col"));
    assert!(def.allows("colgroup"));
    assert!(!def.allows("td"));
}

#[test]
fn test_custom_model_rejects_broken_expression() {
    assert!(CustomModel::compile("(row").is_err());
}

// ========== StrictBlockquote ==========

#[test]
fn test_strict_blockquote_wraps_inline_runs() {
    let model = ChildDef::StrictBlockquote(StrictBlockquote::new(
        set(&["p", "h1"]),
        set(&["p", "h1", "b", PCDATA]),
        "p",
    ));
    let children = vec![
        text("hi "),
        el("b", vec![text("x")]),
        el("p", vec![text("y")]),
        text("z"),
    ];
    let expected = vec![
        el("p", vec![text("hi "), el("b", vec![text("x")])]),
        el("p", vec![text("y")]),
        el("p", vec![text("z")]),
    ];
    assert_eq!(validate(&model, children), ChildResult::Replace(expected));
}

#[test]
fn test_strict_blockquote_accepts_inline_while_balancing() {
    let model = ChildDef::StrictBlockquote(StrictBlockquote::new(
        set(&["p"]),
        set(&["p", "b"]),
        "p",
    ));
    assert!(model.allows("b"));
    assert!(model.allows(PCDATA));
}

#[test]
fn test_strict_blockquote_leaves_blocks_alone() {
    let model = ChildDef::StrictBlockquote(StrictBlockquote::new(
        set(&["p"]),
        set(&["p", "b"]),
        "p",
    ));
    let children = vec![el("p", vec![text("a")]), text(" ")];
    assert_eq!(
        validate(&model, children.clone()),
        ChildResult::Keep(children)
    );
}
