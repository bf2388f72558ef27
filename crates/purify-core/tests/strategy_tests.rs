//! Integration tests for the strategy passes

use purify_common::{CollectedErrors, Config};
use purify_core::PurifyContext;
use purify_core::definition::{ElementFragment, HtmlDefinition, HtmlModule};
use purify_core::strategy::{
    self, StrategySettings, fix_nesting, make_well_formed, validate_attributes,
};
use purify_css::CssDefinition;
use purify_dom::{Armor, Attributes, Element, Node, Token, arborize, flatten};
use purify_html::{DirectLex, Generator, LexContext, Lexer};

fn config_with(pairs: &[(&str, serde_json::Value)]) -> Config {
    let mut config = Config::new();
    for (key, value) in pairs {
        config.set(key, value.clone()).unwrap();
    }
    config
}

fn run_all(html: &str, config: &Config) -> (String, CollectedErrors) {
    let definition = HtmlDefinition::build(config).unwrap();
    run_with(html, config, &definition)
}

fn run_with(html: &str, config: &Config, definition: &HtmlDefinition) -> (String, CollectedErrors) {
    let mut errors = CollectedErrors::new();
    let tokens = DirectLex::new()
        .tokenize(html, &LexContext::from_config(config), &mut errors)
        .unwrap();
    let generator = Generator::new();
    let settings = StrategySettings::from_config(config);
    let mut cx = PurifyContext::new(&mut errors);
    let tokens = strategy::run(tokens, definition, &settings, &generator, &mut cx);
    (generator.render_all(&tokens), errors)
}

fn balance(tokens: Vec<Token>) -> String {
    let definition = HtmlDefinition::build(&Config::default()).unwrap();
    let mut errors = CollectedErrors::new();
    let mut cx = PurifyContext::new(&mut errors);
    let tokens = make_well_formed(tokens, &definition, &mut cx);
    Generator::new().render_all(&tokens)
}

fn el(name: &str, children: Vec<Node>) -> Node {
    Node::element(name, children)
}

fn with_attrs(name: &str, attrs: &[(&str, &str)], children: Vec<Node>) -> Node {
    let mut element = Element::with_children(name, children);
    element.attrs = attrs.iter().copied().collect();
    Node::Element(element)
}

fn root(children: Vec<Node>) -> Element {
    Element::with_children("div", children)
}

// ========== MakeWellFormed ==========

#[test]
fn test_block_inside_paragraph_closes_it() {
    let (html, errors) = run_all("<p>a<div>b</div></p>", &Config::default());
    assert_eq!(html, "<p>a</p><div>b</div>");
    assert!(errors.contains_key("Strategy_MakeWellFormed: Tag auto closed"));
    assert!(errors.contains_key("Strategy_MakeWellFormed: Unnecessary end tag removed"));
}

#[test]
fn test_paragraph_autocloses_paragraph() {
    let (html, _) = run_all("<p>one<p>two", &Config::default());
    assert_eq!(html, "<p>one</p><p>two</p>");
}

#[test]
fn test_formatting_element_is_carried_over() {
    let (html, _) = run_all("<b>x<div>y</div>z</b>", &Config::default());
    assert_eq!(html, "<b>x</b><div><b>y</b></div><b>z</b>");
}

#[test]
fn test_formatting_element_reopened_after_element_end() {
    let (html, errors) = run_all("<div><b>x</div>y</b>", &Config::default());
    assert_eq!(html, "<div><b>x</b></div><b>y</b>");
    assert!(errors.contains_key("Strategy_MakeWellFormed: Tag closed by element end"));
}

#[test]
fn test_empty_carryover_is_elided() {
    let (html, _) = run_all("<b>x<div></div></b>", &Config::default());
    assert_eq!(html, "<b>x</b><div></div>");
}

#[test]
fn test_stray_end_tag_is_removed() {
    let (html, errors) = run_all("a</i>b", &Config::default());
    assert_eq!(html, "ab");
    assert!(errors.contains_key("Strategy_MakeWellFormed: Unnecessary end tag removed"));
}

#[test]
fn test_unclosed_tag_closed_at_document_end() {
    let (html, errors) = run_all("<i>x", &Config::default());
    assert_eq!(html, "<i>x</i>");
    assert!(errors.contains_key("Strategy_MakeWellFormed: Tag closed by document end"));
}

#[test]
fn test_element_with_no_home_is_removed() {
    let (html, errors) = run_all("<b><li>x</li></b>", &Config::default());
    assert_eq!(html, "<b>x</b>");
    assert!(errors.contains_key("Strategy_MakeWellFormed: Tag removed"));
}

#[test]
fn test_start_tag_of_empty_element_becomes_empty() {
    let tokens = vec![Token::start("br", Attributes::new()), Token::text("x")];
    assert_eq!(balance(tokens), "<br />x");
}

#[test]
fn test_empty_tag_of_container_is_expanded() {
    let tokens = vec![Token::empty("b", Attributes::new())];
    assert_eq!(balance(tokens), "<b></b>");
}

#[test]
fn test_nested_list_folds_into_previous_item() {
    let (html, _) = run_all("<ul><li>a</li><ul><li>b</li></ul></ul>", &Config::default());
    assert_eq!(html, "<ul><li>a<ul><li>b</li></ul></li></ul>");
}

#[test]
fn test_declared_wrapper_is_inserted() {
    let config = Config::default();
    let module = HtmlModule::new("Grid")
        .content_set("Block", "row")
        .element(ElementFragment::new("row", "Required: cell"))
        .element(ElementFragment::new("cell", "Flow").wrap("row"));
    let definition = HtmlDefinition::build_with(
        &config,
        std::sync::Arc::new(CssDefinition::from_config(&config)),
        vec![module],
    )
    .unwrap();
    let (html, _) = run_with("<div><cell>x</cell></div>", &config, &definition);
    assert_eq!(html, "<div><row><cell>x</cell></row></div>");
}

// ========== RemoveForeignElements ==========

#[test]
fn test_hidden_element_removed_with_contents() {
    let (html, errors) = run_all("a<script>alert(<b>1</b>)</script>b", &Config::default());
    assert_eq!(html, "ab");
    assert!(errors.contains_key("Strategy_RemoveForeignElements: Foreign meta element removed"));
}

#[test]
fn test_unknown_element_is_unwrapped() {
    let (html, errors) = run_all("<blink>hi</blink>", &Config::default());
    assert_eq!(html, "hi");
    assert!(errors.contains_key("Strategy_RemoveForeignElements: Foreign element removed"));
}

#[test]
fn test_unknown_tags_escaped_when_asked() {
    let config = config_with(&[("Core.EscapeInvalidTags", true.into())]);
    let (html, _) = run_all("<blink>hi</blink>", &config);
    assert_eq!(html, "&lt;blink&gt;hi&lt;/blink&gt;");
}

#[test]
fn test_comments_survive_only_when_allowed() {
    let (html, errors) = run_all("a<!-- secret -->b", &Config::default());
    assert_eq!(html, "ab");
    assert!(errors.contains_key("Strategy_RemoveForeignElements: Comment removed"));

    let config = config_with(&[("HTML.AllowedComments", vec!["pagebreak"].into())]);
    let (html, _) = run_all("a<!-- pagebreak -->b<!-- other -->", &config);
    assert_eq!(html, "a<!-- pagebreak -->b");
}

#[test]
fn test_deprecated_elements_are_transformed() {
    let (html, _) = run_all("<center>x</center>", &Config::default());
    assert_eq!(html, "<div style=\"text-align:center;\">x</div>");

    let (html, _) = run_all("<u>x</u>", &Config::default());
    assert_eq!(html, "<span style=\"text-decoration:underline;\">x</span>");
}

#[test]
fn test_missing_required_attribute_drops_tag() {
    let (html, errors) = run_all("<img alt=\"x\">after", &Config::default());
    assert_eq!(html, "after");
    assert!(errors.contains_key("Strategy_RemoveForeignElements: Missing required attribute"));
}

// ========== FixNesting ==========

#[test]
fn test_fix_nesting_drops_invalid_list() {
    let definition = HtmlDefinition::build(&Config::default()).unwrap();
    let mut tree = root(vec![
        el("p", vec![Node::text("a")]),
        el("ul", vec![Node::text("x")]),
    ]);
    let mut errors = CollectedErrors::new();
    let mut cx = PurifyContext::new(&mut errors);
    fix_nesting(&mut tree, &definition, &mut cx);
    assert_eq!(tree.children, vec![el("p", vec![Node::text("a")])]);
    assert!(errors.contains_key("Strategy_FixNesting: Node removed"));
}

#[test]
fn test_fix_nesting_removes_excluded_descendants() {
    let definition = HtmlDefinition::build(&Config::default()).unwrap();
    let mut tree = root(vec![el(
        "a",
        vec![el("b", vec![el("a", vec![Node::text("inner")])]), Node::text("outer")],
    )]);
    let mut errors = CollectedErrors::new();
    let mut cx = PurifyContext::new(&mut errors);
    fix_nesting(&mut tree, &definition, &mut cx);
    assert_eq!(
        tree.children,
        vec![el("a", vec![el("b", Vec::new()), Node::text("outer")])]
    );
    assert!(errors.contains_key("Strategy_FixNesting: Node excluded"));
}

#[test]
fn test_fix_nesting_passes_inline_context_down() {
    let definition = HtmlDefinition::build(&Config::default()).unwrap();
    let block = vec![el("del", vec![el("div", vec![Node::text("x")])])];

    let mut tree = root(block.clone());
    let mut errors = CollectedErrors::new();
    let mut cx = PurifyContext::new(&mut errors);
    fix_nesting(&mut tree, &definition, &mut cx);
    assert_eq!(tree.children, block);

    let mut tree = root(vec![el("span", block)]);
    fix_nesting(&mut tree, &definition, &mut cx);
    assert_eq!(
        tree.children,
        vec![el("span", vec![el("del", vec![Node::text("x")])])]
    );
}

// ========== ValidateAttributes ==========

#[test]
fn test_validate_attributes_cleans_unarmored_elements() {
    let definition = HtmlDefinition::build(&Config::default()).unwrap();
    let mut tree = root(vec![with_attrs(
        "a",
        &[("href", "javascript:alert(1)"), ("title", "t")],
        vec![Node::text("x")],
    )]);
    let mut errors = CollectedErrors::new();
    let mut cx = PurifyContext::new(&mut errors);
    validate_attributes(&mut tree, &definition, &mut cx);
    assert_eq!(
        tree.children,
        vec![{
            let mut a = Element::with_children("a", vec![Node::text("x")]);
            a.attrs = [("title", "t")].into_iter().collect();
            a.armor.insert(Armor::ValidateAttributes);
            Node::Element(a)
        }]
    );
    assert!(errors.contains_key("AttrValidator: Attribute removed"));
}

#[test]
fn test_validate_attributes_skips_armored_elements() {
    let definition = HtmlDefinition::build(&Config::default()).unwrap();
    let mut b = Element::with_children("b", Vec::new());
    b.attrs = [("onclick", "x()")].into_iter().collect();
    b.armor.insert(Armor::ValidateAttributes);
    let mut tree = root(vec![Node::Element(b.clone())]);
    let mut errors = CollectedErrors::new();
    let mut cx = PurifyContext::new(&mut errors);
    validate_attributes(&mut tree, &definition, &mut cx);
    assert_eq!(tree.children, vec![Node::Element(b)]);
}

#[test]
fn test_validate_attributes_unwraps_when_required_missing() {
    let definition = HtmlDefinition::build(&Config::default()).unwrap();
    let mut tree = root(vec![
        el("img", Vec::new()),
        with_attrs("a", &[], vec![Node::text("kept")]),
    ]);
    let mut errors = CollectedErrors::new();
    let mut cx = PurifyContext::new(&mut errors);
    validate_attributes(&mut tree, &definition, &mut cx);
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].name(), Some("a"));
    assert!(errors.contains_key("Strategy_ValidateAttributes: Element unwrapped"));
}

#[test]
fn test_tree_round_trip_preserves_balanced_stream() {
    let definition = HtmlDefinition::build(&Config::default()).unwrap();
    let (html, _) = run_all("<p>Hello <b>world</b></p>", &Config::default());
    let tokens = DirectLex::new()
        .tokenize(&html, &LexContext::default(), &mut CollectedErrors::new())
        .unwrap();
    let tree = arborize(tokens, definition.root_name());
    let rendered = Generator::new().render_all(&flatten(tree));
    assert_eq!(rendered, html);
}
