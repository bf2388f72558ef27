//! Integration tests for the purifier end to end

use purify_common::warning::was_warned;
use purify_common::{Config, NullCollector, PurifyError, Severity};
use purify_core::{DefinitionCaches, Purifier};
use purify_dom::TokenKind;
use purify_html::{DirectLex, LexContext, Lexer};
use quickcheck_macros::quickcheck;

fn config_with(pairs: &[(&str, serde_json::Value)]) -> Config {
    let mut config = Config::new();
    for (key, value) in pairs {
        config.set(key, value.clone()).unwrap();
    }
    config
}

fn purify(html: &str) -> String {
    purify_using(&Config::default(), html)
}

fn purify_using(config: &Config, html: &str) -> String {
    Purifier::new(config.clone())
        .unwrap()
        .purify(html)
        .unwrap()
        .html
}

// ========== Documents ==========

#[test]
fn test_clean_markup_is_unchanged() {
    assert_eq!(purify("<p>Hello <b>world</b></p>"), "<p>Hello <b>world</b></p>");
    assert_eq!(purify("plain text"), "plain text");
    assert_eq!(purify(""), "");
}

#[test]
fn test_script_is_removed() {
    assert_eq!(purify("<p>a</p><script>alert(1)</script>"), "<p>a</p>");
}

#[test]
fn test_event_handlers_are_removed() {
    assert_eq!(purify("<b onclick=\"steal()\">x</b>"), "<b>x</b>");
}

#[test]
fn test_dangerous_href_is_removed() {
    assert_eq!(purify("<a href=\"javascript:alert(1)\">x</a>"), "<a>x</a>");
    assert_eq!(
        purify("<a href=\"http://example.com/\">x</a>"),
        "<a href=\"http://example.com/\">x</a>"
    );
}

#[test]
fn test_unclosed_tags_are_closed() {
    assert_eq!(purify("<b>bold"), "<b>bold</b>");
}

#[test]
fn test_list_text_is_dropped() {
    assert_eq!(purify("<ul>hello</ul>"), "");
    assert_eq!(purify("<ul><li>foo</li>bar</ul>"), "<ul><li>foobar</li></ul>");
}

#[test]
fn test_nested_list_is_folded() {
    assert_eq!(
        purify("<ul><li>1</li><ol><li>1.1</li></ol></ul>"),
        "<ul><li>1<ol><li>1.1</li></ol></li></ul>"
    );
}

#[test]
fn test_table_is_kept() {
    let table = "<table><tr><td>1</td><td>2</td></tr></table>";
    assert_eq!(purify(table), table);
}

#[test]
fn test_image_gets_alt_text() {
    assert_eq!(
        purify("<img src=\"cat.png\">"),
        "<img src=\"cat.png\" alt=\"cat.png\" />"
    );

    let config = config_with(&[("Attr.DefaultImageAlt", "picture".into())]);
    assert_eq!(
        purify_using(&config, "<img src=\"cat.png\">"),
        "<img src=\"cat.png\" alt=\"picture\" />"
    );
}

#[test]
fn test_image_without_src_uses_placeholder() {
    assert_eq!(purify("<img alt=\"x\">"), "");

    let config = config_with(&[("Attr.DefaultInvalidImage", "/broken.png".into())]);
    assert_eq!(
        purify_using(&config, "<img alt=\"x\">"),
        "<img alt=\"x\" src=\"/broken.png\" />"
    );
    assert_eq!(
        purify_using(&config, "<img>"),
        "<img src=\"/broken.png\" alt=\"Invalid image\" />"
    );
}

#[test]
fn test_font_becomes_styled_span() {
    assert_eq!(
        purify("<font color=\"red\">x</font>"),
        "<span style=\"color:#FF0000;\">x</span>"
    );
}

#[test]
fn test_ids_disabled_by_default() {
    assert_eq!(purify("<p id=\"a\">x</p>"), "<p>x</p>");
}

#[test]
fn test_duplicate_ids_are_removed() {
    let config = config_with(&[("Attr.EnableID", true.into())]);
    assert_eq!(
        purify_using(&config, "<p id=\"a\">1</p><p id=\"a\">2</p>"),
        "<p id=\"a\">1</p><p>2</p>"
    );
}

#[test]
fn test_ids_reset_between_documents() {
    let config = config_with(&[("Attr.EnableID", true.into())]);
    let purifier = Purifier::new(config).unwrap();
    let results = purifier
        .purify_array(&["<p id=\"a\">1</p>", "<p id=\"a\">2</p>"])
        .unwrap();
    let html: Vec<&str> = results.iter().map(|r| r.html.as_str()).collect();
    assert_eq!(html, ["<p id=\"a\">1</p>", "<p id=\"a\">2</p>"]);
}

// ========== Configuration ==========

#[test]
fn test_allowed_list_limits_output() {
    let config = config_with(&[("HTML.Allowed", "p,b".into())]);
    assert_eq!(
        purify_using(&config, "<p><i>a</i><b>b</b></p>"),
        "<p>a<b>b</b></p>"
    );
}

#[test]
fn test_inline_parent_unwraps_blocks() {
    let config = config_with(&[("HTML.Parent", "span".into())]);
    assert_eq!(purify_using(&config, "<div>x</div><b>y</b>"), "x<b>y</b>");
}

#[test]
fn test_unknown_lexer_is_rejected() {
    let config = config_with(&[("Core.LexerImpl", "bogus".into())]);
    let err = Purifier::new(config).unwrap_err();
    assert!(matches!(err, PurifyError::UnknownLexer(ref name) if name == "bogus"));
}

#[test]
fn test_native_lexer_agrees_on_simple_markup() {
    let config = config_with(&[("Core.LexerImpl", "native".into())]);
    for html in [
        "<p>Hello <b>world</b></p>",
        "<a href=\"http://example.com/\" onclick=\"x()\">x</a>",
        "<ul><li>a</li><li>b</li></ul>",
    ] {
        assert_eq!(purify_using(&config, html), purify(html), "{html}");
    }
}

#[test]
fn test_purifier_freezes_config() {
    let purifier = Purifier::new(Config::default()).unwrap();
    let mut config = purifier.config().clone();
    assert!(matches!(
        config.set("HTML.Allowed", "p"),
        Err(PurifyError::ConfigFinalized(_))
    ));
}

#[test]
fn test_default_config_builds_without_warnings() {
    let _purifier = Purifier::new(Config::default()).unwrap();
    for namespace in ["HTML", "Attr", "CSS", "URI"] {
        let message = format!("read of undeclared directive '{namespace}.DefinitionRev'");
        assert!(!was_warned("Config", &message), "{message}");
    }
}

#[test]
fn test_purifier_is_shareable_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Purifier>();

    let purifier = &Purifier::new(Config::default()).unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = ["<b>a", "<i>b"]
            .into_iter()
            .map(|html| scope.spawn(move || purifier.purify(html).unwrap().html))
            .collect();
        let html: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(html, ["<b>a</b>", "<i>b</i>"]);
    });
}

#[test]
fn test_cached_definition_is_shared() {
    let caches = DefinitionCaches::memory();
    let first = Purifier::with_caches(Config::default(), &caches).unwrap();
    let second = Purifier::with_caches(Config::default(), &caches).unwrap();
    assert!(std::ptr::eq(first.definition(), second.definition()));
}

// ========== Diagnostics ==========

#[test]
fn test_collected_errors() {
    let config = config_with(&[("Core.CollectErrors", true.into())]);
    let purifier = Purifier::new(config).unwrap();
    let result = purifier.purify("<blink>x</blink>\n<b>y").unwrap();
    assert_eq!(result.html, "x\n<b>y</b>");

    let errors = result.errors.expect("errors are collected");
    assert!(errors.contains_key("Strategy_RemoveForeignElements: Foreign element removed"));
    assert!(errors.contains_key("Strategy_MakeWellFormed: Tag closed by document end"));
    let foreign = errors.by_severity(Severity::Error).next().unwrap();
    assert_eq!(foreign.line, Some(1));
}

#[test]
fn test_errors_not_collected_by_default() {
    let result = Purifier::new(Config::default())
        .unwrap()
        .purify("<blink>x</blink>")
        .unwrap();
    assert!(result.errors.is_none());
}

#[test]
fn test_purify_with_custom_collector() {
    let purifier = Purifier::new(Config::default()).unwrap();
    let html = purifier.purify_with("<i>x", &mut NullCollector).unwrap();
    assert_eq!(html, "<i>x</i>");
}

// ========== Properties ==========

const SNIPPETS: [&str; 12] = [
    "<b>", "</b>", "<i>", "</i>", "<p>", "</p>", "<div>", "</div>", "text", " ", "&amp;", "<br>",
];

const HOSTILE: [&str; 16] = [
    "<b>",
    "</b>",
    "<p>",
    "<ul>",
    "<li>",
    "<table>",
    "<td>",
    "<a href=\"http://x.com/\" onclick=\"y()\">",
    "</a>",
    "<img src=\"javascript:x\">",
    "<script>",
    "<i style=\"color:red\">",
    "<font color=\"blue\">",
    "<blink>",
    "text",
    "<span title=\"t\">",
];

fn assemble(picks: &[u8], alphabet: &[&str]) -> String {
    picks
        .iter()
        .map(|pick| alphabet[usize::from(*pick) % alphabet.len()])
        .collect()
}

#[quickcheck]
fn prop_purifying_twice_changes_nothing(picks: Vec<u8>) -> bool {
    let purifier = Purifier::new(Config::default()).unwrap();
    let once = purifier.purify(&assemble(&picks, &SNIPPETS)).unwrap().html;
    let twice = purifier.purify(&once).unwrap().html;
    once == twice
}

#[quickcheck]
fn prop_output_respects_allow_list(picks: Vec<u8>) -> bool {
    let config = config_with(&[("HTML.Allowed", "p,b,a[href]".into())]);
    let purifier = Purifier::new(config).unwrap();
    let html = purifier.purify(&assemble(&picks, &HOSTILE)).unwrap().html;
    let tokens = DirectLex::new()
        .tokenize(&html, &LexContext::default(), &mut NullCollector)
        .unwrap();
    tokens.iter().all(|token| match &token.kind {
        TokenKind::Start { name, attrs } | TokenKind::Empty { name, attrs } => {
            ["p", "b", "a"].contains(&name.as_str())
                && attrs.names().all(|attr| name == "a" && attr == "href")
        }
        TokenKind::End { name } => ["p", "b", "a"].contains(&name.as_str()),
        TokenKind::Text { .. } => true,
        TokenKind::Comment { .. } => false,
    })
}

#[quickcheck]
fn prop_output_is_balanced(picks: Vec<u8>) -> bool {
    let purifier = Purifier::new(Config::default()).unwrap();
    let html = purifier.purify(&assemble(&picks, &HOSTILE)).unwrap().html;
    let tokens = DirectLex::new()
        .tokenize(&html, &LexContext::default(), &mut NullCollector)
        .unwrap();
    let mut open = Vec::new();
    for token in &tokens {
        match &token.kind {
            TokenKind::Start { name, .. } => open.push(name.clone()),
            TokenKind::End { name } if open.pop().as_ref() != Some(name) => return false,
            _ => {}
        }
    }
    open.is_empty()
}

#[quickcheck]
fn prop_arbitrary_input_never_fails(input: String) -> bool {
    Purifier::new(Config::default())
        .unwrap()
        .purify(&input)
        .is_ok()
}
