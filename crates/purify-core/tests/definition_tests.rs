//! Integration tests for the HTML definition

use std::sync::Arc;

use purify_common::{Config, PurifyError};
use purify_core::child_def::{ChildDef, ContentModelType, PCDATA};
use purify_core::definition::{DefinitionCaches, ElementFragment, HtmlDefinition, HtmlModule};
use purify_css::{AttrDef, CssDefinition};

fn config_with(pairs: &[(&str, serde_json::Value)]) -> Config {
    let mut config = Config::new();
    for (key, value) in pairs {
        config.set(key, value.clone()).unwrap();
    }
    config
}

fn build(config: &Config) -> HtmlDefinition {
    HtmlDefinition::build(config).expect("standard schema builds")
}

fn build_extra(config: &Config, module: HtmlModule) -> Result<HtmlDefinition, PurifyError> {
    HtmlDefinition::build_with(
        config,
        Arc::new(CssDefinition::from_config(config)),
        vec![module],
    )
}

// ========== Standard schema ==========

#[test]
fn test_default_schema_contents() {
    let def = build(&Config::default());
    for name in ["p", "a", "b", "ul", "li", "table", "td", "img", "br", "span", "center"] {
        assert!(def.is_allowed(name), "expected {name}");
    }
    for name in ["script", "style", "iframe", "form", "html", "body"] {
        assert!(!def.is_allowed(name), "unexpected {name}");
    }
    assert_eq!(def.root_name(), "div");
    assert_eq!(def.block_wrapper(), "p");
}

#[test]
fn test_content_sets_are_expanded() {
    let def = build(&Config::default());
    let flow = def.content_set("Flow").unwrap();
    for name in ["p", "h1", "ul", "b", "table", "div"] {
        assert!(flow.contains(name), "Flow lacks {name}");
    }
    let inline = def.content_set("Inline").unwrap();
    assert!(inline.contains("b"));
    assert!(!inline.contains("p"));
}

#[test]
fn test_element_models() {
    let def = build(&Config::default());
    let model = |name: &str| def.element(name).unwrap().child.model_type();
    assert_eq!(model("br"), ContentModelType::Empty);
    assert_eq!(model("p"), ContentModelType::Optional);
    assert_eq!(model("tr"), ContentModelType::Required);
    assert_eq!(model("table"), ContentModelType::Custom);
    assert_eq!(model("del"), ContentModelType::Chameleon);
    assert_eq!(model("ul"), ContentModelType::List);

    let p = def.element("p").unwrap();
    assert!(p.child.allows(PCDATA));
    assert!(p.child.allows("b"));
    assert!(!p.child.allows("div"));
    assert!(p.descendants_are_inline);
    assert!(!def.element("div").unwrap().descendants_are_inline);
}

#[test]
fn test_element_flags() {
    let def = build(&Config::default());
    assert!(def.element("b").unwrap().formatting);
    assert!(!def.element("div").unwrap().formatting);
    assert!(def.element("a").unwrap().excludes.contains("a"));
    assert!(def.element("img").unwrap().required_attrs.contains("src"));
}

#[test]
fn test_common_attributes_are_merged() {
    let def = build(&Config::default());
    let a = def.element("a").unwrap();
    for attr in ["href", "title", "class", "id", "style", "lang", "dir", "target"] {
        assert!(a.attrs.contains_key(attr), "a lacks {attr}");
    }
    assert!(!a.attrs.contains_key("onclick"));
}

#[test]
fn test_tidy_transforms_follow_config() {
    let tidy = build(&Config::default());
    assert!(tidy.tag_transform("font").is_some());
    assert!(tidy.tag_transform("center").is_some());

    let plain = build(&config_with(&[("HTML.TidyTransforms", false.into())]));
    assert!(plain.tag_transform("font").is_none());
    assert!(plain.is_allowed("font"));
}

#[test]
fn test_strict_drops_legacy_elements() {
    let loose = build(&Config::default());
    assert_eq!(
        loose.element("blockquote").unwrap().child.model_type(),
        ContentModelType::Optional
    );

    let strict = build(&config_with(&[("HTML.Strict", true.into())]));
    assert!(!strict.is_allowed("center"));
    assert!(!strict.is_allowed("font"));
    assert!(!strict.is_allowed("u"));
    assert_eq!(
        strict.element("blockquote").unwrap().child.model_type(),
        ContentModelType::StrictBlockquote
    );
}

// ========== Policy ==========

#[test]
fn test_allowed_list_narrows_elements_and_attributes() {
    let def = build(&config_with(&[("HTML.Allowed", "p,b,a[href]".into())]));
    let names: Vec<&str> = def.element_names().collect();
    assert_eq!(names, ["a", "b", "p"]);

    let a = def.element("a").unwrap();
    assert_eq!(a.attrs.keys().collect::<Vec<_>>(), ["href"]);
    assert!(def.element("p").unwrap().attrs.is_empty());

    // Content models only mention what is left.
    let p = def.element("p").unwrap();
    assert!(p.child.allows("b"));
    assert!(!p.child.allows("i"));
}

#[test]
fn test_global_attributes_in_allowed_list() {
    let def = build(&config_with(&[("HTML.Allowed", "p,b,*[class]".into())]));
    assert!(def.element("p").unwrap().attrs.contains_key("class"));
    assert!(def.element("b").unwrap().attrs.contains_key("class"));
    assert!(!def.element("b").unwrap().attrs.contains_key("title"));
}

#[test]
fn test_forbidden_elements_and_attributes() {
    let def = build(&config_with(&[
        ("HTML.ForbiddenElements", vec!["b", "I"].into()),
        ("HTML.ForbiddenAttributes", vec!["a@title", "*@style"].into()),
    ]));
    assert!(!def.is_allowed("b"));
    assert!(!def.is_allowed("i"));
    let a = def.element("a").unwrap();
    assert!(!a.attrs.contains_key("title"));
    assert!(!a.attrs.contains_key("style"));
    assert!(def.element("p").unwrap().attrs.contains_key("title"));
}

#[test]
fn test_forbidding_required_attribute_removes_element() {
    let def = build(&config_with(&[(
        "HTML.ForbiddenAttributes",
        vec!["img@src"].into(),
    )]));
    assert!(!def.is_allowed("img"));
}

#[test]
fn test_list_without_li() {
    let def = build(&config_with(&[("HTML.Allowed", "ul,p".into())]));
    assert!(matches!(
        def.element("ul").unwrap().child,
        ChildDef::List { li_allowed: false }
    ));
}

#[test]
fn test_block_wrapper_and_parent_fall_back() {
    let def = build(&config_with(&[
        ("HTML.BlockWrapper", "span".into()),
        ("HTML.Parent", "blink".into()),
    ]));
    assert_eq!(def.block_wrapper(), "p");
    assert_eq!(def.root_name(), "div");

    let def = build(&config_with(&[
        ("HTML.BlockWrapper", "div".into()),
        ("HTML.Parent", "span".into()),
    ]));
    assert_eq!(def.block_wrapper(), "div");
    assert_eq!(def.root_name(), "span");
    assert!(def.root().descendants_are_inline);
}

// ========== Extra modules ==========

#[test]
fn test_extra_module_adds_element() {
    let module = HtmlModule::new("Marquee")
        .content_set("Block", "marquee")
        .element(ElementFragment::new("marquee", "Inline").common());
    let def = build_extra(&Config::default(), module).unwrap();
    assert!(def.is_allowed("marquee"));
    assert!(def.element("div").unwrap().child.allows("marquee"));
}

#[test]
fn test_blank_fragment_merges_attributes() {
    let module = HtmlModule::new("Extra")
        .element(ElementFragment::blank("p").attr("data-note", AttrDef::Text));
    let def = build_extra(&Config::default(), module).unwrap();
    let p = def.element("p").unwrap();
    assert!(p.attrs.contains_key("data-note"));
    assert!(p.attrs.contains_key("class"));
    assert_eq!(p.child.model_type(), ContentModelType::Optional);
}

#[test]
fn test_unknown_content_model_is_fatal() {
    let module = HtmlModule::new("Broken")
        .element(ElementFragment::new("blink", "Sparkly: #PCDATA").in_set("Inline"));
    let err = build_extra(&Config::default(), module).unwrap_err();
    assert!(matches!(
        err,
        PurifyError::UnknownContentModel { ref element, ref kind }
            if element == "blink" && kind == "sparkly"
    ));
}

#[test]
fn test_malformed_custom_model_is_fatal() {
    let module = HtmlModule::new("Broken")
        .element(ElementFragment::new("grid", "Custom: (row").in_set("Block"));
    let err = build_extra(&Config::default(), module).unwrap_err();
    assert!(matches!(err, PurifyError::ContentModelSyntax { ref element, .. } if element == "grid"));
}

// ========== Caching ==========

#[test]
fn test_fetch_reuses_cached_definition() {
    let caches = DefinitionCaches::memory();
    let config = Config::default();
    let first = HtmlDefinition::fetch(&config, &caches).unwrap();
    let second = HtmlDefinition::fetch(&config, &caches).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(caches.html.len(), 1);

    let other = config_with(&[("HTML.Allowed", "p".into())]);
    let third = HtmlDefinition::fetch(&other, &caches).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(caches.html.len(), 2);
}

#[test]
fn test_definition_rev_changes_fingerprint() {
    let base = Config::default();
    let bumped = config_with(&[("HTML.DefinitionRev", 2.into())]);
    assert_ne!(
        HtmlDefinition::fingerprint_of(&base),
        HtmlDefinition::fingerprint_of(&bumped)
    );
}

#[test]
fn test_no_op_cache_always_builds() {
    let caches = DefinitionCaches::none();
    let config = Config::default();
    let first = HtmlDefinition::fetch(&config, &caches).unwrap();
    let second = HtmlDefinition::fetch(&config, &caches).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn test_cache_mismatch_is_fatal() {
    let caches = DefinitionCaches::memory();
    let wanted = Config::default();
    let stale = Arc::new(build(&config_with(&[("HTML.Allowed", "p".into())])));
    let _ = caches.html.set(&HtmlDefinition::fingerprint_of(&wanted), stale);
    let err = HtmlDefinition::fetch(&wanted, &caches).unwrap_err();
    assert!(matches!(err, PurifyError::CacheMismatch { kind: "HTML" }));
}
