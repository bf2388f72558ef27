//! Integration tests for attribute definitions, CSS values and URIs

use std::cmp::Ordering;

use purify_common::Config;
use purify_css::color::{validate_css_color, validate_html_color, DEFAULT_COLOR_KEYWORDS};
use purify_css::{
    AttrContext, AttrDef, AttrSettings, CssDefinition, IdAccumulator, Length, Unit, UnitConverter,
    Uri, UriSettings,
};
use quickcheck_macros::quickcheck;

fn validate_with(config: &Config, def: &AttrDef, element: &str, value: &str) -> Option<String> {
    let settings = AttrSettings::from_config(config);
    let css = CssDefinition::from_config(config);
    let mut ids = IdAccumulator::new();
    let mut cx = AttrContext {
        element,
        settings: &settings,
        css: &css,
        ids: &mut ids,
    };
    def.validate(value, &mut cx)
}

fn validate(def: &AttrDef, value: &str) -> Option<String> {
    validate_with(&Config::new(), def, "span", value)
}

fn style(value: &str) -> Option<String> {
    validate(&AttrDef::Css, value)
}

// ========== Lengths ==========

#[test]
fn test_length_comparison_across_units() {
    let ten_px = Length::parse("10px");
    let one_in = Length::parse("1in");
    assert_eq!(ten_px.compare_to(&one_in), Some(Ordering::Less));
    assert_eq!(
        Length::parse("2in").compare_to(&Length::parse("96px")),
        Some(Ordering::Greater)
    );
}

#[test]
fn test_length_relative_units_do_not_compare() {
    assert_eq!(Length::parse("10em").compare_to(&Length::parse("1in")), None);
    assert_eq!(Length::parse("10vw").compare_to(&Length::parse("5px")), None);
}

#[test]
fn test_length_validity() {
    assert!(Length::parse("0").is_valid());
    assert!(Length::parse("1.5EM").is_valid());
    assert_eq!(Length::parse("1.5EM").unit(), Some(Unit::Em));
    assert!(!Length::parse("10").is_valid());
    assert!(!Length::parse("10furlongs").is_valid());
}

#[test]
fn test_unit_converter_metric_english_bridge() {
    let converter = UnitConverter::default();
    let mm = converter
        .convert(&Length::parse("1in"), Unit::Mm)
        .expect("inches convert to millimeters");
    let value = mm.value().expect("converted length is valid");
    assert!((value - 25.4).abs() < 0.01, "1in was {value}mm");
    assert!(converter.convert(&Length::parse("1em"), Unit::Px).is_none());
}

#[test]
fn test_length_bounds() {
    let def = AttrDef::length_min("0");
    assert_eq!(validate(&def, "12px").as_deref(), Some("12px"));
    assert_eq!(validate(&def, "0").as_deref(), Some("0"));
    assert_eq!(validate(&def, "-3px"), None);
    assert_eq!(validate(&def, "x"), None);
}

// ========== Colors ==========

#[test]
fn test_css_color_keywords_and_hex() {
    let keywords = &*DEFAULT_COLOR_KEYWORDS;
    assert_eq!(validate_css_color("Red", keywords).as_deref(), Some("#FF0000"));
    assert_eq!(validate_css_color("#abc", keywords).as_deref(), Some("#abc"));
    assert_eq!(validate_css_color("abcdef", keywords).as_deref(), Some("#abcdef"));
    assert_eq!(validate_css_color("#abcd", keywords), None);
    assert_eq!(validate_css_color("ggg", keywords), None);
}

#[test]
fn test_css_color_functions() {
    let keywords = &*DEFAULT_COLOR_KEYWORDS;
    assert_eq!(
        validate_css_color("rgb(300, 0, 0)", keywords).as_deref(),
        Some("rgb(255,0,0)")
    );
    assert_eq!(
        validate_css_color("hsl(120, 100%, 50%)", keywords).as_deref(),
        Some("hsl(120,100%,50%)")
    );
    assert_eq!(
        validate_css_color("rgba(255, 0, 0, 0.5)", keywords).as_deref(),
        Some("rgba(255,0,0,.5)")
    );
    // rgb channels must share one type
    assert_eq!(validate_css_color("rgb(300, -10, 50%)", keywords), None);
    assert_eq!(validate_css_color("rgb(100%, 0, 0)", keywords), None);
    assert_eq!(validate_css_color("rgb(1, 2)", keywords), None);
    assert_eq!(validate_css_color("rgb(1, 2, 3) x", keywords), None);
}

#[test]
fn test_html_color_expands_short_hex() {
    let keywords = &*DEFAULT_COLOR_KEYWORDS;
    assert_eq!(validate_html_color("#abc", keywords).as_deref(), Some("#aabbcc"));
    assert_eq!(validate_html_color("navy", keywords).as_deref(), Some("#000080"));
    assert_eq!(validate_html_color("#12345", keywords), None);
}

// ========== Shorthands ==========

#[test]
fn test_border_shorthand() {
    assert_eq!(
        style("border: red solid 1px").as_deref(),
        Some("border:1px solid #FF0000;")
    );
    assert_eq!(style("border: bogus"), None);
}

#[test]
fn test_font_shorthand() {
    assert_eq!(
        style("font: bold 12px/1.5 Arial, sans-serif").as_deref(),
        Some("font:bold 12px/1.5 Arial, sans-serif;")
    );
    assert_eq!(
        style("font: bold italic 12px serif").as_deref(),
        Some("font:italic bold 12px serif;")
    );
    assert_eq!(
        style("font: 12px / 2 serif").as_deref(),
        Some("font:12px/2 serif;")
    );
    assert_eq!(style("font: caption").as_deref(), Some("font:caption;"));
    // size and family are both required
    assert_eq!(style("font: bold serif"), None);
    assert_eq!(style("font: 12px"), None);
}

#[test]
fn test_list_style_shorthand() {
    assert_eq!(
        style("list-style: inside square").as_deref(),
        Some("list-style:square inside;")
    );
    assert_eq!(style("list-style: none").as_deref(), Some("list-style:none;"));
}

#[test]
fn test_background_shorthand_orders_fields() {
    assert_eq!(
        style("background: no-repeat red").as_deref(),
        Some("background:#FF0000 no-repeat;")
    );
    assert_eq!(
        style("background: left top blue").as_deref(),
        Some("background:#0000FF left top;")
    );
}

// ========== Style attribute ==========

#[test]
fn test_style_keeps_valid_declarations() {
    assert_eq!(
        style("color: red; text-align: center").as_deref(),
        Some("color:#FF0000;text-align:center;")
    );
    assert_eq!(
        style("COLOR: red; bogus: 1; text-align: sideways").as_deref(),
        Some("color:#FF0000;")
    );
}

#[test]
fn test_style_repeated_property_last_value_wins() {
    assert_eq!(
        style("color: red; margin: 0; color: blue").as_deref(),
        Some("color:#0000FF;margin:0;")
    );
}

#[test]
fn test_style_rejects_script_values() {
    assert_eq!(style("color: expression(alert(1))"), None);
    assert_eq!(style("background-image: url(javascript:alert(1))"), None);
}

#[test]
fn test_style_important_handling() {
    assert_eq!(
        style("font-weight: bold !important").as_deref(),
        Some("font-weight:bold;")
    );
    let mut config = Config::new();
    config.set("CSS.AllowImportant", true).expect("directive exists");
    assert_eq!(
        validate_with(&config, &AttrDef::Css, "span", "font-weight: bold ! important").as_deref(),
        Some("font-weight:bold !important;")
    );
}

#[test]
fn test_style_property_filters() {
    let mut config = Config::new();
    config
        .set("CSS.AllowedProperties", "color, margin")
        .expect("directive exists");
    config
        .set("CSS.ForbiddenProperties", "margin")
        .expect("directive exists");
    let css = CssDefinition::from_config(&config);
    assert!(css.contains("color"));
    assert!(!css.contains("margin"));
    assert_eq!(css.len(), 1);
    assert_eq!(
        validate_with(&config, &AttrDef::Css, "span", "color: red; margin: 0; padding: 1px")
            .as_deref(),
        Some("color:#FF0000;")
    );
}

#[test]
fn test_tricky_properties_need_opt_in() {
    assert!(!CssDefinition::from_config(&Config::new()).contains("display"));
    let mut config = Config::new();
    config.set("CSS.AllowTricky", true).expect("directive exists");
    assert_eq!(
        validate_with(&config, &AttrDef::Css, "div", "display: none").as_deref(),
        Some("display:none;")
    );
    assert_eq!(validate_with(&config, &AttrDef::Css, "img", "display: none"), None);
}

#[test]
fn test_img_width_is_bounded() {
    assert_eq!(
        validate_with(&Config::new(), &AttrDef::Css, "img", "width: 2000px"),
        None
    );
    assert_eq!(
        validate_with(&Config::new(), &AttrDef::Css, "img", "width: 100px").as_deref(),
        Some("width:100px;")
    );
    assert_eq!(
        validate_with(&Config::new(), &AttrDef::Css, "div", "width: 2000px").as_deref(),
        Some("width:2000px;")
    );
}

// ========== HTML attribute types ==========

#[test]
fn test_html_integer_sign_flags() {
    let positive_only = AttrDef::Integer {
        negative: false,
        zero: false,
        positive: true,
    };
    assert_eq!(validate(&positive_only, "+5").as_deref(), Some("5"));
    assert_eq!(validate(&positive_only, "0"), None);
    assert_eq!(validate(&positive_only, "-5"), None);
    assert_eq!(validate(&positive_only, "5a"), None);
}

#[test]
fn test_pixels_are_clamped() {
    let def = AttrDef::Pixels { max: Some(1200) };
    assert_eq!(validate(&def, "12.7").as_deref(), Some("12"));
    assert_eq!(validate(&def, "99999").as_deref(), Some("1200"));
    assert_eq!(validate(&def, "-3").as_deref(), Some("0"));
    assert_eq!(validate(&def, "wide"), None);
    assert_eq!(validate(&AttrDef::HtmlLength, "50%").as_deref(), Some("50%"));
    assert_eq!(validate(&AttrDef::HtmlLength, "150%").as_deref(), Some("100%"));
}

#[test]
fn test_id_requires_opt_in_and_is_unique() {
    assert_eq!(validate(&AttrDef::Id, "main"), None);

    let mut config = Config::new();
    config.set("Attr.EnableID", true).expect("directive exists");
    config.set("Attr.IDPrefix", "user_").expect("directive exists");
    let settings = AttrSettings::from_config(&config);
    let css = CssDefinition::from_config(&config);
    let mut ids = IdAccumulator::new();
    let mut cx = AttrContext {
        element: "div",
        settings: &settings,
        css: &css,
        ids: &mut ids,
    };
    assert_eq!(AttrDef::Id.validate("main", &mut cx).as_deref(), Some("user_main"));
    assert_eq!(AttrDef::Id.validate("main", &mut cx), None);
    assert_eq!(AttrDef::Id.validate("has space", &mut cx), None);
    assert_eq!(
        AttrDef::Id.validate("user_main2", &mut cx).as_deref(),
        Some("user_main2")
    );
}

#[test]
fn test_class_deduplicates() {
    assert_eq!(
        validate(&AttrDef::Class, "a b a 9bad c").as_deref(),
        Some("a b c")
    );
}

#[test]
fn test_enum_case_sensitivity() {
    let insensitive = AttrDef::enumeration(&["left", "right"], false);
    assert_eq!(validate(&insensitive, " LEFT ").as_deref(), Some("left"));
    let sensitive = AttrDef::enumeration(&["A", "a"], true);
    assert_eq!(validate(&sensitive, "A").as_deref(), Some("A"));
    assert_eq!(validate(&sensitive, "b"), None);
}

// ========== URIs ==========

#[test]
fn test_uri_normalization() {
    let settings = UriSettings::from_config(&Config::new());
    let mut uri = Uri::parse("HTTP://Example.COM:80/a b").expect("parses");
    assert!(uri.validate(&settings, false));
    assert_eq!(uri.to_string(), "http://example.com/a%20b");
}

#[test]
fn test_uri_scheme_policy() {
    let settings = UriSettings::from_config(&Config::new());
    for bad in ["javascript:alert(1)", "vbscript:x", "data:text/html,x", "gopher://x"] {
        let mut uri = Uri::parse(bad).expect("parses");
        assert!(!uri.validate(&settings, false), "{bad} was accepted");
    }
    let def = AttrDef::Uri { embedded: false };
    assert_eq!(
        validate(&def, "mailto:someone@example.com").as_deref(),
        Some("mailto:someone@example.com")
    );
}

// ========== Properties ==========

#[quickcheck]
fn prop_pixels_never_exceed_max(n: i32) -> bool {
    let def = AttrDef::Pixels { max: Some(1200) };
    validate(&def, &n.to_string())
        .and_then(|v| v.parse::<i64>().ok())
        .is_some_and(|v| (0..=1200).contains(&v))
}

#[quickcheck]
fn prop_same_unit_lengths_order_like_numbers(a: u16, b: u16) -> bool {
    let left = Length::parse(&format!("{a}px"));
    let right = Length::parse(&format!("{b}px"));
    left.compare_to(&right) == Some(a.cmp(&b))
}
