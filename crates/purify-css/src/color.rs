//! Color validation.
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//!
//! Two dialects are accepted: the CSS one (keywords, hex, and the
//! `rgb()`/`rgba()`/`hsl()`/`hsla()` functions) and the HTML presentational
//! attribute one (keywords and hex only, always written back as `#rrggbb`).

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::number::{normalize_number, to_f64};

/// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
///
/// The sixteen HTML 4 colors plus `orange`, mapped to their hex form.
pub static DEFAULT_COLOR_KEYWORDS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    [
        ("maroon", "#800000"),
        ("red", "#FF0000"),
        ("orange", "#FFA500"),
        ("yellow", "#FFFF00"),
        ("olive", "#808000"),
        ("purple", "#800080"),
        ("fuchsia", "#FF00FF"),
        ("white", "#FFFFFF"),
        ("lime", "#00FF00"),
        ("green", "#008000"),
        ("navy", "#000080"),
        ("blue", "#0000FF"),
        ("aqua", "#00FFFF"),
        ("teal", "#008080"),
        ("black", "#000000"),
        ("silver", "#C0C0C0"),
        ("gray", "#808080"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
});

/// Literal type of a color function argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgType {
    /// "A `<percentage>` value"
    Percentage,
    /// "A `<number>` value", truncated to an integer
    Integer,
}

/// The types a positional argument may take, with the clamp maximum of each.
struct ArgRule {
    percentage: Option<f64>,
    integer: Option<f64>,
}

const RGB_RULES: [ArgRule; 3] = [
    ArgRule { percentage: Some(100.0), integer: Some(255.0) },
    ArgRule { percentage: Some(100.0), integer: Some(255.0) },
    ArgRule { percentage: Some(100.0), integer: Some(255.0) },
];

/// [§ 7 HSL Colors](https://www.w3.org/TR/css-color-4/#the-hsl-notation)
/// "hsl() = hsl( `<hue>`, `<percentage>`, `<percentage>`, `<alpha-value>`? )"
const HSL_RULES: [ArgRule; 3] = [
    ArgRule { percentage: None, integer: Some(360.0) },
    ArgRule { percentage: Some(100.0), integer: None },
    ArgRule { percentage: Some(100.0), integer: None },
];

/// Validate a CSS color value.
///
/// Keywords resolve through `keywords`. Hex colors must have 3 or 6 digits
/// (a missing `#` is added). For `rgb()`/`rgba()` the three channels must
/// all be percentages or all be integers; `hsl()`/`hsla()` fixes the type of
/// each position instead and so may mix them. Channel values are clamped
/// into range, and the alpha channel of the `a` forms is clamped to 0..1.
#[must_use]
pub fn validate_css_color(value: &str, keywords: &HashMap<String, String>) -> Option<String> {
    let color = value.trim();
    if color.is_empty() {
        return None;
    }
    if let Some(hex) = keywords.get(&color.to_ascii_lowercase()) {
        return Some(hex.clone());
    }

    let lower = color.to_ascii_lowercase();
    let function = ["rgba(", "rgb(", "hsla(", "hsl("]
        .into_iter()
        .find(|f| lower.starts_with(f));
    if let Some(function) = function {
        return validate_color_function(&lower[..function.len() - 1], &color[function.len()..]);
    }

    let hex = color.strip_prefix('#').unwrap_or(color);
    if !matches!(hex.len(), 3 | 6) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{hex}"))
}

fn validate_color_function(function: &str, rest: &str) -> Option<String> {
    // The closing parenthesis must be the last character.
    let args = rest.strip_suffix(')')?;
    if args.contains(')') {
        return None;
    }
    let has_alpha = function.ends_with('a');
    let is_hsl = function.starts_with("hsl");
    let rules = if is_hsl { &HSL_RULES } else { &RGB_RULES };
    let allow_different_types = is_hsl;

    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != if has_alpha { 4 } else { 3 } {
        return None;
    }

    let mut first_type = None;
    let mut normalized = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            return None;
        }
        if i == 3 {
            normalized.push(validate_alpha(part)?);
            continue;
        }
        let (arg_type, literal) = part
            .strip_suffix('%')
            .map_or((ArgType::Integer, *part), |n| (ArgType::Percentage, n));
        let max = match arg_type {
            ArgType::Percentage => rules[i].percentage,
            ArgType::Integer => rules[i].integer,
        }?;
        let expected = *first_type.get_or_insert(arg_type);
        if !allow_different_types && expected != arg_type {
            return None;
        }
        let n = to_f64(&normalize_number(literal, false)?).clamp(0.0, max);
        normalized.push(match arg_type {
            ArgType::Integer => format!("{}", n.trunc()),
            ArgType::Percentage => format!("{n}%"),
        });
    }
    Some(format!("{function}({})", normalized.join(",")))
}

/// [§ 4.2 Transparency](https://www.w3.org/TR/css-color-4/#transparency)
/// "`<alpha-value>` = `<number>` | `<percentage>`" - clamped to 0..1 here,
/// numbers only.
#[must_use]
pub fn validate_alpha(value: &str) -> Option<String> {
    let n = normalize_number(value, true)?;
    if to_f64(&n) > 1.0 {
        return Some("1".to_string());
    }
    Some(n)
}

/// Validate an HTML color attribute (`bgcolor`, `color`): a keyword or
/// 3/6 digit hex, written back as six-digit `#rrggbb`.
#[must_use]
pub fn validate_html_color(value: &str, keywords: &HashMap<String, String>) -> Option<String> {
    let color = value.trim();
    if color.is_empty() {
        return None;
    }
    if let Some(hex) = keywords.get(&color.to_ascii_lowercase()) {
        return Some(hex.clone());
    }
    let hex = color.strip_prefix('#').unwrap_or(color);
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => Some(hex.chars().fold(String::from("#"), |mut acc, c| {
            acc.push(c);
            acc.push(c);
            acc
        })),
        6 => Some(format!("#{hex}")),
        _ => None,
    }
}
