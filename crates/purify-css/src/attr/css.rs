//! Validators for CSS property values.
//!
//! [CSS 2.1 § 4.3 Values](https://www.w3.org/TR/CSS21/syndata.html#values)

use std::sync::LazyLock;

use regex::Regex;

use super::{AttrContext, AttrDef};
use crate::length::Length;
use crate::number::{is_digits, munge_color_functions, normalize_number, parse_cdata, words};
use crate::uri::Uri;

/// [§ 4.1.3 Characters and case](https://www.w3.org/TR/CSS21/syndata.html#characters)
/// "identifiers [...] can contain only the characters [a-zA-Z0-9] and ISO
/// 10646 characters U+00A0 and higher, plus the hyphen (-) and the
/// underscore (_); they cannot start with a digit, two hyphens, or a
/// hyphen followed by a digit."
static IDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[_a-zA-Z\x{A0}-\x{10FFFF}][_a-zA-Z0-9\-\x{A0}-\x{10FFFF}]*$")
        .expect("identifier pattern is valid")
});

pub(super) fn validate_multiple(
    single: &AttrDef,
    max: usize,
    value: &str,
    cx: &mut AttrContext<'_>,
) -> Option<String> {
    let value = munge_color_functions(&parse_cdata(value));
    let accepted: Vec<String> = words(&value)
        .filter_map(|part| single.validate(part, cx))
        .take(max)
        .collect();
    if accepted.is_empty() {
        return None;
    }
    Some(accepted.join(" "))
}

pub(super) fn validate_important(
    def: &AttrDef,
    allow: bool,
    value: &str,
    cx: &mut AttrContext<'_>,
) -> Option<String> {
    let mut value = value.trim();
    let mut is_important = false;
    if let Some(rest) = value
        .strip_suffix("important")
        .and_then(|rest| rest.trim_end().strip_suffix('!'))
    {
        value = rest.trim_end();
        is_important = true;
    }
    let validated = def.validate(value, cx)?;
    if allow && is_important {
        return Some(format!("{validated} !important"));
    }
    Some(validated)
}

/// [§ 4.3.3 Percentages](https://www.w3.org/TR/CSS21/syndata.html#percentage-units)
/// "The format of a percentage value is a `<number>` immediately followed by '%'."
pub(super) fn validate_percentage(value: &str, non_negative: bool) -> Option<String> {
    let value = parse_cdata(value);
    let number = value.strip_suffix('%').filter(|n| !n.is_empty())?;
    Some(format!("{}%", normalize_number(number, non_negative)?))
}

pub(super) fn validate_length(
    value: &str,
    min: Option<&Length>,
    max: Option<&Length>,
) -> Option<String> {
    let value = parse_cdata(value);
    if value.is_empty() || value.len() == 1 && value != "0" {
        return None;
    }
    if value == "0" {
        return Some(value);
    }
    let length = Length::parse(&value);
    if !length.is_valid() {
        return None;
    }
    if let Some(min) = min {
        if length.compare_to(min)?.is_lt() {
            return None;
        }
    }
    if let Some(max) = max {
        if length.compare_to(max)?.is_gt() {
            return None;
        }
    }
    Some(length.to_string())
}

pub(super) fn validate_ident(value: &str) -> Option<String> {
    let value = value.trim();
    IDENT.is_match(value).then(|| value.to_string())
}

/// [§ 4.3.4 URLs and URIs](https://www.w3.org/TR/CSS21/syndata.html#uri)
/// "The format of a URI value is 'url(' followed by optional white space
/// followed by an optional single quote (') or double quote (") character
/// followed by the URI itself, followed by an optional single quote (') or
/// double quote (") character followed by optional white space followed
/// by ')'."
pub(super) fn validate_css_uri(value: &str, cx: &mut AttrContext<'_>) -> Option<String> {
    let value = parse_cdata(value);
    let inner = value.strip_prefix("url(")?.strip_suffix(')')?.trim();
    let inner = match inner.chars().next() {
        Some(quote @ ('"' | '\'')) => inner.strip_prefix(quote)?.strip_suffix(quote)?,
        _ => inner,
    };
    let unescaped = expand_css_escapes(inner);

    let mut uri = Uri::parse(&unescaped)?;
    if !uri.validate(&cx.settings.uri, true) {
        return None;
    }
    let result: String = uri
        .to_string()
        .chars()
        .filter(|c| !matches!(c, '"' | '\\' | '\n' | '\u{000C}' | '\r'))
        .collect();
    let result = result
        .replace('(', "%28")
        .replace(')', "%29")
        .replace('\'', "%27");
    Some(format!("url(\"{result}\")"))
}

/// [§ 4.1.3 Characters and case](https://www.w3.org/TR/CSS21/syndata.html#characters)
/// "backslash followed by at most six hexadecimal digits (0..9A..F), which
/// stand for the ISO 10646 character with that number"
fn expand_css_escapes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(h) if h.is_ascii_hexdigit() => {
                    hex.push(*h);
                    let _ = chars.next();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            // An escaped newline is a line continuation.
            match chars.next() {
                Some('\n') | None => {}
                Some(other) => out.push(other),
            }
            continue;
        }
        if let Some(decoded) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
            out.push(decoded);
        }
        if chars.peek() == Some(&' ') {
            let _ = chars.next();
        }
    }
    out
}

/// Legacy `filter: alpha(opacity=N)`; only the opacity parameter is kept,
/// clamped to 0..100.
pub(super) fn validate_filter(value: &str) -> Option<String> {
    let value = parse_cdata(value);
    if value == "none" {
        return Some(value);
    }
    let (function, rest) = value.split_once('(')?;
    let function = function.trim();
    if !matches!(
        function,
        "alpha" | "Alpha" | "progid:DXImageTransform.Microsoft.Alpha"
    ) {
        return None;
    }
    let parameters = rest.split(')').next().unwrap_or_default();
    let mut opacity = None;
    for param in parameters.split(',') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        if key.trim() != "opacity" || opacity.is_some() {
            continue;
        }
        let value = value.trim();
        let digits = value.strip_prefix('-').unwrap_or(value);
        if !is_digits(digits) {
            continue;
        }
        let n: i64 = value.parse().unwrap_or(0);
        opacity = Some(n.clamp(0, 100));
    }
    let params = opacity.map(|n| format!("opacity={n}")).unwrap_or_default();
    Some(format!("{function}({params})"))
}

/// [§ 16.3.1 Underlining, overlining, striking, and blinking](https://www.w3.org/TR/CSS21/text.html#lining-striking-props)
/// "none | [ underline || overline || line-through || blink ]" (without blink)
pub(super) fn validate_text_decoration(value: &str) -> Option<String> {
    let value = parse_cdata(value).to_ascii_lowercase();
    if value == "none" {
        return Some(value);
    }
    let mut kept: Vec<&str> = Vec::new();
    for word in words(&value) {
        if matches!(word, "line-through" | "overline" | "underline") && !kept.contains(&word) {
            kept.push(word);
        }
    }
    if kept.is_empty() {
        return None;
    }
    Some(kept.join(" "))
}

/// [§ 15.3 Font family](https://www.w3.org/TR/CSS21/fonts.html#font-family-prop)
/// "[[ `<family-name>` | `<generic-family>` ] [, `<family-name>`| `<generic-family>`]* ]"
///
/// Quoted names are rewritten with single quotes; unquoted names are
/// checked word by word against the identifier grammar.
pub(super) fn validate_font_family(value: &str) -> Option<String> {
    const GENERIC: [&str; 5] = ["serif", "sans-serif", "monospace", "fantasy", "cursive"];
    let value = parse_cdata(value);
    let mut fonts = Vec::new();
    for font in value.split(',') {
        let font = font.trim();
        if font.is_empty() {
            continue;
        }
        let lower = font.to_ascii_lowercase();
        if GENERIC.contains(&lower.as_str()) {
            fonts.push(lower);
            continue;
        }
        let quoted = font
            .strip_prefix('"')
            .and_then(|f| f.strip_suffix('"'))
            .or_else(|| font.strip_prefix('\'').and_then(|f| f.strip_suffix('\'')));
        match quoted {
            Some(name) => {
                let name = expand_css_escapes(name);
                if name.is_empty()
                    || name
                        .chars()
                        .any(|c| matches!(c, '"' | '\'' | '\\' | '<' | '>' | '\n' | '\r' | '\u{000C}') || c.is_control())
                {
                    continue;
                }
                fonts.push(format!("'{name}'"));
            }
            None => {
                if !words(font).all(|w| IDENT.is_match(w)) {
                    continue;
                }
                if font.contains(' ') {
                    fonts.push(format!("'{font}'"));
                } else {
                    fonts.push(font.to_string());
                }
            }
        }
    }
    if fonts.is_empty() {
        return None;
    }
    Some(fonts.join(", "))
}

/// [§ 14.2.1 Background properties](https://www.w3.org/TR/CSS21/colors.html#propdef-background-position)
/// "[ [ `<percentage>` | `<length>` | left | center | right ] [ `<percentage>` |
/// `<length>` | top | center | bottom ]? ] | [ [ left | center | right ] ||
/// [ top | center | bottom ] ]"
pub(super) fn validate_background_position(value: &str) -> Option<String> {
    let value = parse_cdata(value);
    let mut horizontal: Option<String> = None;
    let mut vertical: Option<String> = None;
    let mut center_first: Option<String> = None;
    let mut center_second: Option<String> = None;
    let mut measures: Vec<String> = Vec::new();
    let mut caught = 0usize;

    for bit in words(&value) {
        let lower = bit.to_ascii_lowercase();
        match lower.as_str() {
            "left" | "right" => {
                horizontal = Some(lower);
                caught += 1;
                continue;
            }
            "top" | "bottom" => {
                vertical = Some(lower);
                caught += 1;
                continue;
            }
            "center" => {
                if caught == 0 {
                    center_first = Some(lower);
                } else {
                    center_second = Some(lower);
                }
                caught += 1;
                continue;
            }
            _ => {}
        }
        if let Some(length) = validate_length(bit, None, None) {
            measures.push(length);
            caught += 1;
        } else if let Some(percentage) = validate_percentage(bit, false) {
            measures.push(percentage);
            caught += 1;
        }
    }
    if caught == 0 {
        return None;
    }

    let mut measures = measures.into_iter();
    let mut result = Vec::new();
    if let Some(h) = horizontal {
        result.push(h);
    } else if let Some(c) = center_first {
        result.push(c);
        // "center" alone means "center center"; do not emit it twice.
        center_second = None;
    } else if let Some(m) = measures.next() {
        result.push(m);
    }
    if let Some(v) = vertical.or(center_second).or_else(|| measures.next()) {
        result.push(v);
    }
    if result.is_empty() {
        return None;
    }
    Some(result.join(" "))
}

/// Validate a whole `style` attribute.
///
/// Declarations are split on semicolons outside quotes. Unknown properties
/// and invalid values are dropped; a repeated property keeps its first
/// position with its last valid value. `inherit` is accepted for every
/// property.
pub(super) fn validate_style(value: &str, cx: &mut AttrContext<'_>) -> Option<String> {
    let value = parse_cdata(value);
    let css = cx.css;
    let mut accepted: Vec<(String, String)> = Vec::new();

    for declaration in split_declarations(&value) {
        let Some((property, raw)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        if property.is_empty() {
            continue;
        }
        let Some(def) = css.get(&property) else {
            continue;
        };
        let raw = raw.trim();
        let result = if raw.eq_ignore_ascii_case("inherit") {
            Some("inherit".to_string())
        } else {
            def.validate(raw, cx)
        };
        let Some(result) = result else {
            tracing::trace!(property, value = raw, "css declaration dropped");
            continue;
        };
        match accepted.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = result,
            None => accepted.push((property, result)),
        }
    }

    if accepted.is_empty() {
        return None;
    }
    Some(
        accepted
            .into_iter()
            .map(|(property, value)| format!("{property}:{value};"))
            .collect(),
    )
}

/// [§ 4.1.8 Declarations and properties](https://www.w3.org/TR/CSS21/syndata.html#declaration)
/// "A declaration is either empty or consists of a property name, followed
/// by a colon (:), followed by a property value."
///
/// Semicolons inside quoted strings do not end a declaration.
fn split_declarations(css: &str) -> Vec<String> {
    let mut declarations = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in css.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                ';' => declarations.push(std::mem::take(&mut current)),
                '"' | '\'' => {
                    current.push(c);
                    quote = Some(c);
                }
                _ => current.push(c),
            },
        }
    }
    if !current.is_empty() {
        declarations.push(current);
    }
    declarations
}
