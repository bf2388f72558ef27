//! Validators for HTML attribute types.
//!
//! [HTML 4.01 § 6 Basic HTML data types](https://www.w3.org/TR/html401/types.html)

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::AttrContext;
use crate::number::{is_digits, parse_cdata};
use crate::uri::{Uri, UriSettings};

/// Class names and name tokens: `-?[A-Za-z_][A-Za-z_0-9-]*` or a leading `--`.
static NMTOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:--|-?[A-Za-z_])[A-Za-z_\-0-9]*$").expect("name token pattern is valid")
});

/// [§ 6.6 Lengths](https://www.w3.org/TR/html401/types.html#h-6.6)
/// Values above this are clamped; very large images have crashed renderers.
pub const MAX_PIXELS: i64 = 1200;

/// Leading integer part of a decimal string, the way a lenient number
/// conversion reads it (`"12.7"` is 12). `None` if there is no number.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let valid = (is_digits(int_part) || (int_part.is_empty() && is_digits(frac_part)))
        && (frac_part.is_empty() || is_digits(frac_part));
    if !valid {
        return None;
    }
    let n: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().unwrap_or(i64::MAX)
    };
    Some(if negative { -n } else { n })
}

/// [§ 6.6 Lengths](https://www.w3.org/TR/html401/types.html#h-6.6)
/// "An integer representing a number of pixels"
pub(super) fn validate_integer(
    value: &str,
    negative: bool,
    zero: bool,
    positive: bool,
) -> Option<String> {
    let value = parse_cdata(value);
    if value.is_empty() {
        return None;
    }
    let (digits, normalized) = if negative && value.starts_with('-') {
        let digits = &value[1..];
        (digits, if digits == "0" { "0".to_string() } else { value.clone() })
    } else if positive && value.starts_with('+') {
        (&value[1..], value[1..].to_string())
    } else {
        (value.as_str(), value.clone())
    };
    if !is_digits(digits) {
        return None;
    }
    let n: i128 = normalized.parse().unwrap_or(0);
    if (!zero && n == 0) || (!positive && n > 0) || (!negative && n < 0) {
        return None;
    }
    Some(normalized)
}

pub(super) fn validate_pixels(value: &str, max: Option<i64>) -> Option<String> {
    let value = value.trim();
    if value == "0" {
        return Some(value.to_string());
    }
    if value.is_empty() {
        return None;
    }
    let n = leading_int(value.strip_suffix("px").unwrap_or(value))?;
    if n < 0 {
        return Some("0".to_string());
    }
    if let Some(max) = max {
        if n > max {
            return Some(max.to_string());
        }
    }
    Some(n.to_string())
}

/// [§ 6.6 Lengths](https://www.w3.org/TR/html401/types.html#h-6.6)
/// "Length: The value may be either a Pixel or a percentage of the available
/// horizontal or vertical space."
pub(super) fn validate_html_length(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(pixels) = validate_pixels(value, Some(MAX_PIXELS)) {
        return Some(pixels);
    }
    let points = leading_int(value.strip_suffix('%')?)?;
    Some(format!("{}%", points.clamp(0, 100)))
}

/// [§ 6.6 Lengths](https://www.w3.org/TR/html401/types.html#h-6.6)
/// "MultiLength: The value may be a Length or a relative length. A relative
/// length has the form "i*", where "i" is an integer."
pub(super) fn validate_multi_length(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(length) = validate_html_length(value) {
        return Some(length);
    }
    let relative = value.strip_suffix('*')?;
    if relative.is_empty() {
        return Some("*".to_string());
    }
    match leading_int(relative)? {
        n if n < 0 => None,
        0 => Some("0".to_string()),
        1 => Some("*".to_string()),
        n => Some(format!("{n}*")),
    }
}

/// [§ 6.2 SGML basic types](https://www.w3.org/TR/html401/types.html#type-id)
/// "ID and NAME tokens must begin with a letter ([A-Za-z]) and may be
/// followed by any number of letters, digits ([0-9]), hyphens ("-"),
/// underscores ("_"), colons (":"), and periods (".")."
///
/// IDs are disabled unless `Attr.EnableID` is set, get `Attr.IDPrefix`
/// prepended once, and must be unique within the document.
pub(super) fn validate_id(value: &str, cx: &mut AttrContext<'_>) -> Option<String> {
    if !cx.settings.enable_id {
        return None;
    }
    let mut id = value.trim().to_string();
    if id.is_empty() {
        return None;
    }
    let prefix = &cx.settings.id_prefix;
    if !prefix.is_empty() && !id.starts_with(prefix.as_str()) {
        id = format!("{prefix}{id}");
    }
    if cx.ids.contains(&id) {
        return None;
    }
    let mut chars = id.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '-' | '.' | '_'))
    {
        return None;
    }
    let _ = cx.ids.add(&id);
    Some(id)
}

/// Space-separated class names; invalid names are dropped, duplicates
/// collapsed.
pub(super) fn validate_class(value: &str) -> Option<String> {
    validate_nmtokens(value)
}

pub(super) fn validate_nmtokens(value: &str) -> Option<String> {
    let value = parse_cdata(value);
    let mut kept: Vec<&str> = Vec::new();
    for token in value.split_whitespace() {
        if NMTOKEN.is_match(token) && !kept.contains(&token) {
            kept.push(token);
        }
    }
    if kept.is_empty() {
        return None;
    }
    Some(kept.join(" "))
}

/// [RFC 3066 § 2.1 Language tag syntax](https://www.rfc-editor.org/rfc/rfc3066#section-2.1)
/// "Language-Tag = Primary-subtag *( "-" Subtag )"
///
/// The primary subtag is 2-3 letters (or `i`/`x`); later subtags are up to
/// 8 alphanumerics. Everything from the first bad subtag on is cut off.
pub(super) fn validate_lang(value: &str) -> Option<String> {
    let value = value.trim();
    let mut subtags = value.split('-');
    let primary = subtags.next()?.to_ascii_lowercase();
    let primary_ok = match primary.len() {
        1 => primary == "x" || primary == "i",
        2 | 3 => primary.bytes().all(|b| b.is_ascii_alphabetic()),
        _ => false,
    };
    if !primary_ok {
        return None;
    }
    let mut result = primary;
    for (i, subtag) in subtags.enumerate() {
        let len = subtag.len();
        let bad_second = i == 0 && len == 1 && subtag != "x";
        if len == 0 || len > 8 || bad_second || !subtag.bytes().all(|b| b.is_ascii_alphanumeric()) {
            break;
        }
        result.push('-');
        result.push_str(&subtag.to_ascii_lowercase());
    }
    Some(result)
}

/// [§ 6.12 Link types](https://www.w3.org/TR/html401/types.html#type-links)
/// Only the link types in `Attr.AllowedRel` survive.
pub(super) fn validate_link_types(value: &str, allowed: &HashSet<String>) -> Option<String> {
    let value = parse_cdata(value).to_ascii_lowercase();
    let mut kept: Vec<&str> = Vec::new();
    for part in value.split_whitespace() {
        if allowed.contains(part) && !kept.contains(&part) {
            kept.push(part);
        }
    }
    if kept.is_empty() {
        return None;
    }
    Some(kept.join(" "))
}

pub(super) fn validate_uri(value: &str, embedded: bool, settings: &UriSettings) -> Option<String> {
    if settings.disable {
        return None;
    }
    let mut uri = Uri::parse(&parse_cdata(value))?;
    if !uri.validate(settings, embedded) {
        return None;
    }
    Some(uri.to_string())
}
