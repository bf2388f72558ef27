//! Number grammar shared by every numeric validator.
//!
//! [§ 4.3 Numbers](https://www.w3.org/TR/CSS21/syndata.html#numbers)
//! "Some value types may have integer values (denoted by `<integer>`) or real
//! number values (denoted by `<number>`). Real numbers and integers are
//! specified in decimal notation only."
//!
//! Exponent notation is therefore rejected, and accepted numbers are
//! normalized: no leading zeros, no trailing fractional zeros, no `+` sign.

use std::sync::LazyLock;

use regex::Regex;

/// Validate and normalize a decimal number.
///
/// Returns `None` for anything that is not `[+-]?digits[.digits]` (either
/// side of the point may be empty, not both), or for a negative number when
/// `non_negative` is set.
#[must_use]
pub fn normalize_number(input: &str, non_negative: bool) -> Option<String> {
    let number = parse_cdata(input);
    if number.is_empty() {
        return None;
    }
    if number == "0" {
        return Some("0".to_string());
    }

    let (sign, unsigned) = match number.as_bytes()[0] {
        b'-' if non_negative => return None,
        b'-' => ("-", &number[1..]),
        b'+' => ("", &number[1..]),
        _ => ("", number.as_str()),
    };

    if is_digits(unsigned) {
        let trimmed = unsigned.trim_start_matches('0');
        return Some(if trimmed.is_empty() {
            "0".to_string()
        } else {
            format!("{sign}{trimmed}")
        });
    }

    // The decimal point is the only other character allowed.
    let (left, right) = unsigned.split_once('.')?;
    if left.is_empty() && right.is_empty() {
        return None;
    }
    if !left.is_empty() && !is_digits(left) {
        return None;
    }
    let left = left.trim_start_matches('0');
    let right = right.trim_end_matches('0');
    if right.is_empty() {
        return Some(if left.is_empty() {
            "0".to_string()
        } else {
            format!("{sign}{left}")
        });
    }
    if !is_digits(right) {
        return None;
    }
    Some(format!("{sign}{left}.{right}"))
}

/// True for a non-empty run of ASCII digits.
#[must_use]
pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric value of an already-normalized number.
#[must_use]
pub fn to_f64(normalized: &str) -> f64 {
    normalized.parse().unwrap_or(0.0)
}

/// Trim the value and turn tabs and line breaks into spaces, the way
/// attribute CDATA is interpreted.
#[must_use]
pub fn parse_cdata(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if matches!(c, '\n' | '\t' | '\r') { ' ' } else { c })
        .collect()
}

static COLOR_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(rgba?|hsla?)\(\s*([^)]*?)\s*\)")
        .expect("color function pattern is valid")
});

/// Remove whitespace inside `rgb()`/`rgba()`/`hsl()`/`hsla()` so that a
/// space-splitting validator sees the whole function as one token.
#[must_use]
pub fn munge_color_functions(value: &str) -> String {
    COLOR_FUNCTION
        .replace_all(value, |caps: &regex::Captures<'_>| {
            let args: String = caps[2].chars().filter(|c| !c.is_whitespace()).collect();
            format!("{}({args})", &caps[1])
        })
        .into_owned()
}

/// Split on single spaces, skipping empty pieces.
pub fn words(value: &str) -> impl Iterator<Item = &str> {
    value.split(' ').filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_numbers() {
        assert_eq!(normalize_number("007", false).as_deref(), Some("7"));
        assert_eq!(normalize_number("+1.50", false).as_deref(), Some("1.5"));
        assert_eq!(normalize_number("-0.0", false).as_deref(), Some("0"));
        assert_eq!(normalize_number("0.250", false).as_deref(), Some(".25"));
        assert_eq!(normalize_number("-.5", false).as_deref(), Some("-.5"));
        assert_eq!(normalize_number("-.5", true), None);
        assert_eq!(normalize_number("1e3", false), None);
        assert_eq!(normalize_number(".", false), None);
        assert_eq!(normalize_number("1.2.3", false), None);
    }

    #[test]
    fn test_munge_color_functions() {
        assert_eq!(
            munge_color_functions("rgb( 1, 2 ,3 ) solid"),
            "rgb(1,2,3) solid"
        );
    }
}
