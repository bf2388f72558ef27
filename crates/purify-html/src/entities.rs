//! Entity decoding for text and attribute values.
//!
//! Decoding is two-tier. Almost all real text either has no `&` at all or
//! only uses the handful of markup-significant entities, so those are
//! substituted directly first. Only when ampersands remain that the direct
//! substitution cannot account for does the regex pass run.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::entity_table::{ENTITY_TABLE, LEGACY_NAMES};

/// The markup-significant entities and what they stand for. Longer
/// spellings come first so that prefix matching picks them.
const SPECIAL_ENTITIES: [(&str, &str); 7] = [
    ("&#039;", "'"),
    ("&quot;", "\""),
    ("&#x27;", "'"),
    ("&amp;", "&"),
    ("&#39;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
];

/// Characters that only ever appear escaped in output.
const SPECIAL_CHARS: [char; 5] = ['&', '<', '>', '"', '\''];

/// `&#xHH;`, `&#NNN;` or `&name;`, each with the semicolon optional.
static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[xX]([0-9A-Fa-f]+)|#([0-9]+)|([A-Za-z][A-Za-z0-9]*))(;?)")
        .expect("entity pattern is valid")
});

/// Decodes character references against a name table.
#[derive(Debug, Clone, Copy)]
pub struct EntityParser {
    table: &'static HashMap<&'static str, char>,
}

impl Default for EntityParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityParser {
    /// A parser over the HTML 4 entity table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: &ENTITY_TABLE,
        }
    }

    /// A parser over a caller-supplied table.
    #[must_use]
    pub const fn with_table(table: &'static HashMap<&'static str, char>) -> Self {
        Self { table }
    }

    /// Decode the character references in a text run or attribute value.
    ///
    /// `"Procter & Gamble"` comes back untouched without touching the
    /// regex engine; `"&amp;&amp;&amp;"` is fully handled by the direct
    /// substitution.
    #[must_use]
    pub fn parse_data(&self, text: &str, is_attr: bool) -> String {
        let escapable = count_escapable_ampersands(text);
        if escapable == 0 {
            return text.to_string();
        }
        let escaped_amps = text.matches("&amp;").count();
        let substituted = substitute_special(text);
        if count_escapable_ampersands(&substituted) <= escaped_amps {
            return substituted;
        }
        // Uncommon entities remain. Decode from the original so nothing is
        // decoded twice.
        self.substitute_all(text, is_attr, false)
    }

    /// Decode every reference except those that stand for a markup
    /// significant character, which stay escaped.
    #[must_use]
    pub fn substitute_non_special(&self, text: &str) -> String {
        if !text.contains('&') {
            return text.to_string();
        }
        self.substitute_all(text, false, true)
    }

    fn substitute_all(&self, text: &str, is_attr: bool, keep_special: bool) -> String {
        ENTITY_PATTERN
            .replace_all(text, |caps: &Captures<'_>| {
                let whole = &caps[0];
                let Some(m) = caps.get(0) else {
                    return whole.to_string();
                };
                let next = text[m.end()..].chars().next();
                let decoded = self.decode_match(caps, next, is_attr);
                match decoded {
                    Some((c, rest)) if !(keep_special && SPECIAL_CHARS.contains(&c)) => {
                        format!("{c}{rest}")
                    }
                    _ => whole.to_string(),
                }
            })
            .into_owned()
    }

    /// The character a match stands for, plus any trailing text of the
    /// match that is not part of the reference.
    fn decode_match<'t>(
        &self,
        caps: &'t Captures<'_>,
        next: Option<char>,
        is_attr: bool,
    ) -> Option<(char, &'t str)> {
        let terminated = caps.get(4).is_some_and(|m| !m.as_str().is_empty());
        if let Some(hex) = caps.get(1) {
            return code_point(u32::from_str_radix(hex.as_str(), 16).ok()?).map(|c| (c, ""));
        }
        if let Some(dec) = caps.get(2) {
            return code_point(dec.as_str().parse().ok()?).map(|c| (c, ""));
        }
        let name = caps.get(3)?.as_str();
        if terminated {
            return self.table.get(name).map(|&c| (c, ""));
        }

        // Without a semicolon only the legacy names are recognized, and
        // in attribute values only when nothing name-like follows.
        let legacy = LEGACY_NAMES
            .iter()
            .filter(|legacy| name.starts_with(*legacy))
            .max_by_key(|legacy| legacy.len())?;
        let rest = &name[legacy.len()..];
        if is_attr {
            let follower = rest.chars().next().or(next);
            if follower.is_some_and(|c| c.is_ascii_alphanumeric() || c == '=') {
                return None;
            }
        }
        self.table.get(legacy).map(|&c| (c, rest))
    }
}

/// Replace the special entities in one left-to-right pass; replaced text is
/// never rescanned.
#[must_use]
pub fn substitute_special(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        match SPECIAL_ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, replacement)) => {
                out.push_str(replacement);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Ampersands that could begin a reference: not followed by a space and
/// not the final character.
fn count_escapable_ampersands(text: &str) -> usize {
    let total = text.matches('&').count();
    let spaced = text.matches("& ").count();
    let trailing = usize::from(text.ends_with('&'));
    total.saturating_sub(spaced + trailing)
}

/// Scalar values only; NUL and surrogates are rejected.
fn code_point(n: u32) -> Option<char> {
    if n == 0 {
        return None;
    }
    char::from_u32(n)
}
