use purify_common::Severity;
use purify_dom::{Armor, Token, TokenKind};
use purify_html::Generator;

use super::StrategySettings;
use super::attr_validator::validate_element_attributes;
use crate::definition::HtmlDefinition;
use crate::purifier::PurifyContext;

/// Remove every token the schema does not know.
///
/// Tag transforms run first, so a deprecated element that has a modern
/// replacement survives under its new name. Start and empty tags of known
/// elements get their attributes validated here and are armored against a
/// second validation; when a required attribute is missing only that tag
/// is dropped, and the unmatched end tag is left for the balancing pass.
/// Unknown tags are dropped (or escaped as text), except that a hidden
/// element takes everything up to its matching end tag with it. Comments
/// survive only when listed in `HTML.AllowedComments`.
#[must_use]
pub fn remove_foreign_elements(
    tokens: Vec<Token>,
    definition: &HtmlDefinition,
    settings: &StrategySettings,
    generator: &Generator,
    cx: &mut PurifyContext<'_>,
) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    // Name and nesting depth of the hidden element being skipped.
    let mut hidden: Option<(String, usize)> = None;

    for mut token in tokens {
        let line = token.pos.line;

        if let Some((name, depth)) = &mut hidden {
            match &token.kind {
                TokenKind::Start { name: n, .. } if n == name.as_str() => *depth += 1,
                TokenKind::End { name: n } if n == name.as_str() => *depth -= 1,
                _ => {}
            }
            if *depth == 0 {
                hidden = None;
            }
            continue;
        }

        match &token.kind {
            TokenKind::Text { .. } => out.push(token),
            TokenKind::Comment { data } => {
                if settings.allowed_comments.contains(data.trim()) {
                    out.push(token);
                } else {
                    cx.errors.send(
                        Severity::Notice,
                        "Strategy_RemoveForeignElements: Comment removed",
                        &[],
                        line,
                    );
                }
            }
            TokenKind::Start { .. } | TokenKind::End { .. } | TokenKind::Empty { .. } => {
                let Some(name) = token.name().map(str::to_string) else {
                    continue;
                };
                if let Some(transform) = definition.tag_transform(&name) {
                    token = transform.transform(token);
                }
                let Some(current) = token.name().map(str::to_string) else {
                    continue;
                };

                if let Some(def) = definition.element(&current) {
                    if token.is_end() {
                        out.push(token);
                        continue;
                    }
                    let Some(attrs) = token.attrs_mut() else {
                        continue;
                    };
                    if validate_element_attributes(&current, def, attrs, definition, cx, line) {
                        token.armor.insert(Armor::ValidateAttributes);
                        out.push(token);
                    } else {
                        cx.errors.send(
                            Severity::Error,
                            "Strategy_RemoveForeignElements: Missing required attribute",
                            &[current.as_str()],
                            line,
                        );
                    }
                } else if settings.hidden_elements.contains(&current) {
                    if token.is_start() {
                        hidden = Some((current.clone(), 1));
                    }
                    cx.errors.send(
                        Severity::Error,
                        "Strategy_RemoveForeignElements: Foreign meta element removed",
                        &[current.as_str()],
                        line,
                    );
                } else if settings.escape_invalid_tags {
                    out.push(Token::text(generator.render_token(&token)).with_position(token.pos));
                } else {
                    cx.errors.send(
                        Severity::Error,
                        "Strategy_RemoveForeignElements: Foreign element removed",
                        &[current.as_str()],
                        line,
                    );
                }
            }
        }
    }

    tracing::debug!(kept = out.len(), "removed foreign elements");
    out
}
