//! Token stream → markup.

use purify_dom::{Attributes, Token, TokenKind};

/// Escape `&`, `<`, `>` and `"` for text and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serializes tokens as markup.
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    /// Close empty elements with ` />`.
    xhtml: bool,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// A generator producing XHTML-compatible output (`<br />`).
    #[must_use]
    pub const fn new() -> Self {
        Self { xhtml: true }
    }

    /// A generator producing plain HTML output (`<br>`).
    #[must_use]
    pub const fn html() -> Self {
        Self { xhtml: false }
    }

    /// Render a whole token stream.
    #[must_use]
    pub fn render_all(&self, tokens: &[Token]) -> String {
        tokens.iter().map(|token| self.render_token(token)).collect()
    }

    /// Render one token.
    #[must_use]
    pub fn render_token(&self, token: &Token) -> String {
        match &token.kind {
            TokenKind::Start { name, attrs } => format!("<{name}{}>", render_attrs(attrs)),
            TokenKind::End { name } => format!("</{name}>"),
            TokenKind::Empty { name, attrs } => {
                let close = if self.xhtml { " />" } else { ">" };
                format!("<{name}{}{close}", render_attrs(attrs))
            }
            TokenKind::Text { data, .. } => escape(data),
            TokenKind::Comment { data } => format!("<!--{data}-->"),
        }
    }
}

/// Attributes in their stored order, each preceded by a space.
fn render_attrs(attrs: &Attributes) -> String {
    attrs
        .iter()
        .map(|attr| format!(" {}=\"{}\"", attr.name, escape(&attr.value)))
        .collect()
}
