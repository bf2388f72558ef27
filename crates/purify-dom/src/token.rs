use core::fmt;
use std::collections::BTreeSet;

use strum_macros::Display;

/// An attribute on a start or empty tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lower-cased attribute name.
    pub name: String,
    /// Entity-decoded value.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// Ordered attribute list with map-style access.
///
/// Source order is kept so that output is stable; a name appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    /// An empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Value of `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|a| a.name == name)
    }

    /// Set `name`, replacing an existing value in place or appending.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.0.push(Attribute::new(name.to_string(), value)),
        }
    }

    /// Add `name` only if it is not present yet. Returns whether it was added.
    pub fn set_if_absent(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.contains(name) {
            return false;
        }
        self.0.push(Attribute::new(name.to_string(), value.into()));
        true
    }

    /// Remove `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|a| a.name == name)?;
        Some(self.0.remove(index).value)
    }

    /// Keep only the attributes for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Attribute) -> bool) {
        self.0.retain(keep);
    }

    /// Iterate in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    /// Attribute names in source order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|a| a.name.as_str())
    }

    /// Number of attributes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no attributes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    /// Later duplicates of a name are ignored.
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            let name = name.into();
            let _ = attrs.set_if_absent(&name, value);
        }
        attrs
    }
}

impl IntoIterator for Attributes {
    type Item = Attribute;
    type IntoIter = std::vec::IntoIter<Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A pipeline operation a token can be exempted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Armor {
    /// Attributes were produced by the sanitizer itself; skip validation.
    ValidateAttributes,
    /// The closing of this element was already reported.
    TagClosedError,
}

/// Set of [`Armor`] flags carried by a token or element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArmorSet(BTreeSet<Armor>);

impl ArmorSet {
    /// No exemptions.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Add an exemption.
    pub fn insert(&mut self, armor: Armor) {
        let _ = self.0.insert(armor);
    }

    /// Whether the exemption is present.
    #[must_use]
    pub fn contains(&self, armor: Armor) -> bool {
        self.0.contains(&armor)
    }
}

/// Source position of a token (1-based line and column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Line number, when the lexer tracked it.
    pub line: Option<usize>,
    /// Column number, when the lexer tracked it.
    pub col: Option<usize>,
}

impl Position {
    /// A known position.
    #[must_use]
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line: Some(line),
            col: Some(col),
        }
    }
}

/// The five token shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Opening tag of an element with content.
    Start {
        /// Tag name.
        name: String,
        /// Attributes.
        attrs: Attributes,
    },
    /// Closing tag.
    End {
        /// Tag name.
        name: String,
    },
    /// Self-contained tag (`<br />`).
    Empty {
        /// Tag name.
        name: String,
        /// Attributes.
        attrs: Attributes,
    },
    /// Character data, already entity-decoded.
    Text {
        /// The characters.
        data: String,
        /// True when `data` is non-empty and only HTML whitespace.
        is_whitespace: bool,
    },
    /// Comment body without the `<!--`/`-->` delimiters.
    Comment {
        /// The comment text.
        data: String,
    },
}

/// One unit of the flat markup stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Where the token started in the source.
    pub pos: Position,
    /// Operations this token is exempt from.
    pub armor: ArmorSet,
}

/// Whitespace as far as text classification goes (space, tab, LF, VT, FF, CR).
#[must_use]
pub const fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\u{000C}' | '\r' | '\u{000B}')
}

impl Token {
    const fn from_kind(kind: TokenKind) -> Self {
        Self {
            kind,
            pos: Position {
                line: None,
                col: None,
            },
            armor: ArmorSet::new(),
        }
    }

    /// Start tag.
    #[must_use]
    pub fn start(name: impl Into<String>, attrs: Attributes) -> Self {
        Self::from_kind(TokenKind::Start {
            name: name.into(),
            attrs,
        })
    }

    /// End tag.
    #[must_use]
    pub fn end(name: impl Into<String>) -> Self {
        Self::from_kind(TokenKind::End { name: name.into() })
    }

    /// Empty (self-closing) tag.
    #[must_use]
    pub fn empty(name: impl Into<String>, attrs: Attributes) -> Self {
        Self::from_kind(TokenKind::Empty {
            name: name.into(),
            attrs,
        })
    }

    /// Text token; the whitespace flag is derived from `data`.
    #[must_use]
    pub fn text(data: impl Into<String>) -> Self {
        let data = data.into();
        let is_whitespace = !data.is_empty() && data.chars().all(is_html_whitespace);
        Self::from_kind(TokenKind::Text {
            data,
            is_whitespace,
        })
    }

    /// Comment token.
    #[must_use]
    pub fn comment(data: impl Into<String>) -> Self {
        Self::from_kind(TokenKind::Comment { data: data.into() })
    }

    /// Attach a source position.
    #[must_use]
    pub const fn with_position(mut self, pos: Position) -> Self {
        self.pos = pos;
        self
    }

    /// Tag name for start, end and empty tokens.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Start { name, .. }
            | TokenKind::End { name }
            | TokenKind::Empty { name, .. } => Some(name),
            TokenKind::Text { .. } | TokenKind::Comment { .. } => None,
        }
    }

    /// Attributes of start and empty tokens.
    #[must_use]
    pub const fn attrs(&self) -> Option<&Attributes> {
        match &self.kind {
            TokenKind::Start { attrs, .. } | TokenKind::Empty { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Mutable attributes of start and empty tokens.
    pub const fn attrs_mut(&mut self) -> Option<&mut Attributes> {
        match &mut self.kind {
            TokenKind::Start { attrs, .. } | TokenKind::Empty { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Rename a tag token. Text and comments are left alone.
    pub fn rename(&mut self, new_name: &str) {
        if let TokenKind::Start { name, .. }
        | TokenKind::End { name }
        | TokenKind::Empty { name, .. } = &mut self.kind
        {
            new_name.clone_into(name);
        }
    }

    /// True for start tokens.
    #[must_use]
    pub const fn is_start(&self) -> bool {
        matches!(self.kind, TokenKind::Start { .. })
    }

    /// True for end tokens.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::End { .. })
    }

    /// True for empty tokens.
    #[must_use]
    pub const fn is_empty_tag(&self) -> bool {
        matches!(self.kind, TokenKind::Empty { .. })
    }

    /// True for start, end and empty tokens.
    #[must_use]
    pub const fn is_tag(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Start { .. } | TokenKind::End { .. } | TokenKind::Empty { .. }
        )
    }

    /// True for text tokens.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, TokenKind::Text { .. })
    }

    /// True for whitespace-only text.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Text {
                is_whitespace: true,
                ..
            }
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Start { name, attrs } | TokenKind::Empty { name, attrs } => {
                write!(f, "<{name}")?;
                for attr in attrs {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if self.is_empty_tag() {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            TokenKind::End { name } => write!(f, "</{name}>"),
            TokenKind::Text { data, .. } => write!(f, "{data:?}"),
            TokenKind::Comment { data } => write!(f, "<!--{data}-->"),
        }
    }
}
