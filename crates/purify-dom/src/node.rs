use std::fmt::Write;

use crate::token::{ArmorSet, Attributes, Position, Token, TokenKind, is_html_whitespace};

/// An element in the node tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Attributes,
    /// Child nodes. Never contains raw tokens.
    pub children: Vec<Node>,
    /// Came from an empty (`<br />`) token; flattens back to one.
    pub empty: bool,
    /// Position of the start tag.
    pub start: Position,
    /// Position of the end tag.
    pub end: Position,
    /// Exemptions of the start tag.
    pub armor: ArmorSet,
    /// Exemptions of the end tag.
    pub end_armor: ArmorSet,
}

impl Element {
    /// An element with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// An element with the given children.
    #[must_use]
    pub fn with_children(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::new(name)
        }
    }
}

/// A node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element and its subtree.
    Element(Element),
    /// Character data.
    Text {
        /// The characters.
        data: String,
        /// True when `data` is non-empty and only whitespace.
        is_whitespace: bool,
        /// Where the text started.
        pos: Position,
    },
    /// A comment.
    Comment {
        /// The comment text.
        data: String,
        /// Where the comment started.
        pos: Position,
    },
}

impl Node {
    /// Element node with children.
    #[must_use]
    pub fn element(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self::Element(Element::with_children(name, children))
    }

    /// Text node; the whitespace flag is derived from `data`.
    #[must_use]
    pub fn text(data: impl Into<String>) -> Self {
        let data = data.into();
        Self::Text {
            is_whitespace: !data.is_empty() && data.chars().all(is_html_whitespace),
            data,
            pos: Position::default(),
        }
    }

    /// Tag name of element nodes.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Element(element) => Some(&element.name),
            Self::Text { .. } | Self::Comment { .. } => None,
        }
    }

    /// The element, if this is one.
    #[must_use]
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// The element, mutably, if this is one.
    pub const fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// True for whitespace-only text.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(
            self,
            Self::Text {
                is_whitespace: true,
                ..
            }
        )
    }

    /// True for text nodes.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    /// True for comment nodes.
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self, Self::Comment { .. })
    }

    /// Build the node for a non-end token. End tokens have no node form.
    #[must_use]
    pub fn from_token(token: Token) -> Option<Self> {
        let pos = token.pos;
        let empty = token.is_empty_tag();
        match token.kind {
            TokenKind::Start { name, attrs } | TokenKind::Empty { name, attrs } => {
                Some(Self::Element(Element {
                    empty,
                    name,
                    attrs,
                    children: Vec::new(),
                    start: pos,
                    end: Position::default(),
                    armor: token.armor,
                    end_armor: ArmorSet::new(),
                }))
            }
            TokenKind::Text {
                data,
                is_whitespace,
            } => Some(Self::Text {
                data,
                is_whitespace,
                pos,
            }),
            TokenKind::Comment { data } => Some(Self::Comment { data, pos }),
            TokenKind::End { .. } => None,
        }
    }

    /// Split into the token that opens this node, the token that closes it
    /// (elements with content only) and the children to emit in between.
    #[must_use]
    pub fn into_token_pair(self) -> (Token, Option<Token>, Vec<Self>) {
        match self {
            Self::Element(element) if element.empty => {
                let mut token = Token::empty(element.name, element.attrs).with_position(element.start);
                token.armor = element.armor;
                (token, None, Vec::new())
            }
            Self::Element(element) => {
                let mut start = Token::start(element.name.clone(), element.attrs)
                    .with_position(element.start);
                start.armor = element.armor;
                let mut end = Token::end(element.name).with_position(element.end);
                end.armor = element.end_armor;
                (start, Some(end), element.children)
            }
            Self::Text {
                data,
                is_whitespace,
                pos,
            } => (
                Token {
                    kind: TokenKind::Text {
                        data,
                        is_whitespace,
                    },
                    pos,
                    armor: ArmorSet::new(),
                },
                None,
                Vec::new(),
            ),
            Self::Comment { data, pos } => (Token::comment(data).with_position(pos), None, Vec::new()),
        }
    }

    /// Indented outline of the subtree, one node per line.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(&Self, usize)> = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            let prefix = "  ".repeat(depth);
            match node {
                Self::Element(element) => {
                    let attrs: Vec<String> = element
                        .attrs
                        .iter()
                        .map(|a| format!(" {}=\"{}\"", a.name, a.value))
                        .collect();
                    let _ = writeln!(out, "{prefix}<{}{}>", element.name, attrs.concat());
                    for child in element.children.iter().rev() {
                        stack.push((child, depth + 1));
                    }
                }
                Self::Text { data, .. } => {
                    let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
                    let _ = writeln!(out, "{prefix}\"{display}\"");
                }
                Self::Comment { data, .. } => {
                    let _ = writeln!(out, "{prefix}<!-- {data} -->");
                }
            }
        }
        out
    }
}
