//! Token and node model for the purify sanitizer.
//!
//! Markup moves through the pipeline in two shapes:
//! - a flat, ordered [`Token`] stream (lexer output, generator input)
//! - a [`Node`] tree under a synthetic root element (nesting validation)
//!
//! [`arborize`] and [`flatten`] convert between them. Both use explicit
//! stacks so that adversarially deep markup cannot exhaust the call stack.

mod node;
mod token;
mod tree;

pub use node::{Element, Node};
pub use token::{
    Armor, ArmorSet, Attribute, Attributes, Position, Token, TokenKind, is_html_whitespace,
};
pub use tree::{arborize, flatten};
