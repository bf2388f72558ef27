//! Markup in and markup out for the purify sanitizer.
//!
//! # Scope
//!
//! This crate implements:
//! - **Input normalization**: newlines, CDATA, conditional comments, body
//!   extraction, processing instructions, script contents
//!
//! - **Entity decoding** ([HTML 4.01 § 5.3](https://www.w3.org/TR/html401/charset.html#h-5.3))
//!   - Fast path for the markup-significant entities
//!   - Numeric and named references, with the attribute-value rules
//!
//! - **Lexers**
//!   - [`DirectLex`], a position-tracking scanner with repair diagnostics
//!   - [`NativeLex`], backed by html5ever
//!
//! - **Generator**: token stream back to escaped markup

pub mod entities;
pub mod entity_table;
pub mod generator;
pub mod lexer;
pub mod normalize;

pub use entities::EntityParser;
pub use generator::Generator;
pub use lexer::{DirectLex, LexContext, Lexer, LexerKind, NativeLex};
pub use normalize::{NormalizeSettings, normalize};
