//! Attribute and CSS value validation for the purify sanitizer.
//!
//! # Scope
//!
//! This crate implements:
//! - **Numbers and lengths** ([CSS 2.1 § 4.3](https://www.w3.org/TR/CSS21/syndata.html#values))
//!   - Number normalization
//!   - Length parsing, comparison, and unit conversion across systems
//!
//! - **Colors** ([CSS Color Level 3](https://www.w3.org/TR/css-color-3/))
//!   - Keywords, hex, `rgb()`/`rgba()`, `hsl()`/`hsla()`
//!   - HTML presentational colors
//!
//! - **URIs** ([RFC 3986](https://www.rfc-editor.org/rfc/rfc3986))
//!   - Component parsing, percent-encoding normalization, scheme and host policy
//!
//! - **Attribute definitions**
//!   - [`AttrDef`], the closed set of value validators and their combinators
//!   - Shorthands (`background`, `border`, `list-style`, `font`)
//!   - [`CssDefinition`], the property table behind `style` attributes

mod attr;
pub mod color;
mod definition;
pub mod length;
pub mod number;
pub mod unit_converter;
pub mod uri;

pub use attr::{
    AttrContext, AttrDef, AttrSettings, FontShorthand, IdAccumulator, Shorthand, ShorthandKind,
};
pub use definition::CssDefinition;
pub use length::{Length, Unit};
pub use unit_converter::UnitConverter;
pub use uri::{Uri, UriSettings};
