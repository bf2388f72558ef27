//! Schema and tree fixing for the purify sanitizer.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML definition** ([XHTML 1.1 modularization](https://www.w3.org/TR/xhtml-modularization/))
//!   - Schema modules merged into per-element definitions
//!   - `HTML.Allowed` and the forbidden lists
//!   - Definitions cached by configuration fingerprint
//!
//! - **Content models**: [`ChildDef`] and its correction verdicts
//!
//! - **Strategies**
//!   - Foreign element removal, tag balancing
//!   - Nesting fixes and attribute validation over the tree
//!
//! - **Transforms**: deprecated elements and attributes rewritten as CSS
//!
//! - **[`Purifier`]**: markup in, sanitized markup out
//!
//! # Example
//!
//! ```
//! use purify_core::{Config, Purifier};
//!
//! let purifier = Purifier::new(Config::default()).unwrap();
//! let clean = purifier.purify("<b onclick=\"x()\">bold</b>").unwrap();
//! assert_eq!(clean.html, "<b>bold</b>");
//! ```

pub use purify_common as common;
pub use purify_css as css;
pub use purify_dom as dom;
pub use purify_html as html;

pub mod child_def;
pub mod definition;
pub mod purifier;
pub mod strategy;
pub mod transform;

pub use child_def::{ChildDef, ChildResult};
pub use definition::{DefinitionCaches, ElementDef, HtmlDefinition};
pub use purifier::{PurifyContext, Purified, Purifier};
pub use purify_common::{Config, PurifyError};
