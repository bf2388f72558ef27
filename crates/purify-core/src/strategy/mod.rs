//! The passes that turn a raw token stream into a schema-conforming tree.
//!
//! Two passes work on tokens (removing foreign elements, then balancing
//! tags), two on the arborized tree (content models, then attributes). Every
//! pass walks with an explicit stack or queue.

mod attr_validator;
mod fix_nesting;
mod make_well_formed;
mod remove_foreign;
mod validate_attributes;

use std::collections::HashSet;

use purify_common::Config;
use purify_dom::{Token, arborize, flatten};
use purify_html::Generator;

use crate::definition::HtmlDefinition;
use crate::purifier::PurifyContext;

pub use attr_validator::validate_element_attributes;
pub use fix_nesting::fix_nesting;
pub use make_well_formed::make_well_formed;
pub use remove_foreign::remove_foreign_elements;
pub use validate_attributes::validate_attributes;

/// Directives read by the strategies.
#[derive(Debug, Clone, Default)]
pub struct StrategySettings {
    /// `Core.HiddenElements`: unknown elements dropped together with their
    /// contents.
    pub hidden_elements: HashSet<String>,
    /// `Core.EscapeInvalidTags`: unknown tags become text.
    pub escape_invalid_tags: bool,
    /// `HTML.AllowedComments`: comment bodies that survive.
    pub allowed_comments: HashSet<String>,
}

impl StrategySettings {
    /// Read the directives.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            hidden_elements: config
                .get_set("Core.HiddenElements")
                .into_iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
            escape_invalid_tags: config.get_bool("Core.EscapeInvalidTags"),
            allowed_comments: config
                .get_set("HTML.AllowedComments")
                .into_iter()
                .map(|comment| comment.trim().to_string())
                .collect(),
        }
    }
}

/// Run every pass over `tokens` and return the fixed stream.
#[must_use]
pub fn run(
    tokens: Vec<Token>,
    definition: &HtmlDefinition,
    settings: &StrategySettings,
    generator: &Generator,
    cx: &mut PurifyContext<'_>,
) -> Vec<Token> {
    let tokens = remove_foreign_elements(tokens, definition, settings, generator, cx);
    let tokens = make_well_formed(tokens, definition, cx);
    let mut root = arborize(tokens, definition.root_name());
    fix_nesting(&mut root, definition, cx);
    validate_attributes(&mut root, definition, cx);
    flatten(root)
}
