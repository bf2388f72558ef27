//! Attribute-definition combinator library.
//!
//! Every attribute value and every CSS property value passes through an
//! [`AttrDef`]: a closed set of validators that either return the value in
//! normalized form or reject it. Larger validators are built by composing
//! smaller ones (alternation, repetition, decorators, shorthands).

mod css;
mod html;
mod shorthand;

use std::collections::{HashMap, HashSet};

use purify_common::Config;

use crate::color::{DEFAULT_COLOR_KEYWORDS, validate_alpha, validate_css_color, validate_html_color};
use crate::definition::CssDefinition;
use crate::length::Length;
use crate::number::{normalize_number, parse_cdata};
use crate::uri::UriSettings;

pub use shorthand::{FontShorthand, Shorthand, ShorthandKind};

/// Configuration-derived settings read by validators.
#[derive(Debug, Clone)]
pub struct AttrSettings {
    /// URI policy.
    pub uri: UriSettings,
    /// `Attr.EnableID`
    pub enable_id: bool,
    /// `Attr.IDPrefix`
    pub id_prefix: String,
    /// `Attr.AllowedFrameTargets`
    pub allowed_frame_targets: HashSet<String>,
    /// `Attr.AllowedRel`
    pub allowed_rel: HashSet<String>,
    /// Color keyword table.
    pub color_keywords: HashMap<String, String>,
}

impl Default for AttrSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AttrSettings {
    /// Read the `Attr.*` and `URI.*` directives.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            uri: UriSettings::from_config(config),
            enable_id: config.get_bool("Attr.EnableID"),
            id_prefix: config.get_str("Attr.IDPrefix").unwrap_or_default().to_string(),
            allowed_frame_targets: config.get_set("Attr.AllowedFrameTargets"),
            allowed_rel: config
                .get_set("Attr.AllowedRel")
                .into_iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            color_keywords: DEFAULT_COLOR_KEYWORDS.clone(),
        }
    }
}

/// IDs already used in the document being purified.
#[derive(Debug, Default, Clone)]
pub struct IdAccumulator {
    ids: HashSet<String>,
}

impl IdAccumulator {
    /// An empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an ID. Returns false if it was already taken.
    pub fn add(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    /// Whether an ID is taken.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

/// Ambient state for one validation call.
#[derive(Debug)]
pub struct AttrContext<'a> {
    /// Name of the element whose attribute is being validated.
    pub element: &'a str,
    /// Configuration-derived settings.
    pub settings: &'a AttrSettings,
    /// Property table for `style` attributes.
    pub css: &'a CssDefinition,
    /// IDs used so far in this document.
    pub ids: &'a mut IdAccumulator,
}

/// A validator for one attribute or property value.
#[derive(Debug, Clone)]
pub enum AttrDef {
    // ========== Combinators ==========
    /// First alternative that accepts wins.
    Composite(Vec<AttrDef>),
    /// Up to `max` space-separated values each accepted by `single`.
    Multiple {
        /// Validator for each value.
        single: Box<AttrDef>,
        /// Maximum number of values kept.
        max: usize,
    },
    /// Strips a trailing `!important`, validates the rest, and puts the
    /// marker back when `allow` is set.
    Important {
        /// Delegate.
        def: Box<AttrDef>,
        /// Whether `!important` survives.
        allow: bool,
    },
    /// Rejects everything on one element, delegates elsewhere.
    DenyElement {
        /// Delegate.
        def: Box<AttrDef>,
        /// Element on which the value is always rejected.
        element: String,
    },
    /// Picks a validator depending on the element.
    Switch {
        /// Element name selecting `with_tag`.
        tag: String,
        /// Used on `tag`.
        with_tag: Box<AttrDef>,
        /// Used everywhere else.
        without_tag: Box<AttrDef>,
    },

    // ========== Shared primitives ==========
    /// Any text (CDATA normalized).
    Text,
    /// One of a fixed set of keywords.
    Enum {
        /// Accepted values.
        values: Vec<String>,
        /// Whether matching is case sensitive.
        case_sensitive: bool,
    },
    /// `<number>`, optionally non-negative.
    Number {
        /// Reject negative numbers.
        non_negative: bool,
    },
    /// `<percentage>`, optionally non-negative.
    Percentage {
        /// Reject negative percentages.
        non_negative: bool,
    },
    /// `<length>` with optional inclusive bounds.
    Length {
        /// Smallest accepted length.
        min: Option<Length>,
        /// Largest accepted length.
        max: Option<Length>,
    },
    /// CSS color.
    CssColor,
    /// `<alpha-value>` clamped into 0..1.
    AlphaValue,
    /// CSS identifier.
    Ident,
    /// `url(...)` in a style value.
    CssUri,
    /// `alpha(opacity=N)` filter.
    Filter,
    /// `text-decoration` keywords.
    TextDecoration,
    /// `font-family` list.
    FontFamily,
    /// `background-position`.
    BackgroundPosition,
    /// Space-separated shorthand (`background`, `border`, `list-style`).
    Shorthand(Box<Shorthand>),
    /// `font` shorthand.
    Font(Box<FontShorthand>),
    /// Entire `style` attribute.
    Css,

    // ========== HTML attribute types ==========
    /// HTML integer with sign constraints.
    Integer {
        /// Accept negative values.
        negative: bool,
        /// Accept zero.
        zero: bool,
        /// Accept positive values.
        positive: bool,
    },
    /// Pixel count, clamped to `max`.
    Pixels {
        /// Upper clamp.
        max: Option<i64>,
    },
    /// Pixels or percentage.
    HtmlLength,
    /// Pixels, percentage or relative `N*`.
    MultiLength,
    /// HTML presentational color.
    HtmlColor,
    /// Boolean attribute; the value becomes the attribute name.
    Bool(String),
    /// `id`, prefixed and unique per document.
    Id,
    /// `class` list.
    Class,
    /// Space-separated name tokens.
    Nmtokens,
    /// Language code.
    Lang,
    /// `target` restricted to the configured frame targets.
    FrameTarget,
    /// `rel`/`rev` restricted to the configured link types.
    LinkTypes,
    /// URI attribute.
    Uri {
        /// The browser fetches it without user action (`img src`).
        embedded: bool,
    },
}

impl AttrDef {
    // ========== Constructors ==========

    /// Enum from string slices.
    #[must_use]
    pub fn enumeration(values: &[&str], case_sensitive: bool) -> Self {
        Self::Enum {
            values: values.iter().map(ToString::to_string).collect(),
            case_sensitive,
        }
    }

    /// Length bounded below.
    #[must_use]
    pub fn length_min(min: &str) -> Self {
        Self::Length {
            min: Some(Length::parse(min)),
            max: None,
        }
    }

    /// Unbounded length.
    #[must_use]
    pub const fn length() -> Self {
        Self::Length {
            min: None,
            max: None,
        }
    }

    /// Ordered alternation.
    #[must_use]
    pub const fn composite(defs: Vec<Self>) -> Self {
        Self::Composite(defs)
    }

    /// Repetition.
    #[must_use]
    pub fn multiple(single: Self, max: usize) -> Self {
        Self::Multiple {
            single: Box::new(single),
            max,
        }
    }

    /// `!important` decorator.
    #[must_use]
    pub fn important(def: Self, allow: bool) -> Self {
        Self::Important {
            def: Box::new(def),
            allow,
        }
    }

    /// Element deny decorator.
    #[must_use]
    pub fn deny_element(def: Self, element: &str) -> Self {
        Self::DenyElement {
            def: Box::new(def),
            element: element.to_string(),
        }
    }

    /// Element switch.
    #[must_use]
    pub fn switch(tag: &str, with_tag: Self, without_tag: Self) -> Self {
        Self::Switch {
            tag: tag.to_string(),
            with_tag: Box::new(with_tag),
            without_tag: Box::new(without_tag),
        }
    }

    // ========== Validation ==========

    /// Validate `value`, returning its normalized form or `None` if it is
    /// not acceptable.
    #[must_use]
    pub fn validate(&self, value: &str, cx: &mut AttrContext<'_>) -> Option<String> {
        match self {
            Self::Composite(defs) => defs.iter().find_map(|def| def.validate(value, cx)),
            Self::Multiple { single, max } => css::validate_multiple(single, *max, value, cx),
            Self::Important { def, allow } => css::validate_important(def, *allow, value, cx),
            Self::DenyElement { def, element } => {
                if cx.element == element {
                    return None;
                }
                def.validate(value, cx)
            }
            Self::Switch {
                tag,
                with_tag,
                without_tag,
            } => {
                if cx.element == tag {
                    with_tag.validate(value, cx)
                } else {
                    without_tag.validate(value, cx)
                }
            }
            Self::Text => Some(parse_cdata(value)),
            Self::Enum {
                values,
                case_sensitive,
            } => {
                let value = value.trim();
                let value = if *case_sensitive {
                    value.to_string()
                } else {
                    value.to_ascii_lowercase()
                };
                values.contains(&value).then_some(value)
            }
            Self::Number { non_negative } => normalize_number(value, *non_negative),
            Self::Percentage { non_negative } => css::validate_percentage(value, *non_negative),
            Self::Length { min, max } => css::validate_length(value, min.as_ref(), max.as_ref()),
            Self::CssColor => validate_css_color(value, &cx.settings.color_keywords),
            Self::AlphaValue => validate_alpha(&parse_cdata(value)),
            Self::Ident => css::validate_ident(value),
            Self::CssUri => css::validate_css_uri(value, cx),
            Self::Filter => css::validate_filter(value),
            Self::TextDecoration => css::validate_text_decoration(value),
            Self::FontFamily => css::validate_font_family(value),
            Self::BackgroundPosition => css::validate_background_position(value),
            Self::Shorthand(shorthand) => shorthand.validate(value, cx),
            Self::Font(font) => font.validate(value, cx),
            Self::Css => css::validate_style(value, cx),
            Self::Integer {
                negative,
                zero,
                positive,
            } => html::validate_integer(value, *negative, *zero, *positive),
            Self::Pixels { max } => html::validate_pixels(value, *max),
            Self::HtmlLength => html::validate_html_length(value),
            Self::MultiLength => html::validate_multi_length(value),
            Self::HtmlColor => validate_html_color(value, &cx.settings.color_keywords),
            Self::Bool(name) => Some(name.clone()),
            Self::Id => html::validate_id(value, cx),
            Self::Class => html::validate_class(value),
            Self::Nmtokens => html::validate_nmtokens(value),
            Self::Lang => html::validate_lang(value),
            Self::FrameTarget => {
                let value = value.trim();
                cx.settings
                    .allowed_frame_targets
                    .contains(value)
                    .then(|| value.to_string())
            }
            Self::LinkTypes => html::validate_link_types(value, &cx.settings.allowed_rel),
            Self::Uri { embedded } => html::validate_uri(value, *embedded, &cx.settings.uri),
        }
    }
}
