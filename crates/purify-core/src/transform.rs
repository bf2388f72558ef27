//! Presentational markup rewritten as CSS.
//!
//! Tag transforms rename deprecated elements before the schema sees them.
//! Attribute transforms run around attribute validation: the pre-transforms
//! turn deprecated attributes into `style` declarations (which are then
//! validated like any other style), the post-transforms fill in defaults.

use purify_dom::{Attributes, Token};

/// Put `css` in front of the element's existing `style`.
pub fn prepend_css(attrs: &mut Attributes, css: &str) {
    let style = match attrs.get("style") {
        Some(existing) => format!("{css}{existing}"),
        None => css.to_string(),
    };
    attrs.set("style", style);
}

// ========== Tag transforms ==========

/// Rewrites one deprecated element into an allowed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagTransform {
    /// Rename, optionally adding a style declaration.
    Simple {
        /// New element name.
        to: &'static str,
        /// Declaration prepended to `style` on start tags.
        css: Option<&'static str>,
    },
    /// `font` → `span`, mapping `color`, `face` and `size` to CSS.
    Font,
}

const FONT_SIZES: [(&str, &str); 14] = [
    ("0", "xx-small"),
    ("1", "xx-small"),
    ("2", "small"),
    ("3", "medium"),
    ("4", "large"),
    ("5", "x-large"),
    ("6", "xx-large"),
    ("7", "300%"),
    ("-1", "smaller"),
    ("-2", "60%"),
    ("+1", "larger"),
    ("+2", "150%"),
    ("+3", "200%"),
    ("+4", "300%"),
];

impl TagTransform {
    /// Rename to `to` without styling.
    #[must_use]
    pub const fn rename(to: &'static str) -> Self {
        Self::Simple { to, css: None }
    }

    /// Rename to `to` and prepend `css`.
    #[must_use]
    pub const fn styled(to: &'static str, css: &'static str) -> Self {
        Self::Simple { to, css: Some(css) }
    }

    /// Name of the element produced.
    #[must_use]
    pub const fn target(&self) -> &'static str {
        match self {
            Self::Simple { to, .. } => to,
            Self::Font => "span",
        }
    }

    /// Apply to a start, empty or end token.
    #[must_use]
    pub fn transform(&self, mut token: Token) -> Token {
        token.rename(self.target());
        let Some(attrs) = token.attrs_mut() else {
            return token;
        };
        match self {
            Self::Simple { css: Some(css), .. } => prepend_css(attrs, css),
            Self::Simple { css: None, .. } => {}
            Self::Font => {
                let css = font_css(attrs);
                if !css.is_empty() {
                    prepend_css(attrs, &css);
                }
            }
        }
        token
    }
}

fn font_css(attrs: &mut Attributes) -> String {
    let mut css = String::new();
    if let Some(color) = attrs.remove("color") {
        css.push_str(&format!("color:{color};"));
    }
    if let Some(face) = attrs.remove("face") {
        css.push_str(&format!("font-family:{face};"));
    }
    if let Some(size) = attrs.remove("size") {
        let size = clamp_font_size(size.trim());
        if let Some((_, keyword)) = FONT_SIZES.iter().find(|(key, _)| *key == size) {
            css.push_str(&format!("font-size:{keyword};"));
        }
    }
    css
}

/// Relative sizes saturate at -2 and +4, absolute ones at 7.
fn clamp_font_size(size: &str) -> String {
    let relative = size.starts_with('+') || size.starts_with('-');
    match size.parse::<i64>() {
        Ok(n) if relative && n < -2 => "-2".to_string(),
        Ok(n) if relative && n > 4 => "+4".to_string(),
        Ok(n) if !relative && n > 7 => "7".to_string(),
        _ => size.to_string(),
    }
}

// ========== Attribute transforms ==========

/// Rewrites an element's attributes around validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrTransform {
    /// `bgcolor` → `background-color`.
    BgColor,
    /// `border` on images → `border: Npx solid`.
    Border,
    /// A keyword attribute mapped to declarations by a lookup table.
    EnumToCss {
        /// Attribute consumed.
        attr: &'static str,
        /// Keyword → declarations.
        table: &'static [(&'static str, &'static str)],
        /// Whether keywords match case sensitively.
        case_sensitive: bool,
    },
    /// A pixel or percentage attribute mapped to one property.
    Length {
        /// Attribute consumed.
        attr: &'static str,
        /// Property written.
        property: &'static str,
    },
    /// A boolean attribute mapped to fixed declarations.
    BoolToCss {
        /// Attribute consumed.
        attr: &'static str,
        /// Declarations written when it is present.
        css: &'static str,
    },
    /// `hspace`/`vspace` on images → margins on both sides.
    ImgSpace {
        /// Attribute consumed.
        attr: &'static str,
    },
    /// Images get an `alt` derived from `src` when they lack one, and a
    /// placeholder `src` when one is configured.
    ImgRequired {
        /// Replacement text; `None` uses the file name of `src`.
        default_alt: Option<String>,
        /// Placeholder for a missing `src`; `None` leaves the image invalid.
        invalid_src: Option<String>,
        /// `alt` given to a placeholder image that has none.
        invalid_alt: String,
    },
    /// `xml:lang` is mirrored into `lang`.
    Lang,
}

impl AttrTransform {
    /// Apply in place.
    pub fn apply(&self, attrs: &mut Attributes) {
        match self {
            Self::BgColor => {
                if let Some(color) = attrs.remove("bgcolor") {
                    prepend_css(attrs, &format!("background-color:{};", color.trim()));
                }
            }
            Self::Border => {
                if let Some(width) = attrs.remove("border") {
                    let width = width.trim();
                    if is_digits(width) {
                        prepend_css(attrs, &format!("border:{width}px solid;"));
                    }
                }
            }
            Self::EnumToCss {
                attr,
                table,
                case_sensitive,
            } => {
                let Some(value) = attrs.remove(attr) else {
                    return;
                };
                let value = value.trim();
                let hit = table.iter().find(|(keyword, _)| {
                    if *case_sensitive {
                        *keyword == value
                    } else {
                        keyword.eq_ignore_ascii_case(value)
                    }
                });
                if let Some((_, css)) = hit {
                    prepend_css(attrs, css);
                }
            }
            Self::Length { attr, property } => {
                if let Some(value) = attrs.remove(attr) {
                    let value = value.trim();
                    if is_digits(value) {
                        prepend_css(attrs, &format!("{property}:{value}px;"));
                    } else if !value.is_empty() {
                        prepend_css(attrs, &format!("{property}:{value};"));
                    }
                }
            }
            Self::BoolToCss { attr, css } => {
                if attrs.remove(attr).is_some() {
                    prepend_css(attrs, css);
                }
            }
            Self::ImgSpace { attr } => {
                let Some(value) = attrs.remove(attr) else {
                    return;
                };
                let value = value.trim();
                if !is_digits(value) {
                    return;
                }
                let sides = if *attr == "hspace" {
                    ["left", "right"]
                } else {
                    ["top", "bottom"]
                };
                let css: String = sides
                    .iter()
                    .map(|side| format!("margin-{side}:{value}px;"))
                    .collect();
                prepend_css(attrs, &css);
            }
            Self::ImgRequired {
                default_alt,
                invalid_src,
                invalid_alt,
            } => {
                if !attrs.contains("src") {
                    let Some(placeholder) = invalid_src else {
                        return;
                    };
                    attrs.set("src", placeholder.as_str());
                    let _ = attrs.set_if_absent("alt", invalid_alt.as_str());
                    return;
                }
                if attrs.contains("alt") {
                    return;
                }
                let Some(src) = attrs.get("src") else {
                    return;
                };
                let alt = default_alt
                    .clone()
                    .unwrap_or_else(|| basename(src).to_string());
                attrs.set("alt", alt);
            }
            Self::Lang => {
                if let Some(lang) = attrs.get("xml:lang").map(str::to_string) {
                    attrs.set("lang", lang);
                }
            }
        }
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn basename(src: &str) -> &str {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}
