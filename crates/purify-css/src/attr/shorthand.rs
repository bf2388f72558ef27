//! Shorthand properties that bundle several sub-properties.
//!
//! [CSS 2.1 § 1.4.3 Shorthand properties](https://www.w3.org/TR/CSS21/about.html#shorthand)
//! "Some properties are shorthand properties, meaning that they allow
//! authors to specify the values of several properties with a single
//! property."
//!
//! Each space-separated token is offered to the sub-properties in a fixed
//! priority order and taken by the first unfilled one that accepts it.
//! Tokens nobody accepts are dropped. The accepted values are written back
//! in a fixed canonical order.

use strum_macros::Display;

use super::{AttrContext, AttrDef};
use crate::number::{munge_color_functions, parse_cdata, words};

/// Which shorthand, for the rules specific to each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ShorthandKind {
    /// [§ 14.2.1](https://www.w3.org/TR/CSS21/colors.html#propdef-background)
    /// "[`<'background-color'>` || `<'background-image'>` ||
    /// `<'background-repeat'>` || `<'background-attachment'>` ||
    /// `<'background-position'>`]"
    Background,
    /// [§ 8.5.4](https://www.w3.org/TR/CSS21/box.html#propdef-border)
    /// "[ `<border-width>` || `<border-style>` || `<'border-top-color'>` ]"
    Border,
    /// [§ 12.5.1](https://www.w3.org/TR/CSS21/generate.html#propdef-list-style)
    /// "[ `<'list-style-type'>` || `<'list-style-position'>` ||
    /// `<'list-style-image'>` ]"
    ListStyle,
}

/// One sub-property slot.
#[derive(Debug, Clone)]
struct ShorthandField {
    name: &'static str,
    def: AttrDef,
    /// Collects every leftover token and validates them together at the end
    /// (`background-position` takes up to two words).
    collects_rest: bool,
}

/// A space-separated shorthand validator.
#[derive(Debug, Clone)]
pub struct Shorthand {
    kind: ShorthandKind,
    /// Fields in assignment priority order.
    fields: Vec<ShorthandField>,
    /// Field indices in serialization order.
    output_order: Vec<usize>,
}

impl Shorthand {
    /// `background` from its sub-property validators.
    #[must_use]
    pub fn background(
        color: AttrDef,
        image: AttrDef,
        repeat: AttrDef,
        attachment: AttrDef,
        position: AttrDef,
    ) -> Self {
        Self {
            kind: ShorthandKind::Background,
            fields: vec![
                field("color", color),
                field("image", image),
                field("repeat", repeat),
                field("attachment", attachment),
                ShorthandField {
                    name: "position",
                    def: position,
                    collects_rest: true,
                },
            ],
            output_order: vec![0, 1, 2, 3, 4],
        }
    }

    /// `border` (and `border-top` etc.) from width, style and color.
    #[must_use]
    pub fn border(width: AttrDef, style: AttrDef, color: AttrDef) -> Self {
        Self {
            kind: ShorthandKind::Border,
            fields: vec![
                field("width", width),
                field("style", style),
                field("color", color),
            ],
            output_order: vec![0, 1, 2],
        }
    }

    /// `list-style` from type, position and image. Written back as
    /// type, image, position.
    #[must_use]
    pub fn list_style(list_type: AttrDef, position: AttrDef, image: AttrDef) -> Self {
        Self {
            kind: ShorthandKind::ListStyle,
            fields: vec![
                field("type", list_type),
                field("position", position),
                field("image", image),
            ],
            output_order: vec![0, 2, 1],
        }
    }

    /// Names of the sub-properties in priority order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Decompose and validate a shorthand value.
    #[must_use]
    pub fn validate(&self, value: &str, cx: &mut AttrContext<'_>) -> Option<String> {
        let value = munge_color_functions(&parse_cdata(value));
        if value.is_empty() {
            return None;
        }

        let mut caught: Vec<Option<String>> = vec![None; self.fields.len()];
        let mut rest: Vec<Vec<&str>> = vec![Vec::new(); self.fields.len()];
        let mut assigned = 0usize;
        // `list-style: none` may set the type, but only once.
        let mut seen_none = false;

        for bit in words(&value) {
            for (i, field) in self.fields.iter().enumerate() {
                if field.collects_rest {
                    rest[i].push(bit);
                    assigned += 1;
                    break;
                }
                if caught[i].is_some() {
                    continue;
                }
                let Some(result) = field.def.validate(bit, cx) else {
                    continue;
                };
                if self.kind == ShorthandKind::ListStyle && result == "none" {
                    if seen_none {
                        continue;
                    }
                    seen_none = true;
                    if field.name == "image" {
                        continue;
                    }
                }
                caught[i] = Some(result);
                assigned += 1;
                break;
            }
        }
        if assigned == 0 {
            return None;
        }

        for (i, field) in self.fields.iter().enumerate() {
            if field.collects_rest && !rest[i].is_empty() {
                caught[i] = field.def.validate(&rest[i].join(" "), cx);
            }
        }

        let parts: Vec<String> = self
            .output_order
            .iter()
            .filter_map(|&i| caught[i].take())
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(parts.join(" "))
    }
}

fn field(name: &'static str, def: AttrDef) -> ShorthandField {
    ShorthandField {
        name,
        def,
        collects_rest: false,
    }
}

/// [§ 15.8 Shorthand font property](https://www.w3.org/TR/CSS21/fonts.html#font-shorthand)
/// "[ [ `<'font-style'>` || `<'font-variant'>` || `<'font-weight'>` ]?
/// `<'font-size'>` [ / `<'line-height'>` ]? `<'font-family'>` ] | caption |
/// icon | menu | message-box | small-caption | status-bar"
#[derive(Debug, Clone)]
pub struct FontShorthand {
    /// `font-style`, `font-variant`, `font-weight` in that order.
    prefix: [AttrDef; 3],
    size: AttrDef,
    line_height: AttrDef,
    family: AttrDef,
}

const SYSTEM_FONTS: [&str; 6] = [
    "caption",
    "icon",
    "menu",
    "message-box",
    "small-caption",
    "status-bar",
];

impl FontShorthand {
    /// `font` from its sub-property validators.
    #[must_use]
    pub const fn new(
        style: AttrDef,
        variant: AttrDef,
        weight: AttrDef,
        size: AttrDef,
        line_height: AttrDef,
        family: AttrDef,
    ) -> Self {
        Self {
            prefix: [style, variant, weight],
            size,
            line_height,
            family,
        }
    }

    /// Validate a `font` value. Size and family are mandatory.
    #[must_use]
    pub fn validate(&self, value: &str, cx: &mut AttrContext<'_>) -> Option<String> {
        let value = parse_cdata(value);
        if value.is_empty() {
            return None;
        }
        let lower = value.to_ascii_lowercase();
        if SYSTEM_FONTS.contains(&lower.as_str()) {
            return Some(lower);
        }

        let bits: Vec<&str> = words(&value).collect();
        let mut prefix: [Option<String>; 3] = [None, None, None];
        let mut i = 0;

        // Style, variant and weight, in any order.
        while i < bits.len() && prefix.iter().any(Option::is_none) {
            let caught = self.prefix.iter().enumerate().find_map(|(slot, def)| {
                if prefix[slot].is_some() {
                    return None;
                }
                def.validate(bits[i], cx).map(|r| (slot, r))
            });
            match caught {
                Some((slot, result)) => {
                    prefix[slot] = Some(result);
                    i += 1;
                }
                None => break,
            }
        }

        // Size, with an optional "/line-height" attached or separated.
        let size_bit = bits.get(i)?;
        let (size, mut line_height, mut found_slash) = match size_bit.split_once('/') {
            Some((size, "")) => (size, None, true),
            Some((size, lh)) => (size, Some(lh), true),
            None => (*size_bit, None, false),
        };
        let size = self.size.validate(size, cx)?;
        i += 1;
        if line_height.is_none() {
            while let Some(&bit) = bits.get(i) {
                if bit == "/" {
                    if found_slash {
                        return None;
                    }
                    found_slash = true;
                    i += 1;
                    continue;
                }
                if found_slash {
                    line_height = Some(bit);
                    i += 1;
                }
                break;
            }
        }
        let line_height = line_height.and_then(|lh| self.line_height.validate(lh, cx));

        // Everything left is the family list.
        if i >= bits.len() {
            return None;
        }
        let family = self.family.validate(&bits[i..].join(" "), cx)?;

        let mut parts: Vec<String> = prefix.into_iter().flatten().collect();
        parts.push(match line_height {
            Some(lh) => format!("{size}/{lh}"),
            None => size,
        });
        parts.push(family);
        Some(parts.join(" "))
    }
}
