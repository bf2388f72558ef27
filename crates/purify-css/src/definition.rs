//! The table of CSS properties accepted in `style` attributes.

use std::collections::BTreeMap;

use purify_common::Config;
use purify_common::warning::warn_once;

use crate::attr::{AttrDef, FontShorthand, Shorthand};
use crate::length::Length;

/// Property name → value validator.
#[derive(Debug, Clone, Default)]
pub struct CssDefinition {
    properties: BTreeMap<String, AttrDef>,
}

const BORDER_STYLES: [&str; 10] = [
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

const LIST_STYLE_TYPES: [&str; 9] = [
    "disc",
    "circle",
    "square",
    "decimal",
    "lower-roman",
    "upper-roman",
    "lower-alpha",
    "upper-alpha",
    "none",
];

impl CssDefinition {
    /// Build the table for a configuration.
    ///
    /// `CSS.AllowTricky` adds the properties that can hide content.
    /// `CSS.AllowedProperties` and `CSS.ForbiddenProperties` filter the
    /// result, and every value is wrapped in the `!important` handler.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut properties = BTreeMap::new();
        let mut add = |name: &str, def: AttrDef| {
            let _ = properties.insert(name.to_string(), def);
        };

        // ====== Text ======
        add(
            "text-align",
            AttrDef::enumeration(&["left", "right", "center", "justify"], false),
        );
        add("text-decoration", AttrDef::TextDecoration);
        add(
            "text-indent",
            AttrDef::composite(vec![AttrDef::length(), percentage(false)]),
        );
        add(
            "text-transform",
            AttrDef::enumeration(&["capitalize", "uppercase", "lowercase", "none"], false),
        );
        add(
            "white-space",
            AttrDef::enumeration(&["nowrap", "normal", "pre", "pre-wrap", "pre-line"], false),
        );
        add(
            "vertical-align",
            AttrDef::composite(vec![
                AttrDef::enumeration(
                    &[
                        "baseline",
                        "sub",
                        "super",
                        "top",
                        "text-top",
                        "middle",
                        "bottom",
                        "text-bottom",
                    ],
                    false,
                ),
                AttrDef::length(),
                percentage(false),
            ]),
        );
        let spacing = || {
            AttrDef::composite(vec![
                AttrDef::length(),
                AttrDef::enumeration(&["normal"], false),
            ])
        };
        add("letter-spacing", spacing());
        add("word-spacing", spacing());
        add("color", AttrDef::CssColor);

        // ====== Fonts ======
        let font_style = || AttrDef::enumeration(&["normal", "italic", "oblique"], false);
        let font_variant = || AttrDef::enumeration(&["normal", "small-caps"], false);
        let font_weight = || {
            AttrDef::enumeration(
                &[
                    "normal", "bold", "bolder", "lighter", "100", "200", "300", "400", "500",
                    "600", "700", "800", "900",
                ],
                false,
            )
        };
        let font_size = || {
            AttrDef::composite(vec![
                AttrDef::enumeration(
                    &[
                        "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large",
                        "larger", "smaller",
                    ],
                    false,
                ),
                percentage(true),
                AttrDef::length_min("0"),
            ])
        };
        let line_height = || {
            AttrDef::composite(vec![
                AttrDef::enumeration(&["normal"], false),
                AttrDef::Number { non_negative: true },
                AttrDef::length_min("0"),
                percentage(true),
            ])
        };
        add("font-style", font_style());
        add("font-variant", font_variant());
        add("font-weight", font_weight());
        add("font-size", font_size());
        add("line-height", line_height());
        add("font-family", AttrDef::FontFamily);
        add(
            "font",
            AttrDef::Font(Box::new(FontShorthand::new(
                font_style(),
                font_variant(),
                font_weight(),
                font_size(),
                line_height(),
                AttrDef::FontFamily,
            ))),
        );

        // ====== Backgrounds ======
        let image = || {
            AttrDef::composite(vec![
                AttrDef::enumeration(&["none"], false),
                AttrDef::CssUri,
            ])
        };
        let repeat = || {
            AttrDef::enumeration(&["repeat", "repeat-x", "repeat-y", "no-repeat"], false)
        };
        let attachment = || AttrDef::enumeration(&["scroll", "fixed"], false);
        let background_color = || {
            AttrDef::composite(vec![
                AttrDef::enumeration(&["transparent"], false),
                AttrDef::CssColor,
            ])
        };
        add("background-color", background_color());
        add("background-image", image());
        add("background-repeat", repeat());
        add("background-attachment", attachment());
        add("background-position", AttrDef::BackgroundPosition);
        add(
            "background",
            AttrDef::Shorthand(Box::new(Shorthand::background(
                background_color(),
                image(),
                repeat(),
                attachment(),
                AttrDef::BackgroundPosition,
            ))),
        );

        // ====== Box model ======
        let border_color = || {
            AttrDef::composite(vec![
                AttrDef::enumeration(&["transparent"], false),
                AttrDef::CssColor,
            ])
        };
        let border_style = || AttrDef::enumeration(&BORDER_STYLES, false);
        let border_width = || {
            AttrDef::composite(vec![
                AttrDef::enumeration(&["thin", "medium", "thick"], false),
                AttrDef::length_min("0"),
            ])
        };
        add("border-color", AttrDef::multiple(border_color(), 4));
        add("border-style", AttrDef::multiple(border_style(), 4));
        add("border-width", AttrDef::multiple(border_width(), 4));
        let border = || {
            AttrDef::Shorthand(Box::new(Shorthand::border(
                border_width(),
                border_style(),
                border_color(),
            )))
        };
        add("border", border());
        for side in ["top", "right", "bottom", "left"] {
            add(&format!("border-{side}-color"), border_color());
            add(&format!("border-{side}-style"), border_style());
            add(&format!("border-{side}-width"), border_width());
            add(&format!("border-{side}"), border());
        }

        let margin = || {
            AttrDef::composite(vec![
                AttrDef::length(),
                percentage(false),
                AttrDef::enumeration(&["auto"], false),
            ])
        };
        let padding = || AttrDef::composite(vec![AttrDef::length_min("0"), percentage(true)]);
        add("margin", AttrDef::multiple(margin(), 4));
        add("padding", AttrDef::multiple(padding(), 4));
        for side in ["top", "right", "bottom", "left"] {
            add(&format!("margin-{side}"), margin());
            add(&format!("padding-{side}"), padding());
        }

        let max_img = config.get_str("CSS.MaxImgLength").map(Length::parse);
        let trusted_size = || {
            AttrDef::composite(vec![
                AttrDef::length_min("0"),
                percentage(true),
                AttrDef::enumeration(&["auto"], false),
            ])
        };
        let img_size = AttrDef::composite(vec![
            AttrDef::Length {
                min: Some(Length::parse("0")),
                max: max_img,
            },
            AttrDef::enumeration(&["auto"], false),
        ]);
        add("width", AttrDef::switch("img", img_size.clone(), trusted_size()));
        add("height", AttrDef::switch("img", img_size, trusted_size()));
        add("max-width", trusted_size());
        add("max-height", trusted_size());
        add("min-width", trusted_size());
        add("min-height", trusted_size());
        add(
            "float",
            AttrDef::enumeration(&["left", "right", "none"], false),
        );
        add(
            "clear",
            AttrDef::enumeration(&["none", "left", "right", "both"], false),
        );

        // ====== Lists ======
        let list_type = || AttrDef::enumeration(&LIST_STYLE_TYPES, false);
        let list_position = || AttrDef::enumeration(&["inside", "outside"], false);
        add("list-style-type", list_type());
        add("list-style-position", list_position());
        add("list-style-image", image());
        add(
            "list-style",
            AttrDef::Shorthand(Box::new(Shorthand::list_style(
                list_type(),
                list_position(),
                image(),
            ))),
        );

        // ====== Tables ======
        add(
            "border-collapse",
            AttrDef::enumeration(&["collapse", "separate"], false),
        );
        add(
            "border-spacing",
            AttrDef::multiple(AttrDef::length(), 2),
        );
        add("caption-side", AttrDef::enumeration(&["top", "bottom"], false));
        add("empty-cells", AttrDef::enumeration(&["show", "hide"], false));
        add("table-layout", AttrDef::enumeration(&["auto", "fixed"], false));

        // ====== Effects ======
        add("opacity", AttrDef::AlphaValue);
        add("filter", AttrDef::Filter);

        if config.get_bool("CSS.AllowTricky") {
            add(
                "display",
                AttrDef::deny_element(
                    AttrDef::enumeration(
                        &[
                            "inline",
                            "block",
                            "list-item",
                            "run-in",
                            "compact",
                            "marker",
                            "table",
                            "inline-block",
                            "inline-table",
                            "table-row-group",
                            "table-header-group",
                            "table-footer-group",
                            "table-row",
                            "table-column-group",
                            "table-column",
                            "table-cell",
                            "table-caption",
                            "none",
                        ],
                        false,
                    ),
                    "img",
                ),
            );
            add(
                "visibility",
                AttrDef::enumeration(&["visible", "hidden", "collapse"], false),
            );
            add(
                "overflow",
                AttrDef::enumeration(&["visible", "hidden", "auto", "scroll"], false),
            );
        }

        let allowed = config.get_list("CSS.AllowedProperties").map(|list| {
            list.into_iter()
                .map(|p| p.trim().to_ascii_lowercase())
                .collect::<Vec<_>>()
        });
        if let Some(allowed) = &allowed {
            for name in allowed {
                if !properties.contains_key(name) {
                    warn_once(
                        "CSS.AllowedProperties",
                        &format!("Style attribute '{name}' is not supported"),
                    );
                }
            }
            properties.retain(|name, _| allowed.contains(name));
        }
        let forbidden = config.get_set("CSS.ForbiddenProperties");
        properties.retain(|name, _| !forbidden.contains(name));

        let allow_important = config.get_bool("CSS.AllowImportant");
        let properties = properties
            .into_iter()
            .map(|(name, def)| (name, AttrDef::important(def, allow_important)))
            .collect();
        tracing::debug!("css definition built");
        Self { properties }
    }

    /// The validator for a property, if it is allowed.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&AttrDef> {
        self.properties.get(property)
    }

    /// Whether a property is allowed.
    #[must_use]
    pub fn contains(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    /// Allowed property names, sorted.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Number of allowed properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether no property is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

const fn percentage(non_negative: bool) -> AttrDef {
    AttrDef::Percentage { non_negative }
}
