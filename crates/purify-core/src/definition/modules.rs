//! The standard schema modules.
//!
//! Each function returns one module's contribution. Order matters: a
//! standalone fragment replaces an earlier definition of the same element,
//! a blank fragment merges into it.

use purify_common::Config;
use purify_css::AttrDef;

use super::{ElementFragment, HtmlModule};
use crate::transform::{AttrTransform, TagTransform};

// ========== Shared attribute types ==========

const fn uri() -> AttrDef {
    AttrDef::Uri { embedded: false }
}

const fn positive_integer() -> AttrDef {
    AttrDef::Integer {
        negative: false,
        zero: false,
        positive: true,
    }
}

const fn any_integer() -> AttrDef {
    AttrDef::Integer {
        negative: true,
        zero: true,
        positive: true,
    }
}

fn keywords(values: &[&str]) -> AttrDef {
    AttrDef::enumeration(values, false)
}

fn boolean(name: &str) -> AttrDef {
    AttrDef::Bool(name.to_string())
}

const CELL_ALIGN: [&str; 5] = ["left", "center", "right", "justify", "char"];
const CELL_VALIGN: [&str; 4] = ["top", "middle", "bottom", "baseline"];
const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// `img` `width`/`height` ceiling in pixels, read from `CSS.MaxImgLength`.
#[allow(clippy::cast_possible_truncation)]
fn max_img_pixels(config: &Config) -> Option<i64> {
    config
        .get_str("CSS.MaxImgLength")
        .and_then(|length| length.trim().strip_suffix("px"))
        .and_then(|n| n.parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.trunc() as i64)
}

/// Every module that applies to `config`, in merge order.
#[must_use]
pub fn standard(config: &Config) -> Vec<HtmlModule> {
    let strict = config.get_bool("HTML.Strict");
    let mut modules = vec![
        text(),
        hypertext(),
        list(),
        presentation(),
        edit(),
        bdo(),
        tables(),
        image(config),
        style_attribute(),
    ];
    if !strict {
        modules.push(legacy());
    }
    modules.push(target());
    modules.push(non_xml_common_attributes());
    if config.get_bool("HTML.TidyTransforms") {
        modules.push(tidy());
    }
    modules
}

/// Headings, paragraphs, phrase elements and the attribute collections
/// every other module builds on.
#[must_use]
pub fn text() -> HtmlModule {
    let mut module = HtmlModule::new("Text")
        .content_set("Flow", "Heading | Block | Inline")
        .collection_attr("Core", "class", AttrDef::Class)
        .collection_attr("Core", "id", AttrDef::Id)
        .collection_attr("Core", "title", AttrDef::Text);

    for name in ["abbr", "acronym", "cite", "dfn", "kbd", "samp", "var", "span"] {
        module = module.element(ElementFragment::new(name, "Inline").in_set("Inline").common());
    }
    module = module.element(
        ElementFragment::new("q", "Inline")
            .in_set("Inline")
            .common()
            .attr("cite", uri()),
    );
    for name in ["em", "strong", "code"] {
        module = module.element(
            ElementFragment::new(name, "Inline")
                .in_set("Inline")
                .common()
                .formatting(),
        );
    }
    module = module.element(
        ElementFragment::new("br", "Empty")
            .in_set("Inline")
            .collections(&["Core"]),
    );
    module = module
        .element(ElementFragment::new("address", "Inline").in_set("Block").common())
        .element(
            ElementFragment::new("blockquote", "StrictBlockquote: Heading | Block | List")
                .in_set("Block")
                .common()
                .attr("cite", uri()),
        )
        .element(
            ElementFragment::new("pre", "Inline")
                .in_set("Block")
                .common()
                .excludes(&["img", "big", "small", "sub", "sup", "font"]),
        );
    for name in HEADINGS {
        module = module.element(ElementFragment::new(name, "Inline").in_set("Heading").common());
    }
    module
        .element(
            ElementFragment::new("p", "Inline")
                .in_set("Block")
                .common()
                .autoclose(&[
                    "address",
                    "blockquote",
                    "center",
                    "dir",
                    "div",
                    "dl",
                    "menu",
                    "ol",
                    "p",
                    "pre",
                    "table",
                    "ul",
                ]),
        )
        .element(ElementFragment::new("div", "Flow").in_set("Block").common())
}

/// Links.
#[must_use]
pub fn hypertext() -> HtmlModule {
    HtmlModule::new("Hypertext").element(
        ElementFragment::new("a", "Inline")
            .in_set("Inline")
            .common()
            .attr("href", uri())
            .attr("rel", AttrDef::LinkTypes)
            .attr("rev", AttrDef::LinkTypes)
            .excludes(&["a"])
            .formatting(),
    )
}

/// Ordered, unordered and definition lists.
#[must_use]
pub fn list() -> HtmlModule {
    let mut module = HtmlModule::new("List").content_set("Flow", "List");
    for name in ["ol", "ul"] {
        module = module.element(
            ElementFragment::new(name, "List: li")
                .in_set("List")
                .common()
                .wrap("li"),
        );
    }
    module
        .element(ElementFragment::new("li", "Flow").common())
        .element(
            ElementFragment::new("dl", "Required: dt | dd")
                .in_set("List")
                .common(),
        )
        .element(ElementFragment::new("dt", "Inline").common())
        .element(ElementFragment::new("dd", "Flow").common())
}

/// Font-style elements and rules.
#[must_use]
pub fn presentation() -> HtmlModule {
    let mut module = HtmlModule::new("Presentation");
    for name in ["b", "big", "i", "small", "tt"] {
        module = module.element(
            ElementFragment::new(name, "Inline")
                .in_set("Inline")
                .common()
                .formatting(),
        );
    }
    for name in ["sub", "sup"] {
        module = module.element(ElementFragment::new(name, "Inline").in_set("Inline").common());
    }
    module.element(ElementFragment::new("hr", "Empty").in_set("Block").common())
}

/// `ins` and `del`, which take whatever their context allows.
#[must_use]
pub fn edit() -> HtmlModule {
    let mut module = HtmlModule::new("Edit");
    for name in ["del", "ins"] {
        module = module.element(
            ElementFragment::new(name, "Chameleon: #PCDATA | Inline ! #PCDATA | Flow")
                .in_set("Inline")
                .common()
                .attr("cite", uri())
                .attr("datetime", AttrDef::Text),
        );
    }
    module
}

/// Text direction.
#[must_use]
pub fn bdo() -> HtmlModule {
    HtmlModule::new("Bdo")
        .collection_attr("I18N", "dir", keywords(&["ltr", "rtl"]))
        .element(
            ElementFragment::new("bdo", "Inline")
                .in_set("Inline")
                .collections(&["Core", "Lang"])
                .required("dir", keywords(&["ltr", "rtl"])),
        )
}

/// Tables.
#[must_use]
pub fn tables() -> HtmlModule {
    let mut module = HtmlModule::new("Tables")
        .element(ElementFragment::new("caption", "Inline").common())
        .element(
            ElementFragment::new(
                "table",
                "Custom: caption?, (col*|colgroup*), ((tbody+|thead?,tfoot?,tbody*)|tr+)",
            )
            .in_set("Block")
            .common()
            .attr("border", AttrDef::Pixels { max: None })
            .attr("cellpadding", AttrDef::HtmlLength)
            .attr("cellspacing", AttrDef::HtmlLength)
            .attr(
                "frame",
                keywords(&[
                    "void", "above", "below", "hsides", "lhs", "rhs", "vsides", "box", "border",
                ]),
            )
            .attr("rules", keywords(&["none", "groups", "rows", "cols", "all"]))
            .attr("summary", AttrDef::Text)
            .attr("width", AttrDef::HtmlLength),
        );
    for name in ["td", "th"] {
        module = module.element(
            ElementFragment::new(name, "Flow")
                .common()
                .attr("abbr", AttrDef::Text)
                .attr("colspan", positive_integer())
                .attr("rowspan", positive_integer())
                .attr("scope", keywords(&["row", "col", "rowgroup", "colgroup"]))
                .attr("align", keywords(&CELL_ALIGN))
                .attr("valign", keywords(&CELL_VALIGN)),
        );
    }
    module = module.element(
        ElementFragment::new("tr", "Required: td | th")
            .common()
            .attr("align", keywords(&CELL_ALIGN))
            .attr("valign", keywords(&CELL_VALIGN)),
    );
    for name in ["thead", "tbody", "tfoot"] {
        module = module.element(
            ElementFragment::new(name, "Required: tr")
                .common()
                .attr("align", keywords(&CELL_ALIGN))
                .attr("valign", keywords(&CELL_VALIGN)),
        );
    }
    for (name, model) in [("col", "Empty"), ("colgroup", "Optional: col")] {
        module = module.element(
            ElementFragment::new(name, model)
                .common()
                .attr("span", positive_integer())
                .attr("width", AttrDef::MultiLength)
                .attr("align", keywords(&CELL_ALIGN))
                .attr("valign", keywords(&CELL_VALIGN)),
        );
    }
    module
}

/// Images. `alt` and `src` are required; a missing `alt` is derived and a
/// missing `src` can be replaced by a placeholder.
#[must_use]
pub fn image(config: &Config) -> HtmlModule {
    let max = max_img_pixels(config);
    HtmlModule::new("Image").element(
        ElementFragment::new("img", "Empty")
            .in_set("Inline")
            .common()
            .required("alt", AttrDef::Text)
            .required("src", AttrDef::Uri { embedded: true })
            .attr("height", AttrDef::Pixels { max })
            .attr("width", AttrDef::Pixels { max })
            .attr("longdesc", uri())
            .post(AttrTransform::ImgRequired {
                default_alt: config.get_str("Attr.DefaultImageAlt").map(str::to_string),
                invalid_src: config.get_str("Attr.DefaultInvalidImage").map(str::to_string),
                invalid_alt: config
                    .get_str("Attr.DefaultInvalidImageAlt")
                    .unwrap_or_default()
                    .to_string(),
            }),
    )
}

/// The `style` attribute on everything carrying the Core collection.
#[must_use]
pub fn style_attribute() -> HtmlModule {
    HtmlModule::new("StyleAttribute").collection_attr("Core", "style", AttrDef::Css)
}

/// Deprecated elements and presentational attributes.
#[must_use]
pub fn legacy() -> HtmlModule {
    let mut module = HtmlModule::new("Legacy")
        .element(ElementFragment::new("center", "Flow").in_set("Block").common());
    for name in ["dir", "menu"] {
        module = module.element(
            ElementFragment::new(name, "Required: li")
                .in_set("Block")
                .common()
                .attr("compact", boolean("compact")),
        );
    }
    module = module.element(
        ElementFragment::new("font", "Inline")
            .in_set("Inline")
            .collections(&["Core", "I18N"])
            .attr("color", AttrDef::HtmlColor)
            .attr("face", AttrDef::Text)
            .attr("size", AttrDef::Text),
    );
    for name in ["s", "strike", "u"] {
        module = module.element(
            ElementFragment::new(name, "Inline")
                .in_set("Inline")
                .common()
                .formatting(),
        );
    }

    module = module.element(ElementFragment::blank("blockquote").model("Flow"));
    for name in ["p", "div"].into_iter().chain(HEADINGS) {
        module = module.element(
            ElementFragment::blank(name)
                .attr("align", keywords(&["left", "center", "right", "justify"])),
        );
    }
    module
        .element(
            ElementFragment::blank("caption")
                .attr("align", keywords(&["top", "bottom", "left", "right"])),
        )
        .element(
            ElementFragment::blank("img")
                .attr("align", keywords(&["top", "middle", "bottom", "left", "right"]))
                .attr("border", AttrDef::Pixels { max: None })
                .attr("hspace", AttrDef::Pixels { max: None })
                .attr("vspace", AttrDef::Pixels { max: None }),
        )
        .element(
            ElementFragment::blank("hr")
                .attr("align", keywords(&["left", "center", "right"]))
                .attr("noshade", boolean("noshade"))
                .attr("size", AttrDef::Pixels { max: None })
                .attr("width", AttrDef::HtmlLength),
        )
        .element(
            ElementFragment::blank("br").attr("clear", keywords(&["left", "all", "right", "none"])),
        )
        .element(ElementFragment::blank("dl").attr("compact", boolean("compact")))
        .element(
            ElementFragment::blank("ol")
                .attr("compact", boolean("compact"))
                .attr("start", any_integer())
                .attr("type", AttrDef::enumeration(&["1", "i", "I", "a", "A"], true)),
        )
        .element(
            ElementFragment::blank("ul")
                .attr("compact", boolean("compact"))
                .attr("type", keywords(&["square", "disc", "circle"])),
        )
        .element(
            ElementFragment::blank("li")
                .attr("value", any_integer())
                .attr(
                    "type",
                    AttrDef::enumeration(
                        &["disc", "square", "circle", "1", "i", "I", "a", "A"],
                        true,
                    ),
                ),
        )
        .element(
            ElementFragment::blank("table")
                .attr("align", keywords(&["left", "center", "right"]))
                .attr("bgcolor", AttrDef::HtmlColor),
        )
        .element(ElementFragment::blank("tr").attr("bgcolor", AttrDef::HtmlColor))
        .element(legacy_cell("td"))
        .element(legacy_cell("th"))
}

fn legacy_cell(name: &str) -> ElementFragment {
    ElementFragment::blank(name)
        .attr("bgcolor", AttrDef::HtmlColor)
        .attr("height", AttrDef::HtmlLength)
        .attr("nowrap", boolean("nowrap"))
        .attr("width", AttrDef::HtmlLength)
}

/// `target` on links.
#[must_use]
pub fn target() -> HtmlModule {
    HtmlModule::new("Target").element(ElementFragment::blank("a").attr("target", AttrDef::FrameTarget))
}

/// `lang` for HTML (as opposed to XHTML's `xml:lang`).
#[must_use]
pub fn non_xml_common_attributes() -> HtmlModule {
    HtmlModule::new("NonXmlCommonAttributes").collection_attr("Lang", "lang", AttrDef::Lang)
}

// ========== Tidy ==========

const BLOCK_ALIGN: &[(&str, &str)] = &[
    ("left", "text-align:left;"),
    ("right", "text-align:right;"),
    ("center", "text-align:center;"),
    ("justify", "text-align:justify;"),
];

const IMG_ALIGN: &[(&str, &str)] = &[
    ("left", "float:left;"),
    ("right", "float:right;"),
    ("top", "vertical-align:top;"),
    ("middle", "vertical-align:middle;"),
    ("bottom", "vertical-align:baseline;"),
];

const TABLE_ALIGN: &[(&str, &str)] = &[
    ("left", "float:left;"),
    ("right", "float:right;"),
    ("center", "margin-left:auto;margin-right:auto;"),
];

const HR_ALIGN: &[(&str, &str)] = &[
    ("left", "margin-left:0;margin-right:auto;text-align:left;"),
    ("center", "margin-left:auto;margin-right:auto;text-align:center;"),
    ("right", "margin-left:auto;margin-right:0;text-align:right;"),
];

const CAPTION_ALIGN: &[(&str, &str)] = &[
    ("left", "text-align:left;"),
    ("right", "text-align:right;"),
    ("top", "caption-side:top;"),
    ("bottom", "caption-side:bottom;"),
];

const BR_CLEAR: &[(&str, &str)] = &[
    ("left", "clear:left;"),
    ("right", "clear:right;"),
    ("all", "clear:both;"),
    ("none", "clear:none;"),
];

const LIST_TYPE: &[(&str, &str)] = &[
    ("disc", "list-style-type:disc;"),
    ("square", "list-style-type:square;"),
    ("circle", "list-style-type:circle;"),
    ("1", "list-style-type:decimal;"),
    ("i", "list-style-type:lower-roman;"),
    ("I", "list-style-type:upper-roman;"),
    ("a", "list-style-type:lower-alpha;"),
    ("A", "list-style-type:upper-alpha;"),
];

const fn to_css(attr: &'static str, table: &'static [(&'static str, &'static str)]) -> AttrTransform {
    AttrTransform::EnumToCss {
        attr,
        table,
        case_sensitive: false,
    }
}

/// Deprecated elements and attributes rewritten as CSS
/// (`HTML.TidyTransforms`).
#[must_use]
pub fn tidy() -> HtmlModule {
    let mut module = HtmlModule::new("Tidy")
        .tag_transform("font", TagTransform::Font)
        .tag_transform("center", TagTransform::styled("div", "text-align:center;"))
        .tag_transform("u", TagTransform::styled("span", "text-decoration:underline;"))
        .tag_transform("s", TagTransform::styled("span", "text-decoration:line-through;"))
        .tag_transform(
            "strike",
            TagTransform::styled("span", "text-decoration:line-through;"),
        )
        .tag_transform("dir", TagTransform::rename("ul"))
        .tag_transform("menu", TagTransform::rename("ul"))
        .global_transform(AttrTransform::Lang);

    for name in ["p", "div"].into_iter().chain(HEADINGS) {
        module = module.element(ElementFragment::blank(name).pre(to_css("align", BLOCK_ALIGN)));
    }
    for name in ["td", "th"] {
        module = module.element(
            ElementFragment::blank(name)
                .pre(AttrTransform::BgColor)
                .pre(AttrTransform::BoolToCss {
                    attr: "nowrap",
                    css: "white-space:nowrap;",
                })
                .pre(AttrTransform::Length {
                    attr: "width",
                    property: "width",
                })
                .pre(AttrTransform::Length {
                    attr: "height",
                    property: "height",
                }),
        );
    }
    for name in ["ol", "ul", "li"] {
        module = module.element(ElementFragment::blank(name).pre(AttrTransform::EnumToCss {
            attr: "type",
            table: LIST_TYPE,
            case_sensitive: true,
        }));
    }
    module
        .element(
            ElementFragment::blank("img")
                .pre(to_css("align", IMG_ALIGN))
                .pre(AttrTransform::Border)
                .pre(AttrTransform::ImgSpace { attr: "hspace" })
                .pre(AttrTransform::ImgSpace { attr: "vspace" }),
        )
        .element(
            ElementFragment::blank("table")
                .pre(AttrTransform::BgColor)
                .pre(to_css("align", TABLE_ALIGN)),
        )
        .element(ElementFragment::blank("tr").pre(AttrTransform::BgColor))
        .element(
            ElementFragment::blank("hr")
                .pre(to_css("align", HR_ALIGN))
                .pre(AttrTransform::BoolToCss {
                    attr: "noshade",
                    css: "color:#808080;background-color:#808080;border:0;",
                })
                .pre(AttrTransform::Length {
                    attr: "size",
                    property: "height",
                })
                .pre(AttrTransform::Length {
                    attr: "width",
                    property: "width",
                }),
        )
        .element(ElementFragment::blank("caption").pre(to_css("align", CAPTION_ALIGN)))
        .element(ElementFragment::blank("br").pre(to_css("clear", BR_CLEAR)))
}
