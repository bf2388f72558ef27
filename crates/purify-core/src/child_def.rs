//! Content models: which children an element may hold.
//!
//! A [`ChildDef`] looks at an element's children, which have already been
//! fixed, and answers with a [`ChildResult`]. None of the variants recurse.
//! When a disallowed element spills its children into the parent, that runs
//! on an explicit stack, so deep input costs heap rather than call frames.

use std::collections::BTreeSet;
use std::sync::{LazyLock, OnceLock};

use purify_common::warning::warn_once;
use purify_common::{ErrorCollector, Severity};
use purify_dom::{Element, Node};
use regex::{Captures, Regex};
use strum_macros::{Display, EnumString};

/// How character data is named in content-model expressions.
pub const PCDATA: &str = "#PCDATA";

/// Element names, plus possibly [`PCDATA`], accepted as children.
pub type ElementSet = BTreeSet<String>;

static NO_ELEMENTS: LazyLock<ElementSet> = LazyLock::new(ElementSet::new);

static LIST_ELEMENTS: LazyLock<ElementSet> =
    LazyLock::new(|| ["li", "ol", "ul"].into_iter().map(String::from).collect());

static MODEL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#a-zA-Z0-9_.-]+").expect("valid regex"));

static UNSOLICITED_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^,(|]\(+),").expect("valid regex"));

/// The content-model type named in a declaration such as `"Required: tr"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContentModelType {
    /// [`ChildDef::Empty`]
    Empty,
    /// [`ChildDef::Optional`]
    Optional,
    /// [`ChildDef::Required`]
    Required,
    /// [`ChildDef::Custom`]
    Custom,
    /// [`ChildDef::Chameleon`]
    Chameleon,
    /// [`ChildDef::List`]
    List,
    /// [`ChildDef::StrictBlockquote`]
    StrictBlockquote,
}

/// Verdict on an element's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildResult {
    /// The children are fine as they are (handed back unchanged).
    Keep(Vec<Node>),
    /// The element itself must be removed along with its children.
    Drop,
    /// The element stays, with these children instead.
    Replace(Vec<Node>),
}

/// Ambient state for one validation.
pub struct ChildContext<'a> {
    /// The element sits somewhere only inline content is allowed.
    pub is_inline: bool,
    /// Where schema problems are reported.
    pub errors: &'a mut dyn ErrorCollector,
}

/// A content model.
#[derive(Debug, Clone)]
pub enum ChildDef {
    /// At least one allowed child must remain.
    Required(ElementSet),
    /// Like `Required`, but no children at all is fine.
    Optional(ElementSet),
    /// No children.
    Empty,
    /// Children must match a DTD-style expression.
    Custom(CustomModel),
    /// Picks a model from the surrounding context (`ins`, `del`).
    Chameleon {
        /// Used in inline context.
        inline: ElementSet,
        /// Used in block context.
        block: ElementSet,
    },
    /// `ul`/`ol`: everything that is not an `li` folds into one.
    List {
        /// Whether the schema allows `li` at all.
        li_allowed: bool,
    },
    /// Block-only content; stray inline runs are wrapped in a block.
    StrictBlockquote(StrictBlockquote),
}

impl ChildDef {
    /// Elements this model lets in directly. Well-formedness repair asks
    /// this before deciding to close an open element.
    #[must_use]
    pub fn allowed_elements(&self) -> &ElementSet {
        match self {
            Self::Required(elements) | Self::Optional(elements) => elements,
            Self::Empty => &NO_ELEMENTS,
            Self::Custom(model) => &model.elements,
            Self::Chameleon { block, .. } => block,
            Self::List { .. } => &LIST_ELEMENTS,
            Self::StrictBlockquote(model) => model.fake_elements(),
        }
    }

    /// Whether `name` may appear directly under an element with this model.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        self.allowed_elements().contains(name)
    }

    /// True for [`ChildDef::Empty`].
    #[must_use]
    pub const fn is_empty_model(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The declared type.
    #[must_use]
    pub const fn model_type(&self) -> ContentModelType {
        match self {
            Self::Required(_) => ContentModelType::Required,
            Self::Optional(_) => ContentModelType::Optional,
            Self::Empty => ContentModelType::Empty,
            Self::Custom(_) => ContentModelType::Custom,
            Self::Chameleon { .. } => ContentModelType::Chameleon,
            Self::List { .. } => ContentModelType::List,
            Self::StrictBlockquote(_) => ContentModelType::StrictBlockquote,
        }
    }

    /// Check `children` against the model.
    #[must_use]
    pub fn validate_children(&self, children: Vec<Node>, cx: &mut ChildContext<'_>) -> ChildResult {
        match self {
            Self::Required(elements) => validate_required(elements, children),
            Self::Optional(elements) => validate_optional(elements, children),
            Self::Empty => {
                if children.is_empty() {
                    ChildResult::Keep(children)
                } else {
                    ChildResult::Replace(Vec::new())
                }
            }
            Self::Custom(model) => model.validate(children),
            Self::Chameleon { inline, block } => {
                if cx.is_inline {
                    validate_optional(inline, children)
                } else {
                    validate_optional(block, children)
                }
            }
            Self::List { li_allowed } => validate_list(*li_allowed, children, cx),
            Self::StrictBlockquote(model) => model.validate(children),
        }
    }
}

// ========== Required / Optional ==========

struct Filtered {
    nodes: Vec<Node>,
    changed: bool,
    whitespace_only: bool,
}

/// Keep allowed children in order. A disallowed element is unwrapped: its
/// children are offered in its place. Disallowed text is dropped.
fn filter_children(elements: &ElementSet, children: Vec<Node>) -> Filtered {
    let pcdata = elements.contains(PCDATA);
    let mut nodes = Vec::with_capacity(children.len());
    let mut changed = false;
    let mut whitespace_only = true;

    let mut stack: Vec<Node> = children.into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.is_whitespace() || node.is_comment() {
            nodes.push(node);
            continue;
        }
        whitespace_only = false;
        match node {
            Node::Element(element) if !elements.contains(&element.name) => {
                changed = true;
                stack.extend(element.children.into_iter().rev());
            }
            Node::Text { .. } if !pcdata => changed = true,
            node => nodes.push(node),
        }
    }

    Filtered {
        nodes,
        changed,
        whitespace_only,
    }
}

fn validate_required(elements: &ElementSet, children: Vec<Node>) -> ChildResult {
    if children.is_empty() {
        return ChildResult::Drop;
    }
    let filtered = filter_children(elements, children);
    if filtered.nodes.is_empty() || filtered.whitespace_only {
        return ChildResult::Drop;
    }
    if filtered.changed {
        ChildResult::Replace(filtered.nodes)
    } else {
        ChildResult::Keep(filtered.nodes)
    }
}

fn validate_optional(elements: &ElementSet, children: Vec<Node>) -> ChildResult {
    if children.is_empty() {
        return ChildResult::Keep(children);
    }
    let filtered = filter_children(elements, children);
    if filtered.whitespace_only {
        return ChildResult::Keep(filtered.nodes);
    }
    if filtered.changed {
        ChildResult::Replace(filtered.nodes)
    } else {
        ChildResult::Keep(filtered.nodes)
    }
}

// ========== List ==========

fn validate_list(li_allowed: bool, children: Vec<Node>, cx: &mut ChildContext<'_>) -> ChildResult {
    if children.is_empty() {
        return ChildResult::Drop;
    }
    if !li_allowed {
        warn_once("ChildDef", "cannot allow ul/ol without allowing li");
        cx.errors
            .send(Severity::Error, "ChildDef_List: li not allowed", &[], None);
        return ChildResult::Drop;
    }

    let mut result: Vec<Node> = Vec::with_capacity(children.len());
    let mut anchor: Option<usize> = None;
    let mut changed = false;
    let mut whitespace_only = true;

    for node in children {
        if node.is_whitespace() || node.is_comment() {
            result.push(node);
            continue;
        }
        whitespace_only = false;
        match node {
            Node::Element(element) if element.name == "li" => {
                anchor = Some(result.len());
                result.push(Node::Element(element));
            }
            // Text before the first li has nowhere to go.
            Node::Text { .. } if anchor.is_none() => changed = true,
            node => {
                changed = true;
                let index = *anchor.get_or_insert_with(|| {
                    result.push(Node::Element(Element::new("li")));
                    result.len() - 1
                });
                if let Some(Node::Element(li)) = result.get_mut(index) {
                    li.children.push(node);
                }
            }
        }
    }

    if result.is_empty() || whitespace_only {
        return ChildResult::Drop;
    }
    if changed {
        ChildResult::Replace(result)
    } else {
        ChildResult::Keep(result)
    }
}

// ========== Custom ==========

/// A DTD-style content expression such as
/// `caption?, (col*|colgroup*), ((tbody+|thead?,tfoot?,tbody*)|tr+)`,
/// compiled to a regular expression over comma-joined child names.
#[derive(Debug, Clone)]
pub struct CustomModel {
    expression: String,
    elements: ElementSet,
    pattern: Regex,
}

impl CustomModel {
    /// Compile an expression.
    ///
    /// # Errors
    /// Returns the regex error when the expression does not compile.
    pub fn compile(expression: &str) -> Result<Self, regex::Error> {
        let mut raw: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
        if !raw.starts_with('(') {
            raw = format!("({raw})");
        }
        let elements = MODEL_NAME
            .find_iter(&raw)
            .map(|m| m.as_str().to_string())
            .collect();

        // Every name becomes "(,name)" so that sequencing is implied by the
        // leading commas; the expression's own commas are then redundant.
        let grouped = MODEL_NAME.replace_all(&raw, |caps: &Captures<'_>| {
            format!("(,{})", regex::escape(&caps[0]))
        });
        let grouped = UNSOLICITED_COMMA.replace_all(&grouped, "${1}");
        let grouped = grouped.replace(",(", "(");

        Ok(Self {
            expression: expression.to_string(),
            elements,
            pattern: Regex::new(&format!("^,?{grouped}$"))?,
        })
    }

    /// The expression as declared.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether a sequence of child names matches.
    #[must_use]
    pub fn matches<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> bool {
        let sequence: String = names.into_iter().fold(String::new(), |mut acc, name| {
            acc.push(',');
            acc.push_str(name);
            acc
        });
        self.pattern.is_match(&sequence)
    }

    fn validate(&self, children: Vec<Node>) -> ChildResult {
        let names = children
            .iter()
            .filter(|node| !node.is_whitespace() && !node.is_comment())
            .map(|node| node.name().unwrap_or(PCDATA));
        if self.matches(names) {
            ChildResult::Keep(children)
        } else {
            ChildResult::Drop
        }
    }
}

// ========== StrictBlockquote ==========

/// Block content only, but inline content is tolerated and regrouped.
///
/// Validation first runs `Required` against a widened set (everything in
/// Flow plus text), then wraps each run of content the real set rejects in
/// the block wrapper element.
#[derive(Debug, Clone)]
pub struct StrictBlockquote {
    real: ElementSet,
    flow: ElementSet,
    wrapper: String,
    fake: OnceLock<ElementSet>,
}

impl StrictBlockquote {
    /// `real` is the declared set, `flow` the expanded Flow set and
    /// `wrapper` the element used to wrap stray inline content.
    #[must_use]
    pub fn new(real: ElementSet, flow: ElementSet, wrapper: impl Into<String>) -> Self {
        Self {
            real,
            flow,
            wrapper: wrapper.into(),
            fake: OnceLock::new(),
        }
    }

    /// Elements accepted before regrouping.
    #[must_use]
    pub fn fake_elements(&self) -> &ElementSet {
        self.fake.get_or_init(|| {
            let mut fake = self.flow.clone();
            let _ = fake.insert(PCDATA.to_string());
            fake
        })
    }

    fn validate(&self, children: Vec<Node>) -> ChildResult {
        if children.is_empty() {
            return ChildResult::Keep(children);
        }
        let (nodes, mut changed) = match validate_required(self.fake_elements(), children) {
            ChildResult::Drop => return ChildResult::Replace(Vec::new()),
            ChildResult::Keep(nodes) => (nodes, false),
            ChildResult::Replace(nodes) => (nodes, true),
        };

        let mut result = Vec::with_capacity(nodes.len());
        let mut wrap: Option<Element> = None;
        for node in nodes {
            let permitted = node
                .as_element()
                .is_some_and(|element| self.real.contains(&element.name));
            if wrap.is_none() {
                let stray = (node.is_text() && !node.is_whitespace())
                    || (node.as_element().is_some() && !permitted);
                if stray {
                    wrap = Some(Element::new(self.wrapper.as_str()));
                    changed = true;
                }
            } else if permitted {
                if let Some(block) = wrap.take() {
                    result.push(Node::Element(block));
                }
            }
            match wrap.as_mut() {
                Some(block) => block.children.push(node),
                None => result.push(node),
            }
        }
        if let Some(block) = wrap {
            result.push(Node::Element(block));
        }

        if changed {
            ChildResult::Replace(result)
        } else {
            ChildResult::Keep(result)
        }
    }
}
