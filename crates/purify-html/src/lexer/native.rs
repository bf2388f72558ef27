//! html5ever-backed lexer.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use purify_common::{ErrorCollector, PurifyError};
use purify_dom::{Attributes, Token};

use super::{LexContext, Lexer};
use crate::normalize::normalize;

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
/// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
/// source, track, wbr", plus the obsolete `param`.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Lexer that lets html5ever build a DOM and then reads the token stream
/// back out of it. Does not know source positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLex;

impl NativeLex {
    /// A new lexer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

enum Step {
    Enter(Handle),
    Leave(String),
}

impl Lexer for NativeLex {
    fn tokenize(
        &self,
        html: &str,
        cx: &LexContext,
        _errors: &mut dyn ErrorCollector,
    ) -> Result<Vec<Token>, PurifyError> {
        let html = normalize(html, &cx.normalize);
        let wrapped = format!(
            "<html><head><meta charset=\"utf-8\"></head><body><div>{html}</div></body></html>"
        );
        let dom = parse_document(RcDom::default(), Default::default()).one(wrapped.as_str());

        let Some(body) = find_element(&dom.document, "body") else {
            return Err(PurifyError::Invariant(
                "parsed document has no body".to_string(),
            ));
        };

        // Content normally sits in the wrapper div, but a stray `</div>`
        // can push some of it out into the body.
        let mut roots: Vec<Handle> = Vec::new();
        for (i, child) in body.children.borrow().iter().enumerate() {
            if i == 0 && element_name(child).as_deref() == Some("div") {
                roots.extend(child.children.borrow().iter().cloned());
            } else {
                roots.push(child.clone());
            }
        }

        // html5ever inserts a tbody into every table; keep it only when the
        // source wrote one.
        let implied_tbody = !html.to_ascii_lowercase().contains("<tbody");

        let mut tokens = Vec::new();
        let mut stack: Vec<Step> = roots.into_iter().rev().map(Step::Enter).collect();
        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Leave(name) => {
                    tokens.push(Token::end(name));
                    continue;
                }
                Step::Enter(node) => node,
            };
            match &node.data {
                NodeData::Text { contents } => tokens.push(Token::text(contents.borrow().to_string())),
                NodeData::Comment { contents } => tokens.push(Token::comment(contents.to_string())),
                NodeData::Element { name, attrs, .. } => {
                    let tag = name.local.to_string().to_ascii_lowercase();
                    let attrs: Attributes = attrs
                        .borrow()
                        .iter()
                        .map(|a| (a.name.local.to_string(), a.value.to_string()))
                        .collect();
                    let children = node.children.borrow();
                    if implied_tbody && tag == "tbody" {
                        stack.extend(children.iter().rev().cloned().map(Step::Enter));
                        continue;
                    }
                    if VOID_ELEMENTS.contains(&tag.as_str()) && children.is_empty() {
                        tokens.push(Token::empty(tag, attrs));
                        continue;
                    }
                    tokens.push(Token::start(tag.clone(), attrs));
                    stack.push(Step::Leave(tag));
                    stack.extend(children.iter().rev().cloned().map(Step::Enter));
                }
                NodeData::Document
                | NodeData::Doctype { .. }
                | NodeData::ProcessingInstruction { .. } => {}
            }
        }
        tracing::trace!(tokens = tokens.len(), "native lexer finished");
        Ok(tokens)
    }
}

fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

/// First element called `name`, depth-first.
fn find_element(root: &Handle, name: &str) -> Option<Handle> {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if element_name(&node).as_deref() == Some(name) {
            return Some(node);
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
    }
    None
}
