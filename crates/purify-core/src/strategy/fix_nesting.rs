use std::collections::BTreeSet;
use std::rc::Rc;

use purify_common::Severity;
use purify_dom::{Element, Node};

use crate::child_def::{ChildContext, ChildResult};
use crate::definition::{ElementDef, HtmlDefinition};
use crate::purifier::PurifyContext;

/// An element whose children are being fixed.
struct Frame<'d> {
    /// `None` for the root.
    element: Option<Element>,
    pending: std::vec::IntoIter<Node>,
    kept: Vec<Node>,
    /// The element sits in inline context.
    is_inline: bool,
    /// Names forbidden below this element, its own exclusions included.
    excludes: Rc<BTreeSet<String>>,
    def: &'d ElementDef,
}

impl<'d> Frame<'d> {
    fn new(
        mut element: Element,
        is_root: bool,
        def: &'d ElementDef,
        is_inline: bool,
        inherited: &Rc<BTreeSet<String>>,
    ) -> Self {
        let excludes = if def.excludes.is_empty() {
            Rc::clone(inherited)
        } else {
            Rc::new(inherited.union(&def.excludes).cloned().collect())
        };
        let pending = std::mem::take(&mut element.children).into_iter();
        Self {
            element: (!is_root).then_some(element),
            pending,
            kept: Vec::new(),
            is_inline,
            excludes,
            def,
        }
    }
}

/// Make every element's children satisfy its content model.
///
/// A post-order walk over an explicit stack: children are fixed before
/// their parent looks at them. Elements excluded by an ancestor are removed
/// on the way down; on the way up each element's [`ChildDef`] decides
/// whether it keeps, replaces or loses its children, or is removed itself.
///
/// [`ChildDef`]: crate::child_def::ChildDef
pub fn fix_nesting(root: &mut Element, definition: &HtmlDefinition, cx: &mut PurifyContext<'_>) {
    let root_def = definition.root();
    let placeholder = std::mem::replace(root, Element::new(definition.root_name()));
    let mut stack = vec![Frame::new(
        placeholder,
        true,
        root_def,
        root_def.descendants_are_inline,
        &Rc::new(BTreeSet::new()),
    )];

    while let Some(frame) = stack.last_mut() {
        if let Some(node) = frame.pending.next() {
            match node {
                Node::Element(child) => {
                    if frame.excludes.contains(&child.name) {
                        cx.errors.send(
                            Severity::Error,
                            "Strategy_FixNesting: Node excluded",
                            &[child.name.as_str()],
                            child.start.line,
                        );
                        continue;
                    }
                    let Some(def) = definition.element(&child.name) else {
                        cx.errors.send(
                            Severity::Error,
                            "Strategy_FixNesting: Node removed",
                            &[child.name.as_str()],
                            child.start.line,
                        );
                        continue;
                    };
                    let is_inline = frame.is_inline || frame.def.descendants_are_inline;
                    let excludes = Rc::clone(&frame.excludes);
                    stack.push(Frame::new(child, false, def, is_inline, &excludes));
                }
                other => frame.kept.push(other),
            }
            continue;
        }

        let Some(frame) = stack.pop() else {
            break;
        };
        let mut child_cx = ChildContext {
            is_inline: frame.is_inline,
            errors: &mut *cx.errors,
        };
        let verdict = frame.def.child.validate_children(frame.kept, &mut child_cx);

        let Some(mut element) = frame.element else {
            root.children = match verdict {
                ChildResult::Keep(children) | ChildResult::Replace(children) => children,
                ChildResult::Drop => Vec::new(),
            };
            break;
        };
        let line = element.start.line;
        match verdict {
            ChildResult::Keep(children) => element.children = children,
            ChildResult::Replace(children) => {
                let key = if children.is_empty() {
                    "Strategy_FixNesting: Node contents removed"
                } else {
                    "Strategy_FixNesting: Node reorganized"
                };
                cx.errors.send(Severity::Error, key, &[element.name.as_str()], line);
                element.children = children;
            }
            ChildResult::Drop => {
                cx.errors.send(
                    Severity::Error,
                    "Strategy_FixNesting: Node removed",
                    &[element.name.as_str()],
                    line,
                );
                continue;
            }
        }
        if let Some(parent) = stack.last_mut() {
            parent.kept.push(Node::Element(element));
        }
    }
}
