use std::collections::VecDeque;

use purify_common::Severity;
use purify_dom::{Armor, Element, Node};

use super::attr_validator::validate_element_attributes;
use crate::definition::HtmlDefinition;
use crate::purifier::PurifyContext;

struct Frame {
    /// `None` for the root.
    element: Option<Element>,
    pending: VecDeque<Node>,
    done: Vec<Node>,
}

impl Frame {
    fn open(mut element: Element, is_root: bool) -> Self {
        let pending = std::mem::take(&mut element.children).into();
        Self {
            element: (!is_root).then_some(element),
            pending,
            done: Vec::new(),
        }
    }
}

/// Validate the attributes of every element not validated yet.
///
/// Elements that passed through foreign-element removal are armored and
/// skipped; this pass catches the ones synthesized since. An element left
/// without a required attribute is unwrapped: its children take its place.
pub fn validate_attributes(
    root: &mut Element,
    definition: &HtmlDefinition,
    cx: &mut PurifyContext<'_>,
) {
    let placeholder = std::mem::replace(root, Element::new(definition.root_name()));
    let mut stack = vec![Frame::open(placeholder, true)];

    while let Some(frame) = stack.last_mut() {
        let Some(node) = frame.pending.pop_front() else {
            let Some(finished) = stack.pop() else {
                break;
            };
            match (finished.element, stack.last_mut()) {
                (Some(mut element), Some(parent)) => {
                    element.children = finished.done;
                    parent.done.push(Node::Element(element));
                }
                _ => root.children = finished.done,
            }
            continue;
        };

        let Node::Element(mut element) = node else {
            frame.done.push(node);
            continue;
        };
        if !element.armor.contains(Armor::ValidateAttributes) {
            let valid = definition.element(&element.name).is_some_and(|def| {
                validate_element_attributes(
                    &element.name,
                    def,
                    &mut element.attrs,
                    definition,
                    cx,
                    element.start.line,
                )
            });
            if !valid {
                cx.errors.send(
                    Severity::Error,
                    "Strategy_ValidateAttributes: Element unwrapped",
                    &[element.name.as_str()],
                    element.start.line,
                );
                for child in std::mem::take(&mut element.children).into_iter().rev() {
                    frame.pending.push_front(child);
                }
                continue;
            }
            element.armor.insert(Armor::ValidateAttributes);
        }
        stack.push(Frame::open(element, false));
    }
    tracing::debug!("validated attributes");
}
