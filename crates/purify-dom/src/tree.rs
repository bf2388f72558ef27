use std::collections::VecDeque;

use crate::node::{Element, Node};
use crate::token::Token;

/// Build a tree from a balanced token stream.
///
/// The stream is placed under a synthetic `root` element, which callers
/// never emit. Start tokens open an element, end tokens close the innermost
/// open element and record their position on it, and every other token
/// becomes a child of the innermost open element.
///
/// An end token with nothing open is ignored, and elements still open at
/// the end of the stream are closed implicitly.
#[must_use]
pub fn arborize(tokens: Vec<Token>, root: &str) -> Element {
    let mut stack: Vec<Element> = vec![Element::new(root)];

    for token in tokens {
        if token.is_end() {
            if stack.len() == 1 {
                continue;
            }
            if let Some(mut closed) = stack.pop() {
                closed.end = token.pos;
                closed.end_armor = token.armor;
                attach(&mut stack, Node::Element(closed));
            }
            continue;
        }
        let opens = token.is_start();
        let Some(node) = Node::from_token(token) else {
            continue;
        };
        match node {
            Node::Element(element) if opens => stack.push(element),
            node => attach(&mut stack, node),
        }
    }

    while stack.len() > 1 {
        if let Some(closed) = stack.pop() {
            attach(&mut stack, Node::Element(closed));
        }
    }
    stack.pop().unwrap_or_else(|| Element::new(root))
}

fn attach(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Convert a tree back into a token stream, omitting `root` itself.
///
/// Works level by level: each element's children are queued on the next
/// level, and its end token is held on its own level until that queue
/// drains. The result pairs every start token with its end token around the
/// children, in document order.
#[must_use]
pub fn flatten(root: Element) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut queues: Vec<VecDeque<Node>> = vec![VecDeque::from([Node::Element(root)])];
    let mut closing: Vec<Option<Token>> = vec![None];

    while let Some(level) = queues.len().checked_sub(1) {
        if let Some(node) = queues[level].pop_front() {
            let is_element = matches!(node, Node::Element(ref e) if !e.empty);
            let (start, end, children) = node.into_token_pair();
            if level > 0 {
                tokens.push(start);
            }
            closing[level] = end;
            if is_element {
                queues.push(children.into());
                closing.push(None);
            }
            continue;
        }

        let _ = queues.pop();
        let _ = closing.pop();
        match queues.len().checked_sub(1) {
            Some(parent) if parent > 0 => {
                if let Some(end) = closing[parent].take() {
                    tokens.push(end);
                }
            }
            _ => {}
        }
    }

    tokens
}
