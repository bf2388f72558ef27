use std::collections::{HashSet, VecDeque};

use purify_common::Severity;
use purify_dom::{Armor, Attributes, Token, TokenKind};

use crate::definition::{ElementDef, HtmlDefinition};
use crate::purifier::PurifyContext;

/// An element opened in the output and not yet closed.
struct Open {
    id: usize,
    name: String,
    start: Token,
    /// Index of the start token in the output.
    out_index: usize,
}

/// State of one balancing pass.
///
/// Tokens carry an id that is unique within the pass; reprocessed and
/// synthesized tokens go back to the front of the queue. Scratch flags live
/// in side tables keyed by that id, never on the tokens themselves.
struct Pass<'d> {
    definition: &'d HtmlDefinition,
    queue: VecDeque<(usize, Token)>,
    next_id: usize,
    stack: Vec<Open>,
    out: Vec<Token>,
    /// Formatting elements reopened after an implicit close.
    carryover: HashSet<usize>,
}

/// Balance the token stream.
///
/// Every start tag gets an end tag, stray end tags are removed, elements the
/// current parent cannot hold close that parent (if some ancestor can hold
/// them) or get wrapped in the parent they declare, and formatting elements
/// closed that way are reopened inside the newcomer.
#[must_use]
pub fn make_well_formed(
    tokens: Vec<Token>,
    definition: &HtmlDefinition,
    cx: &mut PurifyContext<'_>,
) -> Vec<Token> {
    let mut pass = Pass {
        definition,
        next_id: tokens.len(),
        queue: tokens.into_iter().enumerate().collect(),
        stack: Vec::new(),
        out: Vec::new(),
        carryover: HashSet::new(),
    };
    pass.run(cx);
    tracing::debug!(tokens = pass.out.len(), "made token stream well formed");
    pass.out
}

impl<'d> Pass<'d> {
    fn run(&mut self, cx: &mut PurifyContext<'_>) {
        while let Some((id, token)) = self.queue.pop_front() {
            match token.kind {
                TokenKind::Text { .. } | TokenKind::Comment { .. } => self.out.push(token),
                TokenKind::End { .. } => self.end_tag(token, cx),
                TokenKind::Start { .. } | TokenKind::Empty { .. } => self.start_tag(id, token, cx),
            }
        }
        while let Some(open) = self.stack.pop() {
            cx.errors.send(
                Severity::Notice,
                "Strategy_MakeWellFormed: Tag closed by document end",
                &[open.name.as_str()],
                open.start.pos.line,
            );
            self.emit_end(&open);
        }
    }

    fn fresh_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn parent_def(&self) -> &'d ElementDef {
        self.stack
            .last()
            .and_then(|open| self.definition.element(&open.name))
            .unwrap_or_else(|| self.definition.root())
    }

    fn start_tag(&mut self, id: usize, mut token: Token, cx: &mut PurifyContext<'_>) {
        let Some(name) = token.name().map(str::to_string) else {
            return;
        };
        let Some(def) = self.definition.element(&name) else {
            // Unknown elements were removed earlier; anything left is dropped.
            return;
        };

        let empty_model = def.child.is_empty_model();
        if token.is_start() && empty_model {
            if let TokenKind::Start { name, attrs } = token.kind {
                token.kind = TokenKind::Empty { name, attrs };
            }
        } else if token.is_empty_tag() && !empty_model {
            if let TokenKind::Empty { name, attrs } = token.kind {
                token.kind = TokenKind::Start { name, attrs };
            }
            let end = Token::end(name.as_str()).with_position(token.pos);
            let end_id = self.fresh_id();
            self.queue.push_front((end_id, end));
            self.queue.push_front((id, token));
            return;
        }

        if let Some(parent_name) = self.stack.last().map(|open| open.name.clone()) {
            let parent = self.parent_def();
            let disallowed = !parent.child.allows(&name);

            if disallowed {
                if let Some(wrap) = self.wrapper_for(parent, &name, def) {
                    let wrap_start = Token::start(wrap, Attributes::new()).with_position(token.pos);
                    let wrap_id = self.fresh_id();
                    self.queue.push_front((id, token));
                    self.queue.push_front((wrap_id, wrap_start));
                    return;
                }
            }

            if disallowed || parent.autoclose.contains(&name) {
                if !self.autoclose_ok(&name, def) {
                    cx.errors.send(
                        Severity::Error,
                        "Strategy_MakeWellFormed: Tag removed",
                        &[name.as_str()],
                        token.pos.line,
                    );
                    return;
                }
                cx.errors.send(
                    Severity::Notice,
                    "Strategy_MakeWellFormed: Tag auto closed",
                    &[parent_name.as_str()],
                    token.pos.line,
                );
                let pos = token.pos;
                if parent.formatting && def.child.allows(&parent_name) {
                    if let Some(clone) = self.stack.last().map(|open| reopen(&open.start)) {
                        let clone_id = self.fresh_id();
                        let _ = self.carryover.insert(clone_id);
                        self.queue.push_front((clone_id, clone));
                    }
                }
                self.queue.push_front((id, token));
                let end_id = self.fresh_id();
                self.queue
                    .push_front((end_id, Token::end(parent_name).with_position(pos)));
                return;
            }
        }

        if token.is_start() {
            self.stack.push(Open {
                id,
                name,
                start: token.clone(),
                out_index: self.out.len(),
            });
        }
        self.out.push(token);
    }

    /// Whether closing the current parent can lead somewhere: the root or
    /// an ancestor below the parent holds `name`, directly or through its
    /// wrapper.
    fn autoclose_ok(&self, name: &str, def: &ElementDef) -> bool {
        let holds = |holder: &ElementDef| {
            holder.child.allows(name)
                || def.wrap.as_deref().is_some_and(|wrap| {
                    holder.child.allows(wrap)
                        && self
                            .definition
                            .element(wrap)
                            .is_some_and(|wrap_def| wrap_def.child.allows(name))
                })
        };
        let ancestors = self.stack.len().saturating_sub(1);
        holds(self.definition.root())
            || self.stack[..ancestors]
                .iter()
                .filter_map(|open| self.definition.element(&open.name))
                .any(holds)
    }

    /// The declared wrapper of `def`, when the parent holds the wrapper and
    /// the wrapper holds `name`.
    fn wrapper_for(&self, parent: &ElementDef, name: &str, def: &'d ElementDef) -> Option<&'d str> {
        let wrap = def.wrap.as_deref()?;
        let wrap_def = self.definition.element(wrap)?;
        (parent.child.allows(wrap) && wrap_def.child.allows(name)).then_some(wrap)
    }

    fn end_tag(&mut self, token: Token, cx: &mut PurifyContext<'_>) {
        let Some(name) = token.name().map(str::to_string) else {
            return;
        };
        let Some(index) = self.stack.iter().rposition(|open| open.name == name) else {
            cx.errors.send(
                Severity::Warning,
                "Strategy_MakeWellFormed: Unnecessary end tag removed",
                &[name.as_str()],
                token.pos.line,
            );
            return;
        };

        let skipped = self.stack.split_off(index + 1);
        let mut reopen_queue = Vec::new();
        for open in skipped.into_iter().rev() {
            cx.errors.send(
                Severity::Notice,
                "Strategy_MakeWellFormed: Tag closed by element end",
                &[open.name.as_str(), name.as_str()],
                token.pos.line,
            );
            if self
                .definition
                .element(&open.name)
                .is_some_and(|def| def.formatting)
            {
                reopen_queue.push(reopen(&open.start));
            }
            self.emit_end(&open);
        }
        if let Some(open) = self.stack.pop() {
            self.emit_end_with(&open, token);
        }
        // Innermost was closed first, so reopen outermost first.
        for clone in reopen_queue {
            let clone_id = self.fresh_id();
            let _ = self.carryover.insert(clone_id);
            self.queue.push_front((clone_id, clone));
        }
    }

    fn emit_end(&mut self, open: &Open) {
        self.emit_end_with(open, Token::end(open.name.as_str()));
    }

    /// Close `open`; a reopened formatting element that never received
    /// content is removed instead.
    fn emit_end_with(&mut self, open: &Open, end: Token) {
        if self.carryover.remove(&open.id) && self.out.len() == open.out_index + 1 {
            let _ = self.out.pop();
            return;
        }
        self.out.push(end);
    }
}

/// Copy of a start tag for reopening. IDs stay with the original.
fn reopen(start: &Token) -> Token {
    let mut clone = start.clone();
    if let Some(attrs) = clone.attrs_mut() {
        let _ = attrs.remove("id");
    }
    clone.armor.insert(Armor::TagClosedError);
    clone
}
