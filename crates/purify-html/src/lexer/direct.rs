//! Hand-written scanner.
//!
//! Moves a cursor from `<` to `>` over the input and emits a token per
//! tag, text run or comment. Broken markup is never an error: it turns into
//! text, with a diagnostic describing the repair.

use purify_common::{ErrorCollector, PurifyError, Severity};
use purify_dom::{Attributes, Position, Token, is_html_whitespace};

use super::{LexContext, Lexer};
use crate::normalize::normalize;

/// The position-tracking lexer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectLex;

impl DirectLex {
    /// A new lexer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Lexer for DirectLex {
    fn tokenize(
        &self,
        html: &str,
        cx: &LexContext,
        errors: &mut dyn ErrorCollector,
    ) -> Result<Vec<Token>, PurifyError> {
        let html = normalize(html, &cx.normalize);
        Scanner::new(&html, cx, errors).run()
    }
}

/// Fails when a scanning loop stops moving forward.
///
/// Every branch of the attribute loop advances past at least one byte, so
/// through [`DirectLex::tokenize`] this only trips if that stops holding.
#[derive(Debug, Default)]
struct Progress {
    last: Option<usize>,
}

impl Progress {
    fn check(&mut self, cursor: usize, input: &str) -> Result<(), PurifyError> {
        if self.last.is_some_and(|last| last >= cursor) {
            return Err(PurifyError::InfiniteLoop {
                offset: cursor,
                input: input.to_string(),
            });
        }
        self.last = Some(cursor);
        Ok(())
    }
}

struct Scanner<'a, 'e> {
    input: &'a str,
    cursor: usize,
    /// 1-based line and column of the cursor.
    line: usize,
    column: usize,
    cx: &'a LexContext,
    errors: &'e mut dyn ErrorCollector,
    tokens: Vec<Token>,
}

impl<'a, 'e> Scanner<'a, 'e> {
    fn new(input: &'a str, cx: &'a LexContext, errors: &'e mut dyn ErrorCollector) -> Self {
        Self {
            input,
            cursor: 0,
            line: 1,
            column: 1,
            cx,
            errors,
            tokens: Vec::new(),
        }
    }

    // ====== Cursor ======

    /// Move the cursor forward, counting the lines and columns passed over.
    fn advance_to(&mut self, to: usize) {
        if self.cx.track_lines {
            let passed = &self.input[self.cursor..to];
            match passed.rfind('\n') {
                Some(last) => {
                    self.line += passed.matches('\n').count();
                    self.column = passed[last + 1..].chars().count() + 1;
                }
                None => self.column += passed.chars().count(),
            }
        }
        self.cursor = to;
    }

    /// Position of a byte offset at or just behind the cursor, on the
    /// cursor's line.
    fn position(&self, offset: usize) -> Position {
        if !self.cx.track_lines {
            return Position::default();
        }
        let behind = self
            .input
            .get(offset..self.cursor)
            .map_or(0, |gap| gap.chars().count());
        Position::at(self.line, self.column.saturating_sub(behind))
    }

    fn current_line(&self) -> Option<usize> {
        self.cx.track_lines.then_some(self.line)
    }

    // ====== Output ======

    fn emit(&mut self, token: Token, offset: usize) {
        let pos = self.position(offset);
        self.tokens.push(token.with_position(pos));
    }

    fn emit_text(&mut self, raw: &str, offset: usize) {
        let data = self.cx.entities.parse_data(raw, false);
        self.emit(Token::text(data), offset);
    }

    fn report(&mut self, severity: Severity, key: &str) {
        let line = self.current_line();
        self.errors.send(severity, key, &[], line);
    }

    // ====== Main loop ======

    fn run(mut self) -> Result<Vec<Token>, PurifyError> {
        let len = self.input.len();
        let mut inside_tag = false;
        // Offset of the `<` that opened the current tag.
        let mut tag_start = 0;

        while self.cursor < len {
            let input = self.input;
            let rest = &input[self.cursor..];

            if !inside_tag {
                let Some(lt) = rest.find('<').map(|i| i + self.cursor) else {
                    self.emit_text(rest, self.cursor);
                    self.advance_to(len);
                    break;
                };
                if lt > self.cursor {
                    self.emit_text(&input[self.cursor..lt], self.cursor);
                }
                self.advance_to(lt);
                tag_start = lt;
                self.advance_to(lt + 1);
                inside_tag = true;
                continue;
            }

            if rest.starts_with("!--") {
                let body = self.cursor + 3;
                let end = match input[body..].find("-->") {
                    Some(i) => body + i,
                    None => {
                        self.report(Severity::Warning, "Lexer: Unclosed comment");
                        len
                    }
                };
                self.emit(Token::comment(&input[body..end]), tag_start);
                self.advance_to((end + 3).min(len));
                inside_tag = false;
                continue;
            }

            let Some(gt) = rest.find('>').map(|i| i + self.cursor) else {
                self.report(Severity::Warning, "Lexer: Missing gt");
                let text = format!("<{rest}");
                self.emit_text(&text, tag_start);
                self.advance_to(len);
                break;
            };
            let segment = &input[self.cursor..gt];

            if segment.is_empty() {
                self.emit(Token::text("<>"), tag_start);
                self.advance_to(gt + 1);
                inside_tag = false;
                continue;
            }

            if let Some(name) = segment.strip_prefix('/') {
                let name = name
                    .split(is_html_whitespace)
                    .next()
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                if name.is_empty() {
                    self.emit_text(&format!("<{segment}>"), tag_start);
                } else {
                    self.emit(Token::end(name), tag_start);
                }
                self.advance_to(gt + 1);
                inside_tag = false;
                continue;
            }

            if !segment.starts_with(|c: char| c.is_ascii_alphabetic()) {
                // A bare `<`; the cursor is already past it.
                self.report(Severity::Notice, "Lexer: Unescaped lt");
                self.emit(Token::text("<"), tag_start);
                inside_tag = false;
                continue;
            }

            let (segment, self_closing) = match segment.strip_suffix('/') {
                Some(inner) => (inner, true),
                None => (segment, false),
            };
            let (name, attr_string) = match segment.find(is_html_whitespace) {
                Some(i) => segment.split_at(i),
                None => (segment, ""),
            };
            let name = name.to_ascii_lowercase();
            let attrs = self.parse_attributes(attr_string)?;
            let token = if self_closing {
                Token::empty(name, attrs)
            } else {
                Token::start(name, attrs)
            };
            self.emit(token, tag_start);
            self.advance_to(gt + 1);
            inside_tag = false;
        }

        tracing::trace!(tokens = self.tokens.len(), "direct lexer finished");
        Ok(self.tokens)
    }

    // ====== Attributes ======

    /// Parse `name="value" name='value' name=value name` pairs.
    ///
    /// Values are entity-decoded; names are lower-cased; the first of
    /// several same-named attributes wins.
    fn parse_attributes(&mut self, string: &str) -> Result<Attributes, PurifyError> {
        let string = string.trim_matches(is_html_whitespace);
        if string.is_empty() {
            return Ok(Attributes::new());
        }
        let size = string.len();
        let skip_ws = |from: usize| {
            string[from..]
                .find(|c: char| !is_html_whitespace(c))
                .map_or(size, |i| from + i)
        };
        let skip_non_ws = |from: usize| string[from..].find(is_html_whitespace).map_or(size, |i| from + i);

        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut progress = Progress::default();
        let mut cursor = 0;

        while cursor < size {
            progress.check(cursor, string)?;
            cursor = skip_ws(cursor);
            if cursor >= size {
                break;
            }

            let key_end = string[cursor..]
                .find(|c: char| is_html_whitespace(c) || c == '=')
                .map_or(size, |i| cursor + i);
            let key = string[cursor..key_end].to_ascii_lowercase();
            if key.is_empty() {
                self.report(Severity::Error, "Lexer: Missing attribute key");
                cursor = skip_non_ws(cursor + 1);
                continue;
            }

            cursor = skip_ws(key_end);
            if cursor >= size {
                pairs.push((key.clone(), key));
                break;
            }
            if !string[cursor..].starts_with('=') {
                // Boolean attribute; the cursor already sits on the next key.
                pairs.push((key.clone(), key));
                continue;
            }

            cursor = skip_ws(cursor + 1);
            if cursor >= size {
                pairs.push((key, String::new()));
                break;
            }
            let raw = match string[cursor..].chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let begin = cursor + 1;
                    if let Some(i) = string[begin..].find(quote) {
                        cursor = begin + i + 1;
                        &string[begin..begin + i]
                    } else {
                        self.report(Severity::Error, "Lexer: Missing end quote");
                        cursor = size;
                        &string[begin..]
                    }
                }
                _ => {
                    let end = skip_non_ws(cursor);
                    let value = &string[cursor..end];
                    cursor = end;
                    value
                }
            };
            pairs.push((key, self.cx.entities.parse_data(raw, true)));
        }

        Ok(pairs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_detects_stall() {
        let mut progress = Progress::default();
        assert!(progress.check(0, "a").is_ok());
        assert!(progress.check(4, "a").is_ok());
        let err = progress.check(4, "a=b").unwrap_err();
        assert_eq!(
            err,
            PurifyError::InfiniteLoop {
                offset: 4,
                input: "a=b".to_string(),
            }
        );
    }

    #[test]
    fn test_progress_detects_rewind() {
        let mut progress = Progress::default();
        assert!(progress.check(7, "x").is_ok());
        assert!(progress.check(2, "x").is_err());
    }
}
