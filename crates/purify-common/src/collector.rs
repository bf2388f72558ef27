//! Structured diagnostics.
//!
//! The pipeline never formats user-facing strings. Every recoverable defect
//! is reported as a severity, a message key and positional arguments, and a
//! localization layer (outside this workspace) turns those into prose.

use serde::Serialize;
use strum_macros::Display;

/// How serious a reported defect is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
pub enum Severity {
    /// Content was removed or rewritten.
    #[strum(serialize = "error")]
    Error,
    /// Content was kept but looked suspicious.
    #[strum(serialize = "warning")]
    Warning,
    /// Informational.
    #[strum(serialize = "notice")]
    Notice,
}

/// One reported defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of the defect.
    pub severity: Severity,
    /// Message key, e.g. `Lexer: Unescaped lt`.
    pub key: String,
    /// Positional arguments for the message.
    pub args: Vec<String>,
    /// Source line, when the lexer tracked it.
    pub line: Option<usize>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} at line {line}: {}", self.severity, self.key)?,
            None => write!(f, "{}: {}", self.severity, self.key)?,
        }
        if !self.args.is_empty() {
            write!(f, " ({})", self.args.join(", "))?;
        }
        Ok(())
    }
}

/// Receiver for structured diagnostics.
pub trait ErrorCollector {
    /// Report a defect.
    fn send(&mut self, severity: Severity, key: &str, args: &[&str], line: Option<usize>);

    /// Whether anything sent is kept. Callers may skip building arguments
    /// when this is false.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Collector that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCollector;

impl ErrorCollector for NullCollector {
    fn send(&mut self, _severity: Severity, _key: &str, _args: &[&str], _line: Option<usize>) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Collector that records every diagnostic in order.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CollectedErrors {
    diagnostics: Vec<Diagnostic>,
}

impl CollectedErrors {
    /// Create an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// All diagnostics in the order they were sent.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics of one severity.
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }

    /// Whether any diagnostic carries this key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.diagnostics.iter().any(|d| d.key == key)
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// True if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take ownership of the recorded diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl ErrorCollector for CollectedErrors {
    fn send(&mut self, severity: Severity, key: &str, args: &[&str], line: Option<usize>) {
        tracing::trace!(%severity, key, ?line, "diagnostic");
        self.diagnostics.push(Diagnostic {
            severity,
            key: key.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            line,
        });
    }
}
