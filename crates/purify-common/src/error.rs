//! Hard failures.
//!
//! Malformed or hostile markup never produces one of these. They are raised
//! for setup defects (before any document is processed) and for internal
//! invariant violations, which indicate a programming error.

use thiserror::Error;

/// A fatal sanitizer error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PurifyError {
    /// A configuration key that no namespace defines.
    #[error("unknown configuration directive '{0}'")]
    UnknownDirective(String),

    /// A configuration value whose JSON type does not match the directive.
    #[error("directive '{key}' expects {expected}")]
    DirectiveType {
        /// The offending directive.
        key: String,
        /// Human readable name of the expected type.
        expected: &'static str,
    },

    /// The configuration was already finalized by a purifier.
    #[error("cannot modify directive '{0}': configuration is finalized")]
    ConfigFinalized(String),

    /// The configuration source was not a JSON object of directives.
    #[error("invalid configuration document: {0}")]
    ConfigSyntax(String),

    /// `Core.LexerImpl` named a lexer that does not exist.
    #[error("no lexer named '{0}'")]
    UnknownLexer(String),

    /// An element declared a content model type that has no child validator.
    #[error("element '{element}' declares unknown content model type '{kind}'")]
    UnknownContentModel {
        /// Element carrying the bad declaration.
        element: String,
        /// The unrecognized type name.
        kind: String,
    },

    /// A custom content model expression failed to compile.
    #[error("content model for '{element}' is not a valid expression: {reason}")]
    ContentModelSyntax {
        /// Element carrying the bad declaration.
        element: String,
        /// Why it failed.
        reason: String,
    },

    /// A cache handed back a definition built for another configuration.
    #[error("definition cache returned a stale {kind} definition")]
    CacheMismatch {
        /// Which definition family was requested.
        kind: &'static str,
    },

    /// The attribute scanner stopped advancing over its input.
    #[error("attribute scanner made no progress at offset {offset} in {input:?}")]
    InfiniteLoop {
        /// Cursor position where the loop was detected.
        offset: usize,
        /// The attribute string being scanned.
        input: String,
    },

    /// Some other internal invariant did not hold.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}
