//! Lexers: markup → token stream.
//!
//! Two interchangeable strategies produce the same stream for well-formed
//! input. [`DirectLex`] is a hand-written scanner that tracks line and
//! column and reports what it repaired. [`NativeLex`] delegates to
//! html5ever and is more forgiving but knows nothing about positions.

mod direct;
mod native;

use std::str::FromStr;

use purify_common::{Config, ErrorCollector, PurifyError};
use purify_dom::Token;
use strum_macros::{Display, EnumString};

use crate::entities::EntityParser;
use crate::normalize::NormalizeSettings;

pub use direct::DirectLex;
pub use native::NativeLex;

/// What every lexer needs besides the markup itself.
#[derive(Debug, Clone, Default)]
pub struct LexContext {
    /// Pre-tokenizing clean-up.
    pub normalize: NormalizeSettings,
    /// Entity decoder for text and attribute values.
    pub entities: EntityParser,
    /// Attach line/column positions to tokens.
    pub track_lines: bool,
}

impl LexContext {
    /// Read the lexer-related directives.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            normalize: NormalizeSettings::from_config(config),
            entities: EntityParser::new(),
            track_lines: config.get_bool("Core.MaintainLineNumbers")
                || config.get_bool("Core.CollectErrors"),
        }
    }
}

/// A tokenizing strategy.
pub trait Lexer: Send + Sync {
    /// Tokenize `html`, reporting repairs to `errors`.
    ///
    /// # Errors
    /// Malformed markup never fails; only an internal invariant violation
    /// (a scanner that stops advancing) does.
    fn tokenize(
        &self,
        html: &str,
        cx: &LexContext,
        errors: &mut dyn ErrorCollector,
    ) -> Result<Vec<Token>, PurifyError>;
}

/// Names accepted by `Core.LexerImpl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LexerKind {
    /// [`DirectLex`]
    Direct,
    /// [`NativeLex`]
    Native,
}

impl LexerKind {
    /// The lexer a configuration asks for.
    ///
    /// Line tracking and error collection need positions, which only the
    /// direct lexer provides, so either forces it.
    ///
    /// # Errors
    /// Returns [`PurifyError::UnknownLexer`] for an unrecognized name.
    pub fn from_config(config: &Config) -> Result<Self, PurifyError> {
        let name = config.get_str("Core.LexerImpl").unwrap_or("direct");
        let kind =
            Self::from_str(name).map_err(|_| PurifyError::UnknownLexer(name.to_string()))?;
        if config.get_bool("Core.MaintainLineNumbers") || config.get_bool("Core.CollectErrors") {
            return Ok(Self::Direct);
        }
        Ok(kind)
    }

    /// Instantiate the strategy.
    #[must_use]
    pub fn build(self) -> Box<dyn Lexer> {
        match self {
            Self::Direct => Box::new(DirectLex::new()),
            Self::Native => Box::new(NativeLex::new()),
        }
    }
}
