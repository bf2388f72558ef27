//! The sanitizer entry point.

use std::sync::Arc;

use purify_common::{CollectedErrors, Config, ErrorCollector, NullCollector, PurifyError};
use purify_css::IdAccumulator;
use purify_html::{Generator, LexContext, Lexer, LexerKind};

use crate::definition::{DefinitionCaches, HtmlDefinition};
use crate::strategy::{self, StrategySettings};

/// State that lives for one document.
pub struct PurifyContext<'a> {
    /// IDs used so far, so that duplicates can be rejected.
    pub ids: IdAccumulator,
    /// Where diagnostics go.
    pub errors: &'a mut dyn ErrorCollector,
}

impl<'a> PurifyContext<'a> {
    /// Fresh state reporting to `errors`.
    pub fn new(errors: &'a mut dyn ErrorCollector) -> Self {
        Self {
            ids: IdAccumulator::new(),
            errors,
        }
    }
}

/// Output of one purification.
#[derive(Debug, Clone)]
pub struct Purified {
    /// The sanitized markup.
    pub html: String,
    /// Diagnostics, when `Core.CollectErrors` is on.
    pub errors: Option<CollectedErrors>,
}

/// A configured sanitizer.
///
/// Construction does all the setup work (schema, lexer choice) and reports
/// configuration errors; after that the purifier is immutable and can be
/// shared between threads.
pub struct Purifier {
    config: Config,
    definition: Arc<HtmlDefinition>,
    lexer: Box<dyn Lexer>,
    lex: LexContext,
    generator: Generator,
    settings: StrategySettings,
    collect_errors: bool,
}

impl std::fmt::Debug for Purifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Purifier")
            .field("root", &self.definition.root_name())
            .field("collect_errors", &self.collect_errors)
            .finish_non_exhaustive()
    }
}

impl Purifier {
    /// A purifier that builds its definitions from scratch.
    ///
    /// # Errors
    /// Returns any setup error: an unknown lexer, an unknown content-model
    /// type, a malformed custom content model.
    pub fn new(config: Config) -> Result<Self, PurifyError> {
        Self::with_caches(config, &DefinitionCaches::none())
    }

    /// A purifier that fetches its definitions through `caches`.
    ///
    /// # Errors
    /// As [`Purifier::new`], plus [`PurifyError::CacheMismatch`] when a
    /// cache returns a definition built for another configuration.
    pub fn with_caches(mut config: Config, caches: &DefinitionCaches) -> Result<Self, PurifyError> {
        config.finalize();
        let lexer_kind = LexerKind::from_config(&config)?;
        let definition = HtmlDefinition::fetch(&config, caches)?;
        tracing::debug!(lexer = %lexer_kind, parent = definition.root_name(), "purifier ready");
        Ok(Self {
            lexer: lexer_kind.build(),
            lex: LexContext::from_config(&config),
            generator: Generator::new(),
            settings: StrategySettings::from_config(&config),
            collect_errors: config.get_bool("Core.CollectErrors"),
            definition,
            config,
        })
    }

    /// The frozen configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The schema in use.
    #[must_use]
    pub fn definition(&self) -> &HtmlDefinition {
        &self.definition
    }

    /// Sanitize one document.
    ///
    /// # Errors
    /// Only internal invariant violations fail; malformed markup never does.
    pub fn purify(&self, html: &str) -> Result<Purified, PurifyError> {
        if self.collect_errors {
            let mut collected = CollectedErrors::new();
            let html = self.purify_with(html, &mut collected)?;
            Ok(Purified {
                html,
                errors: Some(collected),
            })
        } else {
            let html = self.purify_with(html, &mut NullCollector)?;
            Ok(Purified { html, errors: None })
        }
    }

    /// Sanitize one document, reporting to a caller-supplied collector.
    ///
    /// # Errors
    /// See [`Purifier::purify`].
    pub fn purify_with(
        &self,
        html: &str,
        errors: &mut dyn ErrorCollector,
    ) -> Result<String, PurifyError> {
        let tokens = self.lexer.tokenize(html, &self.lex, errors)?;
        let mut cx = PurifyContext::new(errors);
        let tokens = strategy::run(
            tokens,
            &self.definition,
            &self.settings,
            &self.generator,
            &mut cx,
        );
        Ok(self.generator.render_all(&tokens))
    }

    /// Sanitize several documents. Each gets its own per-document state.
    ///
    /// # Errors
    /// Stops at the first document that fails.
    pub fn purify_array<S: AsRef<str>>(&self, inputs: &[S]) -> Result<Vec<Purified>, PurifyError> {
        inputs.iter().map(|html| self.purify(html.as_ref())).collect()
    }
}
