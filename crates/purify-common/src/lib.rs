//! Common infrastructure for the purify sanitizer.
//!
//! This crate provides shared infrastructure used by all pipeline stages:
//! - **Configuration** - typed `Namespace.Directive` store with fingerprints
//! - **Errors** - fatal setup/invariant errors and structured diagnostics
//! - **Definition Cache** - amortizes schema construction across calls
//! - **Warning System** - deduplicated developer warnings for schema defects

pub mod cache;
pub mod collector;
pub mod config;
pub mod error;
pub mod warning;

pub use cache::{DefinitionCache, MemoryCache, NoOpCache};
pub use collector::{CollectedErrors, Diagnostic, ErrorCollector, NullCollector, Severity};
pub use config::Config;
pub use error::PurifyError;
