//! Integration tests for configuration, caching and diagnostics

use std::sync::Arc;

use purify_common::warning::{clear_warnings, warn_once, was_warned};
use purify_common::{
    CollectedErrors, Config, DefinitionCache, ErrorCollector, MemoryCache, NoOpCache,
    NullCollector, PurifyError, Severity,
};

// ========== Config ==========

#[test]
fn test_defaults() {
    let config = Config::new();
    assert_eq!(config.get_str("HTML.Parent"), Some("div"));
    assert_eq!(config.get_str("Core.LexerImpl"), Some("direct"));
    assert!(config.get_bool("Core.AggressivelyRemoveScript"));
    assert!(config.get_str("HTML.Allowed").is_none());
    assert!(config.get_list("CSS.AllowedProperties").is_none());
    assert!(config.get_set("URI.AllowedSchemes").contains("https"));
}

#[test]
fn test_unknown_directive_is_rejected() {
    let mut config = Config::new();
    let err = config.set("HTML.Bogus", true).unwrap_err();
    assert_eq!(err, PurifyError::UnknownDirective("HTML.Bogus".to_string()));
}

#[test]
fn test_wrong_type_is_rejected() {
    let mut config = Config::new();
    match config.set("Core.CollectErrors", "yes") {
        Err(PurifyError::DirectiveType { key, .. }) => assert_eq!(key, "Core.CollectErrors"),
        other => panic!("Expected DirectiveType, got {other:?}"),
    }
}

#[test]
fn test_finalized_config_rejects_writes() {
    let mut config = Config::new();
    config.finalize();
    assert!(matches!(
        config.set("HTML.Parent", "span"),
        Err(PurifyError::ConfigFinalized(_))
    ));
}

#[test]
fn test_from_json_nested_and_flat() {
    let config =
        Config::from_json(r#"{"HTML": {"Allowed": "p,b"}, "Core.LexerImpl": "native"}"#).unwrap();
    assert_eq!(config.get_str("HTML.Allowed"), Some("p,b"));
    assert_eq!(config.get_str("Core.LexerImpl"), Some("native"));
}

#[test]
fn test_from_json_rejects_non_object() {
    assert!(matches!(
        Config::from_json("[1, 2]"),
        Err(PurifyError::ConfigSyntax(_))
    ));
}

#[test]
fn test_revision_changes_fingerprint() {
    let a = Config::new();
    let mut b = Config::new();
    b.set("HTML.DefinitionRev", 2).unwrap();
    assert_ne!(a.fingerprint("HTML"), b.fingerprint("HTML"));
    assert!(b.fingerprint("HTML").ends_with("-2"));
}

// ========== Cache ==========

#[test]
fn test_memory_cache_add_set_replace() {
    let cache: MemoryCache<String> = MemoryCache::new();
    assert!(cache.get("k").is_none());
    assert!(!cache.replace("k", Arc::new("x".to_string())));
    assert!(cache.add("k", Arc::new("first".to_string())));
    assert!(!cache.add("k", Arc::new("second".to_string())));
    assert_eq!(cache.get("k").unwrap().as_str(), "first");
    assert!(cache.replace("k", Arc::new("third".to_string())));
    assert_eq!(cache.get("k").unwrap().as_str(), "third");
    assert!(cache.set("j", Arc::new("other".to_string())));
    assert_eq!(cache.len(), 2);
    cache.flush();
    assert!(cache.is_empty());
}

#[test]
fn test_noop_cache_never_stores() {
    let cache = NoOpCache;
    assert!(!DefinitionCache::<u32>::set(&cache, "k", Arc::new(1)));
    assert!(DefinitionCache::<u32>::get(&cache, "k").is_none());
    assert!(DefinitionCache::<u32>::is_empty(&cache));
}

// ========== Collector ==========

#[test]
fn test_collected_errors_keep_order() {
    let mut errors = CollectedErrors::new();
    errors.send(Severity::Error, "Lexer: Unescaped lt", &[], Some(3));
    errors.send(Severity::Warning, "Strategy_FixNesting: Node reorganized", &["p"], None);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.diagnostics()[0].line, Some(3));
    assert_eq!(errors.by_severity(Severity::Warning).count(), 1);
    assert!(errors.contains_key("Lexer: Unescaped lt"));
    assert_eq!(
        errors.diagnostics()[1].to_string(),
        "warning: Strategy_FixNesting: Node reorganized (p)"
    );
}

#[test]
fn test_null_collector_is_disabled() {
    let mut errors = NullCollector;
    assert!(!errors.is_enabled());
    errors.send(Severity::Error, "ignored", &[], None);
}

// ========== Warnings ==========

#[test]
fn test_warn_once_records_message() {
    warn_once("Test", "a unique message for the warning test");
    assert!(was_warned("Test", "a unique message for the warning test"));
    clear_warnings();
    assert!(!was_warned("Test", "a unique message for the warning test"));
}
