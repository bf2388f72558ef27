//! Developer warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used when a schema is misconfigured (an allowed element that does not
//! exist, a list container without `li`), never for untrusted input.

use std::collections::HashSet;
use std::sync::Mutex;

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a schema or configuration defect (prints once per unique message)
///
/// Every call is also recorded as a `tracing` event, deduplicated or not.
///
/// # Example
/// ```ignore
/// warn_once("HTMLDefinition", "element 'blink' is not supported");
/// ```
pub fn warn_once(component: &str, message: &str) {
    tracing::warn!(component, message, "schema warning");

    let key = format!("[{component}] {message}");
    // A poisoned set only loses deduplication, so keep going with its contents.
    let should_print = WARNED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[purify {component}] ⚠ {message}").yellow());
    }
}

/// Clear all recorded warnings (call when switching configurations)
pub fn clear_warnings() {
    let mut guard = WARNED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Whether `warn_once` has already printed this exact message.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}
