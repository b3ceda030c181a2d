//! Parse diagnostics with colored terminal output.
//!
//! Recoverable parse errors are reported here as well as in the parser's error
//! list. Each distinct `(component, message)` pair is printed once per process
//! so that a malformed document does not flood stderr.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    // A panic while holding the lock leaves the set itself intact.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key(component: &str, message: &str) -> String {
    format!("[{component}] {message}")
}

/// Report a diagnostic (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("XML Tokenizer", "duplicate-attribute: id");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let should_print = warned()
        .get_or_insert_with(HashSet::new)
        .insert(key(component, message));

    if should_print {
        eprintln!("{}", format!("[xml5 {component}] ⚠ {message}").yellow());
    }
}

/// Whether this exact diagnostic has been reported since the last clear.
#[must_use]
pub fn has_warned(component: &str, message: &str) -> bool {
    warned()
        .as_ref()
        .is_some_and(|set| set.contains(&key(component, message)))
}

/// Clear all recorded warnings (call before parsing a new document)
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}
