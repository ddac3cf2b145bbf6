//! Process-wide caches of compiled regular expressions.

use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::RwLock;

/// A lazily populated map from a key to its compiled pattern.
///
/// Lookups take a read lock. A miss compiles outside any lock and inserts
/// with `or_insert`, so two threads racing on the same key both compile and
/// the first insert wins.
#[derive(Debug, Default)]
pub(crate) struct RegexCache {
    entries: RwLock<FxHashMap<String, Regex>>,
}

impl RegexCache {
    /// Returns the cached regex for `key`, compiling `pattern(key)` on a miss.
    ///
    /// Returns `None` only if the generated pattern fails to compile.
    pub(crate) fn get_or_compile(&self, key: &str, pattern: impl FnOnce() -> String) -> Option<Regex> {
        if let Ok(entries) = self.entries.read() {
            if let Some(re) = entries.get(key) {
                return Some(re.clone());
            }
        }

        let compiled = Regex::new(&pattern()).ok()?;
        match self.entries.write() {
            Ok(mut entries) => Some(entries.entry(key.to_string()).or_insert(compiled).clone()),
            Err(_) => Some(compiled),
        }
    }
}
