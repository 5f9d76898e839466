//! Memoized parsing.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::ast::Expr;
use crate::parser::parse;

/// Thread-safe map from source text to its parsed tree.
///
/// Keys are the exact source text. Entries are never evicted, and failed
/// parses are cached as their degenerate `null` tree. Two threads missing on
/// the same text may both parse it; the trees are equal, so either insert is
/// fine.
#[derive(Debug, Default)]
pub struct ParseCache {
    entries: DashMap<String, Arc<Expr>>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached tree for `source`, parsing it on a miss.
    pub fn get_or_parse(&self, source: &str) -> Arc<Expr> {
        if let Some(expr) = self.entries.get(source) {
            return Arc::clone(&expr);
        }

        tracing::debug!(source, "parse cache miss");
        let expr = Arc::new(parse(source));
        // A concurrent miss may have inserted first; keep that tree.
        let entry = self.entries.entry(source.to_string()).or_insert(expr);
        Arc::clone(&entry)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

static GLOBAL: LazyLock<ParseCache> = LazyLock::new(ParseCache::new);

/// The process-wide cache behind [`crate::get_or_parse`].
pub fn global() -> &'static ParseCache {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_returns_same_tree() {
        let cache = ParseCache::new();
        let first = cache.get_or_parse("a.b + 1");
        let second = cache.get_or_parse("a.b + 1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_exact_text() {
        let cache = ParseCache::new();
        cache.get_or_parse("1+2");
        cache.get_or_parse("1 + 2");
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("1+2"));
        assert!(!cache.contains("1+ 2"));
    }

    #[test]
    fn test_failed_parse_is_cached_as_null() {
        let cache = ParseCache::new();
        assert!(cache.get_or_parse("1 +").is_null_literal());
        assert!(cache.contains("1 +"));
    }
}
