//! Identifier cache scoped to one resolution context.
//!
//! Keys are the exact literal reference strings: case-sensitive and never
//! normalized before lookup. There is no eviction; the cache lives and dies
//! with its [`ResolutionContext`](crate::context::ResolutionContext).

use dashmap::DashMap;
use log::debug;

use crate::models::ResolvedLocation;

/// Concurrent memo of identifier -> resolved location.
///
/// Reads never block each other. Two threads racing on the first resolution
/// of the same key both store their value; the last write wins.
#[derive(Debug, Default)]
pub struct IdentifierCache {
    entries: DashMap<String, ResolvedLocation>,
}

impl IdentifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<ResolvedLocation> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn put(&self, key: impl Into<String>, value: ResolvedLocation) {
        let key = key.into();
        if self.entries.insert(key.clone(), value).is_some() {
            debug!("Identifier cache: replaced entry for '{}'", key);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn location(path: &str) -> ResolvedLocation {
        ResolvedLocation::new(PathBuf::from(path))
    }

    #[test]
    fn test_get_after_put() {
        let cache = IdentifierCache::new();
        assert!(cache.get("bal:///cat").is_none());

        cache.put("bal:///cat", location("/lib/cat.usda"));
        assert_eq!(cache.get("bal:///cat"), Some(location("/lib/cat.usda")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_literal() {
        let cache = IdentifierCache::new();
        cache.put("bal:///Cat", location("/lib/Cat.usda"));

        assert!(cache.get("bal:///cat").is_none());
        assert!(cache.get("bal:///Cat/").is_none());
        assert!(cache.contains("bal:///Cat"));
    }

    #[test]
    fn test_clear() {
        let cache = IdentifierCache::new();
        cache.put("bal:///a", location("/a"));
        cache.put("bal:///b", location("/b"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_racing_writers_converge() {
        let cache = IdentifierCache::new();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let cache = &cache;
                scope.spawn(move || {
                    cache.put("bal:///cat", location(&format!("/lib/cat{}.usda", i)));
                    assert!(cache.get("bal:///cat").is_some());
                });
            }
        });

        assert_eq!(cache.len(), 1);
        assert!(cache.get("bal:///cat").is_some());
    }
}
