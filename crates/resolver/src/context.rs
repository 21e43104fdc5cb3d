//! Resolution context: search scope plus identifier cache.
//!
//! A context is created per document-open operation and dropped when the
//! document session ends, taking its cache with it.

use std::path::{Path, PathBuf};

use crate::cache::IdentifierCache;

/// Groups the search roots for one document session with its identifier cache.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    search_paths: Vec<PathBuf>,
    cache: IdentifierCache,
}

impl ResolutionContext {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            cache: IdentifierCache::new(),
        }
    }

    /// Ordered root search paths.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn cache(&self) -> &IdentifierCache {
        &self.cache
    }

    /// First search root under which `relative` exists.
    pub fn find_in_search_paths(&self, relative: &Path) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.exists())
    }
}
