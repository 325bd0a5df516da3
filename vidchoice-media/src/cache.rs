use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
pub use string_cache::DefaultAtom as Atom;

lazy_static! {
    static ref GLOBAL_PRELOADS: PreloadCache = PreloadCache::default();
}

/// Preloaded stimulus bytes keyed by source identifier.
///
/// Cloning is cheap: clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct PreloadCache {
    buffers: Arc<RwLock<HashMap<Atom, Arc<[u8]>>>>,
}

impl PreloadCache {
    /// Process-wide cache shared by every trial
    pub fn global() -> Self {
        GLOBAL_PRELOADS.clone()
    }

    /// Store a buffer for `uri`, replacing any earlier one
    pub fn insert(&self, uri: &str, bytes: impl Into<Arc<[u8]>>) {
        let mut map = self
            .buffers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        map.insert(Atom::from(uri), bytes.into());
    }

    /// Buffer previously preloaded for `uri`, if any
    pub fn get(&self, uri: &str) -> Option<Arc<[u8]>> {
        self.buffers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&Atom::from(uri))
            .cloned()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.get(uri).is_some()
    }

    /// Current count of preloaded sources
    pub fn len(&self) -> usize {
        self.buffers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.buffers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
