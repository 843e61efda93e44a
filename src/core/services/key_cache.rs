use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::core::errors::{ExportError, Result};
use crate::core::models::key_material::KeyMaterial;
use crate::core::traits::key_source::KeySource;

static SHARED: OnceLock<Arc<KeyCache>> = OnceLock::new();

/// Read-through cache of key material, keyed by `KeySource::id`.
///
/// Entries are never invalidated on their own: a long-lived worker that
/// runs many exports reads each key file once. Callers that need rotated
/// keys must `evict` or `clear` explicitly.
#[derive(Debug, Default)]
pub struct KeyCache {
    entries: Mutex<HashMap<String, KeyMaterial>>,
}

impl KeyCache {
    /// An empty cache, isolated from every other instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache shared by sessions that do not inject their own.
    pub fn shared() -> Arc<KeyCache> {
        SHARED.get_or_init(|| Arc::new(KeyCache::new())).clone()
    }

    /// Return the material for `source`, reading it only on first request.
    ///
    /// The lock is held across the read so concurrent sessions never read
    /// the same source twice.
    pub fn get(&self, source: &dyn KeySource) -> Result<KeyMaterial> {
        let mut entries = self.lock();
        if let Some(material) = entries.get(source.id()) {
            tracing::info!(source = source.id(), "using cached key");
            return Ok(material.clone());
        }

        tracing::info!(source = source.id(), "reading key");
        let bytes = source
            .read_key()
            .map_err(|e| ExportError::KeySourceUnreadable {
                id: source.id().to_string(),
                source: e,
            })?;
        let material = KeyMaterial::new(bytes);
        entries.insert(source.id().to_string(), material.clone());
        Ok(material)
    }

    /// Drop the entry for one source so the next `get` re-reads it.
    pub fn evict(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, KeyMaterial>> {
        // Entries are inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{CountingSource, UnreadableSource};

    #[test]
    fn second_get_does_not_reread() {
        let cache = KeyCache::new();
        let source = CountingSource::new("keys/a.asc", "material-a");

        let first = cache.get(&source).unwrap();
        let second = cache.get(&source).unwrap();

        assert_eq!(source.reads(), 1);
        assert_eq!(first, second);
        assert_eq!(first.as_bytes(), b"material-a");
    }

    #[test]
    fn distinct_sources_are_cached_separately() {
        let cache = KeyCache::new();
        let a = CountingSource::new("keys/a.asc", "a");
        let b = CountingSource::new("keys/b.asc", "b");

        cache.get(&a).unwrap();
        cache.get(&b).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(a.reads(), 1);
        assert_eq!(b.reads(), 1);
    }

    #[test]
    fn evict_forces_reread() {
        let cache = KeyCache::new();
        let source = CountingSource::new("keys/a.asc", "a");

        cache.get(&source).unwrap();
        assert!(cache.evict("keys/a.asc"));
        assert!(!cache.evict("keys/a.asc"));
        cache.get(&source).unwrap();

        assert_eq!(source.reads(), 2);
    }

    #[test]
    fn clear_empties_cache() {
        let cache = KeyCache::new();
        cache.get(&CountingSource::new("keys/a.asc", "a")).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn unreadable_source_is_fatal_and_not_cached() {
        let cache = KeyCache::new();
        let result = cache.get(&UnreadableSource::new("keys/missing.asc"));

        assert!(matches!(
            result,
            Err(ExportError::KeySourceUnreadable { ref id, .. }) if id == "keys/missing.asc"
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_gets_read_once() {
        let cache = Arc::new(KeyCache::new());
        let source = Arc::new(CountingSource::new("keys/a.asc", "a"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let source = Arc::clone(&source);
                std::thread::spawn(move || cache.get(source.as_ref()).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(source.reads(), 1);
    }

    #[test]
    fn shared_returns_same_instance() {
        assert!(Arc::ptr_eq(&KeyCache::shared(), &KeyCache::shared()));
    }
}
