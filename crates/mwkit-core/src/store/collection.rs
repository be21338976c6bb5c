// ── Generic entity collection ──
//
// Lock-free concurrent storage with O(1) lookups. Change notification is
// owned by the store so one logical mutation bumps the version once.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;

/// A lock-free collection for a single entity type, keyed by its identity.
pub(crate) struct EntityCollection<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    by_key: DashMap<K, Arc<T>>,
}

impl<K, T> EntityCollection<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            by_key: DashMap::new(),
        }
    }

    /// Insert or replace an entity. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: K, entity: T) -> bool {
        self.by_key.insert(key, Arc::new(entity)).is_none()
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &K) -> Option<Arc<T>> {
        self.by_key.remove(key).map(|(_, v)| v)
    }

    pub(crate) fn get(&self, key: &K) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }

    /// Mutate an entity in place (copy-on-write if a reader still holds
    /// the old `Arc`). Returns `false` if the key is absent.
    pub(crate) fn update(&self, key: &K, f: impl FnOnce(&mut T)) -> bool {
        match self.by_key.get_mut(key) {
            Some(mut entry) => {
                f(Arc::make_mut(entry.value_mut()));
                true
            }
            None => false,
        }
    }

    /// All current values, in no particular order.
    pub(crate) fn values(&self) -> Vec<Arc<T>> {
        self.by_key.iter().map(|r| Arc::clone(r.value())).collect()
    }

    /// Return all current keys in the collection.
    pub(crate) fn keys(&self) -> Vec<K> {
        self.by_key.iter().map(|r| r.key().clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upsert_returns_true_for_new_key() {
        let col: EntityCollection<String, String> = EntityCollection::new();
        assert!(col.upsert("key1".into(), "hello".into()));
    }

    #[test]
    fn upsert_returns_false_for_existing_key() {
        let col: EntityCollection<String, String> = EntityCollection::new();
        col.upsert("key1".into(), "hello".into());
        assert!(!col.upsert("key1".into(), "world".into()));
        assert_eq!(*col.get(&"key1".into()).unwrap(), "world");
    }

    #[test]
    fn remove_returns_entity() {
        let col: EntityCollection<String, String> = EntityCollection::new();
        col.upsert("key1".into(), "hello".into());

        let removed = col.remove(&"key1".into());
        assert_eq!(*removed.unwrap(), "hello");
        assert!(col.get(&"key1".into()).is_none());
        assert!(col.is_empty());
    }

    #[test]
    fn update_copies_on_write() {
        let col: EntityCollection<u32, String> = EntityCollection::new();
        col.upsert(1, "old".into());
        let held = col.get(&1).unwrap();

        assert!(col.update(&1, |s| *s = "new".into()));
        assert_eq!(*held, "old");
        assert_eq!(*col.get(&1).unwrap(), "new");
    }

    #[test]
    fn update_missing_key_is_noop() {
        let col: EntityCollection<u32, String> = EntityCollection::new();
        assert!(!col.update(&7, |s| s.push('x')));
        assert_eq!(col.len(), 0);
    }

    #[test]
    fn keys_and_values_reflect_contents() {
        let col: EntityCollection<u32, &'static str> = EntityCollection::new();
        col.upsert(1, "x");
        col.upsert(2, "y");

        let mut keys = col.keys();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2]);
        assert_eq!(col.values().len(), 2);
    }
}
