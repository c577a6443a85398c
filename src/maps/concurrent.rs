use super::{AtomicStore, Store};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

/// Sharded concurrent map with atomic per-key composite operations.
///
/// Each key lives in one shard guarded by its own lock, so every operation on a single
/// key (including [`compare_and_swap`](Self::compare_and_swap) and
/// [`load_or_store`](Self::load_or_store)) is atomic. No guard is ever handed out: values
/// come back as clones, and [`range`](Self::range) visits a snapshot, so the visitor may
/// freely call back into the map.
///
/// # Example
///
/// ```
/// use fanflow::ConcurrentMap;
///
/// let m = ConcurrentMap::new();
/// assert_eq!(m.load_or_store("k", 1), (1, false));
/// assert_eq!(m.load_or_store("k", 2), (1, true));
///
/// assert!(!m.compare_and_swap("k", &7, 3));
/// assert!(m.compare_and_swap("k", &1, 3));
/// assert_eq!(m.load("k"), Some(3));
/// ```
pub struct ConcurrentMap<K, V> {
    inner: DashMap<K, V>,
}

impl<K, V> ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: DashMap::with_capacity(capacity),
        }
    }

    pub fn load<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.get(key).map(|r| r.value().clone())
    }

    pub fn store(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Return the existing value and `true`, or store `value` and return it with `false`.
    pub fn load_or_store(&self, key: K, value: V) -> (V, bool)
    where
        V: Clone,
    {
        match self.inner.entry(key) {
            Entry::Occupied(e) => (e.get().clone(), true),
            Entry::Vacant(e) => (e.insert(value).value().clone(), false),
        }
    }

    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(key);
    }

    pub fn load_and_delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(key).map(|(_, v)| v)
    }

    /// Store `value` unconditionally and return the previous value, if any.
    pub fn swap(&self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    /// Replace the value with `new` only if the current value equals `old`.
    pub fn compare_and_swap<Q>(&self, key: &Q, old: &V, new: V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        let Some(mut current) = self.inner.get_mut(key) else {
            return false;
        };
        if *current != *old {
            return false;
        }
        *current = new;
        true
    }

    /// Remove the entry only if its value equals `old`.
    pub fn compare_and_delete<Q>(&self, key: &Q, old: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        self.inner.remove_if(key, |_, v| v == old).is_some()
    }

    /// Visit a snapshot of the entries until `f` returns `false`.
    ///
    /// The snapshot is consistent per shard, not across the whole map.
    pub fn range<F>(&self, mut f: F)
    where
        K: Clone,
        V: Clone,
        F: FnMut(&K, &V) -> bool,
    {
        for (k, v) in self.snapshot() {
            if !f(&k, &v) {
                break;
            }
        }
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.inner
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

impl<K, V> Default for ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<K, V> fmt::Debug for ConcurrentMap<K, V>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl<K, V> Store<K, V> for ConcurrentMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        self.load(key)
    }

    fn set(&self, key: K, value: V) {
        self.store(key, value);
    }

    fn delete(&self, key: &K) {
        ConcurrentMap::delete(self, key);
    }

    fn has(&self, key: &K) -> bool {
        ConcurrentMap::has(self, key)
    }

    fn len(&self) -> usize {
        ConcurrentMap::len(self)
    }

    fn clear(&self) {
        ConcurrentMap::clear(self);
    }

    fn keys(&self) -> Vec<K> {
        self.inner.iter().map(|e| e.key().clone()).collect()
    }

    fn values(&self) -> Vec<V> {
        self.inner.iter().map(|e| e.value().clone()).collect()
    }

    fn range<F>(&self, f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        ConcurrentMap::range(self, f);
    }
}

impl<K, V> AtomicStore<K, V> for ConcurrentMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn load_or_store(&self, key: K, value: V) -> (V, bool) {
        ConcurrentMap::load_or_store(self, key, value)
    }

    fn load_and_delete(&self, key: &K) -> Option<V> {
        ConcurrentMap::load_and_delete(self, key)
    }

    fn swap(&self, key: K, value: V) -> Option<V> {
        ConcurrentMap::swap(self, key, value)
    }

    fn compare_and_swap(&self, key: &K, old: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        ConcurrentMap::compare_and_swap(self, key, old, new)
    }

    fn compare_and_delete(&self, key: &K, old: &V) -> bool
    where
        V: PartialEq,
    {
        ConcurrentMap::compare_and_delete(self, key, old)
    }
}
