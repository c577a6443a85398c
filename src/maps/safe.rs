use super::{AtomicStore, Store};
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;

/// `HashMap` behind a reader/writer lock.
///
/// `set`, `delete` and `clear` take the lock exclusively; every other operation shares it.
/// [`SafeMap::for_each`] holds the shared lock for the whole visit, so the visitor must
/// not write to the same map and should not block.
///
/// # Example
///
/// ```
/// use fanflow::SafeMap;
///
/// let m = SafeMap::new();
/// m.set("a", 1);
/// assert_eq!(m.get("a"), Some(1));
/// assert!(m.has("a"));
/// m.delete("a");
/// assert!(m.is_empty());
/// ```
pub struct SafeMap<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> SafeMap<K, V>
where
    K: Eq + Hash,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    pub fn set(&self, key: K, value: V) {
        self.inner.write().insert(key, value);
    }

    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove(key);
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Drop every entry and release the backing allocation.
    pub fn clear(&self) {
        *self.inner.write() = HashMap::new();
    }

    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.inner.read().keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.inner.read().values().cloned().collect()
    }

    /// Visit every entry under the shared lock.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.inner.read().iter() {
            f(k, v);
        }
    }

    /// Consume the map and return the underlying `HashMap`.
    pub fn into_inner(self) -> HashMap<K, V> {
        self.inner.into_inner()
    }
}

impl<K, V> Default for SafeMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<HashMap<K, V>> for SafeMap<K, V> {
    fn from(map: HashMap<K, V>) -> Self {
        Self {
            inner: RwLock::new(map),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SafeMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<HashMap<K, V>>())
    }
}

impl<K, V> fmt::Debug for SafeMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.read().iter()).finish()
    }
}

impl<K, V> Store<K, V> for SafeMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        SafeMap::get(self, key)
    }

    fn set(&self, key: K, value: V) {
        SafeMap::set(self, key, value);
    }

    fn delete(&self, key: &K) {
        SafeMap::delete(self, key);
    }

    fn has(&self, key: &K) -> bool {
        SafeMap::has(self, key)
    }

    fn len(&self) -> usize {
        SafeMap::len(self)
    }

    fn clear(&self) {
        SafeMap::clear(self);
    }

    fn keys(&self) -> Vec<K> {
        SafeMap::keys(self)
    }

    fn values(&self) -> Vec<V> {
        SafeMap::values(self)
    }

    fn range<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for (k, v) in self.inner.read().iter() {
            if !f(k, v) {
                break;
            }
        }
    }

    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V),
    {
        SafeMap::for_each(self, f);
    }
}

// Composite operations run under the exclusive lock.
impl<K, V> AtomicStore<K, V> for SafeMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn load_or_store(&self, key: K, value: V) -> (V, bool) {
        match self.inner.write().entry(key) {
            Entry::Occupied(e) => (e.get().clone(), true),
            Entry::Vacant(e) => (e.insert(value).clone(), false),
        }
    }

    fn load_and_delete(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }

    fn swap(&self, key: K, value: V) -> Option<V> {
        self.inner.write().insert(key, value)
    }

    fn compare_and_swap(&self, key: &K, old: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        let mut map = self.inner.write();
        match map.get_mut(key) {
            Some(current) if *current == *old => {
                *current = new;
                true
            }
            _ => false,
        }
    }

    fn compare_and_delete(&self, key: &K, old: &V) -> bool
    where
        V: PartialEq,
    {
        let mut map = self.inner.write();
        if map.get(key) != Some(old) {
            return false;
        }
        map.remove(key);
        true
    }
}
