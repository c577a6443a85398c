//! Concurrency-safe key/value stores.
//!
//! Two implementations of the same capability set:
//! - [`SafeMap`] guards a `HashMap` with a single reader/writer lock. Reads share the
//!   lock, writes take it exclusively.
//! - [`ConcurrentMap`] wraps a sharded [`dashmap::DashMap`], so operations on different
//!   keys rarely contend and every composite operation is atomic per key.
//!
//! The shared surface is expressed by [`Store`] (plain get/set/delete/enumerate) and
//! [`AtomicStore`] (load-or-store, swap, compare-and-swap, compare-and-delete). Both maps
//! implement both traits, so code can be written once against the traits.
//!
//! Values are returned as clones; enumeration returns fresh snapshots that later writes
//! never affect. None of the operations fail: absence and mismatches are reported through
//! `Option` and `bool`.

mod concurrent;
mod safe;

pub use concurrent::ConcurrentMap;
pub use safe::SafeMap;

/// Basic key/value capability shared by the maps in this module.
pub trait Store<K, V> {
    fn get(&self, key: &K) -> Option<V>;

    /// Insert or overwrite.
    fn set(&self, key: K, value: V);

    fn delete(&self, key: &K);

    fn has(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);

    /// Snapshot of the keys, in no particular order.
    fn keys(&self) -> Vec<K>;

    /// Snapshot of the values, in no particular order.
    fn values(&self) -> Vec<V>;

    /// Visit entries until `f` returns `false`.
    fn range<F>(&self, f: F)
    where
        F: FnMut(&K, &V) -> bool;

    /// Visit every entry.
    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        self.range(|k, v| {
            f(k, v);
            true
        });
    }
}

/// Composite operations that read and write one key atomically.
pub trait AtomicStore<K, V>: Store<K, V> {
    /// Return the existing value and `true`, or store `value` and return it with `false`.
    fn load_or_store(&self, key: K, value: V) -> (V, bool);

    /// Remove the entry and return its value, if any.
    fn load_and_delete(&self, key: &K) -> Option<V>;

    /// Store `value` and return the previous value, if any.
    fn swap(&self, key: K, value: V) -> Option<V>;

    /// Replace the value with `new` only if it currently equals `old`.
    fn compare_and_swap(&self, key: &K, old: &V, new: V) -> bool
    where
        V: PartialEq;

    /// Remove the entry only if its value currently equals `old`.
    fn compare_and_delete(&self, key: &K, old: &V) -> bool
    where
        V: PartialEq;
}
