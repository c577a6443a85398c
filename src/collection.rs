//! Sequential collection transforms.
//!
//! Plain, single-threaded helpers over slices and hash maps. They allocate their output
//! and never mutate their input (except the explicit in-place sorts). The sequential
//! [`Runner`](crate::Runner) mode is built on [`transform_by`].

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Map every element through `f`, preserving order.
pub fn transform_by<T, O, F>(source: &[T], f: F) -> Vec<O>
where
    F: FnMut(&T) -> O,
{
    source.iter().map(f).collect()
}

/// Map every element to a `Vec` and concatenate the results in order.
pub fn transform_many_by<T, O, F>(source: &[T], f: F) -> Vec<O>
where
    F: FnMut(&T) -> Vec<O>,
{
    flatten(transform_by(source, f))
}

/// Concatenate nested vectors, allocating the output once.
pub fn flatten<T>(source: Vec<Vec<T>>) -> Vec<T> {
    let size = source.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(size);
    for part in source {
        out.extend(part);
    }
    out
}

/// Map every value of `source`, keeping keys.
pub fn map_transform_by<K, T, O, F>(source: &HashMap<K, T>, mut f: F) -> HashMap<K, O>
where
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> O,
{
    source.iter().map(|(k, v)| (k.clone(), f(v))).collect()
}

/// Turn every entry into one output element (order unspecified).
pub fn map_to_vec<K, T, O, F>(source: &HashMap<K, T>, mut f: F) -> Vec<O>
where
    F: FnMut(&K, &T) -> O,
{
    source.iter().map(|(k, v)| f(k, v)).collect()
}

/// Index elements by `key`. When two elements share a key the later one wins.
pub fn slice_to_map<K, T, F>(source: &[T], mut key: F) -> HashMap<K, T>
where
    K: Eq + Hash,
    T: Clone,
    F: FnMut(&T) -> K,
{
    source.iter().map(|v| (key(v), v.clone())).collect()
}

/// Keep the elements matching `pred`, preserving order.
pub fn filter_by<T, F>(source: &[T], mut pred: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    source.iter().filter(|v| pred(v)).cloned().collect()
}

/// Predicate testing membership in `source`: it returns `present` for members and
/// `!present` for everything else.
pub fn in_filter<T>(source: &[T], present: bool) -> impl Fn(&T) -> bool + use<T>
where
    T: Eq + Hash + Clone,
{
    let set: HashSet<T> = source.iter().cloned().collect();
    move |item| set.contains(item) == present
}

/// Keep the entries matching `pred`.
pub fn map_filter_by<K, T, F>(source: &HashMap<K, T>, mut pred: F) -> HashMap<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
    F: FnMut(&K, &T) -> bool,
{
    source
        .iter()
        .filter(|(k, v)| pred(k, v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Drop repeated elements, keeping the first occurrence of each.
pub fn distinct<T>(source: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::with_capacity(source.len());
    source
        .iter()
        .filter(|v| seen.insert(*v))
        .cloned()
        .collect()
}

/// Drop elements that `equals` considers repeated.
///
/// The first occurrence keeps its position but takes the value of the latest equal
/// element.
pub fn distinct_by<T, F>(source: &[T], mut equals: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> bool,
{
    let mut out: Vec<T> = Vec::with_capacity(source.len());
    for v in source {
        match out.iter().position(|u| equals(v, u)) {
            Some(i) => out[i] = v.clone(),
            None => out.push(v.clone()),
        }
    }
    out
}

/// Elements of `a` that are not in `b` (duplicates in `a` are kept).
pub fn difference<T>(a: &[T], b: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    filter_by(a, in_filter(b, false))
}

/// Unique elements of `a` that are also in `b`, in `a`'s order.
pub fn intersection<T>(a: &[T], b: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    distinct(&filter_by(a, in_filter(b, true)))
}

/// Elements that occur more than once, each reported once.
pub fn duplicates<T>(source: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::with_capacity(source.len());
    let repeated: Vec<T> = source
        .iter()
        .filter(|v| !seen.insert(*v))
        .cloned()
        .collect();
    distinct(&repeated)
}

/// Group elements by `key`, preserving order within each group.
pub fn group_by<T, K, F>(source: &[T], mut key: F) -> HashMap<K, Vec<T>>
where
    T: Clone,
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut out: HashMap<K, Vec<T>> = HashMap::new();
    for v in source {
        out.entry(key(v)).or_default().push(v.clone());
    }
    out
}

/// Fold `source` left to right, starting from `A::default()`.
pub fn aggregate<T, A, F>(source: &[T], f: F) -> A
where
    A: Default,
    F: FnMut(A, &T) -> A,
{
    source.iter().fold(A::default(), f)
}

/// Smallest element, or `None` for an empty slice.
///
/// Only `PartialOrd` is required, so floats are accepted. An element that does not compare
/// less than the current minimum (NaN included) never replaces it.
#[must_use]
pub fn min_of<T: PartialOrd + Clone>(source: &[T]) -> Option<T> {
    let (first, rest) = source.split_first()?;
    let best = rest.iter().fold(first, |best, v| if v < best { v } else { best });
    Some(best.clone())
}

#[must_use]
pub fn max_of<T: PartialOrd + Clone>(source: &[T]) -> Option<T> {
    let (first, rest) = source.split_first()?;
    let best = rest.iter().fold(first, |best, v| if v > best { v } else { best });
    Some(best.clone())
}

pub fn sort<T: Ord>(source: &mut [T]) {
    source.sort();
}

/// Stable sort by `compare`.
pub fn sort_by<T, F>(source: &mut [T], compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    source.sort_by(compare);
}

pub fn contains<T: PartialEq>(source: &[T], item: &T) -> bool {
    source.contains(item)
}

pub fn map_contains<K: Eq + Hash, V>(source: &HashMap<K, V>, key: &K) -> bool {
    source.contains_key(key)
}

pub fn any<T, F: FnMut(&T) -> bool>(source: &[T], pred: F) -> bool {
    source.iter().any(pred)
}

/// True for an empty slice.
pub fn all<T, F: FnMut(&T) -> bool>(source: &[T], pred: F) -> bool {
    source.iter().all(pred)
}

pub fn map_keys<K: Clone, V>(source: &HashMap<K, V>) -> Vec<K> {
    source.keys().cloned().collect()
}

pub fn map_values<K, V: Clone>(source: &HashMap<K, V>) -> Vec<V> {
    source.values().cloned().collect()
}
