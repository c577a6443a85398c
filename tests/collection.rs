use fanflow::collection::*;
use std::collections::{HashMap, HashSet};

fn strs(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn transform_and_flatten() {
    assert_eq!(transform_by(&[1, 2, 3], |x: &i32| x * 10), vec![10, 20, 30]);
    assert_eq!(
        transform_many_by(&[1, 2, 3], |x: &i32| vec![*x; *x as usize]),
        vec![1, 2, 2, 3, 3, 3]
    );
    assert_eq!(flatten(vec![vec![1], vec![], vec![2, 3]]), vec![1, 2, 3]);
    assert!(flatten(Vec::<Vec<u8>>::new()).is_empty());
}

#[test]
fn map_conversions() {
    let m: HashMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();

    let doubled = map_transform_by(&m, |v: &i32| v * 2);
    assert_eq!(doubled["a"], 2);
    assert_eq!(doubled["b"], 4);

    let mut pairs = map_to_vec(&m, |k: &&str, v: &i32| format!("{k}={v}"));
    pairs.sort();
    assert_eq!(pairs, vec!["a=1", "b=2"]);

    let only_b = map_filter_by(&m, |k: &&str, _: &i32| *k == "b");
    assert_eq!(only_b.len(), 1);
    assert_eq!(only_b["b"], 2);

    assert!(map_contains(&m, &"a"));
    assert!(!map_contains(&m, &"z"));

    let mut keys = map_keys(&m);
    keys.sort();
    assert_eq!(keys, vec!["a", "b"]);
    let mut values = map_values(&m);
    values.sort();
    assert_eq!(values, vec![1, 2]);
}

#[test]
fn slice_to_map_later_element_wins() {
    let m = slice_to_map(&[(1, "one"), (2, "two"), (1, "uno")], |p: &(i32, &str)| p.0);
    assert_eq!(m.len(), 2);
    assert_eq!(m[&1], (1, "uno"));
}

#[test]
fn filtering() {
    assert_eq!(filter_by(&[1, 2, 3, 4], |x: &i32| x % 2 == 0), vec![2, 4]);

    let keep = in_filter(&[1, 2], true);
    let exclude = in_filter(&[1, 2], false);
    assert!(keep(&1) && !keep(&3));
    assert!(!exclude(&1) && exclude(&3));
}

#[test]
fn difference_cases() {
    let cases: [(&[&str], &[&str], &[&str]); 4] = [
        (&["a", "b"], &["b"], &["a"]),
        (&["a", "b"], &["b", "a"], &[]),
        (&["a", "a", "b"], &["b"], &["a", "a"]),
        (&[], &[], &[]),
    ];
    for (a, b, want) in cases {
        assert_eq!(difference(&strs(a), &strs(b)), strs(want), "a={a:?} b={b:?}");
    }
}

#[test]
fn intersection_cases() {
    let cases: [(&[&str], &[&str], &[&str]); 6] = [
        (&[], &[], &[]),
        (&["a", "b"], &["b"], &["b"]),
        (&["a", "b"], &["b", "a"], &["a", "b"]),
        (&["a", "a", "b"], &["b"], &["b"]),
        (&["a", "a", "b"], &["b", "b", "a", "a", "c"], &["a", "b"]),
        (&["b", "b", "a", "a", "c"], &["a", "a", "b"], &["b", "a"]),
    ];
    for (a, b, want) in cases {
        assert_eq!(intersection(&strs(a), &strs(b)), strs(want), "a={a:?} b={b:?}");
    }
}

#[test]
fn distinct_and_duplicates() {
    assert_eq!(distinct(&["a", "b", "a", "b"]), vec!["a", "b"]);
    assert_eq!(distinct(&["a", "b", "c"]), vec!["a", "b", "c"]);
    assert!(distinct::<u8>(&[]).is_empty());

    assert_eq!(duplicates(&["a", "b", "a", "a"]), vec!["a"]);
    assert!(duplicates::<&str>(&[]).is_empty());
    assert_eq!(duplicates(&[3, 1, 3, 2, 1]), vec![3, 1]);
}

#[test]
fn distinct_by_replaces_with_latest_equal() {
    let people = [("ann", 1), ("bob", 2), ("ann", 3)];
    let out = distinct_by(&people, |l: &(&str, i32), r: &(&str, i32)| l.0 == r.0);
    assert_eq!(out, vec![("ann", 3), ("bob", 2)]);
}

#[test]
fn group_by_odd_and_even() {
    let mut odd = group_by(&[3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5], |x: &i32| x % 2 != 0)
        .remove(&true)
        .unwrap_or_default();
    sort(&mut odd);
    assert_eq!(odd, vec![1, 1, 3, 3, 5, 5, 5, 9]);

    let groups = group_by(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9], |x: &i32| x % 2 == 0);
    assert_eq!(groups[&true], vec![0, 2, 4, 6, 8]);
    assert_eq!(groups[&false], vec![1, 3, 5, 7, 9]);
}

#[test]
fn aggregate_sums() {
    assert_eq!(aggregate(&[1, 2, 3, 4, 5], |s: i32, v: &i32| s + v), 15);
    assert_eq!(
        aggregate(&[1, 2, 3, 4, 5], |s: i32, v: &i32| if v % 2 != 0 { s } else { s + v }),
        6
    );
    let joined: String = aggregate(&["a", "b"], |mut acc: String, s: &&str| {
        acc.push_str(s);
        acc
    });
    assert_eq!(joined, "ab");
}

#[test]
fn min_max_sort_search() {
    assert_eq!(min_of(&[3, -1, 7]), Some(-1));
    assert_eq!(max_of(&[3, -1, 7]), Some(7));
    assert_eq!(min_of::<i32>(&[]), None);
    assert_eq!(min_of(&[2.5, -0.5, 1.0]), Some(-0.5));
    assert_eq!(max_of(&[2.5f32, -0.5, 1.0]), Some(2.5));
    assert_eq!(max_of::<f64>(&[]), None);
    assert_eq!(min_of(&["pear", "apple", "fig"]), Some("apple"));

    let mut v = vec![3, 1, 2];
    sort(&mut v);
    assert_eq!(v, vec![1, 2, 3]);
    sort_by(&mut v, |a: &i32, b: &i32| b.cmp(a));
    assert_eq!(v, vec![3, 2, 1]);

    assert!(contains(&v, &2));
    assert!(!contains(&v, &9));
    assert!(any(&v, |x: &i32| *x > 2));
    assert!(all(&v, |x: &i32| *x > 0));
    assert!(all::<i32, _>(&[], |_| false));
    assert!(!any::<i32, _>(&[], |_| true));
}

#[test]
fn difference_of_disjoint_sets_is_identity() {
    let a: Vec<u32> = (0..50).collect();
    let b: Vec<u32> = (50..100).collect();
    let out: HashSet<u32> = difference(&a, &b).into_iter().collect();
    assert_eq!(out, a.into_iter().collect());
}
