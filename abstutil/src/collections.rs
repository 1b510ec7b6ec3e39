use std::collections::BTreeMap;

/// Filters a `BTreeMap` in place, keeping only entries for which `f` returns true.
pub fn retain_btreemap<K: Ord + Clone, V, F: FnMut(&K, &V) -> bool>(
    map: &mut BTreeMap<K, V>,
    mut f: F,
) {
    let to_remove: Vec<K> = map
        .iter()
        .filter(|(k, v)| !f(k, v))
        .map(|(k, _)| k.clone())
        .collect();
    for k in to_remove {
        map.remove(&k);
    }
}
