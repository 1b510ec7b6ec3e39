use std::collections::BTreeMap;

/// A thin wrapper around an OSM element's tag map, with the match helpers the extraction pass
/// leans on constantly (`is`, `is_any`, wildcard/multi-value matching for filter rules).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new(map: BTreeMap<String, String>) -> Tags {
        Tags(map)
    }

    pub fn empty() -> Tags {
        Tags(BTreeMap::new())
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, k: K, v: V) {
        self.0.insert(k.into(), v.into());
    }

    pub fn get(&self, k: &str) -> Option<&String> {
        self.0.get(k)
    }

    pub fn contains_key(&self, k: &str) -> bool {
        self.0.contains_key(k)
    }

    /// Exact match, case sensitive, matching the source filter semantics (no normalization).
    pub fn is(&self, k: &str, v: &str) -> bool {
        self.0.get(k).map(|x| x == v).unwrap_or(false)
    }

    pub fn is_any(&self, k: &str, values: Vec<&str>) -> bool {
        if let Some(x) = self.0.get(k) {
            values.contains(&x.as_str())
        } else {
            false
        }
    }

    /// `"*"` always matches; otherwise, if `multi_val_match` is set, a semicolon-separated tag
    /// value matches if any of its parts equals `v` (spec.md §4.A's `MULT_VAL_MATCH` flag).
    pub fn matches(&self, k: &str, v: &str, multi_val_match: bool) -> bool {
        let Some(actual) = self.0.get(k) else {
            return false;
        };
        if v == "*" {
            return true;
        }
        if actual == v {
            return true;
        }
        multi_val_match && actual.split(';').any(|part| part.trim() == v)
    }

    pub fn inner(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}
