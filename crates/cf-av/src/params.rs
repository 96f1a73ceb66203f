//! Caller-supplied operation parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single parameter value: one string, or an ordered list of strings
/// (only `input_files` takes a list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        ParamValue::List(v)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(v: Vec<&str>) -> Self {
        ParamValue::List(v.into_iter().map(str::to_string).collect())
    }
}

/// Mapping from parameter name to value.
///
/// Keys are kept sorted so that iteration (and anything derived from it)
/// is deterministic. Blank strings count as absent.
///
/// # Example
///
/// ```
/// use cf_av::ParameterSet;
///
/// let params = ParameterSet::new()
///     .with("input_file", "in.mp4")
///     .with("start_time", "00:01:00")
///     .with("duration", "30");
/// assert_eq!(params.text("duration"), Some("30"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, ParamValue>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Append `value` under `key`, promoting an existing single value to a
    /// list. Used when a caller repeats a key.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.0.entry(key.into()) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(ParamValue::Text(value));
            }
            std::collections::btree_map::Entry::Occupied(mut e) => {
                let slot = e.get_mut();
                let previous = std::mem::replace(slot, ParamValue::List(Vec::new()));
                *slot = match previous {
                    ParamValue::Text(prev) => ParamValue::List(vec![prev, value]),
                    ParamValue::List(mut items) => {
                        items.push(value);
                        ParamValue::List(items)
                    }
                };
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Whether `key` carries a non-blank value.
    pub fn contains(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(ParamValue::Text(s)) => !s.trim().is_empty(),
            Some(ParamValue::List(items)) => !items.is_empty(),
            None => false,
        }
    }

    /// The value of `key` as given, if present, not blank and not a list.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(ParamValue::Text(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether `key` holds a list where a single value is expected.
    pub fn is_list(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(ParamValue::List(_)))
    }

    /// The value of `key` as a list. A single value becomes a one-element
    /// list; blank entries are dropped.
    pub fn list(&self, key: &str) -> Option<Vec<&str>> {
        match self.0.get(key)? {
            ParamValue::Text(s) if s.trim().is_empty() => None,
            ParamValue::Text(s) => Some(vec![s.as_str()]),
            ParamValue::List(items) => Some(
                items
                    .iter()
                    .map(String::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .collect(),
            ),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}
