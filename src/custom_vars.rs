//! Custom variable sets and their indexed JSON form.
//!
//! Piwik expects custom variables (`_cvar`, `cvar`) as a JSON object whose
//! field names are 1-based indices and whose values are `[key, value]`
//! pairs:
//!
//! ```text
//! {"1":["key1","value1"],"2":["key2","value2"]}
//! ```
//!
//! Indices are assigned while serializing, in the backing map's iteration
//! order. Which pair lands under which index is arbitrary and may differ
//! between calls; only the index range `1..=N` is fixed.

use std::collections::{hash_map, HashMap};
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::CustomVarsError;

/// A set of custom key/value string pairs attached to a tracking request.
///
/// Keys are unique; putting an existing key overwrites its value.
///
/// # Examples
///
/// ```
/// use piwik_custom_vars::CustomVariableSet;
///
/// let mut vars = CustomVariableSet::new();
/// assert_eq!(vars.put("plan", "free"), None);
/// assert_eq!(vars.put("plan", "pro"), Some("free".to_string()));
/// assert_eq!(vars.get("plan"), Some("pro"));
/// assert_eq!(vars.serialize(), r#"{"1":["plan","pro"]}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomVariableSet {
    vars: HashMap<String, String>,
}

impl CustomVariableSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vars: HashMap::with_capacity(capacity),
        }
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Store `value` under `key`, returning the value it replaced.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.vars.insert(key.into(), value.into())
    }

    /// Remove the entry under `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    /// Iterate over `(key, value)` pairs in arbitrary order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.vars.iter(),
        }
    }

    /// Render the set as the indexed JSON object Piwik expects.
    ///
    /// The empty set renders as `{}`. Does not modify the set.
    pub fn serialize(&self) -> String {
        trace!(entries = self.vars.len(), "serializing custom variables");
        self.to_json_value().to_string()
    }

    /// Build the indexed JSON object as a [`serde_json::Value`].
    pub fn to_json_value(&self) -> Value {
        let mut object = Map::with_capacity(self.vars.len());
        for (index, (key, value)) in self.vars.iter().enumerate() {
            object.insert(
                (index + 1).to_string(),
                Value::Array(vec![Value::String(key.clone()), Value::String(value.clone())]),
            );
        }
        Value::Object(object)
    }

    /// Parse the indexed JSON object back into a set.
    ///
    /// Field names must be exactly `"1"` through `"N"` (in any order) and
    /// every value a `[key, value]` pair of strings. If two pairs share a
    /// key, the one with the higher index wins.
    pub fn parse(json: &str) -> Result<Self, CustomVarsError> {
        let result = serde_json::from_str::<IndexedEntries>(json)
            .map_err(CustomVarsError::from)
            .and_then(|raw| Self::from_indexed(raw.0));
        if let Err(err) = &result {
            debug!(error = %err, "rejected custom variable JSON");
        }
        result
    }

    fn from_indexed(entries: Vec<(String, (String, String))>) -> Result<Self, CustomVarsError> {
        let expected = entries.len();
        let mut indexed = entries
            .into_iter()
            .map(|(field, pair)| parse_index(&field).map(|index| (index, pair)))
            .collect::<Result<Vec<_>, _>>()?;
        indexed.sort_unstable_by_key(|(index, _)| *index);

        let mut set = Self::with_capacity(expected);
        for (position, (index, (key, value))) in indexed.into_iter().enumerate() {
            if index != position + 1 {
                return Err(CustomVarsError::IndexGap {
                    expected,
                    found: index,
                });
            }
            set.vars.insert(key, value);
        }
        Ok(set)
    }
}

fn parse_index(field: &str) -> Result<usize, CustomVarsError> {
    let is_canonical = !field.is_empty()
        && !field.starts_with('0')
        && field.bytes().all(|b| b.is_ascii_digit());
    if !is_canonical {
        return Err(CustomVarsError::invalid_index(field));
    }
    field
        .parse::<usize>()
        .map_err(|_| CustomVarsError::invalid_index(field))
}

impl fmt::Display for CustomVariableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_value())
    }
}

impl Serialize for CustomVariableSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.vars.len()))?;
        for (index, pair) in self.vars.iter().enumerate() {
            map.serialize_entry(&(index + 1).to_string(), &pair)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CustomVariableSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexedEntries::deserialize(deserializer)?;
        Self::from_indexed(raw.0).map_err(de::Error::custom)
    }
}

/// Object fields in document order, duplicates kept.
struct IndexedEntries(Vec<(String, (String, String))>);

impl<'de> Deserialize<'de> for IndexedEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = IndexedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of indexed [key, value] pairs")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, (String, String)>()? {
                    entries.push(entry);
                }
                Ok(IndexedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl<K, V> FromIterator<(K, V)> for CustomVariableSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<K, V> Extend<(K, V)> for CustomVariableSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.vars
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

/// Borrowing iterator over the pairs of a [`CustomVariableSet`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: hash_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a CustomVariableSet {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for CustomVariableSet {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}
