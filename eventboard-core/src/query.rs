//! URL query parameters.
//!
//! The query string is the only persisted state: selections are parsed from
//! it and serialized back into it. Values are either a single string or, for
//! repeated keys, a list of strings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

/// Separator between values of a multi-select parameter (`?location=SF|NYC`)
pub const VALUE_DELIMITER: char = '|';
const ESCAPE: char = '\\';

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Single(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// All raw strings carried by this value.
    pub fn items(&self) -> &[String] {
        match self {
            QueryValue::Single(s) => std::slice::from_ref(s),
            QueryValue::Many(items) => items,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Single(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Single(s)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(items: Vec<String>) -> Self {
        QueryValue::Many(items)
    }
}

/// String-keyed query parameters, kept in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, QueryValue>);

impl QueryParams {
    pub fn new() -> Self {
        QueryParams::default()
    }

    /// Parse a raw query string, with or without the leading `?`.
    /// Keys that appear more than once become `QueryValue::Many`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = QueryParams::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            params.append(key.into_owned(), value.into_owned());
        }

        params
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Add a value, promoting an existing key to `Many`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();

        match self.0.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(QueryValue::Single(value));
            }
            Entry::Occupied(mut slot) => {
                let items = match slot.get_mut() {
                    QueryValue::Single(first) => vec![std::mem::take(first), value],
                    QueryValue::Many(items) => {
                        items.push(value);
                        return;
                    }
                };
                slot.insert(QueryValue::Many(items));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render as `application/x-www-form-urlencoded`, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.iter() {
            for item in value.items() {
                serializer.append_pair(key, item);
            }
        }
        serializer.finish()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Join values with the delimiter, escaping delimiters and backslashes
/// inside values so `split_values` can recover them exactly.
pub fn join_values<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut joined = String::new();

    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            joined.push(VALUE_DELIMITER);
        }
        for c in value.chars() {
            if c == VALUE_DELIMITER || c == ESCAPE {
                joined.push(ESCAPE);
            }
            joined.push(c);
        }
    }

    joined
}

/// Split on unescaped delimiters. Empty pieces are dropped; a trailing lone
/// backslash is kept literally.
pub fn split_values(raw: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => current.push(chars.next().unwrap_or(ESCAPE)),
            VALUE_DELIMITER => values.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    values.push(current);

    values.retain(|v| !v.is_empty());
    values
}
