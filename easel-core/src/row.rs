//! Generic row representation exchanged with the store.
//!
//! A [`Row`] is a column-name keyed mapping of [`Value`]s. It serializes to a
//! flat JSON object (`{"_id": 3, "token": "t1", "title": null}`), which is
//! also the on-disk format of the file-backed store.

use std::borrow::Cow;
use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RowError;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text view of the cell. Integers render in decimal; `Null` has none.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Integer(n) => Some(Cow::Owned(n.to_string())),
            Value::Text(s) => Some(Cow::Borrowed(s)),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Column-name keyed mapping of cell values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a row from its JSON object form.
    ///
    /// Returns [`RowError::Unreadable`] if `json` is not an object of
    /// null / integer / string cells.
    pub fn from_json(json: &str) -> Result<Self, RowError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        // Keys are strings and values are JSON scalars; serialization cannot fail.
        serde_json::to_string(&self.0).unwrap_or_else(|_| String::from("{}"))
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(column.into(), value.into())
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.0.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Value) -> bool) {
        self.0.retain(|k, v| keep(k, v));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_form_is_a_flat_object() {
        let row: Row = [("_id", Value::Integer(3)), ("token", Value::from("t1")), ("title", Value::Null)]
            .into_iter()
            .collect();
        assert_eq!(row.to_json(), r#"{"_id":3,"title":null,"token":"t1"}"#);
    }

    #[test]
    fn from_json_reads_scalars() {
        let row = Row::from_json(r#"{"_id": 9, "title": "Starry Night", "byline": null}"#).unwrap();
        assert_eq!(row.get("_id"), Some(&Value::Integer(9)));
        assert_eq!(row.get("title"), Some(&Value::from("Starry Night")));
        assert_eq!(row.get("byline"), Some(&Value::Null));
    }

    #[test]
    fn from_json_rejects_non_object() {
        let err = Row::from_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, RowError::Unreadable(_)));
    }

    #[test]
    fn from_json_rejects_nested_values() {
        let err = Row::from_json(r#"{"title": {"nested": true}}"#).unwrap_err();
        assert!(matches!(err, RowError::Unreadable(_)));
    }

    #[test]
    fn integer_cells_have_a_text_view() {
        assert_eq!(Value::Integer(-12).as_text().as_deref(), Some("-12"));
        assert_eq!(Value::Null.as_text(), None);
    }
}
