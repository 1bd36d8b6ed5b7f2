//! Dataset rows and query result rows.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::key::PrimaryKey;
use crate::value::Value;

/// One record of a dataset: field names mapped to values.
///
/// Fields keep insertion order. The first row's order defines the column
/// order of a dataset and, by default, which column is the primary key.
///
/// # Example
///
/// ```
/// use standout_grid::{Row, Value};
///
/// let row: Row = [("id", Value::from(1i64)), ("name", Value::from("Ada"))]
///     .into_iter()
///     .collect();
///
/// assert_eq!(row.get("name"), Some(&Value::from("Ada")));
/// assert_eq!(row.keys().collect::<Vec<_>>(), vec!["id", "name"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Row::default()
    }

    /// Sets a field, returning the previous value.
    ///
    /// Replacing a field keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    /// Returns the value of a field, if the row has it.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the row has the field (even when it is null).
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flattens a JSON object into a row.
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        object
            .into_iter()
            .map(|(key, value)| (key, Value::from_json(value)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One output row of a query.
///
/// Carries the dataset's primary-key designation next to the row's fields.
/// Row hooks receive and return this type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    primary: PrimaryKey,
    fields: Row,
}

impl ResultRow {
    /// Creates a result row.
    pub fn new(primary: PrimaryKey, fields: Row) -> Self {
        ResultRow { primary, fields }
    }

    /// The primary-key designation.
    pub fn primary_key(&self) -> &PrimaryKey {
        &self.primary
    }

    /// The value identifying this row.
    ///
    /// A single key field yields its value; a composite key yields an
    /// array of the key fields' values, in key order. Missing fields are
    /// null.
    pub fn primary_value(&self) -> Value {
        let value_of = |field: &str| self.fields.get(field).cloned().unwrap_or_default();
        match &self.primary {
            PrimaryKey::None => Value::Null,
            PrimaryKey::Single(field) => value_of(field),
            PrimaryKey::Composite(fields) => {
                Value::Array(fields.iter().map(|field| value_of(field)).collect())
            }
        }
    }

    /// Returns the value of a field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Sets a field value.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key, value);
    }

    /// All fields.
    pub fn fields(&self) -> &Row {
        &self.fields
    }

    /// Consumes the row, returning its fields.
    pub fn into_fields(self) -> Row {
        self.fields
    }
}
