//! Runtime value types for row fields and filter operands.
//!
//! The [`Value`] enum represents one cell of a row. It supports the shapes
//! a grid dataset carries: scalars, arrays and date-times.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::datetime::DATETIME_FORMAT;

/// A single field value, owned by its row.
///
/// # Example
///
/// ```
/// use standout_grid::{Number, Value};
///
/// let name = Value::from("Ada");
/// let age = Value::from(36i64);
///
/// assert_eq!(name.as_str(), Some("Ada"));
/// assert_eq!(age.as_number(), Some(Number::I64(36)));
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// Text value.
    Text(String),
    /// Composite value.
    Array(Vec<Value>),
    /// Date-time value without a time zone.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for `Null` and for empty text.
    ///
    /// Blank values are ignored by type inference and select-option
    /// collection.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns `true` if this is an `Array`.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Extracts the text value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the array elements, if present.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Extracts the date-time value, if present.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns the number this value holds, parsing numeric text.
    pub fn to_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => Number::parse(s),
            _ => None,
        }
    }

    /// Canonical text form used by pattern filters.
    ///
    /// Booleans render as `1`/`0`, date-times as `YYYY-MM-DD HH:MM:SS`,
    /// arrays as their JSON encoding.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Bool(true) => Cow::Borrowed("1"),
            Value::Bool(false) => Cow::Borrowed("0"),
            Value::Number(n) => Cow::Owned(n.to_string()),
            Value::Text(s) => Cow::Borrowed(s),
            Value::Array(_) => Cow::Owned(self.to_json().to_string()),
            Value::DateTime(dt) => Cow::Owned(dt.format(DATETIME_FORMAT).to_string()),
        }
    }

    /// Loose truthiness: zero, empty text, `"0"`, empty arrays and null are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.to_f64() != 0.0,
            Value::Text(s) => !s.is_empty() && s != "0",
            Value::Array(items) => !items.is_empty(),
            Value::DateTime(_) => true,
        }
    }

    /// Converts a JSON value into a field value.
    ///
    /// Nested objects are not flattened further; they are kept as their
    /// JSON text.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Number::I64(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Number::U64(u))
                } else {
                    n.as_f64()
                        .map(|f| Value::Number(Number::F64(f)))
                        .unwrap_or(Value::Null)
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            object @ serde_json::Value::Object(_) => Value::Text(object.to_string()),
        }
    }

    /// Converts this value into JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(Number::I64(n)) => serde_json::Value::from(*n),
            Value::Number(Number::U64(n)) => serde_json::Value::from(*n),
            Value::Number(Number::F64(n)) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format(DATETIME_FORMAT).to_string())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// Numeric value.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers beyond `i64::MAX`
/// - `F64` for floating point
///
/// Comparisons between different numeric types are handled by converting
/// to the appropriate common type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Parses numeric text: optional sign, digits, decimal point, exponent.
    ///
    /// Surrounding whitespace is allowed; `inf`, `NaN` and hex are not.
    pub fn parse(text: &str) -> Option<Number> {
        let trimmed = text.trim();
        if trimmed.is_empty()
            || !trimmed
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
            || !trimmed.bytes().any(|b| b.is_ascii_digit())
        {
            return None;
        }

        if let Ok(n) = trimmed.parse::<i64>() {
            return Some(Number::I64(n));
        }
        if let Ok(n) = trimmed.parse::<u64>() {
            return Some(Number::U64(n));
        }
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Number::F64)
    }

    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns `true` for the integers `0` and `1`.
    pub fn is_binary_integer(self) -> bool {
        matches!(self, Number::I64(0 | 1) | Number::U64(0 | 1))
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),

            // Mixed type comparisons - convert to f64
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        i64::try_from(n).map(Number::I64).unwrap_or(Number::U64(n))
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::from(n as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn value_extractors() {
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::from(42i64).as_number(), Some(Number::I64(42)));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("test").as_number(), None);
        assert_eq!(Value::from(1i64).as_str(), None);
        assert!(Value::from(vec![Value::from(1i64)]).is_array());
    }

    #[test]
    fn blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(!Value::from("0").is_blank());
        assert!(!Value::from(0i64).is_blank());
        assert!(!Value::from(false).is_blank());
    }

    #[test]
    fn text_form() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::from(true).to_text(), "1");
        assert_eq!(Value::from(false).to_text(), "0");
        assert_eq!(Value::from(12i64).to_text(), "12");
        assert_eq!(Value::from(2.0f64).to_text(), "2");
        assert_eq!(Value::from(1.5f64).to_text(), "1.5");
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(Value::from(dt).to_text(), "2024-03-01 09:30:00");
        let array = Value::from(vec![Value::from("a"), Value::from(1i64)]);
        assert_eq!(array.to_text(), r#"["a",1]"#);
    }

    #[test]
    fn truthiness() {
        assert!(Value::from("yes").truthy());
        assert!(!Value::from("0").truthy());
        assert!(!Value::from("").truthy());
        assert!(!Value::from(0i64).truthy());
        assert!(Value::from(-1i64).truthy());
        assert!(!Value::Array(vec![]).truthy());
        assert!(!Value::Null.truthy());
    }

    #[test]
    fn json_conversion() {
        let json = serde_json::json!({"a": 1});
        assert_eq!(Value::from_json(json), Value::from(r#"{"a":1}"#));
        assert_eq!(
            Value::from_json(serde_json::json!([1, "x", null])),
            Value::Array(vec![Value::from(1i64), Value::from("x"), Value::Null])
        );
        assert_eq!(
            Value::from_json(serde_json::json!(u64::MAX)),
            Value::Number(Number::U64(u64::MAX))
        );
        assert_eq!(Value::from(2.5f64).to_json(), serde_json::json!(2.5));
    }

    #[test]
    fn number_parse() {
        assert_eq!(Number::parse("42"), Some(Number::I64(42)));
        assert_eq!(Number::parse(" -7 "), Some(Number::I64(-7)));
        assert_eq!(Number::parse("3.25"), Some(Number::F64(3.25)));
        assert_eq!(Number::parse("1e3"), Some(Number::F64(1000.0)));
        assert_eq!(Number::parse("abc"), None);
        assert_eq!(Number::parse("inf"), None);
        assert_eq!(Number::parse("NaN"), None);
        assert_eq!(Number::parse(""), None);
        assert_eq!(Number::parse("."), None);
        assert_eq!(Number::parse("12px"), None);
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }

    #[test]
    fn binary_integers() {
        assert!(Number::I64(1).is_binary_integer());
        assert!(Number::U64(0).is_binary_integer());
        assert!(!Number::I64(2).is_binary_integer());
        assert!(!Number::F64(1.0).is_binary_integer());
    }
}
