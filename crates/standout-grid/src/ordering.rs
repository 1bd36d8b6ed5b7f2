//! Ordering types for result sorting.
//!
//! Provides [`Dir`] for sort direction, [`SortKey`] for the type-coerced
//! value rows are ordered by, [`natural_cmp`] for the total order used on
//! untyped columns and [`compare_values`] for the loose comparison used by
//! relational filters.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::codec::ArrayCodec;
use crate::column::ColumnType;
use crate::datetime::{parse_datetime, timestamp};
use crate::error::GridError;
use crate::value::{Number, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dir {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Dir::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Dir::Desc)
        } else {
            Err(GridError::UnknownDirection(s.to_string()))
        }
    }
}

/// The type-coerced value a row is ordered by.
///
/// Keys of one column always share a variant, except `Missing`, which
/// stands for null fields and values that could not be coerced.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    /// Null or uncoercible; sorts before every present key.
    Missing,
    /// String ordering.
    Text(String),
    /// Numeric ordering.
    Numeric(f64),
    /// Natural ordering of the raw value.
    Natural(Value),
}

impl SortKey {
    /// Derives the sort key of a field value for a column type.
    pub fn derive(value: Option<&Value>, column_type: Option<ColumnType>, codec: &dyn ArrayCodec) -> Self {
        let value = match value {
            None | Some(Value::Null) => return SortKey::Missing,
            Some(value) => value,
        };

        match column_type {
            Some(ColumnType::Text) => SortKey::Text(value.to_text().to_lowercase()),
            Some(ColumnType::Date | ColumnType::DateTime | ColumnType::Time) => timestamp(value)
                .map(|ts| SortKey::Numeric(ts as f64))
                .unwrap_or(SortKey::Missing),
            Some(ColumnType::Boolean) => SortKey::Numeric(if value.truthy() { 1.0 } else { 0.0 }),
            Some(ColumnType::Array) => match value {
                Value::Array(items) => SortKey::Text(codec.encode(items)),
                other => SortKey::Text(other.to_text().into_owned()),
            },
            Some(ColumnType::Number) => match value {
                Value::Bool(b) => SortKey::Numeric(if *b { 1.0 } else { 0.0 }),
                other => other
                    .to_number()
                    .map(|n| SortKey::Numeric(n.to_f64()))
                    .unwrap_or(SortKey::Missing),
            },
            None => SortKey::Natural(value.clone()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Numeric(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Natural(_) => 3,
        }
    }

    /// Compares two keys in ascending order.
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Numeric(a), SortKey::Numeric(b)) => a.total_cmp(b),
            (SortKey::Natural(a), SortKey::Natural(b)) => natural_cmp(a, b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Total natural order over raw values.
///
/// Values are grouped by kind first (null, boolean, number or numeric text,
/// other text, date-time, array) and ordered within the group, so mixed
/// columns still sort consistently.
pub fn natural_cmp(a: &Value, b: &Value) -> Ordering {
    let (ka, kb) = (NaturalKind::of(a), NaturalKind::of(b));
    match (&ka, &kb) {
        (NaturalKind::Bool(x), NaturalKind::Bool(y)) => x.cmp(y),
        (NaturalKind::Number(x), NaturalKind::Number(y)) => x.total_cmp(y),
        (NaturalKind::Text(x), NaturalKind::Text(y)) => x.cmp(y),
        (NaturalKind::DateTime(x), NaturalKind::DateTime(y)) => x.cmp(y),
        (NaturalKind::Array(x), NaturalKind::Array(y)) => x.cmp(y),
        _ => ka.rank().cmp(&kb.rank()),
    }
}

enum NaturalKind<'a> {
    Null,
    Bool(bool),
    Number(f64),
    Text(&'a str),
    DateTime(chrono::NaiveDateTime),
    Array(String),
}

impl<'a> NaturalKind<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => NaturalKind::Null,
            Value::Bool(b) => NaturalKind::Bool(*b),
            Value::Number(n) => NaturalKind::Number(n.to_f64()),
            Value::Text(s) => match Number::parse(s) {
                Some(n) => NaturalKind::Number(n.to_f64()),
                None => NaturalKind::Text(s),
            },
            Value::DateTime(dt) => NaturalKind::DateTime(*dt),
            Value::Array(_) => NaturalKind::Array(value.to_text().into_owned()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            NaturalKind::Null => 0,
            NaturalKind::Bool(_) => 1,
            NaturalKind::Number(_) => 2,
            NaturalKind::Text(_) => 3,
            NaturalKind::DateTime(_) => 4,
            NaturalKind::Array(_) => 5,
        }
    }
}

/// Compares two raw values the way a loosely typed comparison would.
///
/// - numbers compare numerically, including against numeric text
/// - non-numeric text compares lexically
/// - date-times compare chronologically; text is parsed when compared
///   with a date-time
/// - booleans compare against the other side's truthiness
/// - arrays compare by length, then element by element
///
/// Returns `None` if the values cannot be compared, including any
/// comparison against null other than null itself.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) | (_, Value::Null) => None,

        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Number(n), Value::Text(s)) => compare_number_text(*n, s),
        (Value::Text(s), Value::Number(n)) => compare_number_text(*n, s).map(Ordering::reverse),
        (Value::Text(a), Value::Text(b)) => match (Number::parse(a), Number::parse(b)) {
            (Some(x), Some(y)) => x.compare(y),
            _ => Some(a.cmp(b)),
        },

        (Value::Bool(a), other) => Some(a.cmp(&other.truthy())),
        (other, Value::Bool(b)) => Some(other.truthy().cmp(b)),

        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::Text(s)) => parse_datetime(s).map(|b| a.cmp(&b)),
        (Value::Text(s), Value::DateTime(b)) => parse_datetime(s).map(|a| a.cmp(b)),

        (Value::Array(a), Value::Array(b)) => {
            let by_len = a.len().cmp(&b.len());
            if by_len != Ordering::Equal {
                return Some(by_len);
            }
            for (x, y) in a.iter().zip(b) {
                match compare_values(x, y)? {
                    Ordering::Equal => continue,
                    unequal => return Some(unequal),
                }
            }
            Some(Ordering::Equal)
        }

        // Type mismatch - cannot compare
        _ => None,
    }
}

fn compare_number_text(n: Number, s: &str) -> Option<Ordering> {
    match Number::parse(s) {
        Some(m) => n.compare(m),
        None => Some(n.to_string().as_str().cmp(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonArrayCodec;
    use chrono::NaiveDate;

    fn key(value: Value, column_type: Option<ColumnType>) -> SortKey {
        SortKey::derive(Some(&value), column_type, &JsonArrayCodec)
    }

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Asc.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn dir_display_and_parse() {
        assert_eq!(Dir::Asc.to_string(), "asc");
        assert_eq!(Dir::Desc.to_string(), "desc");
        assert_eq!("DESC".parse::<Dir>().unwrap(), Dir::Desc);
        assert!("sideways".parse::<Dir>().is_err());
    }

    #[test]
    fn text_keys_are_case_folded() {
        assert_eq!(key(Value::from("Banana"), Some(ColumnType::Text)), SortKey::Text("banana".into()));
        let apple = key(Value::from("apple"), Some(ColumnType::Text));
        let banana = key(Value::from("Banana"), Some(ColumnType::Text));
        assert_eq!(apple.compare(&banana), Ordering::Less);
    }

    #[test]
    fn text_keys_order_numbers_as_strings() {
        let ten = key(Value::from(10i64), Some(ColumnType::Text));
        let nine = key(Value::from(9i64), Some(ColumnType::Text));
        assert_eq!(ten.compare(&nine), Ordering::Less);
    }

    #[test]
    fn number_keys_parse_text() {
        let ten = key(Value::from("10"), Some(ColumnType::Number));
        let nine = key(Value::from(9i64), Some(ColumnType::Number));
        assert_eq!(ten.compare(&nine), Ordering::Greater);
        assert_eq!(key(Value::from("n/a"), Some(ColumnType::Number)), SortKey::Missing);
    }

    #[test]
    fn number_keys_count_booleans_as_zero_and_one() {
        assert_eq!(key(Value::from(true), Some(ColumnType::Number)), SortKey::Numeric(1.0));
        assert_eq!(key(Value::from(false), Some(ColumnType::Number)), SortKey::Numeric(0.0));
        let two = key(Value::from(2i64), Some(ColumnType::Number));
        assert_eq!(key(Value::from(true), Some(ColumnType::Number)).compare(&two), Ordering::Less);
    }

    #[test]
    fn date_keys_use_timestamps() {
        let dt = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(key(Value::from(dt), Some(ColumnType::Date)), SortKey::Numeric(86_400.0));
        assert_eq!(key(Value::from("1970-01-02"), Some(ColumnType::DateTime)), SortKey::Numeric(86_400.0));
        assert_eq!(key(Value::from("whenever"), Some(ColumnType::Date)), SortKey::Missing);
    }

    #[test]
    fn boolean_keys() {
        assert_eq!(key(Value::from(true), Some(ColumnType::Boolean)), SortKey::Numeric(1.0));
        assert_eq!(key(Value::from("0"), Some(ColumnType::Boolean)), SortKey::Numeric(0.0));
    }

    #[test]
    fn array_keys_use_encoding() {
        let array = Value::from(vec![Value::from("b"), Value::from(1i64)]);
        assert_eq!(key(array, Some(ColumnType::Array)), SortKey::Text(r#"["b",1]"#.into()));
    }

    #[test]
    fn missing_sorts_first() {
        assert_eq!(SortKey::derive(None, Some(ColumnType::Text), &JsonArrayCodec), SortKey::Missing);
        assert_eq!(key(Value::Null, None), SortKey::Missing);
        assert_eq!(SortKey::Missing.compare(&SortKey::Numeric(-1e9)), Ordering::Less);
        assert_eq!(SortKey::Text(String::new()).compare(&SortKey::Missing), Ordering::Greater);
        assert_eq!(SortKey::Missing.compare(&SortKey::Missing), Ordering::Equal);
    }

    #[test]
    fn compare_numbers_and_numeric_text() {
        assert_eq!(compare_values(&Value::from(10i64), &Value::from("9")), Some(Ordering::Greater));
        assert_eq!(compare_values(&Value::from("10"), &Value::from("9")), Some(Ordering::Greater));
        assert_eq!(compare_values(&Value::from("abc"), &Value::from("abd")), Some(Ordering::Less));
        assert_eq!(compare_values(&Value::from(5i64), &Value::from("abc")), Some(Ordering::Less));
    }

    #[test]
    fn compare_datetimes_with_text() {
        let dt = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(compare_values(&Value::from(dt), &Value::from("2024-01-01")), Some(Ordering::Greater));
        assert_eq!(compare_values(&Value::from("2025-01-01"), &Value::from(dt)), Some(Ordering::Greater));
        assert_eq!(compare_values(&Value::from(dt), &Value::from("later")), None);
    }

    #[test]
    fn compare_booleans_by_truthiness() {
        assert_eq!(compare_values(&Value::from(true), &Value::from("yes")), Some(Ordering::Equal));
        assert_eq!(compare_values(&Value::from(0i64), &Value::from(true)), Some(Ordering::Less));
    }

    #[test]
    fn compare_nulls_and_mismatches() {
        assert_eq!(compare_values(&Value::Null, &Value::Null), Some(Ordering::Equal));
        assert_eq!(compare_values(&Value::Null, &Value::from(1i64)), None);
        assert_eq!(compare_values(&Value::from(vec![]), &Value::from(1i64)), None);
    }

    #[test]
    fn natural_order_is_grouped_by_kind() {
        let mut values = vec![
            Value::from("pear"),
            Value::from(vec![Value::from(1i64)]),
            Value::from(10i64),
            Value::Null,
            Value::from("9"),
            Value::from(true),
            Value::from("apple"),
        ];
        values.sort_by(natural_cmp);
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::from(true),
                Value::from("9"),
                Value::from(10i64),
                Value::from("apple"),
                Value::from("pear"),
                Value::from(vec![Value::from(1i64)]),
            ]
        );
    }

    #[test]
    fn natural_keys_use_natural_order() {
        let a = key(Value::from(2i64), None);
        let b = key(Value::from("10"), None);
        assert_eq!(a.compare(&b), Ordering::Less);
    }

    #[test]
    fn compare_arrays() {
        let short = Value::from(vec![Value::from(9i64)]);
        let long = Value::from(vec![Value::from(1i64), Value::from(2i64)]);
        assert_eq!(compare_values(&short, &long), Some(Ordering::Less));
        let other = Value::from(vec![Value::from(1i64), Value::from(3i64)]);
        assert_eq!(compare_values(&long, &other), Some(Ordering::Less));
    }
}
