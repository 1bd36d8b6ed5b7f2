//! Column type inference.
//!
//! Untyped columns get a type from a sample of the dataset's first rows.
//! Every sampled value falls into one bucket (see [`TypeInferencer::classify`]);
//! the set of buckets observed is then resolved to a single type (see
//! [`TypeInferencer::resolve`]).

use std::collections::BTreeSet;

use tracing::debug;

use crate::column::{ColumnSpec, ColumnType};
use crate::datetime::{is_midnight, parse_datetime};
use crate::row::Row;
use crate::value::{Number, Value};

/// Number of leading rows sampled per column unless configured otherwise.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Guesses the types of untyped columns from sampled rows.
///
/// # Example
///
/// ```
/// use standout_grid::{ColumnType, Row, TypeInferencer, Value};
///
/// let rows: Vec<Row> = vec![
///     [("id", Value::from(1i64)), ("active", Value::from("1"))].into_iter().collect(),
///     [("id", Value::from(2i64)), ("active", Value::from("0"))].into_iter().collect(),
/// ];
///
/// let columns = TypeInferencer::new().infer(&rows, Vec::new());
/// assert_eq!(columns[0].column_type, Some(ColumnType::Number));
/// assert_eq!(columns[1].column_type, Some(ColumnType::Boolean));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInferencer {
    sample_size: usize,
}

impl Default for TypeInferencer {
    fn default() -> Self {
        TypeInferencer {
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl TypeInferencer {
    /// Creates an inferencer sampling [`DEFAULT_SAMPLE_SIZE`] rows.
    pub fn new() -> Self {
        TypeInferencer::default()
    }

    /// Sets how many leading rows are sampled.
    pub fn sample_size(mut self, rows: usize) -> Self {
        self.sample_size = rows;
        self
    }

    /// Merges declared columns with the first row's keys and types every
    /// untyped column.
    ///
    /// Keys of the first row without a declared column get a synthesized
    /// one. Declared columns keep their first-row position; declared
    /// columns the first row does not have are appended. Typed columns are
    /// returned unchanged.
    pub fn infer(&self, rows: &[Row], declared: Vec<ColumnSpec>) -> Vec<ColumnSpec> {
        let mut declared = declared;
        let mut columns = Vec::with_capacity(declared.len());

        if let Some(first) = rows.first() {
            for key in first.keys() {
                match declared.iter().position(|c| c.id == key) {
                    Some(index) => columns.push(declared.remove(index)),
                    None => columns.push(ColumnSpec::new(key)),
                }
            }
        }
        columns.append(&mut declared);

        for column in columns.iter_mut().filter(|c| c.is_untyped()) {
            let inferred = self.infer_field(rows, &column.field);
            debug!(column = %column.id, inferred = %inferred, "inferred column type");
            column.column_type = Some(inferred);
        }

        columns
    }

    /// Infers the type of one field from the sampled rows.
    pub fn infer_field<'r>(&self, rows: impl IntoIterator<Item = &'r Row>, field: &str) -> ColumnType {
        let buckets: BTreeSet<ColumnType> = rows
            .into_iter()
            .take(self.sample_size)
            .filter_map(|row| row.get(field))
            .filter_map(Self::classify)
            .collect();
        Self::resolve(&buckets)
    }

    /// Returns the column with a type.
    ///
    /// An untyped column takes the type of the known column with the same
    /// id, or has its field inferred from `rows` when no known column is
    /// typed.
    pub fn type_column<'r>(
        &self,
        column: &ColumnSpec,
        known: &[ColumnSpec],
        rows: impl IntoIterator<Item = &'r Row>,
    ) -> ColumnSpec {
        let mut column = column.clone();
        if column.is_untyped() {
            let column_type = known
                .iter()
                .filter(|k| k.id == column.id)
                .find_map(|k| k.column_type)
                .unwrap_or_else(|| self.infer_field(rows, &column.field));
            column.column_type = Some(column_type);
        }
        column
    }

    /// Classifies a single value into an inference bucket.
    ///
    /// Checked in order: array, date/datetime, boolean, number, text.
    /// Returns `None` for null and empty text, which carry no type
    /// information.
    pub fn classify(value: &Value) -> Option<ColumnType> {
        let bucket = match value {
            Value::Null => return None,
            Value::Text(s) if s.is_empty() => return None,
            Value::Array(_) => ColumnType::Array,
            Value::DateTime(dt) => date_bucket(dt),
            Value::Bool(_) => ColumnType::Boolean,
            Value::Number(n) if n.is_binary_integer() => ColumnType::Boolean,
            Value::Number(_) => ColumnType::Number,
            Value::Text(s) => match parse_datetime(s) {
                Some(dt) => date_bucket(&dt),
                None if s == "1" || s == "0" => ColumnType::Boolean,
                None if Number::parse(s).is_some() => ColumnType::Number,
                None => ColumnType::Text,
            },
        };
        Some(bucket)
    }

    /// Resolves the buckets observed across a sample to one type.
    ///
    /// - a single bucket wins outright
    /// - boolean together with number resolves to number
    /// - date together with datetime resolves to datetime
    /// - anything else, including no bucket at all, is text
    ///
    /// The boolean/number and date/datetime checks apply even when other
    /// buckets were observed too.
    pub fn resolve(buckets: &BTreeSet<ColumnType>) -> ColumnType {
        if buckets.len() == 1 {
            if let Some(only) = buckets.first() {
                return *only;
            }
        }

        if buckets.contains(&ColumnType::Boolean) && buckets.contains(&ColumnType::Number) {
            ColumnType::Number
        } else if buckets.contains(&ColumnType::Date) && buckets.contains(&ColumnType::DateTime) {
            ColumnType::DateTime
        } else {
            ColumnType::Text
        }
    }
}

fn date_bucket(dt: &chrono::NaiveDateTime) -> ColumnType {
    if is_midnight(dt) {
        ColumnType::Date
    } else {
        ColumnType::DateTime
    }
}
