//! Column filters.
//!
//! A [`Filter`] is an operator and an operand. Before a query runs, each
//! filter is compiled against its column's type into a [`Predicate`], which
//! holds the case-insensitive pattern for the text operators.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::codec::ArrayCodec;
use crate::column::ColumnType;
use crate::op::Operator;
use crate::ordering::compare_values;
use crate::value::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single filter predicate on a column.
///
/// # Example
///
/// ```
/// use standout_grid::{Filter, Operator, Value};
///
/// let filter = Filter::new(Operator::Like, "ada");
/// assert_eq!(filter.op, Operator::Like);
/// assert_eq!(filter.value, Value::from("ada"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// The comparison operator.
    pub op: Operator,
    /// The value to compare against. Ignored by the null operators.
    pub value: Value,
}

impl Filter {
    /// Creates a new filter.
    pub fn new(op: Operator, value: impl Into<Value>) -> Self {
        Filter {
            op,
            value: value.into(),
        }
    }

    /// Creates an `IsNull` filter.
    pub fn is_null() -> Self {
        Filter::new(Operator::IsNull, Value::Null)
    }

    /// Creates an `IsNotNull` filter.
    pub fn is_not_null() -> Self {
        Filter::new(Operator::IsNotNull, Value::Null)
    }

    /// Compiles this filter for a column of the given type.
    pub fn compile(&self, column_type: Option<ColumnType>) -> Predicate {
        let pattern = if self.op.is_pattern_op() {
            let needle = operand_text(&self.value, column_type);
            build_pattern(self.op, &needle)
        } else {
            None
        };

        Predicate {
            op: self.op,
            value: self.value.clone(),
            column_type,
            pattern,
        }
    }
}

/// A filter compiled for one column.
#[derive(Debug, Clone)]
pub struct Predicate {
    op: Operator,
    value: Value,
    column_type: Option<ColumnType>,
    pattern: Option<Regex>,
}

impl Predicate {
    /// The operator this predicate applies.
    pub fn op(&self) -> Operator {
        self.op
    }

    /// Evaluates this predicate against a field value.
    ///
    /// Returns `false` when the values cannot be compared or the pattern
    /// could not be built.
    pub fn matches(&self, field: &Value, codec: &dyn ArrayCodec) -> bool {
        match self.op {
            Operator::IsNull => field.is_null(),
            Operator::IsNotNull => !field.is_null(),
            op if op.is_relational_op() => {
                compare_values(field, &self.value).is_some_and(|ordering| op.eval_ordering(ordering))
            }
            op => {
                let Some(pattern) = &self.pattern else {
                    return false;
                };
                let found = match (self.column_type, field) {
                    (Some(ColumnType::Array), Value::Array(items)) => {
                        codec.any_element(items, pattern)
                    }
                    (Some(ColumnType::Array), Value::Text(text)) => match codec.decode(text) {
                        Some(items) => codec.any_element(&items, pattern),
                        None => pattern.is_match(text),
                    },
                    _ => pattern.is_match(&field_text(field, self.column_type)),
                };
                found != op.is_negated()
            }
        }
    }
}

/// Text form of a field value as seen by the pattern operators.
fn field_text(value: &Value, column_type: Option<ColumnType>) -> Cow<'_, str> {
    match (value, column_type) {
        (Value::DateTime(dt), Some(ColumnType::Date)) => Cow::Owned(dt.format(DATE_FORMAT).to_string()),
        _ => value.to_text(),
    }
}

/// Text form of a filter operand; boolean words collapse to `1`/`0` on
/// boolean columns.
fn operand_text(value: &Value, column_type: Option<ColumnType>) -> String {
    if column_type == Some(ColumnType::Boolean) {
        if let Value::Text(s) = value {
            if s.eq_ignore_ascii_case("true") {
                return "1".to_string();
            }
            if s.eq_ignore_ascii_case("false") {
                return "0".to_string();
            }
        }
    }
    field_text(value, column_type).into_owned()
}

/// Builds the positive, case-insensitive pattern for a text operator.
///
/// The operand is matched literally. Negated operators reuse the pattern of
/// the operator they complement.
fn build_pattern(op: Operator, needle: &str) -> Option<Regex> {
    let escaped = regex::escape(needle);
    let source = match op.positive() {
        Operator::Eq => format!("^(?:{escaped})$"),
        Operator::Like => escaped,
        Operator::EndsWith => format!("(?:{escaped})$"),
        Operator::StartsWith => format!("^(?:{escaped})"),
        _ => return None,
    };

    match RegexBuilder::new(&source).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(operator = %op, error = %err, "filter pattern rejected, no rows will match");
            None
        }
    }
}
