//! Filter operators.
//!
//! The [`Operator`] enum defines every predicate a column filter can apply,
//! grouped by how the engine evaluates them.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::GridError;

/// Comparison operator for a column filter.
///
/// Operators are grouped by evaluation strategy:
/// - **Pattern**: `Eq`, `Neq`, `Like`, `NotLike`, `EndsWith`, `StartsWith` -
///   case-insensitive text matching
/// - **Relational**: `Gt`, `Gte`, `Lt`, `Lte` - raw value comparison
/// - **Null**: `IsNull`, `IsNotNull` - null identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Pattern operators
    /// Full-string match.
    Eq,
    /// Complement of `Eq`.
    Neq,
    /// Substring anywhere.
    Like,
    /// Complement of `Like`.
    NotLike,
    /// Suffix match.
    EndsWith,
    /// Prefix match.
    StartsWith,

    // Relational operators
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,

    // Null operators
    /// Value is null.
    IsNull,
    /// Value is not null.
    IsNotNull,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 12] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Like,
        Operator::NotLike,
        Operator::EndsWith,
        Operator::StartsWith,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::IsNull,
        Operator::IsNotNull,
    ];

    /// Returns `true` if this operator matches against a text pattern.
    pub fn is_pattern_op(self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::Neq
                | Operator::Like
                | Operator::NotLike
                | Operator::EndsWith
                | Operator::StartsWith
        )
    }

    /// Returns `true` if this operator compares raw values.
    pub fn is_relational_op(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }

    /// Returns `true` if this operator tests null identity.
    pub fn is_null_op(self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Returns `true` for the pattern operators that complement another one.
    pub fn is_negated(self) -> bool {
        matches!(self, Operator::Neq | Operator::NotLike)
    }

    /// Maps a negated pattern operator to the positive operator it complements.
    ///
    /// - `Neq` -> `Eq`
    /// - `NotLike` -> `Like`
    /// - Others unchanged
    pub fn positive(self) -> Operator {
        match self {
            Operator::Neq => Operator::Eq,
            Operator::NotLike => Operator::Like,
            other => other,
        }
    }

    /// Evaluates a relational operator given an ordering result.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Lte => ordering != Ordering::Greater,
            _ => false, // Not an ordering-based operator
        }
    }

    /// Returns the grid operator code.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Like => "like",
            Operator::NotLike => "nlike",
            Operator::EndsWith => "llike",
            Operator::StartsWith => "rlike",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::IsNull => "isNull",
            Operator::IsNotNull => "isNotNull",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GridError::UnknownOperator(s.to_string()))
    }
}
