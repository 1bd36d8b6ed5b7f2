//! Column definitions.
//!
//! A [`ColumnSpec`] names the row field a column reads, its semantic type
//! and the filter/sort directives active for one query.

use std::str::FromStr;

use crate::error::GridError;
use crate::filter::Filter;
use crate::ordering::Dir;

/// Semantic type of a column.
///
/// The derived ordering is only used to keep inference buckets in a
/// deterministic set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnType {
    /// Free text.
    Text,
    /// Integer or decimal values.
    Number,
    /// `true`/`false` or `1`/`0`.
    Boolean,
    /// Date with no time of day.
    Date,
    /// Date with a time of day.
    DateTime,
    /// Time of day. Declared only, never inferred.
    Time,
    /// Composite values.
    Array,
}

impl ColumnType {
    /// Returns the type name.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Time => "time",
            ColumnType::Array => "array",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ColumnType::Text),
            "number" => Ok(ColumnType::Number),
            "boolean" => Ok(ColumnType::Boolean),
            "date" => Ok(ColumnType::Date),
            "datetime" => Ok(ColumnType::DateTime),
            "time" => Ok(ColumnType::Time),
            "array" => Ok(ColumnType::Array),
            _ => Err(GridError::UnknownColumnType(s.to_string())),
        }
    }
}

/// A column definition plus its per-query filter and sort state.
///
/// # Example
///
/// ```
/// use standout_grid::{ColumnSpec, ColumnType, Dir, Filter, Operator};
///
/// let column = ColumnSpec::new("name")
///     .typed(ColumnType::Text)
///     .filter(Filter::new(Operator::Like, "ada"))
///     .sort(Dir::Asc);
///
/// assert!(column.is_filtered());
/// assert!(column.is_sorted());
/// assert_eq!(column.field, "name");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Column identifier.
    pub id: String,
    /// Row key the column reads.
    pub field: String,
    /// Display title.
    pub title: String,
    /// Semantic type; `None` until declared or inferred.
    pub column_type: Option<ColumnType>,
    /// Whether filters on this column are applied.
    pub filterable: bool,
    /// Whether a sort on this column is applied.
    pub sortable: bool,
    /// Whether the column is shown.
    pub visible: bool,
    /// Whether the column identifies rows.
    pub primary: bool,
    /// Active filters, combined with AND.
    pub filters: Vec<Filter>,
    /// Active sort direction.
    pub order: Option<Dir>,
}

impl ColumnSpec {
    /// Creates an untyped, filterable, sortable, visible column whose field
    /// and title equal its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        ColumnSpec {
            field: id.clone(),
            title: id.clone(),
            id,
            column_type: None,
            filterable: true,
            sortable: true,
            visible: true,
            primary: false,
            filters: Vec::new(),
            order: None,
        }
    }

    /// Sets the row key this column reads.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Sets the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Declares the column type.
    pub fn typed(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    /// Enables or disables filtering.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Enables or disables sorting.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Shows or hides the column.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Marks the column as (part of) the primary key.
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Adds an active filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the active sort direction.
    pub fn sort(mut self, dir: Dir) -> Self {
        self.order = Some(dir);
        self
    }

    /// Drops all per-query state, keeping the definition.
    pub fn cleared(mut self) -> Self {
        self.filters.clear();
        self.order = None;
        self
    }

    /// Returns `true` if the column is filterable and has active filters.
    pub fn is_filtered(&self) -> bool {
        self.filterable && !self.filters.is_empty()
    }

    /// Returns `true` if the column is sortable and has a sort direction.
    pub fn is_sorted(&self) -> bool {
        self.sortable && self.order.is_some()
    }

    /// Returns `true` if the column has no declared or inferred type.
    pub fn is_untyped(&self) -> bool {
        self.column_type.is_none()
    }
}
