//! Query execution.
//!
//! [`QueryEngine::execute`] runs the four phases of a grid query over
//! in-memory rows, always in this order:
//!
//! ```text
//! filter -> sort -> count -> paginate -> normalize
//! ```
//!
//! The total count is taken after filtering and before pagination, and only
//! the rows of the requested page are normalized into [`ResultRow`]s.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::codec::{ArrayCodec, JsonArrayCodec};
use crate::column::{ColumnSpec, ColumnType};
use crate::filter::Predicate;
use crate::infer::TypeInferencer;
use crate::key::PrimaryKey;
use crate::ordering::{natural_cmp, SortKey};
use crate::row::{ResultRow, Row};
use crate::value::Value;

/// Hook offered every output row; returning `None` drops the row.
pub type RowHook = Arc<dyn Fn(ResultRow) -> Option<ResultRow> + Send + Sync>;

/// Pagination parameters of one query.
///
/// # Example
///
/// ```
/// use standout_grid::Page;
///
/// // Second page of two rows over five candidates.
/// assert_eq!(Page::new(1, 2).window(5), 2..4);
///
/// // A cap of three rows leaves one row for the second page.
/// assert_eq!(Page::new(1, 2).max_results(3).window(5), 2..3);
///
/// // No paging: everything, or the first `max_results` rows.
/// assert_eq!(Page::all().window(5), 0..5);
/// assert_eq!(Page::all().max_results(2).window(5), 0..2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    /// Zero-based page number.
    pub page: usize,
    /// Rows per page; `0` disables paging.
    pub page_size: usize,
    /// Hard cap on the rows reachable through paging.
    pub max_results: Option<usize>,
}

impl Page {
    /// No paging and no cap.
    pub fn all() -> Self {
        Page::default()
    }

    /// Page `page` of `page_size` rows.
    pub fn new(page: usize, page_size: usize) -> Self {
        Page {
            page,
            page_size,
            max_results: None,
        }
    }

    /// Sets the hard cap on returned rows.
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// The slice of `total` candidate rows this page covers.
    ///
    /// With paging, the slice starts at `page * page_size` and is
    /// `page_size` long, shortened to the allowance left under
    /// `max_results` when that is smaller. The range is clamped to `total`.
    pub fn window(&self, total: usize) -> Range<usize> {
        let (start, len) = if self.page_size > 0 {
            let start = self.page.saturating_mul(self.page_size);
            let len = match self.max_results {
                Some(max) if max.saturating_sub(start) < self.page_size => max.saturating_sub(start),
                _ => self.page_size,
            };
            (start, len)
        } else if let Some(max) = self.max_results {
            (0, max)
        } else {
            (0, total)
        };

        let start = start.min(total);
        start..start.saturating_add(len).min(total)
    }
}

/// Output of one query.
#[derive(Clone)]
pub struct QueryResult<'a> {
    /// Normalized rows of the requested page, minus rows the hook dropped.
    pub rows: Vec<ResultRow>,
    /// Candidate rows after filtering, before pagination.
    pub total_count: usize,
    /// Raw dataset rows of the requested page, in result order.
    pub items: Vec<&'a Row>,
    source: &'a [Row],
    known: Vec<ColumnSpec>,
    inferencer: TypeInferencer,
    codec: Arc<dyn ArrayCodec>,
}

impl std::fmt::Debug for QueryResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResult")
            .field("rows", &self.rows)
            .field("total_count", &self.total_count)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl<'a> QueryResult<'a> {
    /// Number of output rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no output rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total count capped by `max_results`, for pager displays.
    pub fn capped_total(&self, max_results: Option<usize>) -> usize {
        match max_results {
            Some(max) => self.total_count.min(max),
            None => self.total_count,
        }
    }

    /// Distinct values of a column across this page's raw rows.
    ///
    /// An untyped column takes the type of the query column with the same
    /// id, or is inferred from the queried rows. Encoded arrays are decoded
    /// with the engine's codec. See [`distinct_values`] for the collection
    /// rules.
    pub fn distinct_values(&self, column: &ColumnSpec) -> Vec<Value> {
        let column = self.inferencer.type_column(column, &self.known, self.source);
        distinct_values(self.items.iter().copied(), &column, self.codec.as_ref())
    }

    /// Adds columns consulted when typing a column for [`Self::distinct_values`].
    pub(crate) fn with_known_columns(mut self, columns: impl IntoIterator<Item = ColumnSpec>) -> Self {
        self.known.extend(columns);
        self
    }
}

/// Executes filter, sort and pagination over rows.
///
/// The engine holds no per-query state: the rows of the last page are
/// returned in [`QueryResult::items`].
///
/// # Example
///
/// ```
/// use standout_grid::{ColumnSpec, ColumnType, Dir, Filter, Operator, Page, QueryEngine, Row, Value};
///
/// let rows: Vec<Row> = (1..=5i64)
///     .map(|n| [("n", Value::from(n))].into_iter().collect())
///     .collect();
///
/// let columns = vec![ColumnSpec::new("n")
///     .typed(ColumnType::Number)
///     .filter(Filter::new(Operator::Gt, 1i64))
///     .sort(Dir::Desc)];
///
/// let result = QueryEngine::new().execute(&rows, &columns, &Page::new(0, 2));
/// assert_eq!(result.total_count, 4);
/// assert_eq!(result.rows[0].field("n"), Some(&Value::from(5i64)));
/// assert_eq!(result.rows[1].field("n"), Some(&Value::from(4i64)));
/// ```
#[derive(Clone)]
pub struct QueryEngine {
    primary: PrimaryKey,
    codec: Arc<dyn ArrayCodec>,
    inferencer: TypeInferencer,
    row_hook: Option<RowHook>,
}

impl Default for QueryEngine {
    fn default() -> Self {
        QueryEngine {
            primary: PrimaryKey::None,
            codec: Arc::new(JsonArrayCodec),
            inferencer: TypeInferencer::new(),
            row_hook: None,
        }
    }
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("primary", &self.primary)
            .field("row_hook", &self.row_hook.is_some())
            .finish_non_exhaustive()
    }
}

impl QueryEngine {
    /// Creates an engine with no primary key, the JSON array codec and no
    /// row hook.
    pub fn new() -> Self {
        QueryEngine::default()
    }

    /// Sets the primary-key designation attached to result rows.
    pub fn primary_key(mut self, primary: PrimaryKey) -> Self {
        self.primary = primary;
        self
    }

    /// Replaces the array codec.
    pub fn codec(mut self, codec: Arc<dyn ArrayCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Sets the inferencer typing untyped columns in
    /// [`QueryResult::distinct_values`].
    pub fn inferencer(mut self, inferencer: TypeInferencer) -> Self {
        self.inferencer = inferencer;
        self
    }

    /// Installs a row hook.
    pub fn row_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(ResultRow) -> Option<ResultRow> + Send + Sync + 'static,
    {
        self.row_hook = Some(Arc::new(hook));
        self
    }

    /// Installs an already shared row hook, or removes it.
    pub fn shared_row_hook(mut self, hook: Option<RowHook>) -> Self {
        self.row_hook = hook;
        self
    }

    /// Runs a query.
    ///
    /// Never fails: per-row anomalies only decide whether a row matches and
    /// where it sorts.
    pub fn execute<'a>(&self, rows: &'a [Row], columns: &[ColumnSpec], page: &Page) -> QueryResult<'a> {
        let active: Vec<(&ColumnSpec, Vec<Predicate>)> = columns
            .iter()
            .filter(|column| column.is_filtered())
            .map(|column| {
                let predicates = column
                    .filters
                    .iter()
                    .map(|filter| filter.compile(column.column_type))
                    .collect();
                (column, predicates)
            })
            .collect();

        // Array fields matched structurally are restored on output.
        let array_fields: Vec<&str> = active
            .iter()
            .filter(|(column, _)| column.column_type == Some(ColumnType::Array))
            .map(|(column, _)| column.field.as_str())
            .collect();

        let mut candidates: Vec<&'a Row> = rows
            .iter()
            .enumerate()
            .filter(|(index, row)| {
                let keep = self.row_matches(row, &active);
                if !keep {
                    trace!(row = index, "row filtered out");
                }
                keep
            })
            .map(|(_, row)| row)
            .collect();

        debug!(
            rows = rows.len(),
            filtered_columns = active.len(),
            candidates = candidates.len(),
            "filtered rows"
        );

        if let Some(column) = columns.iter().find(|column| column.is_sorted()) {
            self.sort(&mut candidates, column);
        }

        let total_count = candidates.len();
        let window = page.window(total_count);
        debug!(total = total_count, start = window.start, end = window.end, "paginated rows");

        let items: Vec<&'a Row> = candidates[window].to_vec();
        let result_rows = items
            .iter()
            .filter_map(|row| self.normalize(row, &array_fields))
            .collect();

        QueryResult {
            rows: result_rows,
            total_count,
            items,
            source: rows,
            known: columns.to_vec(),
            inferencer: self.inferencer,
            codec: Arc::clone(&self.codec),
        }
    }

    /// A row survives when every active filter of every column matches.
    ///
    /// Columns whose field the row lacks do not take part.
    fn row_matches(&self, row: &Row, active: &[(&ColumnSpec, Vec<Predicate>)]) -> bool {
        active.iter().all(|(column, predicates)| match row.get(&column.field) {
            None => true,
            Some(value) => predicates
                .iter()
                .all(|predicate| predicate.matches(value, self.codec.as_ref())),
        })
    }

    /// Stable sort by the column's type-coerced key.
    fn sort(&self, candidates: &mut Vec<&Row>, column: &ColumnSpec) {
        let dir = column.order.unwrap_or_default();
        debug!(column = %column.id, dir = %dir, "sorting rows");

        let mut keyed: Vec<(SortKey, &Row)> = candidates
            .drain(..)
            .map(|row| {
                let key = SortKey::derive(row.get(&column.field), column.column_type, self.codec.as_ref());
                (key, row)
            })
            .collect();
        keyed.sort_by(|(a, _), (b, _)| dir.apply(a.compare(b)));
        candidates.extend(keyed.into_iter().map(|(_, row)| row));
    }

    fn normalize(&self, row: &Row, array_fields: &[&str]) -> Option<ResultRow> {
        let fields: Row = row
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Text(text) if array_fields.contains(&key) => self
                        .codec
                        .decode(text)
                        .map(Value::Array)
                        .unwrap_or_else(|| value.clone()),
                    _ => value.clone(),
                };
                (key, value)
            })
            .collect();

        let result = ResultRow::new(self.primary.clone(), fields);
        match &self.row_hook {
            Some(hook) => hook(result),
            None => Some(result),
        }
    }
}

/// Distinct non-blank values of a column, sorted in natural order.
///
/// Array columns contribute their elements rather than whole arrays;
/// arrays stored as encoded text are decoded first. Rows without the field
/// are skipped.
pub fn distinct_values<'r>(
    rows: impl IntoIterator<Item = &'r Row>,
    column: &ColumnSpec,
    codec: &dyn ArrayCodec,
) -> Vec<Value> {
    let is_array = column.column_type == Some(ColumnType::Array);
    let mut seen = HashSet::new();
    let mut values = Vec::new();

    let mut push = |value: Value| {
        if !value.is_blank() && seen.insert(value.to_text().into_owned()) {
            values.push(value);
        }
    };

    for value in rows.into_iter().filter_map(|row| row.get(&column.field)) {
        match value {
            Value::Array(items) if is_array => items.iter().cloned().for_each(&mut push),
            Value::Text(text) if is_array => match codec.decode(text) {
                Some(items) => items.into_iter().for_each(&mut push),
                None => push(value.clone()),
            },
            other => push(other.clone()),
        }
    }

    values.sort_by(natural_cmp);
    values
}
