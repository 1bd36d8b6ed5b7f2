//! Grid - In-memory tabular query engine.
//!
//! Grid runs data-grid queries against a table of rows held in memory. It
//! provides:
//!
//! - Column type inference from a sample of the rows
//! - Per-column filters: equality, containment, prefix/suffix, comparison, null checks
//! - A single-column sort with type-aware keys
//! - Pagination with page, page size and a hard result cap
//! - Primary-key designation and an optional row hook on every result row
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use standout_grid::{ColumnSpec, Dataset, Dir, Filter, Operator, Page, Value};
//!
//! let mut dataset = Dataset::from_json(json!([
//!     {"id": 1, "name": "Write docs", "priority": 3, "done": "0"},
//!     {"id": 2, "name": "Fix bug", "priority": 5, "done": "0"},
//!     {"id": 3, "name": "Old task", "priority": 1, "done": "1"},
//! ]))
//! .unwrap();
//!
//! // Infer column types; the first column becomes the primary key.
//! dataset.initialise();
//!
//! let columns = vec![
//!     ColumnSpec::new("priority")
//!         .filter(Filter::new(Operator::Gte, 3i64))
//!         .sort(Dir::Desc),
//!     ColumnSpec::new("done").filter(Filter::new(Operator::Eq, false)),
//! ];
//!
//! let result = dataset.execute(&columns, &Page::new(0, 10));
//! assert_eq!(result.total_count, 2);
//! assert_eq!(result.rows[0].field("name"), Some(&Value::from("Fix bug")));
//! assert_eq!(result.rows[0].primary_value(), Value::from(2i64));
//! ```
//!
//! # Query Semantics
//!
//! A query runs its phases in a fixed order:
//!
//! ```text
//! filter -> sort -> count -> paginate -> normalize
//! ```
//!
//! - **Filter**: every filter of every filterable column must match. A row
//!   without a column's field is not judged by that column.
//! - **Sort**: the first sortable column with a direction orders the rows;
//!   the sort is stable.
//! - **Count**: `total_count` is taken after filtering, before paging.
//! - **Paginate**: see [`Page::window`].
//! - **Normalize**: rows gain the primary key and pass through the row hook.
//!
//! # Column Types and Operators
//!
//! | Type | Pattern operators match | Sort key |
//! |------|-------------------------|----------|
//! | `text` | the text | lowercased text |
//! | `number` | the decimal form | numeric value |
//! | `boolean` | `1` / `0` | truthiness |
//! | `date` | `YYYY-MM-DD` | timestamp |
//! | `datetime` | `YYYY-MM-DD HH:MM:SS` | timestamp |
//! | `time` | the text | seconds |
//! | `array` | any element | encoded text |
//!
//! Pattern operators (`eq`, `neq`, `like`, `nlike`, `llike`, `rlike`) match
//! case-insensitively and treat their operand literally. Relational
//! operators (`gt`, `gte`, `lt`, `lte`) compare numerically when both sides
//! are numeric and as text otherwise.

mod codec;
mod column;
mod config;
mod dataset;
mod datetime;
mod error;
mod filter;
mod infer;
mod key;
mod op;
mod ordering;
mod query;
mod row;
mod value;

// Re-export public API
pub use codec::{ArrayCodec, JsonArrayCodec};
pub use column::{ColumnSpec, ColumnType};
pub use config::GridConfig;
pub use dataset::Dataset;
pub use datetime::{parse_datetime, DATETIME_FORMAT};
pub use error::{GridError, Result};
pub use filter::{Filter, Predicate};
pub use infer::{TypeInferencer, DEFAULT_SAMPLE_SIZE};
pub use key::{KeyPolicy, PrimaryKey};
pub use op::Operator;
pub use ordering::{compare_values, natural_cmp, Dir, SortKey};
pub use query::{distinct_values, Page, QueryEngine, QueryResult, RowHook};
pub use row::{ResultRow, Row};
pub use value::{Number, Value};
