//! Datasets: validated rows plus the column and key configuration queries
//! run against.

use std::borrow::Cow;
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::codec::{ArrayCodec, JsonArrayCodec};
use crate::column::ColumnSpec;
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::infer::TypeInferencer;
use crate::key::{KeyPolicy, PrimaryKey};
use crate::query::{self, Page, QueryEngine, QueryResult, RowHook};
use crate::row::{ResultRow, Row};
use crate::value::Value;

/// Columns and key resolved by [`Dataset::initialise`].
#[derive(Debug, Clone)]
struct Resolved {
    columns: Vec<ColumnSpec>,
    primary: PrimaryKey,
}

/// An in-memory table of rows.
///
/// The rows are validated when set: there must be at least one, and the
/// first must have at least one field. Column types are inferred once, on
/// [`initialise`](Dataset::initialise); the rows cannot be replaced after
/// that.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_grid::{ColumnSpec, ColumnType, Dataset, Filter, Operator, Page, Value};
///
/// let mut dataset = Dataset::from_json(json!([
///     {"id": 1, "active": "1"},
///     {"id": 2, "active": "0"},
/// ]))
/// .unwrap();
///
/// dataset.initialise();
/// assert_eq!(dataset.column("active").unwrap().column_type, Some(ColumnType::Boolean));
///
/// let columns = vec![ColumnSpec::new("active").filter(Filter::new(Operator::Eq, true))];
/// let result = dataset.execute(&columns, &Page::all());
/// assert_eq!(result.total_count, 1);
/// assert_eq!(result.rows[0].primary_value(), Value::from(1i64));
/// ```
#[derive(Clone)]
pub struct Dataset {
    rows: Vec<Row>,
    declared: Vec<ColumnSpec>,
    config: GridConfig,
    codec: Arc<dyn ArrayCodec>,
    row_hook: Option<RowHook>,
    resolved: Option<Resolved>,
    frozen: bool,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("rows", &self.rows.len())
            .field("declared", &self.declared)
            .field("config", &self.config)
            .field("row_hook", &self.row_hook.is_some())
            .field("resolved", &self.resolved)
            .field("frozen", &self.frozen)
            .finish_non_exhaustive()
    }
}

impl Dataset {
    /// Creates a dataset over rows.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyData`] if there are no rows and
    /// [`GridError::NotTwoDimensional`] if the first row has no fields.
    pub fn new(rows: Vec<Row>) -> Result<Self> {
        validate(&rows)?;
        Ok(Dataset {
            rows,
            declared: Vec::new(),
            config: GridConfig::default(),
            codec: Arc::new(JsonArrayCodec),
            row_hook: None,
            resolved: None,
            frozen: false,
        })
    }

    /// Creates a dataset from a JSON array of objects.
    ///
    /// Nested objects inside a record are kept as their JSON text.
    pub fn from_json(document: serde_json::Value) -> Result<Self> {
        let records = match document {
            serde_json::Value::Array(records) => records,
            other => {
                return Err(GridError::NotTwoDimensional(format!(
                    "expected a list of records, found {}",
                    json_kind(&other)
                )))
            }
        };

        let rows = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| match record {
                serde_json::Value::Object(object) => Ok(Row::from_json_object(object)),
                other => Err(GridError::NotTwoDimensional(format!(
                    "record {index} is {}, not an object",
                    json_kind(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Dataset::new(rows)
    }

    /// Parses a JSON document holding an array of objects.
    pub fn from_json_str(document: &str) -> Result<Self> {
        Dataset::from_json(serde_json::from_str(document)?)
    }

    /// Creates a dataset from serializable records, one row per record.
    ///
    /// ```
    /// use serde::Serialize;
    /// use standout_grid::Dataset;
    ///
    /// #[derive(Serialize)]
    /// struct Book {
    ///     isbn: String,
    ///     pages: u32,
    /// }
    ///
    /// let books = vec![Book { isbn: "978-0".into(), pages: 320 }];
    /// let dataset = Dataset::from_records(&books).unwrap();
    /// assert_eq!(dataset.len(), 1);
    /// ```
    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Self> {
        Dataset::from_json(serde_json::to_value(records)?)
    }

    /// Declares columns; undeclared keys of the first row are added on
    /// initialisation.
    ///
    /// Reconfiguring an initialised dataset drops the resolved columns; the
    /// rows stay frozen.
    pub fn with_columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.declared = columns;
        self.resolved = None;
        self
    }

    /// Sets the primary-key policy.
    pub fn with_primary_key(mut self, policy: KeyPolicy) -> Self {
        self.config.primary_key = policy;
        self.resolved = None;
        self
    }

    /// Applies a configuration.
    pub fn with_config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self.resolved = None;
        self
    }

    /// Replaces the codec used for array columns.
    pub fn with_codec<C: ArrayCodec + 'static>(mut self, codec: C) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Installs a hook offered every result row; returning `None` drops it.
    pub fn with_row_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(ResultRow) -> Option<ResultRow> + Send + Sync + 'static,
    {
        self.row_hook = Some(Arc::new(hook));
        self
    }

    /// Replaces the rows.
    ///
    /// # Errors
    ///
    /// [`GridError::AlreadyInitialised`] once [`initialise`](Dataset::initialise)
    /// has run, even if the dataset was reconfigured since, plus the
    /// validation errors of [`Dataset::new`].
    pub fn set_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        if self.frozen {
            return Err(GridError::AlreadyInitialised);
        }
        validate(&rows)?;
        self.rows = rows;
        Ok(())
    }

    /// Infers column types and resolves the primary key.
    ///
    /// Runs once; later calls return the cached columns.
    pub fn initialise(&mut self) -> &[ColumnSpec] {
        self.frozen = true;
        let resolved = match self.resolved.take() {
            Some(resolved) => resolved,
            None => self.resolve(),
        };
        &self.resolved.insert(resolved).columns
    }

    /// Returns `true` once column types have been inferred.
    pub fn is_initialised(&self) -> bool {
        self.resolved.is_some()
    }

    /// The dataset's columns: resolved after initialisation, declared
    /// before.
    pub fn columns(&self) -> &[ColumnSpec] {
        match &self.resolved {
            Some(resolved) => &resolved.columns,
            None => &self.declared,
        }
    }

    /// Looks up a column by id.
    pub fn column(&self, id: &str) -> Option<&ColumnSpec> {
        self.columns().iter().find(|c| c.id == id)
    }

    /// The primary-key designation attached to result rows.
    pub fn primary_key(&self) -> Cow<'_, PrimaryKey> {
        match &self.resolved {
            Some(resolved) => Cow::Borrowed(&resolved.primary),
            None => Cow::Owned(self.resolve().primary),
        }
    }

    /// Identity of the dataset's column layout.
    ///
    /// A SHA-256 digest over the resolved column ids, so two datasets with
    /// the same columns share a hash regardless of their rows.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        for column in &self.resolved().columns {
            hasher.update(column.id.as_bytes());
        }
        format!("grid-{:x}", hasher.finalize())
    }

    /// The dataset's rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false`: datasets hold at least one row.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Runs a query.
    ///
    /// Untyped query columns take the type of the dataset column with the
    /// same id, or are inferred from the rows when there is none. On a
    /// dataset that was never initialised, resolution happens per query and
    /// is not cached.
    pub fn execute(&self, columns: &[ColumnSpec], page: &Page) -> QueryResult<'_> {
        let resolved = self.resolved();
        let columns = self.typed(columns, &resolved.columns);
        self.engine(resolved.primary.clone())
            .execute(&self.rows, &columns, page)
            .with_known_columns(resolved.columns.iter().cloned())
    }

    /// Distinct non-blank values of a column across all rows, array
    /// elements flattened, in natural order.
    pub fn distinct_values(&self, column: &ColumnSpec) -> Vec<Value> {
        let resolved = self.resolved();
        let column = self.typed_one(column, &resolved.columns);
        query::distinct_values(&self.rows, &column, self.codec.as_ref())
    }

    fn engine(&self, primary: PrimaryKey) -> QueryEngine {
        QueryEngine::new()
            .primary_key(primary)
            .codec(Arc::clone(&self.codec))
            .inferencer(self.inferencer())
            .shared_row_hook(self.row_hook.clone())
    }

    fn resolved(&self) -> Cow<'_, Resolved> {
        match &self.resolved {
            Some(resolved) => Cow::Borrowed(resolved),
            None => Cow::Owned(self.resolve()),
        }
    }

    fn inferencer(&self) -> TypeInferencer {
        TypeInferencer::new().sample_size(self.config.sample_size)
    }

    fn resolve(&self) -> Resolved {
        let mut columns = self
            .inferencer()
            .infer(&self.rows, self.declared.clone());
        let primary = self.config.primary_key.apply(&mut columns);
        debug!(
            rows = self.rows.len(),
            columns = columns.len(),
            primary = ?primary,
            "resolved dataset columns"
        );
        Resolved { columns, primary }
    }

    fn typed(&self, columns: &[ColumnSpec], known: &[ColumnSpec]) -> Vec<ColumnSpec> {
        columns.iter().map(|c| self.typed_one(c, known)).collect()
    }

    fn typed_one(&self, column: &ColumnSpec, known: &[ColumnSpec]) -> ColumnSpec {
        self.inferencer().type_column(column, known, &self.rows)
    }
}

fn validate(rows: &[Row]) -> Result<()> {
    match rows.first() {
        None => Err(GridError::EmptyData),
        Some(first) if first.is_empty() => Err(GridError::NotTwoDimensional("the first row has no fields".into())),
        Some(_) => Ok(()),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::filter::Filter;
    use crate::op::Operator;
    use crate::ordering::Dir;
    use serde_json::json;

    fn inventory() -> Dataset {
        Dataset::from_json(json!([
            {"sku": "A-1", "name": "Widget", "stock": 12, "tags": ["red", "small"]},
            {"sku": "B-2", "name": "gadget", "stock": 0, "tags": ["blue"]},
            {"sku": "C-3", "name": "Doohickey", "stock": 7, "tags": []},
        ]))
        .unwrap()
    }

    #[test]
    fn rejects_empty_data() {
        assert!(matches!(Dataset::new(Vec::new()), Err(GridError::EmptyData)));
        assert!(matches!(Dataset::from_json(json!([])), Err(GridError::EmptyData)));
    }

    #[test]
    fn rejects_non_tabular_data() {
        assert!(matches!(
            Dataset::new(vec![Row::new()]),
            Err(GridError::NotTwoDimensional(_))
        ));
        assert!(matches!(
            Dataset::from_json(json!({"id": 1})),
            Err(GridError::NotTwoDimensional(_))
        ));
        assert!(matches!(
            Dataset::from_json(json!([1, 2])),
            Err(GridError::NotTwoDimensional(_))
        ));
        assert!(matches!(Dataset::from_json_str("[{"), Err(GridError::Config(_))));
    }

    #[test]
    fn initialise_infers_and_marks_primary() {
        let mut dataset = inventory();
        assert!(!dataset.is_initialised());
        assert!(dataset.columns().is_empty());

        let columns = dataset.initialise();
        let ids: Vec<&str> = columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["sku", "name", "stock", "tags"]);

        assert_eq!(dataset.column("stock").unwrap().column_type, Some(ColumnType::Number));
        assert_eq!(dataset.column("tags").unwrap().column_type, Some(ColumnType::Array));
        assert!(dataset.column("sku").unwrap().primary);
        assert!(!dataset.column("name").unwrap().primary);
        assert_eq!(*dataset.primary_key(), PrimaryKey::Single("sku".into()));
    }

    #[test]
    fn rows_are_frozen_after_initialise() {
        let mut dataset = inventory();
        let replacement = vec![[("id", Value::from(1i64))].into_iter().collect()];
        assert!(dataset.set_rows(replacement.clone()).is_ok());
        assert_eq!(dataset.len(), 1);

        dataset.initialise();
        assert!(matches!(dataset.set_rows(replacement), Err(GridError::AlreadyInitialised)));
        assert!(matches!(dataset.set_rows(Vec::new()), Err(GridError::AlreadyInitialised)));
    }

    #[test]
    fn reconfiguring_keeps_rows_frozen() {
        let mut dataset = inventory();
        dataset.initialise();

        let mut dataset = dataset
            .with_columns(vec![ColumnSpec::new("name").typed(ColumnType::Text)])
            .with_primary_key(KeyPolicy::Field("name".into()))
            .with_config(GridConfig::default());
        assert!(!dataset.is_initialised());

        let replacement = vec![[("id", Value::from(1i64))].into_iter().collect()];
        assert!(matches!(dataset.set_rows(replacement), Err(GridError::AlreadyInitialised)));
        assert_eq!(dataset.len(), 3);

        let ids: Vec<&str> = dataset.initialise().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["sku", "name", "stock", "tags"]);
    }

    #[test]
    fn hash_follows_column_layout() {
        let mut initialised = inventory();
        initialised.initialise();
        let hash = inventory().hash();

        assert!(hash.starts_with("grid-"));
        assert_eq!(hash.len(), "grid-".len() + 64);
        assert_eq!(hash, initialised.hash());

        let other = Dataset::from_json(json!([
            {"sku": "Z-9", "name": "Sprocket", "stock": 1, "tags": []},
        ]))
        .unwrap();
        assert_eq!(other.hash(), hash);

        let narrower = Dataset::from_json(json!([{"sku": "A-1", "name": "Widget"}])).unwrap();
        assert_ne!(narrower.hash(), hash);
    }

    #[test]
    fn query_distinct_values_use_dataset_types() {
        let dataset = Dataset::from_json(json!([
            {"id": 1, "tags": "a|b"},
            {"id": 2, "tags": "c"},
        ]))
        .unwrap()
        .with_columns(vec![ColumnSpec::new("tags").typed(ColumnType::Array)])
        .with_codec(Pipes);

        let result = dataset.execute(&[], &Page::all());
        assert_eq!(
            result.distinct_values(&ColumnSpec::new("tags")),
            vec![Value::from("a"), Value::from("b"), Value::from("c")]
        );
    }

    #[derive(Debug)]
    struct Pipes;

    impl ArrayCodec for Pipes {
        fn encode(&self, items: &[Value]) -> String {
            items.iter().map(|v| v.to_text().into_owned()).collect::<Vec<_>>().join("|")
        }

        fn decode(&self, text: &str) -> Option<Vec<Value>> {
            Some(text.split('|').map(Value::from).collect())
        }
    }

    #[test]
    fn composite_primary_key() {
        let dataset = inventory().with_primary_key(KeyPolicy::Fields(vec!["sku".into(), "name".into()]));
        let result = dataset.execute(&[], &Page::new(0, 1));
        assert_eq!(
            result.rows[0].primary_value(),
            Value::from(vec![Value::from("A-1"), Value::from("Widget")])
        );
    }

    #[test]
    fn config_drives_sampling_and_key() {
        let config = GridConfig::from_json(r#"{"sample_size": 1, "primary_key": "name"}"#).unwrap();
        let mut dataset = Dataset::from_json(json!([
            {"name": "a", "flag": 1},
            {"name": "b", "flag": 7},
        ]))
        .unwrap()
        .with_config(config);

        dataset.initialise();
        assert_eq!(dataset.column("flag").unwrap().column_type, Some(ColumnType::Boolean));
        assert!(dataset.column("name").unwrap().primary);
        assert_eq!(*dataset.primary_key(), PrimaryKey::Single("name".into()));
    }

    #[test]
    fn execute_types_untyped_query_columns() {
        let mut dataset = inventory();
        dataset.initialise();
        let columns = vec![ColumnSpec::new("stock").filter(Filter::new(Operator::Gt, "5")).sort(Dir::Asc)];
        let result = dataset.execute(&columns, &Page::all());
        let skus: Vec<&Value> = result.rows.iter().filter_map(|r| r.field("sku")).collect();
        assert_eq!(skus, vec![&Value::from("C-3"), &Value::from("A-1")]);
    }

    #[test]
    fn execute_without_initialise_matches_initialised() {
        let uninitialised = inventory();
        let mut initialised = inventory();
        initialised.initialise();

        let columns = vec![ColumnSpec::new("name").sort(Dir::Desc)];
        let a = uninitialised.execute(&columns, &Page::all());
        let b = initialised.execute(&columns, &Page::all());
        assert_eq!(a.rows, b.rows);
        assert!(!uninitialised.is_initialised());
    }

    #[test]
    fn array_filter_matches_elements() {
        let dataset = inventory();
        let columns = vec![ColumnSpec::new("tags").filter(Filter::new(Operator::Eq, "Blue"))];
        let result = dataset.execute(&columns, &Page::all());
        assert_eq!(result.total_count, 1);
        assert_eq!(result.rows[0].field("sku"), Some(&Value::from("B-2")));
    }

    #[test]
    fn row_hook_runs_on_dataset_queries() {
        let dataset = inventory().with_row_hook(|row| {
            let in_stock = row.field("stock").map(Value::truthy).unwrap_or(false);
            in_stock.then_some(row)
        });
        let result = dataset.execute(&[], &Page::all());
        assert_eq!(result.len(), 2);
        assert_eq!(result.total_count, 3);
    }

    #[test]
    fn distinct_values_across_dataset() {
        let dataset = inventory();
        assert_eq!(
            dataset.distinct_values(&ColumnSpec::new("tags")),
            vec![Value::from("blue"), Value::from("red"), Value::from("small")]
        );
        assert_eq!(
            dataset.distinct_values(&ColumnSpec::new("stock")),
            vec![Value::from(0i64), Value::from(7i64), Value::from(12i64)]
        );
    }

    #[test]
    fn from_records_keeps_field_order() {
        #[derive(Serialize)]
        struct Entry {
            zeta: u32,
            alpha: String,
        }

        let entries = vec![Entry { zeta: 1, alpha: "x".into() }];
        let mut dataset = Dataset::from_records(&entries).unwrap();
        let ids: Vec<&str> = dataset.initialise().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
    }

    #[test]
    fn dataset_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dataset>();
    }
}
