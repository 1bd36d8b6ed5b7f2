//! Primary-key selection.
//!
//! A [`KeyPolicy`] says which columns identify a row; resolving it against
//! a dataset's columns yields the [`PrimaryKey`] designation attached to
//! every result row.

use serde::{Deserialize, Serialize};

use crate::column::ColumnSpec;

/// How the primary key of a dataset is chosen.
///
/// In configuration documents the policy is `null` (first column), a column
/// id, or a list of column ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPolicy {
    /// The first column identifies rows.
    #[default]
    FirstColumn,
    /// One named column identifies rows.
    Field(String),
    /// Several named columns identify rows together.
    Fields(Vec<String>),
}

impl KeyPolicy {
    /// Marks the key columns as primary and returns the designation.
    ///
    /// Columns the caller already marked primary stay primary.
    pub fn apply(&self, columns: &mut [ColumnSpec]) -> PrimaryKey {
        for (index, column) in columns.iter_mut().enumerate() {
            if column.primary {
                continue;
            }
            column.primary = match self {
                KeyPolicy::FirstColumn => index == 0,
                KeyPolicy::Field(id) => column.id == *id,
                KeyPolicy::Fields(ids) => ids.contains(&column.id),
            };
        }
        self.designation(columns)
    }

    /// Resolves the designation against columns, mapping column ids to the
    /// row fields they read.
    ///
    /// Ids naming no column are used as field names directly.
    pub fn designation(&self, columns: &[ColumnSpec]) -> PrimaryKey {
        let field_of = |id: &str| {
            columns
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.field.clone())
                .unwrap_or_else(|| id.to_string())
        };

        match self {
            KeyPolicy::Field(id) => PrimaryKey::Single(field_of(id)),
            KeyPolicy::Fields(ids) => PrimaryKey::Composite(ids.iter().map(|id| field_of(id)).collect()),
            KeyPolicy::FirstColumn => {
                PrimaryKey::from_fields(columns.iter().filter(|c| c.primary).map(|c| c.field.clone()))
            }
        }
    }
}

/// The field(s) identifying a result row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PrimaryKey {
    /// No identifying field.
    #[default]
    None,
    /// A single identifying field.
    Single(String),
    /// Several identifying fields.
    Composite(Vec<String>),
}

impl PrimaryKey {
    /// Builds a designation from field names: none, one, or several.
    pub fn from_fields(fields: impl IntoIterator<Item = String>) -> Self {
        let mut fields: Vec<String> = fields.into_iter().collect();
        match fields.len() {
            0 => PrimaryKey::None,
            1 => PrimaryKey::Single(fields.remove(0)),
            _ => PrimaryKey::Composite(fields),
        }
    }

    /// The identifying field names.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            PrimaryKey::None => Vec::new(),
            PrimaryKey::Single(field) => vec![field.as_str()],
            PrimaryKey::Composite(fields) => fields.iter().map(String::as_str).collect(),
        }
    }

    /// Returns `true` if the field is part of the key.
    pub fn contains(&self, field: &str) -> bool {
        self.fields().contains(&field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("id"),
            ColumnSpec::new("region").field("region_code"),
            ColumnSpec::new("name"),
        ]
    }

    fn primary_ids(columns: &[ColumnSpec]) -> Vec<&str> {
        columns.iter().filter(|c| c.primary).map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn first_column_by_default() {
        let mut cols = columns();
        let key = KeyPolicy::default().apply(&mut cols);
        assert_eq!(primary_ids(&cols), vec!["id"]);
        assert_eq!(key, PrimaryKey::Single("id".into()));
    }

    #[test]
    fn first_column_keeps_caller_primaries() {
        let mut cols = columns();
        cols[2].primary = true;
        let key = KeyPolicy::FirstColumn.apply(&mut cols);
        assert_eq!(primary_ids(&cols), vec!["id", "name"]);
        assert_eq!(key, PrimaryKey::Composite(vec!["id".into(), "name".into()]));
    }

    #[test]
    fn named_field_maps_to_row_field() {
        let mut cols = columns();
        let key = KeyPolicy::Field("region".into()).apply(&mut cols);
        assert_eq!(primary_ids(&cols), vec!["region"]);
        assert_eq!(key, PrimaryKey::Single("region_code".into()));
    }

    #[test]
    fn composite_fields() {
        let mut cols = columns();
        let key = KeyPolicy::Fields(vec!["name".into(), "id".into()]).apply(&mut cols);
        assert_eq!(primary_ids(&cols), vec!["id", "name"]);
        assert_eq!(key.fields(), vec!["name", "id"]);
        assert!(key.contains("id"));
        assert!(!key.contains("region_code"));
    }

    #[test]
    fn from_fields_sizes() {
        assert_eq!(PrimaryKey::from_fields(Vec::new()), PrimaryKey::None);
        assert_eq!(PrimaryKey::from_fields(vec!["a".to_string()]), PrimaryKey::Single("a".into()));
    }

    #[test]
    fn policy_deserializes_from_config_shapes() {
        let first: KeyPolicy = serde_json::from_str("null").unwrap();
        assert_eq!(first, KeyPolicy::FirstColumn);
        let single: KeyPolicy = serde_json::from_str(r#""id""#).unwrap();
        assert_eq!(single, KeyPolicy::Field("id".into()));
        let many: KeyPolicy = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(many, KeyPolicy::Fields(vec!["a".into(), "b".into()]));
    }
}
