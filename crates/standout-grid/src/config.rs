//! Dataset configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::infer::DEFAULT_SAMPLE_SIZE;
use crate::key::KeyPolicy;

/// Settings applied to a [`Dataset`](crate::Dataset).
///
/// Every field has a default, so a configuration document only needs to
/// name what it changes.
///
/// # Example
///
/// ```
/// use standout_grid::{GridConfig, KeyPolicy};
///
/// let config = GridConfig::from_json(r#"{"primary_key": ["region", "id"]}"#).unwrap();
/// assert_eq!(config.sample_size, 10);
/// assert_eq!(
///     config.primary_key,
///     KeyPolicy::Fields(vec!["region".into(), "id".into()])
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Leading rows sampled per untyped column.
    pub sample_size: usize,
    /// Which columns identify a row.
    pub primary_key: KeyPolicy,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            sample_size: DEFAULT_SAMPLE_SIZE,
            primary_key: KeyPolicy::FirstColumn,
        }
    }
}

impl GridConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }
}
