//! Array codec: the bridge between structured array fields and text search.
//!
//! Array columns are matched element by element, sorted by their encoded
//! text, and may be stored in the dataset already encoded. The
//! [`ArrayCodec`] trait isolates those three concerns so a different
//! structured-match strategy can be plugged into a [`Dataset`] without
//! touching filter or sort logic.
//!
//! [`Dataset`]: crate::Dataset

use regex::Regex;

use crate::value::Value;

/// Encodes, decodes and matches array field values.
///
/// # Example
///
/// ```
/// use regex::Regex;
/// use standout_grid::{ArrayCodec, JsonArrayCodec, Value};
///
/// let codec = JsonArrayCodec;
/// let tags = vec![Value::from("red"), Value::from("green")];
///
/// let text = codec.encode(&tags);
/// assert_eq!(text, r#"["red","green"]"#);
/// assert_eq!(codec.decode(&text), Some(tags.clone()));
///
/// let pattern = Regex::new("^gre").unwrap();
/// assert!(codec.any_element(&tags, &pattern));
/// ```
pub trait ArrayCodec: Send + Sync {
    /// Encodes array elements to a stable textual form.
    fn encode(&self, items: &[Value]) -> String;

    /// Decodes text produced by [`encode`](Self::encode).
    ///
    /// Returns `None` if the text is not an encoded array.
    fn decode(&self, text: &str) -> Option<Vec<Value>>;

    /// Returns `true` if any element matches the pattern.
    ///
    /// Nested arrays are searched recursively; scalar elements are tested
    /// through their text form.
    fn any_element(&self, items: &[Value], pattern: &Regex) -> bool {
        items.iter().any(|item| match item {
            Value::Array(inner) => self.any_element(inner, pattern),
            scalar => pattern.is_match(&scalar.to_text()),
        })
    }
}

/// Default codec using JSON as the textual form.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArrayCodec;

impl ArrayCodec for JsonArrayCodec {
    fn encode(&self, items: &[Value]) -> String {
        serde_json::Value::Array(items.iter().map(Value::to_json).collect()).to_string()
    }

    fn decode(&self, text: &str) -> Option<Vec<Value>> {
        match serde_json::from_str::<serde_json::Value>(text).ok()? {
            serde_json::Value::Array(items) => Some(items.into_iter().map(Value::from_json).collect()),
            _ => None,
        }
    }
}
