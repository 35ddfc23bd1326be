//! Dotted-path field extraction over heterogeneous nested values.
//!
//! Every value taking part in a traversal implements [`Traverse`], whose
//! [`Traverse::shape`] classifies it exactly once per step as a sequence, a
//! record (named fields), a mapping (string keys), null, or opaque. The walk in
//! [`extract_field`] dispatches on that shape:
//!
//! - sequence + integer segment (optionally negative): index into it; an index
//!   outside the bounds is an error, not a miss
//! - record: field lookup by name, missing field -> `None`
//! - mapping: key lookup, missing key -> `None`
//! - anything else: [`Traverse::attribute`], missing -> `None`
//!
//! The walk stops as soon as the current value is null.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::config::FieldExtractionConfig;
use crate::domain::error::{EvalError, Result};
use crate::obs;

/// Classification of a value for one traversal step.
pub enum Shape<'a> {
    Null,
    Sequence(&'a dyn Sequence),
    Record(&'a dyn Record),
    Mapping(&'a dyn Mapping),
    Opaque,
}

impl Shape<'_> {
    /// Short name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Sequence(_) => "sequence",
            Shape::Record(_) => "record",
            Shape::Mapping(_) => "mapping",
            Shape::Opaque => "opaque value",
        }
    }
}

/// A value that can be walked by dotted paths.
pub trait Traverse {
    fn shape(&self) -> Shape<'_>;

    /// Lower this value into JSON once extraction has reached it.
    fn to_value(&self) -> Value;

    /// String content exposed directly by chat-style messages.
    fn content(&self) -> Option<&str> {
        None
    }

    /// Named-attribute lookup for values that are neither records nor mappings.
    fn attribute(&self, _name: &str) -> Option<&dyn Traverse> {
        None
    }
}

/// Positional access.
pub trait Sequence {
    fn len(&self) -> usize;

    fn item(&self, index: usize) -> Option<&dyn Traverse>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named-field access on typed records.
pub trait Record {
    fn field(&self, name: &str) -> Option<&dyn Traverse>;
}

/// Key access on string-keyed maps.
pub trait Mapping {
    fn get(&self, key: &str) -> Option<&dyn Traverse>;
}

impl Traverse for Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Value::Null => Shape::Null,
            Value::Array(items) => Shape::Sequence(items),
            Value::Object(map) => Shape::Mapping(map),
            _ => Shape::Opaque,
        }
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl Mapping for Map<String, Value> {
    fn get(&self, key: &str) -> Option<&dyn Traverse> {
        Map::get(self, key).map(|v| v as &dyn Traverse)
    }
}

impl<T: Traverse> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn item(&self, index: usize) -> Option<&dyn Traverse> {
        self.get(index).map(|v| v as &dyn Traverse)
    }
}

impl<T: Traverse> Traverse for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(self)
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Traverse::to_value).collect())
    }
}

impl<T: Traverse> Traverse for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(inner) => inner.shape(),
            None => Shape::Null,
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Traverse::to_value)
    }

    fn content(&self) -> Option<&str> {
        self.as_ref().and_then(Traverse::content)
    }

    fn attribute(&self, name: &str) -> Option<&dyn Traverse> {
        self.as_ref().and_then(|inner| inner.attribute(name))
    }
}

impl Traverse for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

/// A chat-style message, the usual shape of agent predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    /// Plain text, or structured output when the agent returns JSON.
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<Value>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            name: None,
        }
    }

    pub fn assistant(content: impl Into<Value>) -> Self {
        Self::new("assistant", content)
    }
}

impl Record for ChatMessage {
    fn field(&self, name: &str) -> Option<&dyn Traverse> {
        match name {
            "role" => Some(&self.role),
            "content" => Some(&self.content),
            "name" => Some(&self.name),
            _ => None,
        }
    }
}

impl Traverse for ChatMessage {
    fn shape(&self) -> Shape<'_> {
        Shape::Record(self)
    }

    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn content(&self) -> Option<&str> {
        self.content.as_str()
    }
}

/// Parse `-?[0-9]+`. Out-of-range literals saturate so they fail the bounds check.
fn parse_index(segment: &str) -> Option<i64> {
    let digits = segment.strip_prefix('-').unwrap_or(segment);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(segment.parse::<i64>().unwrap_or(if segment.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

fn index_into<'a>(items: &'a dyn Sequence, index: i64, path: &str) -> Result<&'a dyn Traverse> {
    let len = items.len();
    let resolved = if index < 0 { len as i64 + index } else { index };
    let out_of_range = || EvalError::IndexOutOfRange {
        path: path.to_string(),
        index,
        len,
    };
    if resolved < 0 {
        return Err(out_of_range());
    }
    usize::try_from(resolved)
        .ok()
        .and_then(|i| items.item(i))
        .ok_or_else(out_of_range)
}

fn is_null(value: &dyn Traverse) -> bool {
    matches!(value.shape(), Shape::Null)
}

/// Follow the dotted `path` from `value`.
///
/// Returns `Ok(None)` when a key, field or attribute is missing or a null is
/// reached, and `Err(IndexOutOfRange)` when a sequence index is out of bounds.
pub fn extract_field<'a>(value: &'a dyn Traverse, path: &str) -> Result<Option<&'a dyn Traverse>> {
    let mut current = value;
    for segment in path.split('.') {
        let next = match (current.shape(), parse_index(segment)) {
            (Shape::Null, _) => None,
            (Shape::Sequence(items), Some(index)) => Some(index_into(items, index, path)?),
            (Shape::Record(record), _) => record.field(segment),
            (Shape::Mapping(map), _) => map.get(segment),
            _ => current.attribute(segment),
        };
        match next {
            Some(node) if !is_null(node) => current = node,
            _ => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Like [`extract_field`], lowered to JSON.
pub fn extract_value(value: &dyn Traverse, path: &str) -> Result<Option<Value>> {
    Ok(extract_field(value, path)?.map(Traverse::to_value))
}

fn required(value: &dyn Traverse, path: &str) -> Result<Value> {
    extract_value(value, path)?.ok_or_else(|| {
        obs::emit_extraction_failed(path);
        EvalError::FieldExtraction {
            path: path.to_string(),
        }
    })
}

/// Pull `(y_true, y_pred)` out of a ground-truth record and a list of prediction
/// candidates.
///
/// When the last candidate exposes string content directly, that string is the
/// prediction. Otherwise `prediction_field` is resolved against the whole
/// candidate list.
pub fn extract_values(
    extraction: &FieldExtractionConfig,
    ground_truth: &dyn Traverse,
    predictions: &dyn Traverse,
) -> Result<(Value, Value)> {
    let y_true = required(ground_truth, &extraction.ground_truth_field)?;

    let shape = predictions.shape();
    let kind = shape.kind();
    let Shape::Sequence(candidates) = shape else {
        return Err(EvalError::NotASequence(kind.to_string()));
    };
    let last = index_into(candidates, -1, "-1")?;

    if let Some(content) = last.content() {
        return Ok((y_true, Value::String(content.to_string())));
    }

    let y_pred = required(predictions, &extraction.prediction_field)?;
    Ok((y_true, y_pred))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("-1"), Some(-1));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("-"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index("+1"), None);
        assert_eq!(parse_index("1a"), None);
        assert_eq!(parse_index("99999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_shape_kind() {
        assert_eq!(json!(null).shape().kind(), "null");
        assert_eq!(json!([1]).shape().kind(), "sequence");
        assert_eq!(json!({}).shape().kind(), "mapping");
        assert_eq!(json!("x").shape().kind(), "opaque value");
        assert_eq!(ChatMessage::assistant("x").shape().kind(), "record");
    }

    #[test]
    fn test_nested_mapping() {
        let data = json!({"a": {"b": 5}});
        assert_eq!(extract_value(&data, "a.b").expect("extract"), Some(json!(5)));
    }

    #[test]
    fn test_null_stops_traversal() {
        let data = json!({"a": null});
        assert_eq!(extract_value(&data, "a.b").expect("extract"), None);
        assert_eq!(extract_value(&data, "a").expect("extract"), None);
    }

    #[test]
    fn test_falsy_values_are_not_missing() {
        let data = json!({"zero": 0, "flag": false, "empty": ""});
        assert_eq!(extract_value(&data, "zero").expect("extract"), Some(json!(0)));
        assert_eq!(extract_value(&data, "flag").expect("extract"), Some(json!(false)));
        assert_eq!(extract_value(&data, "empty").expect("extract"), Some(json!("")));
    }

    #[test]
    fn test_negative_index() {
        let data = json!([10, 20, 30]);
        assert_eq!(extract_value(&data, "-1").expect("extract"), Some(json!(30)));
        assert_eq!(extract_value(&data, "-3").expect("extract"), Some(json!(10)));
    }

    #[test]
    fn test_non_integer_segment_on_sequence_is_missing() {
        let data = json!([{"value": 1}]);
        assert_eq!(extract_value(&data, "value").expect("extract"), None);
    }

    #[test]
    fn test_integer_segment_on_mapping_is_key_lookup() {
        let data = json!({"1": "one"});
        assert_eq!(extract_value(&data, "1").expect("extract"), Some(json!("one")));
    }

    #[test]
    fn test_scalar_has_no_attributes() {
        let data = json!({"a": "text"});
        assert_eq!(extract_value(&data, "a.len").expect("extract"), None);
    }

    #[test]
    fn test_out_of_range_index_errors() {
        let data = json!([1, 2]);
        let err = extract_value(&data, "2").expect_err("out of range");
        assert!(matches!(
            err,
            EvalError::IndexOutOfRange { index: 2, len: 2, .. }
        ));
        assert!(extract_value(&data, "-3").is_err());
    }

    #[test]
    fn test_record_fields() {
        let messages = vec![
            ChatMessage::assistant("first"),
            ChatMessage::assistant(json!({"value": 15})),
        ];
        assert_eq!(
            extract_value(&messages, "-1.content.value").expect("extract"),
            Some(json!(15))
        );
        assert_eq!(
            extract_value(&messages, "0.role").expect("extract"),
            Some(json!("assistant"))
        );
        assert_eq!(extract_value(&messages, "0.name").expect("extract"), None);
        assert_eq!(extract_value(&messages, "-1.nonexistent").expect("extract"), None);
    }

    #[test]
    fn test_extract_values_requires_sequence_of_predictions() {
        let extraction = FieldExtractionConfig {
            ground_truth_field: "value".to_string(),
            prediction_field: "content".to_string(),
        };
        let err = extract_values(&extraction, &json!({"value": 1}), &json!({"content": "a"}))
            .expect_err("not a sequence");
        assert!(matches!(err, EvalError::NotASequence(_)));
    }

    #[test]
    fn test_extract_values_empty_predictions() {
        let extraction = FieldExtractionConfig {
            ground_truth_field: "value".to_string(),
            prediction_field: "-1.content".to_string(),
        };
        let err = extract_values(&extraction, &json!({"value": 1}), &json!([]))
            .expect_err("empty predictions");
        assert!(matches!(err, EvalError::IndexOutOfRange { len: 0, .. }));
    }
}
