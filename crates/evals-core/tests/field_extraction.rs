//! Dotted-path extraction over JSON values and typed chat records.

use evals_core::{
    extract_field, extract_value, extract_values, ChatMessage, EvalError, FieldExtractionConfig,
    Traverse,
};
use serde_json::{json, Value};

fn extraction(ground_truth_field: &str, prediction_field: &str) -> FieldExtractionConfig {
    FieldExtractionConfig {
        ground_truth_field: ground_truth_field.to_string(),
        prediction_field: prediction_field.to_string(),
    }
}

#[test]
fn nested_mapping_lookup() {
    let value = json!({"a": {"b": 5}});
    assert_eq!(extract_value(&value, "a.b").unwrap(), Some(json!(5)));
}

#[test]
fn index_then_key() {
    let value = json!([{"value": 1}, {"value": 2}]);
    assert_eq!(extract_value(&value, "1.value").unwrap(), Some(json!(2)));
    assert_eq!(extract_value(&value, "-2.value").unwrap(), Some(json!(1)));
}

#[test]
fn missing_key_is_none() {
    let value = json!({"a": {"b": 5}});
    assert!(extract_field(&value, "a.c").unwrap().is_none());
    assert!(extract_field(&value, "x.y.z").unwrap().is_none());
}

#[test]
fn null_stops_traversal() {
    let value = json!({"a": null});
    assert!(extract_field(&value, "a").unwrap().is_none());
    assert!(extract_field(&value, "a.b.c").unwrap().is_none());
}

#[test]
fn index_out_of_range_is_an_error() {
    let value = json!({"items": [1, 2]});
    let err = extract_field(&value, "items.5").err().unwrap();
    assert!(matches!(
        err,
        EvalError::IndexOutOfRange { index: 5, len: 2, ref path } if path == "items.5"
    ));
    assert!(extract_field(&value, "items.-3").is_err());
}

#[test]
fn non_integer_segment_on_sequence_is_none() {
    let value = json!([1, 2, 3]);
    assert!(extract_field(&value, "first").unwrap().is_none());
}

#[test]
fn scalar_has_no_attributes() {
    let value = json!({"a": "text"});
    assert!(extract_field(&value, "a.len").unwrap().is_none());
}

#[test]
fn record_fields_and_sequences_of_records() {
    let transcript = vec![
        ChatMessage::new("user", "what is 2+2?"),
        ChatMessage::assistant(json!({"answer": 4})),
    ];
    assert_eq!(
        extract_value(&transcript, "0.role").unwrap(),
        Some(json!("user"))
    );
    assert_eq!(
        extract_value(&transcript, "-1.content.answer").unwrap(),
        Some(json!(4))
    );
    // Unset optional field behaves like a missing one.
    assert!(extract_field(&transcript, "-1.name").unwrap().is_none());
    assert!(extract_field(&transcript, "-1.tool_calls").unwrap().is_none());
}

#[test]
fn extract_values_json_candidates() {
    let config = extraction("value", "-1.content");
    let ground_truth = json!({"value": 10});
    let predictions = json!([{"content": "a"}, {"content": "b"}]);

    let (y_true, y_pred) = extract_values(&config, &ground_truth, &predictions).unwrap();
    assert_eq!(y_true, json!(10));
    assert_eq!(y_pred, json!("b"));
}

#[test]
fn extract_values_fast_path_ignores_prediction_field() {
    let config = extraction("label", "does.not.exist");
    let ground_truth = json!({"label": "yes"});
    let predictions = vec![
        ChatMessage::new("user", "is it?"),
        ChatMessage::assistant("yes"),
    ];

    let (y_true, y_pred) = extract_values(&config, &ground_truth, &predictions).unwrap();
    assert_eq!(y_true, json!("yes"));
    assert_eq!(y_pred, json!("yes"));
}

#[test]
fn extract_values_structured_content_uses_prediction_field() {
    let config = extraction("label", "-1.content.answer");
    let ground_truth = json!({"label": 4});
    let predictions = vec![ChatMessage::assistant(json!({"answer": 4}))];

    let (_, y_pred) = extract_values(&config, &ground_truth, &predictions).unwrap();
    assert_eq!(y_pred, json!(4));
}

#[test]
fn extract_values_missing_ground_truth() {
    let config = extraction("value", "-1.content");
    let err = extract_values(&config, &json!({"other": 1}), &json!([{"content": "a"}]))
        .unwrap_err();
    assert!(matches!(err, EvalError::FieldExtraction { ref path } if path == "value"));
    assert_eq!(err.to_string(), "failed to extract field at path: 'value'");
}

#[test]
fn extract_values_missing_prediction() {
    let config = extraction("value", "-1.answer");
    let err = extract_values(&config, &json!({"value": 1}), &json!([{"content": "a"}]))
        .unwrap_err();
    assert!(matches!(err, EvalError::FieldExtraction { ref path } if path == "-1.answer"));
}

#[test]
fn extract_values_empty_candidates() {
    let config = extraction("value", "-1.content");
    let err = extract_values(&config, &json!({"value": 1}), &json!([])).unwrap_err();
    assert!(matches!(err, EvalError::IndexOutOfRange { len: 0, .. }));
}

#[test]
fn extract_values_rejects_non_sequence_candidates() {
    let config = extraction("value", "content");
    let err = extract_values(&config, &json!({"value": 1}), &json!({"content": "a"}))
        .unwrap_err();
    assert!(matches!(err, EvalError::NotASequence(ref kind) if kind == "mapping"));
}

#[test]
fn to_value_lowers_records() {
    let message = ChatMessage::assistant("ok");
    let lowered: Value = message.to_value();
    assert_eq!(lowered, json!({"role": "assistant", "content": "ok"}));
}
