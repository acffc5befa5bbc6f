//! Gating conditions (`enabled` flags) in configuration trees

use chartmirror_core::values::Tree;
use serde_json::Value as JsonValue;

use crate::error::ConditionError;

/// Evaluate a dotted condition path against a configuration tree
///
/// Each segment is looked up at the current position:
/// - a string sets the result to `value == "true"` without descending
/// - a boolean sets the result directly
/// - a mapping is descended into
/// - a missing key or `null` leaves the result and the position unchanged
///
/// The last boolean determined wins; a path that never reaches a string or
/// boolean evaluates to `false`. Any other shape (number, sequence) is a
/// [`ConditionError::TypeMismatch`].
pub fn evaluate(condition: &str, values: &Tree) -> Result<bool, ConditionError> {
    let mut position = values;
    let mut enabled = false;

    for segment in condition.split('.') {
        match position.get(segment) {
            Some(JsonValue::String(s)) => enabled = s == "true",
            Some(JsonValue::Bool(b)) => enabled = *b,
            Some(JsonValue::Object(nested)) => position = nested,
            Some(JsonValue::Null) | None => {}
            Some(other) => {
                return Err(ConditionError::TypeMismatch {
                    condition: condition.to_string(),
                    segment: segment.to_string(),
                    found: value_kind(other),
                });
            }
        }
    }

    Ok(enabled)
}

/// Like [`evaluate`], treating a malformed path as "condition not met"
pub fn condition_met(condition: &str, values: &Tree) -> bool {
    evaluate(condition, values).unwrap_or_else(|e| {
        tracing::debug!("Treating condition as disabled: {}", e);
        false
    })
}

fn value_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a sequence",
        JsonValue::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: JsonValue) -> Tree {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_nested_boolean_true() {
        let values = tree(json!({ "a": { "b": true } }));
        assert_eq!(evaluate("a.b", &values), Ok(true));
    }

    #[test]
    fn test_nested_string_false() {
        let values = tree(json!({ "a": { "b": "false" } }));
        assert_eq!(evaluate("a.b", &values), Ok(false));
    }

    #[test]
    fn test_string_true_is_terminal_test() {
        let values = tree(json!({ "metrics": "true" }));
        assert_eq!(evaluate("metrics", &values), Ok(true));

        // Any string other than the literal "true" is false
        let values = tree(json!({ "metrics": "yes" }));
        assert_eq!(evaluate("metrics", &values), Ok(false));
    }

    #[test]
    fn test_string_does_not_descend() {
        // "a" is a string, so "b" is looked up at the root again
        let values = tree(json!({ "a": "true", "b": false }));
        assert_eq!(evaluate("a.b", &values), Ok(false));
    }

    #[test]
    fn test_missing_path_is_false() {
        let values = tree(json!({ "other": true }));
        assert_eq!(evaluate("metrics.enabled", &values), Ok(false));
        assert_eq!(evaluate("enabled", &Tree::new()), Ok(false));
    }

    #[test]
    fn test_path_ending_on_mapping_is_false() {
        let values = tree(json!({ "a": { "b": { "c": true } } }));
        assert_eq!(evaluate("a.b", &values), Ok(false));
    }

    #[test]
    fn test_type_mismatch() {
        let values = tree(json!({ "a": 3 }));
        let err = evaluate("a.b", &values).unwrap_err();
        assert_eq!(
            err,
            ConditionError::TypeMismatch {
                condition: "a.b".to_string(),
                segment: "a".to_string(),
                found: "a number",
            }
        );
        assert!(!condition_met("a.b", &values));
    }
}
