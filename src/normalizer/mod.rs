pub mod classify;
pub mod extract;
pub mod fields;

pub use classify::classify;
pub use extract::extract_text;

use serde_json::Value;

use crate::models::ParsedResult;

/// Raw provider reply -> typed result.
pub fn normalize(raw: &Value) -> ParsedResult {
    let text = extract_text(raw);
    classify(text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnparsedReason;
    use serde_json::json;

    #[test]
    fn test_normalize_choices_reply_with_whitespace() {
        let raw = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "\n {\"type\":\"unknown\",\"message\":\"Can't tell\"} \n"
                }
            }]
        });
        assert_eq!(
            normalize(&raw),
            ParsedResult::Unknown { message: "Can't tell".to_string() }
        );
    }

    #[test]
    fn test_normalize_unrecognised_envelope_is_unexpected_shape() {
        // The serialized envelope is valid JSON but has no discriminant.
        let raw = json!({"error": {"code": 429}});
        assert!(matches!(
            normalize(&raw),
            ParsedResult::Unparsed { reason: UnparsedReason::UnexpectedShape, .. }
        ));
    }
}
