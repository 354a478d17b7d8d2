use serde_json::{Map, Value};

use super::fields::{list_from, lookup, number_from, optional_number, text_from};
use crate::models::{EdibleInfo, NonEdibleInfo, ParsedResult, ReplyKind, UnparsedReason};

pub const DEFAULT_UNKNOWN_MESSAGE: &str = "I couldn't determine the item type.";

/// Strictly decode `text` as JSON and classify it by its `type` discriminant.
pub fn classify(text: &str) -> ParsedResult {
    let parsed: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("⚠️ Reply is not valid JSON ({}), keeping raw text", e);
            return ParsedResult::Unparsed {
                raw_text: text.to_string(),
                reason: UnparsedReason::NotJson,
            };
        }
    };

    // The discriminant key is not aliased, unlike the payload fields.
    let kind = parsed
        .get("type")
        .and_then(Value::as_str)
        .and_then(ReplyKind::from_string);
    if let Some(kind) = kind {
        log::debug!("🏷️ Reply classified as {}", kind);
    }

    match (kind, parsed.as_object()) {
        (Some(ReplyKind::Edible), Some(obj)) => ParsedResult::Edible(edible_from(obj)),
        (Some(ReplyKind::NonEdible), Some(obj)) => ParsedResult::NonEdible(non_edible_from(obj)),
        (Some(ReplyKind::Unknown), Some(obj)) => ParsedResult::Unknown {
            message: text_from(lookup(obj, "message"))
                .unwrap_or_else(|| DEFAULT_UNKNOWN_MESSAGE.to_string()),
        },
        _ => {
            log::warn!("⚠️ Reply JSON has no recognised 'type' discriminant");
            ParsedResult::Unparsed {
                raw_text: serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| text.to_string()),
                reason: UnparsedReason::UnexpectedShape,
            }
        }
    }
}

fn edible_from(obj: &Map<String, Value>) -> EdibleInfo {
    EdibleInfo {
        calories: number_from(lookup(obj, "calories")),
        proteins: number_from(lookup(obj, "proteins")),
        fats: number_from(lookup(obj, "fats")),
        carbohydrates: number_from(lookup(obj, "carbohydrates")),
        fiber: optional_number(lookup(obj, "fiber")),
        minerals: list_from(lookup(obj, "minerals")),
    }
}

fn non_edible_from(obj: &Map<String, Value>) -> NonEdibleInfo {
    NonEdibleInfo {
        material: text_from(lookup(obj, "material")),
        recyclability: text_from(lookup(obj, "recyclability")),
        alternatives: list_from(lookup(obj, "alternatives")),
        tips: list_from(lookup(obj, "tips")),
        summary: text_from(lookup(obj, "summary")),
    }
}
