use serde_json::Value;

type ShapeMatcher = fn(&Value) -> Option<String>;

/// Reply shapes in priority order. The first matcher that returns text wins.
pub const SHAPE_MATCHERS: &[(&str, ShapeMatcher)] = &[
    ("empty", match_empty),
    ("plain_string", match_plain_string),
    ("content_list", match_content_list),
    ("text_field", match_text_field),
    ("choices", match_choices),
];

/// Pull the reply text out of whatever envelope the provider returned.
/// Never fails: unknown shapes fall back to their JSON serialization.
pub fn extract_text(raw: &Value) -> String {
    for (name, matcher) in SHAPE_MATCHERS {
        if let Some(text) = matcher(raw) {
            log::debug!("🔎 Reply text extracted via '{}' matcher ({} chars)", name, text.len());
            return text;
        }
    }

    log::warn!("⚠️ Unrecognised reply shape, falling back to serialized JSON");
    serialize_fallback(raw)
}

fn serialize_fallback(raw: &Value) -> String {
    serde_json::to_string(raw).unwrap_or_else(|_| format!("{:?}", raw))
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

pub fn match_empty(raw: &Value) -> Option<String> {
    raw.is_null().then(String::new)
}

pub fn match_plain_string(raw: &Value) -> Option<String> {
    raw.as_str().map(str::to_string)
}

/// `message.content` (or a top-level `content`) given as a list of parts.
pub fn match_content_list(raw: &Value) -> Option<String> {
    let parts = raw
        .pointer("/message/content")
        .and_then(Value::as_array)
        .or_else(|| raw.get("content").and_then(Value::as_array))?;

    first_text_part(parts)
}

fn first_text_part(parts: &[Value]) -> Option<String> {
    parts.iter().find_map(|part| {
        if let Some(s) = part.as_str() {
            return Some(s.to_string());
        }
        if part.get("type").and_then(Value::as_str) == Some("text") {
            if let Some(text) =
                non_empty_str(part.get("text")).or_else(|| non_empty_str(part.get("content")))
            {
                return Some(text);
            }
        }
        non_empty_str(part.get("text")).or_else(|| non_empty_str(part.get("content")))
    })
}

pub fn match_text_field(raw: &Value) -> Option<String> {
    match raw.get("text")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// OpenAI-style `choices[0].message`, either a bare string or `{content}`.
/// Some providers send `content` as a list of parts; anything else that is
/// not a string is serialized on its own, without the envelope.
pub fn match_choices(raw: &Value) -> Option<String> {
    let message = raw.pointer("/choices/0/message")?;
    if let Some(s) = message.as_str() {
        return Some(s.to_string());
    }
    let content = message.get("content")?;
    match content {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => first_text_part(parts).or_else(|| Some(serialize_fallback(content))),
        _ => Some(serialize_fallback(content)),
    }
}
