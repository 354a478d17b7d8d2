use serde_json::{Map, Value};

/// Canonical field name -> keys the model has been seen to use for it.
/// Keys are tried in order; a case-insensitive pass follows if none match.
pub const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("calories", &["Calories", "calories", "Calorie", "calorie"]),
    ("proteins", &["Proteins", "proteins", "Protein", "protein"]),
    ("fats", &["Fats", "fats", "Fat", "fat"]),
    (
        "carbohydrates",
        &["Carbohydrates", "carbohydrates", "Carbohydrate", "carbohydrate", "Carbs", "carbs"],
    ),
    ("fiber", &["Fiber", "fiber", "Fibre", "fibre"]),
    ("minerals", &["Minerals", "minerals", "Mineral", "mineral"]),
    ("material", &["material", "Material", "materials", "Materials"]),
    ("recyclability", &["recyclability", "Recyclability"]),
    ("alternatives", &["alternatives", "Alternatives", "alternative", "Alternative"]),
    ("tips", &["tips", "Tips", "tip", "Tip"]),
    ("summary", &["summary", "Summary", "message", "Message"]),
    ("message", &["message", "Message"]),
];

fn aliases_for(canonical: &str) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// Resolve a canonical field through the alias table. `null` counts as absent.
pub fn lookup<'a>(obj: &'a Map<String, Value>, canonical: &str) -> Option<&'a Value> {
    let aliases = aliases_for(canonical);

    let exact = aliases
        .iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null());
    if exact.is_some() {
        return exact;
    }

    aliases.iter().find_map(|alias| {
        obj.iter()
            .find(|(key, v)| key.eq_ignore_ascii_case(alias) && !v.is_null())
            .map(|(_, v)| v)
    })
}

/// Lenient number coercion: units and other noise are stripped, anything
/// unparseable becomes 0. The result is always finite.
pub fn number_from(value: Option<&Value>) -> f64 {
    let n = match value {
        None | Some(Value::Null) | Some(Value::Bool(_)) => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_leading_decimal(s),
        Some(other) => parse_leading_decimal(&other.to_string()),
    };

    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn parse_leading_decimal(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    // "1.2.3" reads as 1.2
    let mut seen_dot = false;
    let prefix: String = cleaned
        .chars()
        .take_while(|c| {
            if *c == '.' {
                if seen_dot {
                    return false;
                }
                seen_dot = true;
            }
            true
        })
        .collect();

    prefix.parse::<f64>().unwrap_or(0.0)
}

/// Optional number: absent or null stays `None`, anything else is coerced.
pub fn optional_number(value: Option<&Value>) -> Option<f64> {
    value.map(|v| number_from(Some(v)))
}

/// Scalar text field. Numbers and booleans are stringified, blank strings are absent.
pub fn text_from(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Array-or-scalar field as a list. A scalar becomes a one-element list.
pub fn list_from(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = match value? {
        Value::Array(items) => items.iter().filter_map(|v| text_from(Some(v))).collect(),
        scalar => text_from(Some(scalar)).into_iter().collect(),
    };

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
