use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const REDACTED: &str = "[REDACTED]";

const SENSITIVE_KEYS: &[&str] = &[
    "apikey",
    "api_key",
    "authorization",
    "token",
    "access_token",
    "refresh_token",
    "secret",
    "password",
];

static INLINE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(Bearer)\s+[A-Za-z0-9._~+/=-]{10,}").expect("bearer redaction regex"),
            "$1 [REDACTED]",
        ),
        (
            Regex::new(r"\beyJ[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\b")
                .expect("jwt redaction regex"),
            REDACTED,
        ),
    ]
});

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_lowercase();
    SENSITIVE_KEYS.contains(&normalized.as_str())
}

/// Masks bearer tokens and JWTs and caps the result at `max_bytes`, cutting
/// on a char boundary.
pub fn redact_text(text: &str, max_bytes: usize) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in INLINE_PATTERNS.iter() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    if out.len() > max_bytes {
        let mut cut = max_bytes;
        while cut > 0 && !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out.push_str("...");
    }
    out
}

pub fn redact_value(value: &Value, max_bytes: usize) -> Value {
    match value {
        Value::String(text) => Value::String(redact_text(text, max_bytes)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| redact_value(item, max_bytes))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| {
                    if is_sensitive_key(key) && !val.is_null() {
                        (key.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (key.clone(), redact_value(val, max_bytes))
                    }
                })
                .collect(),
        ),
        other => other.clone(),
    }
}
