use axum::http::{HeaderMap, HeaderName};
use serde_json::Value;

/// Header carrying the caller's self-declared participant name.
pub const USER_HEADER: HeaderName = HeaderName::from_static("user");

/// The `user` header, if present, valid UTF-8 and not blank.
/// Decoded from the raw bytes: participant names are any UTF-8, not just
/// visible ASCII.
pub fn user_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Check a required non-empty string field, recording a problem in `errors`
/// when it is missing or malformed.
pub fn required_string(
    value: Option<Value>,
    field: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match value {
        None | Some(Value::Null) => {
            errors.push(format!("{field} is required"));
            None
        }
        Some(Value::String(value)) if value.trim().is_empty() => {
            errors.push(format!("{field} must not be empty"));
            None
        }
        Some(Value::String(value)) => Some(value),
        Some(_) => {
            errors.push(format!("{field} must be a string"));
            None
        }
    }
}
