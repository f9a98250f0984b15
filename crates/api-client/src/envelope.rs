//! Response envelope unwrapping
//!
//! The backend answers in one of two shapes:
//!
//! - coded: `{ "code": 200, "data": ..., "msg": "..." }`
//! - bare: the payload itself, e.g. `{ "token": "...", "user": {...} }`
//!
//! A coded envelope succeeds only with `code == 200`. A bare object fails when
//! it carries a truthy `error`, or a truthy `message` without `token`/`user`.

use crate::error::{ApiError, ApiResult, DEFAULT_FAILURE_MESSAGE};
use serde_json::{Map, Value};

/// Envelope code that marks success
pub const SUCCESS_CODE: i64 = 200;

/// The two wire shapes a successful HTTP response can take
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// `{code, data, msg?}`
    Coded {
        /// Business status code
        code: i64,
        /// Payload, `null` when absent
        data: Value,
        /// `msg`, falling back to `message`
        message: Option<String>,
    },
    /// Anything without a `code` field
    Bare(Value),
}

impl ResponseEnvelope {
    /// Classify a response body
    #[must_use]
    pub fn from_value(body: Value) -> Self {
        match body {
            Value::Object(mut map) if map.contains_key("code") => {
                let code = map.get("code").and_then(code_of).unwrap_or_default();
                let message = text_field(&map, "msg").or_else(|| text_field(&map, "message"));
                let data = map.remove("data").unwrap_or(Value::Null);
                Self::Coded {
                    code,
                    data,
                    message,
                }
            }
            other => Self::Bare(other),
        }
    }

    /// Produce the success value or the business error
    pub fn unwrap_payload(self) -> ApiResult<Value> {
        match self {
            Self::Coded { code, data, .. } if code == SUCCESS_CODE => Ok(data),
            Self::Coded { code, message, .. } => Err(ApiError::business(
                Some(code),
                message.unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            )),
            Self::Bare(payload) => match bare_failure(&payload) {
                Some(message) => Err(ApiError::business(None, message)),
                None => Ok(payload),
            },
        }
    }
}

/// Unwrap a response body in one step
pub fn unwrap_envelope(body: Value) -> ApiResult<Value> {
    ResponseEnvelope::from_value(body).unwrap_payload()
}

/// Numeric codes only; `200.0` counts as 200, a string `"200"` does not
#[allow(clippy::cast_possible_truncation)]
fn code_of(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn bare_failure(payload: &Value) -> Option<String> {
    let Value::Object(map) = payload else {
        return None;
    };

    let error = map.get("error").filter(|v| is_truthy(v));
    let message = map.get("message").filter(|v| is_truthy(v));
    let carries_session = ["token", "user"]
        .iter()
        .any(|key| map.get(*key).is_some_and(is_truthy));

    match (error, message) {
        (Some(error), _) => Some(display_text(error)),
        (None, Some(message)) if !carries_session => Some(display_text(message)),
        _ => None,
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).filter(|v| is_truthy(v)).map(display_text)
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loose truthiness as the backend means it: empty, zero, false and null are unset
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coded_success_yields_data_exactly() {
        let data = json!({"id": 7, "tags": ["a", "b"], "nested": {"x": null}});
        let value = unwrap_envelope(json!({"code": 200, "data": data.clone(), "msg": "ok"})).unwrap();
        assert_eq!(value, data);
    }

    #[test]
    fn test_coded_success_without_data_is_null() {
        assert_eq!(unwrap_envelope(json!({"code": 200})).unwrap(), Value::Null);
    }

    #[test]
    fn test_coded_failure_uses_msg() {
        let err = unwrap_envelope(json!({"code": 500, "msg": "M"})).unwrap_err();
        assert_eq!(err.to_string(), "M");
        assert!(matches!(err, ApiError::Business { code: Some(500), .. }));
    }

    #[test]
    fn test_coded_failure_message_fallbacks() {
        let err = unwrap_envelope(json!({"code": 400, "message": "bad input"})).unwrap_err();
        assert_eq!(err.message(), "bad input");

        let err = unwrap_envelope(json!({"code": 400, "msg": ""})).unwrap_err();
        assert_eq!(err.message(), DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_code_must_be_numeric() {
        assert_eq!(
            unwrap_envelope(json!({"code": 200.0, "data": 1})).unwrap(),
            json!(1)
        );

        let err = unwrap_envelope(json!({"code": "200", "data": 1})).unwrap_err();
        assert_eq!(err.message(), DEFAULT_FAILURE_MESSAGE);

        let err = unwrap_envelope(json!({"code": 200.5, "data": 1})).unwrap_err();
        assert_eq!(err.message(), DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_bare_session_payload_passes_through() {
        let body = json!({"token": "t", "user": {}});
        assert_eq!(unwrap_envelope(body.clone()).unwrap(), body);
    }

    #[test]
    fn test_bare_message_with_token_is_success() {
        let body = json!({"token": "t", "message": "welcome back"});
        assert_eq!(unwrap_envelope(body.clone()).unwrap(), body);
    }

    #[test]
    fn test_bare_error_fields_reject() {
        let err = unwrap_envelope(json!({"error": "invalid credentials"})).unwrap_err();
        assert_eq!(err.message(), "invalid credentials");

        let err = unwrap_envelope(json!({"message": "access_token missing"})).unwrap_err();
        assert_eq!(err.message(), "access_token missing");

        // error wins even when a token is present
        let err = unwrap_envelope(json!({"error": "locked", "token": "t"})).unwrap_err();
        assert_eq!(err.message(), "locked");
    }

    #[test]
    fn test_bare_non_objects_pass_through() {
        assert_eq!(unwrap_envelope(json!([1, 2])).unwrap(), json!([1, 2]));
        assert_eq!(unwrap_envelope(json!("ok")).unwrap(), json!("ok"));
    }
}
