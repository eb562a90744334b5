//! The uniform response envelope and its formatter.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ResponseConfig;
use crate::status::{classify, resolve_message, Category};

/// `{ status, code, message, data, errors }` -- the body of every response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status: Category,
    /// Business code, or the numeric status rendered as a string.
    pub code: String,
    pub message: String,
    pub data: Value,
    pub errors: Value,
}

/// Build an envelope.
///
/// 1. classify `status` into a [`Category`];
/// 2. resolve the message, falling back to the configured category default,
///    and split off a business code after `|`;
/// 3. `code` is the business code when one was found, else `status`;
/// 4. `data` and `errors` are normalized with [`object_shaped`].
pub fn format(
    data: Value,
    message: &str,
    status: u16,
    errors: Option<Value>,
    config: &ResponseConfig,
) -> Envelope {
    let category = classify(status);
    let resolved = resolve_message(message, category, &config.code);

    Envelope {
        status: category,
        code: resolved
            .business_code
            .unwrap_or_else(|| status.to_string()),
        message: resolved.message,
        data: object_shaped(data),
        errors: object_shaped(errors.unwrap_or(Value::Null)),
    }
}

/// Whether a value counts as empty: `null`, `false`, `0`, `""`, `"0"`, or
/// an empty list or object.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Coerce a value into a list or object for the wire.
///
/// Blank values become `{}`; any other scalar is wrapped in a one-element
/// list; lists and objects pass through.
pub fn object_shaped(value: Value) -> Value {
    if is_blank(&value) {
        return Value::Object(Map::new());
    }
    match value {
        Value::Array(_) | Value::Object(_) => value,
        scalar => Value::Array(vec![scalar]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ResponseConfig {
        ResponseConfig::default()
    }

    #[test]
    fn success_uses_default_business_code() {
        let envelope = format(json!({"id": 1}), "", 200, None, &config());
        assert_eq!(envelope.status, Category::Success);
        assert_eq!(envelope.code, "10000");
        assert_eq!(envelope.message, "Success");
        assert_eq!(envelope.data, json!({"id": 1}));
        assert_eq!(envelope.errors, json!({}));
    }

    #[test]
    fn caller_message_with_pipe_overrides_code() {
        let envelope = format(Value::Null, "Custom|777", 400, None, &config());
        assert_eq!(envelope.status, Category::Fail);
        assert_eq!(envelope.code, "777");
        assert_eq!(envelope.message, "Custom");
    }

    #[test]
    fn caller_message_without_pipe_keeps_numeric_status() {
        let envelope = format(Value::Null, "Missing", 404, None, &config());
        assert_eq!(envelope.code, "404");
        assert_eq!(envelope.message, "Missing");
    }

    #[test]
    fn configured_default_without_pipe_keeps_numeric_status() {
        let mut config = config();
        config.code.fail = "Request failed".into();

        let envelope = format(Value::Null, "", 404, None, &config);
        assert_eq!(envelope.code, "404");
        assert_eq!(envelope.message, "Request failed");
    }

    #[test]
    fn blank_data_and_errors_serialize_as_objects() {
        for blank in [json!(null), json!(false), json!(0), json!(""), json!("0"), json!([]), json!({})] {
            let envelope = format(blank.clone(), "m", 500, Some(blank), &config());
            let wire = serde_json::to_value(&envelope).unwrap();
            assert_eq!(wire["data"], json!({}));
            assert_eq!(wire["errors"], json!({}));
        }
    }

    #[test]
    fn scalar_data_is_wrapped_in_a_list() {
        let envelope = format(json!("hello"), "", 200, None, &config());
        assert_eq!(envelope.data, json!(["hello"]));
    }

    #[test]
    fn wire_field_order_is_stable() {
        let envelope = format(json!({"b": 1, "a": 2}), "ok", 201, None, &config());
        let first = serde_json::to_string(&envelope).unwrap();
        let second = serde_json::to_string(&format(json!({"b": 1, "a": 2}), "ok", 201, None, &config())).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first,
            r#"{"status":"success","code":"201","message":"ok","data":{"b":1,"a":2},"errors":{}}"#
        );
    }

    #[test]
    fn server_error_uses_error_default() {
        let envelope = format(Value::Null, "", 503, Some(json!({"field": "bad"})), &config());
        assert_eq!(envelope.status, Category::Error);
        assert_eq!(envelope.code, "30000");
        assert_eq!(envelope.message, "Error");
        assert_eq!(envelope.errors, json!({"field": "bad"}));
    }
}
