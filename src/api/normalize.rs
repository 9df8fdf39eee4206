//! Response shaping into the uniform result contract.
//!
//! The backend answers each endpoint with a slightly different body shape.
//! One mapping function per operation turns a parsed exchange into a result:
//!
//! | Operation      | `ok` from          | `status` | `message`             | `data`                   |
//! |----------------|--------------------|----------|-----------------------|--------------------------|
//! | register, me   | transport status   | -        | server fields kept flat alongside `ok`           |
//! | login          | transport status   | yes      | `body.message` or ""  | `body.data` or full body |
//! | list reports   | `!body.error`      | no       | `body.message`        | `body.listStory` or `[]` |
//! | store report   | `!body.error`      | no       | `body.message`        | full body                |
//!
//! The login, list and store mappers read fields off the body, so a `null`
//! body is a failure for them. Push operations are not normalized; their
//! parsed body is returned as-is.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use super::error::ApiError;
use super::operation::Operation;

/// Uniform result returned by the login and story operations.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NormalizedResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Value,
}

impl NormalizedResult {
    /// Result for a captured failure: `ok: false`, the error text verbatim,
    /// and the operation's empty `data`.
    pub fn failure(op: Operation, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: None,
            message: Some(message.into()),
            data: op.empty_data(),
        }
    }
}

/// Server body with the transport `ok` flag laid over it.
///
/// Serializes as the server's own fields plus `ok`. A server-sent `ok` field
/// is replaced by the transport flag.
#[derive(Debug, Clone, PartialEq)]
pub struct PassthroughResult {
    pub ok: bool,
    pub fields: Map<String, Value>,
}

impl PassthroughResult {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Server `message`, if it sent one.
    pub fn message(&self) -> Option<String> {
        match self.fields.get("message") {
            None | Some(Value::Null) => None,
            Some(m) => Some(value_text(m)),
        }
    }

    /// The merged object, as a single JSON value.
    pub fn to_value(&self) -> Value {
        let mut merged = self.fields.clone();
        merged.insert("ok".to_string(), Value::Bool(self.ok));
        Value::Object(merged)
    }
}

impl Serialize for PassthroughResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = self.fields.keys().filter(|k| k.as_str() != "ok").count();
        let mut map = serializer.serialize_map(Some(extra + 1))?;
        for (key, value) in self.fields.iter().filter(|(k, _)| k.as_str() != "ok") {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("ok", &self.ok)?;
        map.end()
    }
}

/// A parsed exchange: transport status plus the decoded JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub status: u16,
    pub ok: bool,
    pub body: Value,
}

/// register / getMyUserInfo: keep every server field, take `ok` from transport.
///
/// Objects contribute their fields, arrays and strings their indexed
/// elements. Other bodies (including `null`) contribute nothing.
pub fn passthrough(exchange: Exchange) -> PassthroughResult {
    let fields = match exchange.body {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (i.to_string(), Value::String(c.to_string())))
            .collect(),
        _ => Map::new(),
    };
    PassthroughResult {
        ok: exchange.ok,
        fields,
    }
}

/// login: tolerates both `{data: {...}}` and flat bodies.
pub fn login(exchange: Exchange) -> Result<NormalizedResult, ApiError> {
    let body = readable(exchange.body, "message")?;
    let message = body
        .get("message")
        .filter(|m| is_truthy(m))
        .map(value_text)
        .unwrap_or_default();
    let nested = body.get("data").filter(|d| is_truthy(d)).cloned();
    Ok(NormalizedResult {
        ok: exchange.ok,
        status: Some(exchange.status),
        message: Some(message),
        data: nested.unwrap_or(body),
    })
}

/// getAllReports: `ok` comes from the body's `error` flag, not the status.
pub fn report_list(exchange: Exchange) -> Result<NormalizedResult, ApiError> {
    let body = readable(exchange.body, "error")?;
    let data = match body.get("listStory") {
        Some(list) if is_truthy(list) => list.clone(),
        _ => Value::Array(Vec::new()),
    };
    Ok(NormalizedResult {
        ok: !has_error_flag(&body),
        status: None,
        message: message_of(&body),
        data,
    })
}

/// storeNewReport: `ok` from the body's `error` flag, whole body as data.
pub fn stored_report(exchange: Exchange) -> Result<NormalizedResult, ApiError> {
    let body = readable(exchange.body, "error")?;
    Ok(NormalizedResult {
        ok: !has_error_flag(&body),
        status: None,
        message: message_of(&body),
        data: body,
    })
}

/// A `null` body has no fields to read; anything else is readable (missing
/// fields are simply absent).
fn readable(body: Value, first_field: &str) -> Result<Value, ApiError> {
    if body.is_null() {
        return Err(ApiError::Decode(format!(
            "Cannot read properties of null (reading '{}')",
            first_field
        )));
    }
    Ok(body)
}

/// Whether a body carries a truthy `error` flag.
pub fn has_error_flag(body: &Value) -> bool {
    body.get("error").is_some_and(is_truthy)
}

fn message_of(body: &Value) -> Option<String> {
    match body.get("message") {
        None | Some(Value::Null) => None,
        Some(m) => Some(value_text(m)),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JavaScript-style truthiness, matching how the backend's flags are read.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
