//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Every request carries the same id; one request is in flight per endpoint.
pub const REQUEST_ID: u64 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
    pub jsonrpc: String,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
            id: REQUEST_ID,
            jsonrpc: JSONRPC_VERSION.to_string(),
        }
    }
}

/// The `error` member of a failed call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A parsed response. `raw` is the full body as received, used for
/// deep-equality checks and diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub result: Option<Value>,
    pub error: Option<ErrorObject>,
    pub raw: Value,
}

impl Response {
    /// The `result` member, treating an explicit `null` as absent.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref().filter(|result| !result.is_null())
    }

    /// Looks up a top-level field of the result object.
    pub fn result_field(&self, field: &str) -> Option<&Value> {
        self.result().and_then(|result| result.get(field))
    }
}

/// Mirrors the truthiness rules used by the fixture expectations: `null`,
/// `false`, zero, and empty strings/arrays/objects count as empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
