use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: None,
            method: method.into(),
            params: Value::Null,
        }
    }

    pub fn tool_call(id: impl Into<Value>, name: &str, arguments: Value) -> Self {
        Self::new(
            id,
            "tools/call",
            json!({"name": name, "arguments": arguments}),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Result body of `tools/call`.
///
/// Tool failures are reported here with `isError` set, never as a JSON-RPC
/// error object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<TextContent>,
    pub structured_content: Value,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

#[derive(Debug, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl ToolCallResult {
    pub fn success(payload: Value) -> Self {
        Self::build(payload, false)
    }

    pub fn failure(payload: Value) -> Self {
        Self::build(payload, true)
    }

    fn build(payload: Value, is_error: bool) -> Self {
        let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
        Self {
            content: vec![TextContent { kind: "text", text }],
            structured_content: payload,
            is_error,
        }
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(&self).unwrap_or_else(|err| {
            tracing::error!(error = %err, "tool result could not be serialized");
            serialization_failure(&err)
        })
    }
}

/// Failure kind reported when a tool result cannot be turned into JSON.
pub const INTERNAL_ERROR_KIND: &str = "internal_error";

fn serialization_failure(err: &serde_json::Error) -> Value {
    let payload = json!({
        "error": format!("tool result could not be serialized: {err}"),
        "status": "failed",
        "kind": INTERNAL_ERROR_KIND
    });
    json!({
        "content": [{"type": "text", "text": payload.to_string()}],
        "structuredContent": payload,
        "isError": true
    })
}
