//! JSON-RPC 2.0 envelopes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{RpcError, RpcResult};
use crate::codec::render_error_value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Outgoing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Serialize as a text frame
    pub fn to_text(&self) -> RpcResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Incoming response correlated by `id`
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcResponse {
    pub id: u64,
    pub result: Option<Value>,
    /// Present whenever the message carried an `error` key, even `null`
    pub error: Option<Value>,
}

impl JsonRpcResponse {
    /// Parse a text frame
    ///
    /// Returns `None` for anything that is not a JSON object with a
    /// non-negative integer `id`.
    pub fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut object) = value else {
            return None;
        };
        let id = object.get("id")?.as_u64()?;
        let error = object.remove("error");
        let result = object.remove("result");
        Some(Self { id, result, error })
    }

    /// `Ok(result)` (null when absent) unless an error member was present
    pub fn into_outcome(self) -> RpcResult<Value> {
        match self.error {
            Some(error) => Err(RpcError::Remote(render_error_value(&error))),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let req = JsonRpcRequest::new(3, "tools/call", json!({"name": "echo", "arguments": {}}));
        assert_eq!(
            req.to_text().unwrap(),
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{}}}"#
        );
    }

    #[test]
    fn test_parse_result_response() {
        let resp = JsonRpcResponse::parse(r#"{"id":1,"result":{"ok":true}}"#).unwrap();
        assert_eq!(resp.id, 1);
        assert_eq!(resp.into_outcome(), Ok(json!({"ok": true})));
    }

    #[test]
    fn test_parse_error_response() {
        let resp = JsonRpcResponse::parse(r#"{"id":1,"error":"boom"}"#).unwrap();
        assert_eq!(resp.into_outcome(), Err(RpcError::Remote("boom".into())));

        let text = r#"{"jsonrpc":"2.0","id":9,"error":{"code":-32601,"message":"nope"}}"#;
        let resp = JsonRpcResponse::parse(text).unwrap();
        let err = resp.into_outcome().unwrap_err();
        assert_eq!(err.to_string(), r#"{"code":-32601,"message":"nope"}"#);
    }

    #[test]
    fn test_error_key_wins_even_when_null() {
        let resp = JsonRpcResponse::parse(r#"{"id":2,"result":1,"error":null}"#).unwrap();
        assert_eq!(resp.into_outcome(), Err(RpcError::Remote("null".into())));
    }

    #[test]
    fn test_missing_result_is_null() {
        let resp = JsonRpcResponse::parse(r#"{"id":4}"#).unwrap();
        assert_eq!(resp.into_outcome(), Ok(Value::Null));
    }

    #[test]
    fn test_parse_rejects_non_responses() {
        assert!(JsonRpcResponse::parse("not json").is_none());
        assert!(JsonRpcResponse::parse("[1,2]").is_none());
        assert!(JsonRpcResponse::parse(r#"{"method":"notifications/progress"}"#).is_none());
        assert!(JsonRpcResponse::parse(r#"{"id":"1","result":{}}"#).is_none());
        assert!(JsonRpcResponse::parse(r#"{"id":-1,"result":{}}"#).is_none());
        assert!(JsonRpcResponse::parse(r#"{"id":1.5,"result":{}}"#).is_none());
    }
}
