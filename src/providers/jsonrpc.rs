/// JSON-RPC 2.0 wire types for talking to an Ethereum node
/// Separate concern for protocol handling
use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const JSONRPC_VERSION: &str = "2.0";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";

/// JSON-RPC 2.0 request structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

/// JSON-RPC 2.0 response structure
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl JsonRpcRequest {
    pub fn new(method: &str, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id,
        }
    }

    /// `eth_getBalance` at the latest block
    pub fn get_balance(address: &str) -> Self {
        Self::new(
            ETH_GET_BALANCE,
            Value::Array(vec![
                Value::String(address.to_string()),
                Value::String("latest".to_string()),
            ]),
            1,
        )
    }
}

impl JsonRpcResponse {
    /// Parse a raw body into a response envelope
    pub fn from_slice(body: &[u8]) -> Result<Self, FetchError> {
        serde_json::from_slice(body)
            .map_err(|e| FetchError::decode(format!("Invalid JSON-RPC response: {}", e)))
    }

    /// The `result` member as a string, or a decode error describing why not
    pub fn into_string_result(self) -> Result<String, FetchError> {
        if let Some(error) = self.error {
            return Err(FetchError::decode(format!("Node returned error: {}", error)));
        }
        match self.result {
            Some(Value::String(result)) => Ok(result),
            Some(other) => Err(FetchError::decode(format!(
                "Expected string result, got {}",
                other
            ))),
            None => Err(FetchError::decode("Response has no result")),
        }
    }
}
