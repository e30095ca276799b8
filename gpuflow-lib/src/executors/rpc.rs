//! Ethereum JSON-RPC transport.
//!
//! # Feature Flags
//!
//! This module requires the `http-executor` feature flag for actual HTTP
//! requests. Without it every request returns an `Unimplemented` error,
//! which the clients treat as a backend failure and answer in demo mode.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
#[cfg(feature = "http-executor")]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "http-executor")]
use std::time::Duration;

use crate::{Address, MarketError, Result};

/// JSON-RPC error code nodes use for `execution reverted`.
const EXECUTION_REVERTED: i64 = 3;

/// JSON-RPC 2.0 client for an Ethereum node.
pub struct JsonRpcClient {
    url: String,
    #[cfg_attr(not(feature = "http-executor"), allow(dead_code))]
    timeout_secs: u64,
    #[cfg(feature = "http-executor")]
    client: reqwest::Client,
    #[cfg(feature = "http-executor")]
    next_request_id: AtomicU64,
}

#[derive(Serialize)]
#[cfg_attr(not(feature = "http-executor"), allow(dead_code))]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Transaction fields for `eth_call` / `eth_sendTransaction`.
#[derive(Clone, Debug, Serialize)]
pub struct TransactionRequest {
    /// Sender (required for sends, optional for calls).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Target contract.
    pub to: String,
    /// Hex calldata.
    pub data: String,
}

impl JsonRpcClient {
    /// Create a client for `url`.
    #[cfg(feature = "http-executor")]
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let url = url.into();
        validate_url(&url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MarketError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url,
            timeout_secs,
            client,
            next_request_id: AtomicU64::new(1),
        })
    }

    /// Create a client for `url` (stub when feature disabled).
    #[cfg(not(feature = "http-executor"))]
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let url = url.into();
        validate_url(&url)?;
        Ok(Self { url, timeout_secs })
    }

    /// The node URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a raw JSON-RPC request.
    #[cfg(feature = "http-executor")]
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_request_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        tracing::debug!(method, url = %self.url, "json-rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MarketError::Transport(format!(
                "JSON-RPC request failed ({}): {}",
                status.as_u16(),
                text
            )));
        }

        let parsed: RpcResponse = response.json().await.map_err(|e| {
            MarketError::Serialization(format!("Failed to parse JSON-RPC response: {}", e))
        })?;
        unpack_response(method, parsed)
    }

    /// Send a raw JSON-RPC request (stub when feature disabled).
    #[cfg(not(feature = "http-executor"))]
    async fn request(&self, _method: &str, _params: Value) -> Result<Value> {
        Err(MarketError::Unimplemented(
            "JSON-RPC client not compiled - enable the 'http-executor' feature",
        ))
    }

    /// Map reqwest errors to MarketError.
    #[cfg(feature = "http-executor")]
    fn map_reqwest_error(&self, e: reqwest::Error) -> MarketError {
        if e.is_timeout() {
            MarketError::ConnectionTimeout {
                operation: "JSON-RPC request".to_string(),
                timeout_ms: self.timeout_secs * 1000,
            }
        } else if e.is_connect() {
            MarketError::ConnectionFailed {
                target: self.url.clone(),
                reason: e.to_string(),
            }
        } else {
            MarketError::Transport(format!("JSON-RPC request failed: {}", e))
        }
    }

    /// Call `method` and deserialize its result.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let value = self.request(method, params).await?;
        serde_json::from_value(value).map_err(|e| {
            MarketError::Serialization(format!("Unexpected {} result: {}", method, e))
        })
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64> {
        let hex: String = self.call("eth_chainId", Value::Array(vec![])).await?;
        parse_quantity(&hex)
    }

    /// `eth_accounts`
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.call("eth_accounts", Value::Array(vec![])).await
    }

    /// `eth_call` against the latest block; returns the hex result.
    pub async fn eth_call(&self, tx: &TransactionRequest) -> Result<String> {
        self.call("eth_call", serde_json::json!([tx, "latest"])).await
    }

    /// `eth_sendTransaction`; returns the transaction hash.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String> {
        self.call("eth_sendTransaction", serde_json::json!([tx])).await
    }
}

fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(MarketError::InvalidData {
            field: "rpc_url".to_string(),
            reason: "RPC URL cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Turn a JSON-RPC envelope into its result or a typed error.
fn unpack_response(method: &str, response: RpcResponse) -> Result<Value> {
    if let Some(error) = response.error {
        let lowered = error.message.to_ascii_lowercase();
        if error.code == EXECUTION_REVERTED || lowered.contains("revert") {
            return Err(MarketError::reverted(method, error.message));
        }
        return Err(MarketError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| MarketError::Serialization(format!("{} returned neither result nor error", method)))
}

/// Parse a hex `QUANTITY` such as `"0x13882"`.
pub fn parse_quantity(hex: &str) -> Result<u64> {
    let digits = hex
        .strip_prefix("0x")
        .ok_or_else(|| MarketError::Serialization(format!("quantity {:?} lacks 0x prefix", hex)))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| MarketError::Serialization(format!("invalid quantity {:?}: {}", hex, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x13882").unwrap(), 80002);
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert!(parse_quantity("13882").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_revert_detection() {
        let response = RpcResponse {
            result: None,
            error: Some(RpcErrorObject {
                code: -32000,
                message: "execution reverted: not renter".into(),
            }),
        };
        let err = unpack_response("stopSession", response).unwrap_err();
        assert!(matches!(err, MarketError::Reverted { .. }));

        let response = RpcResponse {
            result: None,
            error: Some(RpcErrorObject {
                code: -32601,
                message: "method not found".into(),
            }),
        };
        let err = unpack_response("eth_call", response).unwrap_err();
        assert!(matches!(err, MarketError::Rpc { code: -32601, .. }));
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(JsonRpcClient::new("", 30).is_err());
    }

    #[cfg(not(feature = "http-executor"))]
    #[tokio::test]
    async fn test_stub_is_unimplemented() {
        let client = JsonRpcClient::new("http://localhost:8545", 30).unwrap();
        let err = client.chain_id().await.unwrap_err();
        assert_eq!(err.code(), crate::MarketErrorCode::Unimplemented);
        assert!(err.is_backend_failure());
    }
}
