//! JSON-RPC over HTTP provider.
//!
//! Talks to a node that signs for its own unlocked accounts (a local dev
//! node, or a signer proxy). There is no push channel, so `events()` is None.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ProviderError, WalletProvider};

/// JSON-RPC 내부 에러 코드
const INTERNAL_ERROR: i64 = -32603;

pub struct HttpProvider {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderError>,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, ProviderError> {
        match (self.error, self.result) {
            (Some(err), _) => Err(err),
            // null result (예: 아직 없는 receipt)도 정상 응답
            (None, result) => Ok(result.unwrap_or(Value::Null)),
        }
    }
}

#[async_trait]
impl WalletProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(id, method, "json-rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::new(ProviderError::DISCONNECTED, e.to_string()))?;

        let decoded: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(INTERNAL_ERROR, format!("invalid json-rpc response: {}", e)))?;

        decoded.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: Value) -> Result<Value, ProviderError> {
        serde_json::from_value::<RpcResponse>(raw).unwrap().into_result()
    }

    #[test]
    fn test_result_response() {
        let value = decode(json!({ "jsonrpc": "2.0", "id": 1, "result": "0xaa36a7" })).unwrap();
        assert_eq!(value, json!("0xaa36a7"));
    }

    #[test]
    fn test_null_result() {
        let value = decode(json!({ "jsonrpc": "2.0", "id": 1, "result": null })).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_error_response() {
        let err = decode(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 4001, "message": "User rejected the request." }
        }))
        .unwrap_err();
        assert!(err.is_user_rejected());
    }

    #[tokio::test]
    async fn test_unreachable_node_is_disconnected() {
        let provider = HttpProvider::new("http://127.0.0.1:1");
        let err = provider.request("eth_chainId", json!([])).await.unwrap_err();
        assert_eq!(err.code, ProviderError::DISCONNECTED);
    }
}
