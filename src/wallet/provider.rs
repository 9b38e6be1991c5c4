//! EIP-1193 provider abstraction.

use async_trait::async_trait;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

/// EIP-1193 provider 에러
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderError {
    /// 사용자가 요청을 거절함
    pub const USER_REJECTED: i64 = 4001;
    /// provider가 연결되지 않음
    pub const DISCONNECTED: i64 = 4900;
    /// 지갑에 등록되지 않은 체인
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_user_rejected(&self) -> bool {
        self.code == Self::USER_REJECTED
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == Self::UNRECOGNIZED_CHAIN
    }
}

/// provider가 push하는 이벤트 (`accountsChanged`, `chainChanged`)
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    /// hex chain id
    ChainChanged(String),
}

/// 지갑 provider (브라우저 확장 또는 JSON-RPC 노드)
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// 이벤트 구독. 이벤트를 내보내지 않는 provider는 None
    fn events(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        None
    }
}
