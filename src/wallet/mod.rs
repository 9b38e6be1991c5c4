//! Wallet Client Module
//!
//! Connects to an EIP-1193 wallet provider, keeps the user on the expected
//! chain and submits native-currency tips. Signing and broadcast stay inside
//! the provider; this module only builds requests and mirrors the provider's
//! last reported account and chain.
//!
//! ```text
//! connect()
//!   eth_requestAccounts ──► eth_chainId ──► expected? ──yes──► Connected
//!                                              │no
//!                                        prompt(switch?)
//!                                              │yes
//!                          wallet_switchEthereumChain ──4902──► wallet_addEthereumChain
//!                                              │
//!                                     settle delay, eth_chainId ──► Connected
//! ```

mod connector;
mod http;
mod provider;

pub use connector::{EventOutcome, WalletConnector, WalletState};
pub use http::HttpProvider;
pub use provider::{ProviderError, ProviderEvent, WalletProvider};
#[cfg(test)]
pub(crate) use connector::tests as connector_tests;

use ethers::types::{Address, H256};
use ethers::utils::to_checksum;
use serde_json::{json, Value};
use thiserror::Error;

use crate::types::EtherAmount;

/// 팁 폼 프리셋 금액 (ETH)
pub const PRESET_AMOUNTS: [&str; 4] = ["0.001", "0.005", "0.01", "0.05"];

/// Sepolia 테스트넷 chain id
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// 지갑 연결/전송 에러
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Please install the MetaMask wallet extension")]
    ExtensionMissing,

    #[error("You rejected the connection request")]
    UserRejected,

    #[error("Please switch to {0} to continue")]
    WrongNetwork(String),

    #[error("Unable to add {0}")]
    AddChainFailed(String),

    #[error("No accounts found")]
    NoAccounts,

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Transaction {0:?} failed")]
    TransactionFailed(H256),

    #[error("Timed out waiting for receipt of {0:?}")]
    ReceiptTimeout(H256),

    #[error("Unexpected provider response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// 대상 네트워크 설정 (wallet_addEthereumChain 파라미터 포함)
#[derive(Debug, Clone, PartialEq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub decimals: u8,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl ChainConfig {
    pub fn sepolia() -> Self {
        Self {
            chain_id: SEPOLIA_CHAIN_ID,
            chain_name: "Sepolia Testnet".to_string(),
            currency_name: "Sepolia ETH".to_string(),
            currency_symbol: "ETH".to_string(),
            decimals: 18,
            rpc_urls: vec!["https://rpc.sepolia.org".to_string()],
            block_explorer_urls: vec!["https://sepolia.etherscan.io".to_string()],
        }
    }

    /// `0xaa36a7` 형태
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    pub(crate) fn add_chain_params(&self) -> Value {
        json!([{
            "chainId": self.chain_id_hex(),
            "chainName": self.chain_name,
            "nativeCurrency": {
                "name": self.currency_name,
                "symbol": self.currency_symbol,
                "decimals": self.decimals,
            },
            "rpcUrls": self.rpc_urls,
            "blockExplorerUrls": self.block_explorer_urls,
        }])
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::sepolia()
    }
}

/// `0x742d...bEb0` 형태의 축약 주소 (체크섬 표기)
pub fn format_address(address: &Address) -> String {
    let checksummed = to_checksum(address, None);
    format!("{}...{}", &checksummed[..6], &checksummed[checksummed.len() - 4..])
}

/// 팁 금액 검증
pub fn validate_amount(amount: &str) -> Result<EtherAmount, WalletError> {
    EtherAmount::parse(amount)
        .map_err(|_| WalletError::InvalidInput("Please enter a valid amount".to_string()))
}
