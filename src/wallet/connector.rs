//! Wallet Connection State Machine
//!
//! # Interview Q&A
//!
//! Q: 지갑 상태는 누가 진실(Source of Truth)인가?
//! A: provider가 마지막으로 보고한 계정/체인
//!    - connect/check_connection: provider에 직접 질의
//!    - accountsChanged: 빈 목록이면 연결 해제, 아니면 첫 계정으로 교체
//!    - chainChanged: 상태를 고치지 않고 reload 요청 (화면 전체를 새로 구성)
//!
//! Q: 에러는 어떻게 분류하는가?
//! A: 세 가지가 사용자에게 의미 있음
//!    1. 확장 프로그램 없음 (ExtensionMissing)
//!    2. 사용자 거절, 코드 4001 (UserRejected)
//!    3. 잘못된 네트워크 (WrongNetwork / AddChainFailed)

use std::time::Duration;

use ethers::types::{Address, TransactionRequest, H256, U256};
use ethers::utils::format_ether;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use super::{validate_amount, ChainConfig, ProviderError, ProviderEvent, WalletError, WalletProvider};

/// UI가 보는 지갑 상태
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub address: Option<Address>,
    pub is_connected: bool,
    pub chain_id: Option<u64>,
}

/// provider 이벤트 처리 결과
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// 모든 계정 연결 해제됨
    Disconnected,
    /// 다른 계정으로 전환됨
    AccountSwitched(Address),
    /// 체인 변경: 화면을 다시 로드해야 함
    ReloadRequired,
}

pub struct WalletConnector<P> {
    /// None = 지갑 확장 없음
    provider: Option<P>,
    chain: ChainConfig,
    state: WalletState,
    last_error: Option<String>,
    /// 체인 전환 후 재조회까지 대기
    settle_delay: Duration,
    receipt_poll_interval: Duration,
    receipt_max_attempts: u32,
}

impl<P: WalletProvider> WalletConnector<P> {
    pub fn new(provider: Option<P>) -> Self {
        Self {
            provider,
            chain: ChainConfig::sepolia(),
            state: WalletState::default(),
            last_error: None,
            settle_delay: Duration::from_secs(1),
            receipt_poll_interval: Duration::from_secs(2),
            receipt_max_attempts: 90,
        }
    }

    pub fn with_chain(mut self, chain: ChainConfig) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_receipt_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.receipt_poll_interval = interval;
        self.receipt_max_attempts = max_attempts.max(1);
        self
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    pub fn address(&self) -> Option<Address> {
        self.state.address
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// 이미 승인된 계정이 있으면 조용히 연결 상태로 복원
    ///
    /// 실패는 로그만 남기고 연결 해제 상태 유지
    pub async fn check_connection(&mut self) -> Option<Address> {
        let provider = self.provider.as_ref()?;

        match read_authorized(provider).await {
            Ok(Some((address, chain_id))) => {
                self.state = WalletState {
                    address: Some(address),
                    is_connected: true,
                    chain_id: Some(chain_id),
                };
                tracing::debug!(?address, chain_id, "restored wallet connection");
                Some(address)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("failed to check wallet connection: {}", e);
                None
            }
        }
    }

    /// 지갑 연결
    ///
    /// 체인이 다르면 `prompt(현재 chain id)`로 전환 여부를 묻고,
    /// 거절하면 `WrongNetwork`
    pub async fn connect<F>(&mut self, prompt: F) -> Result<Address, WalletError>
    where
        F: FnOnce(u64) -> bool + Send,
    {
        self.last_error = None;

        match self.try_connect(prompt).await {
            Ok(state) => {
                let address = state.address.ok_or(WalletError::NoAccounts)?;
                tracing::info!(?address, chain_id = ?state.chain_id, "wallet connected");
                self.state = state;
                Ok(address)
            }
            Err(e) => {
                tracing::error!("failed to connect wallet: {}", e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn try_connect<F>(&self, prompt: F) -> Result<WalletState, WalletError>
    where
        F: FnOnce(u64) -> bool + Send,
    {
        let provider = self.provider.as_ref().ok_or(WalletError::ExtensionMissing)?;

        let accounts = provider
            .request("eth_requestAccounts", json!([]))
            .await
            .map_err(classify)
            .and_then(parse_accounts)?;
        let address = *accounts.first().ok_or(WalletError::NoAccounts)?;

        let mut chain_id = read_chain_id(provider).await?;
        if chain_id != self.chain.chain_id {
            tracing::warn!(chain_id, expected = self.chain.chain_id, "wallet on unexpected chain");
            if !prompt(chain_id) {
                return Err(WalletError::WrongNetwork(self.chain.chain_name.clone()));
            }

            self.switch_chain(provider).await?;
            tokio::time::sleep(self.settle_delay).await;
            chain_id = read_chain_id(provider).await?;
        }

        Ok(WalletState {
            address: Some(address),
            is_connected: true,
            chain_id: Some(chain_id),
        })
    }

    /// 대상 체인으로 전환, 지갑에 없으면(4902) 추가
    async fn switch_chain(&self, provider: &P) -> Result<(), WalletError> {
        let params = json!([{ "chainId": self.chain.chain_id_hex() }]);
        match provider.request("wallet_switchEthereumChain", params).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_unrecognized_chain() => {
                tracing::info!(chain = %self.chain.chain_name, "adding chain to wallet");
                provider
                    .request("wallet_addEthereumChain", self.chain.add_chain_params())
                    .await
                    .map(|_| ())
                    .map_err(|_| WalletError::AddChainFailed(self.chain.chain_name.clone()))
            }
            Err(e) if e.is_user_rejected() => {
                Err(WalletError::WrongNetwork(self.chain.chain_name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 연결 해제 (로컬 상태만 초기화)
    pub fn disconnect(&mut self) {
        self.state = WalletState::default();
        self.last_error = None;
    }

    /// provider 이벤트 구독
    pub fn events(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        self.provider.as_ref().and_then(|p| p.events())
    }

    /// accountsChanged / chainChanged 처리
    pub fn handle_event(&mut self, event: ProviderEvent) -> EventOutcome {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                Some(&address) => {
                    tracing::info!(?address, "wallet account switched");
                    self.state.address = Some(address);
                    EventOutcome::AccountSwitched(address)
                }
                None => {
                    tracing::info!("wallet disconnected all accounts");
                    self.disconnect();
                    EventOutcome::Disconnected
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                tracing::info!(%chain_id, "wallet chain changed");
                EventOutcome::ReloadRequired
            }
        }
    }

    /// 주소 잔액 (ETH 단위 문자열)
    pub async fn balance(&self, address: Address) -> Result<String, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::ExtensionMissing)?;
        let raw = provider
            .request("eth_getBalance", json!([address, "latest"]))
            .await?;
        let wei: U256 = serde_json::from_value(raw)
            .map_err(|e| WalletError::UnexpectedResponse(e.to_string()))?;
        Ok(format_ether(wei))
    }

    /// 연결된 계정에서 `to`로 ETH 전송 후 receipt까지 대기
    ///
    /// 브로드캐스트는 한 번만 요청하고 재전송하지 않음
    pub async fn send_tip(&self, to: Address, amount: &str) -> Result<H256, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::ExtensionMissing)?;
        let from = match (self.state.is_connected, self.state.address) {
            (true, Some(address)) => address,
            _ => return Err(WalletError::NotConnected),
        };
        let amount = validate_amount(amount)?;

        let tx = TransactionRequest::new().from(from).to(to).value(amount.wei());
        let raw = provider
            .request("eth_sendTransaction", json!([tx]))
            .await
            .map_err(classify)?;
        let tx_hash: H256 = serde_json::from_value(raw)
            .map_err(|e| WalletError::UnexpectedResponse(e.to_string()))?;
        tracing::info!(?tx_hash, ?to, amount = amount.as_str(), "tip broadcast");

        self.wait_for_receipt(provider, tx_hash).await?;
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, provider: &P, tx_hash: H256) -> Result<(), WalletError> {
        for attempt in 1..=self.receipt_max_attempts {
            let receipt = provider
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;

            if !receipt.is_null() {
                // status: 0x1 성공, 0x0 revert
                return match receipt.get("status").and_then(Value::as_str) {
                    Some("0x0") => Err(WalletError::TransactionFailed(tx_hash)),
                    _ => {
                        tracing::info!(?tx_hash, attempt, "tip confirmed");
                        Ok(())
                    }
                };
            }

            if attempt < self.receipt_max_attempts {
                tokio::time::sleep(self.receipt_poll_interval).await;
            }
        }

        Err(WalletError::ReceiptTimeout(tx_hash))
    }
}

/// 4001은 사용자 거절로 분류
fn classify(err: ProviderError) -> WalletError {
    if err.is_user_rejected() {
        WalletError::UserRejected
    } else {
        WalletError::Provider(err)
    }
}

fn parse_accounts(raw: Value) -> Result<Vec<Address>, WalletError> {
    serde_json::from_value(raw).map_err(|e| WalletError::UnexpectedResponse(e.to_string()))
}

/// 이미 승인된 첫 계정과 현재 체인
async fn read_authorized<P: WalletProvider>(
    provider: &P,
) -> Result<Option<(Address, u64)>, WalletError> {
    let accounts = parse_accounts(provider.request("eth_accounts", json!([])).await?)?;
    match accounts.first() {
        Some(&address) => Ok(Some((address, read_chain_id(provider).await?))),
        None => Ok(None),
    }
}

/// eth_chainId: hex 문자열 (일부 provider는 숫자)
async fn read_chain_id<P: WalletProvider>(provider: &P) -> Result<u64, WalletError> {
    let raw = provider.request("eth_chainId", json!([])).await?;
    match &raw {
        Value::String(s) => u64::from_str_radix(s.trim_start_matches("0x"), 16)
            .map_err(|_| WalletError::UnexpectedResponse(format!("chain id {}", s))),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| WalletError::UnexpectedResponse(format!("chain id {}", n))),
        other => Err(WalletError::UnexpectedResponse(format!("chain id {}", other))),
    }
}
