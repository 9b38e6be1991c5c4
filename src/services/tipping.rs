//! Tipping Flow
//!
//! Client-side orchestration: validate the form, send the transfer through
//! the connected wallet, then record the confirmed tip with the API.
//!
//! # Flow
//!
//! ```text
//! validate(to, amount) ──► wallet.send_tip ──► receipt ──► api.create_tip
//!                                                   │
//!                                      기록 실패 시 tx hash와 함께 에러
//! ```

use ethers::types::{Address, H256};
use thiserror::Error;

use crate::{
    client::{ClientError, TipsClient},
    db::Tip,
    routes::tips::CreateTipRequest,
    types::EthAddress,
    wallet::{validate_amount, WalletConnector, WalletError, WalletProvider},
};

#[derive(Debug, Error)]
pub enum TipError {
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// 온체인 전송은 성공했지만 API 기록 실패
    #[error("Tip {tx_hash:?} was sent but could not be recorded: {source}")]
    NotRecorded {
        tx_hash: H256,
        #[source]
        source: ClientError,
    },
}

/// 팁 전송 + 기록
///
/// 금액/주소 검증은 지갑 요청 전에 수행 (잘못된 입력으로 서명 창을 띄우지 않음)
pub async fn send_and_record<P: WalletProvider>(
    wallet: &WalletConnector<P>,
    api: &TipsClient,
    recipient: &str,
    amount: &str,
    message: Option<String>,
) -> Result<Tip, TipError> {
    let from = wallet.address().ok_or(WalletError::NotConnected)?;
    let to: Address = EthAddress::parse(recipient)
        .ok()
        .and_then(|a| a.as_str().parse().ok())
        .ok_or_else(|| WalletError::InvalidInput("Invalid recipient address".to_string()))?;
    let amount = validate_amount(amount)?;

    let tx_hash = wallet.send_tip(to, amount.as_str()).await?;

    let request = CreateTipRequest {
        from_address: Some(format!("{:?}", from)),
        to_address: Some(format!("{:?}", to)),
        amount: Some(amount.as_str().to_string()),
        message: message.filter(|m| !m.trim().is_empty()),
        tx_hash: Some(format!("{:?}", tx_hash)),
    };

    api.create_tip(&request).await.map_err(|source| {
        tracing::error!(?tx_hash, "tip sent on-chain but recording failed: {}", source);
        TipError::NotRecorded { tx_hash, source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    use crate::routes::test_support::spawn_server;
    use crate::wallet::connector_tests::{connector, ScriptedProvider, ACCOUNT, RECIPIENT};

    async fn connected_wallet(provider: ScriptedProvider) -> WalletConnector<ScriptedProvider> {
        let provider = provider
            .on("eth_requestAccounts", Ok(json!([ACCOUNT])))
            .on("eth_chainId", Ok(json!("0xaa36a7")));
        let mut wallet = connector(provider);
        wallet.connect(|_| true).await.unwrap();
        wallet
    }

    #[tokio::test]
    async fn test_send_and_record() {
        let api = TipsClient::new(spawn_server().await);
        let hash = format!("0x{}", "12".repeat(32));
        let wallet = connected_wallet(
            ScriptedProvider::new()
                .on("eth_sendTransaction", Ok(json!(hash)))
                .on("eth_getTransactionReceipt", Ok(json!({ "status": "0x1" }))),
        )
        .await;

        let tip = send_and_record(&wallet, &api, RECIPIENT, "0.005", Some("great post".into()))
            .await
            .unwrap();

        assert_eq!(tip.from_address, ACCOUNT);
        assert_eq!(tip.to_address, RECIPIENT);
        assert_eq!(tip.amount, "0.005");
        assert_eq!(tip.tx_hash, hash);

        let received = api.tips_received(RECIPIENT).await.unwrap();
        assert_eq!(received.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_recipient_never_reaches_wallet() {
        let api = TipsClient::new(spawn_server().await);
        let wallet = connected_wallet(ScriptedProvider::new()).await;

        let err = send_and_record(&wallet, &api, "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb", "0.01", None)
            .await
            .unwrap_err();
        assert!(matches!(err, TipError::Wallet(WalletError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_recording_failure_keeps_tx_hash() {
        // 기록 API 없음: 연결 거부
        let api = TipsClient::new("http://127.0.0.1:1");
        let hash = format!("0x{}", "34".repeat(32));
        let wallet = connected_wallet(
            ScriptedProvider::new()
                .on("eth_sendTransaction", Ok(json!(hash)))
                .on("eth_getTransactionReceipt", Ok(json!({ "status": "0x1" }))),
        )
        .await;

        let err = send_and_record(&wallet, &api, RECIPIENT, "0.01", None)
            .await
            .unwrap_err();
        match err {
            TipError::NotRecorded { tx_hash, .. } => assert_eq!(format!("{:?}", tx_hash), hash),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_requires_connected_wallet() {
        let api = TipsClient::new("http://127.0.0.1:1");
        let wallet = connector(ScriptedProvider::new().on("eth_chainId", Ok(Value::Null)));

        let err = send_and_record(&wallet, &api, RECIPIENT, "0.01", None)
            .await
            .unwrap_err();
        assert!(matches!(err, TipError::Wallet(WalletError::NotConnected)));
    }
}
