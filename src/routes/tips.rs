//! Tip Endpoints
//!
//! Records confirmed on-chain tips and lists them per address.
//! Addresses are not required to belong to a registered user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    db::{NewTip, Page, Tip},
    error::ApiError,
    routes::{
        extract::{ApiJson, ApiQuery},
        users::non_empty,
    },
    services::{ReceivedTip, TipWithParties},
    types::{EtherAmount, EthAddress, TxHash},
};

/// 페이지 크기 상한
pub const MAX_PAGE_SIZE: u32 = 100;
/// page만 주어졌을 때 페이지 크기
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ============ Request Types ============

/// 팁 기록 요청
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTipRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    /// ETH 단위 10진 문자열
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

/// 목록 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// 페이지 (0부터 시작)
    pub page: Option<u32>,
    /// 페이지 크기 (최대 100). 둘 다 없으면 전체 목록
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn to_page(&self) -> Option<Page> {
        if self.page.is_none() && self.limit.is_none() {
            return None;
        }
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = self.page.unwrap_or(0);
        Some(Page {
            limit: limit as i64,
            offset: page as i64 * limit as i64,
        })
    }
}

// ============ Handlers ============

/// POST /api/tips
pub async fn create_tip(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTipRequest>,
) -> Result<(StatusCode, Json<Tip>), ApiError> {
    let required = (
        non_empty(req.from_address),
        non_empty(req.to_address),
        non_empty(req.amount),
        non_empty(req.tx_hash),
    );
    let (from_address, to_address, amount, tx_hash) = match required {
        (Some(from), Some(to), Some(amount), Some(hash)) => (from, to, amount, hash),
        _ => return Err(ApiError::BadRequest("Missing required fields".to_string())),
    };

    let from_address = EthAddress::parse(&from_address)
        .map_err(|e| ApiError::ValidationError(format!("fromAddress: {}", e)))?;
    let to_address = EthAddress::parse(&to_address)
        .map_err(|e| ApiError::ValidationError(format!("toAddress: {}", e)))?;
    let amount = EtherAmount::parse(&amount)
        .map_err(|e| ApiError::ValidationError(format!("amount: {}", e)))?;
    let tx_hash = TxHash::parse(&tx_hash)
        .map_err(|e| ApiError::ValidationError(format!("txHash: {}", e)))?;

    let tip = state
        .tips
        .record_tip(NewTip {
            from_address: from_address.into_inner(),
            to_address: to_address.into_inner(),
            amount: amount.as_str().to_string(),
            message: non_empty(req.message),
            tx_hash: tx_hash.into_inner(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(tip)))
}

/// GET /api/tips/user/:walletAddress
///
/// 주소가 보냈거나 받은 팁, 최신순
pub async fn get_tips_by_user(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<TipWithParties>>, ApiError> {
    let address = EthAddress::parse(&wallet_address).map_err(ApiError::ValidationError)?;
    let tips = state.tips.tips_for_address(address.as_str(), query.to_page()).await?;
    Ok(Json(tips))
}

/// GET /api/tips/received/:walletAddress
///
/// 주소가 받은 팁, 최신순
pub async fn get_tips_by_recipient(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<ReceivedTip>>, ApiError> {
    let address = EthAddress::parse(&wallet_address).map_err(ApiError::ValidationError)?;
    let tips = state.tips.tips_received_by(address.as_str(), query.to_page()).await?;
    Ok(Json(tips))
}
