//! Database Models
//!
//! Users and off-chain tip records. Tip addresses are plain strings with no
//! foreign key to `users`; the owning user is resolved at read time.
//!
//! JSON 필드는 프론트엔드와 맞추기 위해 camelCase 사용

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 사용자 프로필
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    /// 고유 사용자명
    pub username: String,

    /// 지갑 주소 (lowercase, 고유)
    pub wallet_address: String,

    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// 팁 기록 (온체인 전송 확인 후 저장)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: Uuid,

    /// 보낸 주소 (lowercase)
    pub from_address: String,

    /// 받은 주소 (lowercase)
    pub to_address: String,

    /// ETH 단위 10진 문자열 (예: "0.01")
    pub amount: String,

    pub message: Option<String>,

    /// 트랜잭션 해시 (고유)
    pub tx_hash: String,

    pub created_at: DateTime<Utc>,
}

/// 사용자 생성 입력 (검증 완료된 값)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub wallet_address: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// 팁 생성 입력 (검증 완료된 값)
#[derive(Debug, Clone)]
pub struct NewTip {
    pub from_address: String,
    pub to_address: String,
    pub amount: String,
    pub message: Option<String>,
    pub tx_hash: String,
}

/// LIMIT/OFFSET 페이지
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn first(limit: i64) -> Self {
        Self { limit, offset: 0 }
    }
}
