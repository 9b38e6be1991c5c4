//! Crypto Tips API Library
//!
//! # Overview
//!
//! 사용자/팁을 저장하는 REST 백엔드와, 지갑 provider로 ETH 팁을 보내고
//! 백엔드에 기록하는 클라이언트를 함께 제공합니다.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │     Client (wallet)      │        │        API (axum)         │
//! │                          │  HTTP  │                          │
//! │  WalletConnector ─┐      │ ─────► │  Routes ─► TipService    │
//! │  TipsClient ──────┴ tipping        │              │           │
//! └─────────┬────────────────┘        └──────────────┼───────────┘
//!           │ EIP-1193                               │
//!           ▼                                        ▼
//!   ┌────────────────┐                       ┌──────────────┐
//!   │ Wallet / Chain │                       │  PostgreSQL  │
//!   └────────────────┘                       └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 처리
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: 비즈니스 로직 (TipService, tipping 흐름)
//! - `db`: 데이터베이스 연동 (Repository trait)
//! - `types`: 주소/해시/금액 검증 타입
//! - `wallet`: 지갑 연결 상태 머신
//! - `client`: API HTTP 클라이언트
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crypto_tips_api::{config::Config, db::Database, routes, services::TipService, AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let db = Database::connect(&config.database_url, config.db_max_connections).await?;
//!     let state = AppState {
//!         tips: Arc::new(TipService::new(Arc::new(db))),
//!         config: Arc::new(config),
//!     };
//!     let app = routes::router(state);
//!     // ... 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod client;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod db;
pub mod types;
pub mod wallet;

// Re-exports for convenience
pub use client::TipsClient;
pub use config::Config;
pub use error::ApiError;
pub use db::Database;
pub use services::TipService;
pub use wallet::{HttpProvider, WalletConnector};

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub tips: Arc<TipService>,
    pub config: Arc<Config>,
}
