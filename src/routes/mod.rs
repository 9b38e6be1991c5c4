//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//!
//! ```text
//! GET  /health                               - 서버 상태 확인
//!
//! POST /api/users                            - 사용자 생성
//! GET  /api/users/wallet/:walletAddress      - 지갑 주소로 프로필 조회
//! GET  /api/users/username/:username         - 사용자명으로 프로필 조회
//!
//! POST /api/tips                             - 팁 기록
//! GET  /api/tips/user/:walletAddress         - 보낸/받은 팁
//! GET  /api/tips/received/:walletAddress     - 받은 팁
//! ```

pub mod extract;
pub mod health;
pub mod tips;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// 라우터 생성 (미들웨어 + 상태 주입 포함)
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    let users = Router::new()
        .route("/", post(users::create_user))
        .route("/wallet/:wallet_address", get(users::get_user_by_wallet))
        .route("/username/:username", get(users::get_user_by_username));

    let tips = Router::new()
        .route("/", post(tips::create_tip))
        .route("/user/:wallet_address", get(tips::get_tips_by_user))
        .route("/received/:wallet_address", get(tips::get_tips_by_recipient));

    Router::new()
        // Health check
        .route("/health", get(health::health_check))

        .nest("/api/users", users)
        .nest("/api/tips", tips)

        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}

/// CORS 설정
///
/// 프로덕션: ALLOWED_ORIGINS만, GET/POST + Content-Type
/// 개발: localhost 개발 서버, 모든 메서드/헤더
fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if state.config.is_production() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
