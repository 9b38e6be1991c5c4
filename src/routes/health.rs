//! Health Check Endpoint
//!
//! # Interview Q&A
//!
//! Q: DB 연결 상태도 체크하는 이유는?
//! A: "깊은 헬스체크"(deep health check) 패턴
//!    - 단순 200 OK: 프로세스 살아있음
//!    - DB 체크: 실제 서비스 가능 상태
//!    - 로드밸런서/모니터링이 degraded 상태를 구분 가능

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health check 응답
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// ok | degraded
    pub status: String,
    pub message: String,
    pub version: String,
    pub database: DatabaseStatus,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// GET /health
///
/// 서버 및 DB 상태 확인 (항상 200)
pub async fn health_check(
    State(state): State<AppState>,
) -> Json<HealthResponse> {
    // DB 연결 테스트
    let db_start = std::time::Instant::now();
    let db_status = match state.tips.health_check().await {
        Ok(_) => DatabaseStatus {
            connected: true,
            latency_ms: Some(db_start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!("health check: database unavailable: {}", e);
            DatabaseStatus {
                connected: false,
                latency_ms: None,
            }
        }
    };

    let (status, message) = if db_status.connected {
        ("ok", "Crypto Tips API is running")
    } else {
        ("degraded", "Crypto Tips API is running without a database")
    };

    Json(HealthResponse {
        status: status.to_string(),
        message: message.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::db::mock::MockRepository;
    use crate::routes::test_support::{app_with, send};

    #[tokio::test]
    async fn test_health_ok() {
        let app = app_with(Arc::new(MockRepository::new()));
        let (status, body) = send(&app, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Crypto Tips API is running");
        assert_eq!(body["database"]["connected"], true);
    }

    #[tokio::test]
    async fn test_health_degraded() {
        let store = Arc::new(MockRepository::new());
        store.set_healthy(false);
        let app = app_with(store);
        let (status, body) = send(&app, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert!(body["database"]["latencyMs"].is_null());
    }
}
