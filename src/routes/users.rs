//! User Endpoints
//!
//! Registration and profile lookup. Profiles embed the ten most recent tips
//! the user received.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    db::{NewUser, User},
    error::ApiError,
    routes::extract::ApiJson,
    services::UserProfile,
    types::{EthAddress, Username},
};

// ============ Request Types ============

/// 사용자 생성 요청
///
/// 필수 값도 Option으로 받아 누락 시 400 메시지를 직접 결정
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

// ============ Handlers ============

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let (username, wallet_address) = match (non_empty(req.username), non_empty(req.wallet_address)) {
        (Some(username), Some(wallet_address)) => (username, wallet_address),
        _ => {
            return Err(ApiError::BadRequest(
                "Username and wallet address are required".to_string(),
            ))
        }
    };

    let username = Username::parse(&username).map_err(ApiError::ValidationError)?;
    let wallet_address = EthAddress::parse(&wallet_address).map_err(ApiError::ValidationError)?;

    let user = state
        .tips
        .register_user(NewUser {
            username: username.into_inner(),
            wallet_address: wallet_address.into_inner(),
            display_name: non_empty(req.display_name),
            bio: non_empty(req.bio),
            avatar_url: non_empty(req.avatar_url),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/wallet/:walletAddress
pub async fn get_user_by_wallet(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let wallet_address = EthAddress::parse(&wallet_address).map_err(ApiError::ValidationError)?;

    state
        .tips
        .profile_by_wallet(wallet_address.as_str())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User".to_string()))
}

/// GET /api/users/username/:username
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    state
        .tips
        .profile_by_username(&username)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User".to_string()))
}

/// 빈 문자열은 누락으로 취급
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app, send, send_raw};

    const WALLET: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";

    #[tokio::test]
    async fn test_create_user() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({
                "username": "alice",
                "walletAddress": WALLET,
                "displayName": "Alice",
                "bio": ""
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["walletAddress"], WALLET.to_lowercase());
        assert_eq!(body["displayName"], "Alice");
        assert!(body["bio"].is_null());
        assert!(body["id"].is_string());
        assert!(body["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_create_user_missing_fields() {
        let app = app();
        let (status, body) = send(&app, "POST", "/api/users", Some(json!({ "username": "alice" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username and wallet address are required");

        let (status, _) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "username": "", "walletAddress": WALLET })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_user_without_body() {
        let app = app();
        let (status, body) = send_raw(&app, "POST", "/api/users", None, "").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username and wallet address are required");
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_malformed_bodies_get_json_errors() {
        let app = app();
        let payload = json!({ "username": "alice", "walletAddress": WALLET }).to_string();

        // Content-Type 누락
        let (status, body) = send_raw(&app, "POST", "/api/users", None, &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(body["error"].as_str().unwrap().contains("application/json"));

        let (status, body) =
            send_raw(&app, "POST", "/api/users", Some("application/json"), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Request body is not valid JSON");

        let (status, body) = send_raw(
            &app,
            "POST",
            "/api/users",
            Some("application/json"),
            r#"{"username":1,"walletAddress":"0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_create_user_invalid_wallet() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "username": "alice", "walletAddress": "0x1234" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_duplicate_user_conflicts() {
        let app = app();
        let create = json!({ "username": "alice", "walletAddress": WALLET });
        send(&app, "POST", "/api/users", Some(create)).await;

        // 같은 주소, 대소문자만 다름
        let (status, body) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "username": "alice2", "walletAddress": WALLET.to_lowercase() })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "walletAddress already exists");

        let (status, body) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({
                "username": "alice",
                "walletAddress": "0x0000000000000000000000000000000000000001"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "username already exists");
    }

    #[tokio::test]
    async fn test_get_user_by_wallet_and_username() {
        let app = app();
        send(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "username": "alice", "walletAddress": WALLET })),
        )
        .await;
        send(
            &app,
            "POST",
            "/api/tips",
            Some(json!({
                "fromAddress": "0x0000000000000000000000000000000000000002",
                "toAddress": WALLET,
                "amount": "0.01",
                "txHash": format!("0x{}", "1".repeat(64)),
            })),
        )
        .await;

        let (status, body) = send(&app, "GET", &format!("/api/users/wallet/{}", WALLET), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["tipsReceived"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, "GET", "/api/users/username/alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["walletAddress"], WALLET.to_lowercase());
    }

    #[tokio::test]
    async fn test_unknown_user_not_found() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api/users/username/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");

        let (status, _) = send(
            &app,
            "GET",
            "/api/users/wallet/0x0000000000000000000000000000000000000009",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/api/users/wallet/not-an-address", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
