//! API Client
//!
//! Typed reqwest client for the tips API, used by the wallet side after a
//! transfer is confirmed. Non-2xx responses are decoded from the API's error
//! body so callers see the same `error`/`code` the server produced.

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    db::{Tip, User},
    error::ErrorResponse,
    routes::{health::HealthResponse, tips::CreateTipRequest, users::CreateUserRequest},
    services::{ReceivedTip, TipWithParties, UserProfile},
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("API error {status}: {error} ({code})")]
    Api {
        status: u16,
        error: String,
        code: String,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::InvalidUrl(_) => None,
        }
    }
}

pub struct TipsClient {
    http: reqwest::Client,
    base_url: String,
}

impl TipsClient {
    /// `base_url` 예: `http://localhost:3000`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 경로 세그먼트는 percent-encoding 되어 붙음 (`a?b` → `a%3Fb`)
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(self.url(&["health"])?).send().await?;
        decode(response).await
    }

    pub async fn create_user(&self, req: &CreateUserRequest) -> Result<User, ClientError> {
        let response = self.http.post(self.url(&["api", "users"])?).json(req).send().await?;
        decode(response).await
    }

    /// 404는 None
    pub async fn user_by_wallet(&self, wallet_address: &str) -> Result<Option<UserProfile>, ClientError> {
        let response = self
            .http
            .get(self.url(&["api", "users", "wallet", wallet_address])?)
            .send()
            .await?;
        decode_optional(response).await
    }

    /// 404는 None
    pub async fn user_by_username(&self, username: &str) -> Result<Option<UserProfile>, ClientError> {
        let response = self
            .http
            .get(self.url(&["api", "users", "username", username])?)
            .send()
            .await?;
        decode_optional(response).await
    }

    pub async fn create_tip(&self, req: &CreateTipRequest) -> Result<Tip, ClientError> {
        let response = self.http.post(self.url(&["api", "tips"])?).json(req).send().await?;
        decode(response).await
    }

    pub async fn tips_for_user(&self, wallet_address: &str) -> Result<Vec<TipWithParties>, ClientError> {
        let response = self
            .http
            .get(self.url(&["api", "tips", "user", wallet_address])?)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn tips_received(&self, wallet_address: &str) -> Result<Vec<ReceivedTip>, ClientError> {
        let response = self
            .http
            .get(self.url(&["api", "tips", "received", wallet_address])?)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    // 서버 에러 바디가 아니면 상태 코드 문구 사용
    let text = response.text().await.unwrap_or_default();
    let (error, code) = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => (body.error, body.code),
        Err(_) => (
            status.canonical_reason().unwrap_or("Unknown error").to_string(),
            "UNKNOWN".to_string(),
        ),
    };
    tracing::debug!(status = status.as_u16(), %error, %code, "api request failed");

    Err(ClientError::Api {
        status: status.as_u16(),
        error,
        code,
    })
}

async fn decode_optional<T: DeserializeOwned>(response: reqwest::Response) -> Result<Option<T>, ClientError> {
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    decode(response).await.map(Some)
}
