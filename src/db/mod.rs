//! Database Module
//!
//! # Interview Q&A
//!
//! Q: 왜 PostgreSQL을 선택했는가?
//! A: 사용자명/지갑 주소/트랜잭션 해시의 유일성을 DB 제약으로 보장
//!
//!    1. UNIQUE 제약: 동시 요청에도 중복 가입/중복 기록 방지
//!    2. 인덱싱: 주소별, 시간별 조회 최적화
//!    3. 생태계: SQLx 지원
//!
//! Q: 중복 에러는 어떻게 구분하는가?
//! A: 제약 이름으로 필드 판별
//!
//!    ```text
//!    users_username_key        → username
//!    users_wallet_address_key  → walletAddress
//!    tips_tx_hash_key          → txHash
//!    ```
//!
//! Q: 커넥션 풀은 어떻게 관리하는가?
//! A: SQLx의 PgPool 사용
//!    - 최소/최대 커넥션 수 설정
//!    - 커넥션 재사용 (오버헤드 감소)
//!    - 타임아웃 처리

mod models;
mod repository;

pub use models::*;
pub use repository::Repository;
#[cfg(test)]
pub use repository::mock;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use uuid::Uuid;

/// 저장소 에러
#[derive(Debug, Error)]
pub enum StoreError {
    /// UNIQUE 제약 위반 (필드명은 JSON 이름)
    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// 데이터베이스 연결 및 쿼리 담당
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 설정값 (기본 10)
    /// - min_connections: 1 (idle 시 최소 유지)
    /// - acquire_timeout: 3초 (커넥션 획득 대기)
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// 종료 시 커넥션 정리
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// UNIQUE 위반이면 Conflict, 그 외는 그대로
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("users_username_key") => "username",
                Some("users_wallet_address_key") => "walletAddress",
                Some("tips_tx_hash_key") => "txHash",
                _ => "record",
            };
            return StoreError::Conflict(field);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Repository for Database {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, wallet_address, display_name, bio, avatar_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING id, username, wallet_address, display_name, bio, avatar_url, created_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.wallet_address)
        .bind(&user.display_name)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn find_user_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, wallet_address, display_name, bio, avatar_url, created_at
            FROM users
            WHERE wallet_address = $1
            "#
        )
        .bind(wallet_address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, wallet_address, display_name, bio, avatar_url, created_at
            FROM users
            WHERE username = $1
            "#
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_users_by_wallets(&self, wallet_addresses: &[String]) -> Result<Vec<User>, StoreError> {
        if wallet_addresses.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, wallet_address, display_name, bio, avatar_url, created_at
            FROM users
            WHERE wallet_address = ANY($1)
            "#
        )
        .bind(wallet_addresses.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_tip(&self, tip: NewTip) -> Result<Tip, StoreError> {
        sqlx::query_as::<_, Tip>(
            r#"
            INSERT INTO tips (id, from_address, to_address, amount, message, tx_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING id, from_address, to_address, amount, message, tx_hash, created_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(&tip.from_address)
        .bind(&tip.to_address)
        .bind(&tip.amount)
        .bind(&tip.message)
        .bind(&tip.tx_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn tips_involving(&self, address: &str, page: Option<Page>) -> Result<Vec<Tip>, StoreError> {
        // LIMIT NULL = 제한 없음, OFFSET NULL = 0
        let tips = sqlx::query_as::<_, Tip>(
            r#"
            SELECT id, from_address, to_address, amount, message, tx_hash, created_at
            FROM tips
            WHERE from_address = $1 OR to_address = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(address)
        .bind(page.map(|p| p.limit))
        .bind(page.map(|p| p.offset))
        .fetch_all(&self.pool)
        .await?;

        Ok(tips)
    }

    async fn tips_received(&self, address: &str, page: Option<Page>) -> Result<Vec<Tip>, StoreError> {
        let tips = sqlx::query_as::<_, Tip>(
            r#"
            SELECT id, from_address, to_address, amount, message, tx_hash, created_at
            FROM tips
            WHERE to_address = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(address)
        .bind(page.map(|p| p.limit))
        .bind(page.map(|p| p.offset))
        .fetch_all(&self.pool)
        .await?;

        Ok(tips)
    }
}
