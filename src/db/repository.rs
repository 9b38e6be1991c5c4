//! Repository Pattern Implementation
//!
//! # Interview Q&A
//!
//! Q: Repository 패턴이란?
//! A: 데이터 접근 로직을 추상화하는 패턴
//!
//!    장점:
//!    - 비즈니스 로직과 데이터 접근 분리
//!    - 테스트 시 Mock 구현 쉬움 (PostgreSQL 없이 라우터 테스트)
//!
//!    ```text
//!    AppState.store: Arc<dyn Repository>
//!        ├── Database              (PostgreSQL, db/mod.rs)
//!        └── MockRepository        (테스트용, 메모리)
//!    ```
//!
//! 주소 인자는 호출 측에서 lowercase로 정규화된 값이라고 가정

use async_trait::async_trait;

use super::models::{NewTip, NewUser, Page, Tip, User};
use super::StoreError;

/// 사용자/팁 저장소 인터페이스
#[async_trait]
pub trait Repository: Send + Sync {
    /// 저장소 연결 확인
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// 여러 주소의 사용자 일괄 조회 (없는 주소는 결과에서 빠짐)
    async fn find_users_by_wallets(&self, wallet_addresses: &[String]) -> Result<Vec<User>, StoreError>;

    async fn create_tip(&self, tip: NewTip) -> Result<Tip, StoreError>;

    /// 보냈거나 받은 팁 (최신순)
    async fn tips_involving(&self, address: &str, page: Option<Page>) -> Result<Vec<Tip>, StoreError>;

    /// 받은 팁 (최신순)
    async fn tips_received(&self, address: &str, page: Option<Page>) -> Result<Vec<Tip>, StoreError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::RwLock;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    /// 메모리 기반 Repository
    ///
    /// created_at은 삽입 순서대로 1초씩 증가시켜 정렬을 결정적으로 만듦
    pub struct MockRepository {
        users: RwLock<Vec<User>>,
        tips: RwLock<Vec<Tip>>,
        healthy: AtomicBool,
    }

    impl MockRepository {
        pub fn new() -> Self {
            Self {
                users: RwLock::new(Vec::new()),
                tips: RwLock::new(Vec::new()),
                healthy: AtomicBool::new(true),
            }
        }

        pub fn set_healthy(&self, healthy: bool) {
            self.healthy.store(healthy, Ordering::SeqCst);
        }

        fn next_timestamp(count: usize) -> chrono::DateTime<Utc> {
            Utc::now() + Duration::seconds(count as i64)
        }

        fn paginate(mut tips: Vec<Tip>, page: Option<Page>) -> Vec<Tip> {
            tips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            match page {
                Some(p) => tips
                    .into_iter()
                    .skip(p.offset.max(0) as usize)
                    .take(p.limit.max(0) as usize)
                    .collect(),
                None => tips,
            }
        }
    }

    #[async_trait]
    impl Repository for MockRepository {
        async fn health_check(&self) -> Result<(), StoreError> {
            if self.healthy.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(StoreError::Database(sqlx::Error::PoolTimedOut))
            }
        }

        async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
            let mut users = self.users.write().unwrap();
            if users.iter().any(|u| u.username == user.username) {
                return Err(StoreError::Conflict("username"));
            }
            if users.iter().any(|u| u.wallet_address == user.wallet_address) {
                return Err(StoreError::Conflict("walletAddress"));
            }

            let created = User {
                id: Uuid::new_v4(),
                username: user.username,
                wallet_address: user.wallet_address,
                display_name: user.display_name,
                bio: user.bio,
                avatar_url: user.avatar_url,
                created_at: Self::next_timestamp(users.len()),
            };
            users.push(created.clone());
            Ok(created)
        }

        async fn find_user_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, StoreError> {
            let users = self.users.read().unwrap();
            Ok(users.iter().find(|u| u.wallet_address == wallet_address).cloned())
        }

        async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
            let users = self.users.read().unwrap();
            Ok(users.iter().find(|u| u.username == username).cloned())
        }

        async fn find_users_by_wallets(&self, wallet_addresses: &[String]) -> Result<Vec<User>, StoreError> {
            let users = self.users.read().unwrap();
            Ok(users
                .iter()
                .filter(|u| wallet_addresses.contains(&u.wallet_address))
                .cloned()
                .collect())
        }

        async fn create_tip(&self, tip: NewTip) -> Result<Tip, StoreError> {
            let mut tips = self.tips.write().unwrap();
            if tips.iter().any(|t| t.tx_hash == tip.tx_hash) {
                return Err(StoreError::Conflict("txHash"));
            }

            let created = Tip {
                id: Uuid::new_v4(),
                from_address: tip.from_address,
                to_address: tip.to_address,
                amount: tip.amount,
                message: tip.message,
                tx_hash: tip.tx_hash,
                created_at: Self::next_timestamp(tips.len()),
            };
            tips.push(created.clone());
            Ok(created)
        }

        async fn tips_involving(&self, address: &str, page: Option<Page>) -> Result<Vec<Tip>, StoreError> {
            let tips = self.tips.read().unwrap();
            let matching = tips
                .iter()
                .filter(|t| t.from_address == address || t.to_address == address)
                .cloned()
                .collect();
            Ok(Self::paginate(matching, page))
        }

        async fn tips_received(&self, address: &str, page: Option<Page>) -> Result<Vec<Tip>, StoreError> {
            let tips = self.tips.read().unwrap();
            let matching = tips
                .iter()
                .filter(|t| t.to_address == address)
                .cloned()
                .collect();
            Ok(Self::paginate(matching, page))
        }
    }
}
