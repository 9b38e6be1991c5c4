//! Tip Directory Service
//!
//! Assembles API views on top of the repository: user profiles with their
//! most recent tips, and tip listings with the users owning each address.
//! Tip addresses have no foreign key, so owners are resolved with one batch
//! lookup per listing and missing owners serialize as `null`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::{NewTip, NewUser, Page, Repository, StoreError, Tip, User};

/// 프로필에 포함되는 최근 받은 팁 개수
pub const PROFILE_RECENT_TIPS: i64 = 10;

/// 사용자 + 최근 받은 팁
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub tips_received: Vec<Tip>,
}

/// 보낸/받은 사용자 정보가 붙은 팁
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipWithParties {
    #[serde(flatten)]
    pub tip: Tip,
    pub from_user: Option<User>,
    pub to_user: Option<User>,
}

/// 보낸 사용자 정보가 붙은 받은 팁
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedTip {
    #[serde(flatten)]
    pub tip: Tip,
    pub from_user: Option<User>,
}

pub struct TipService {
    store: Arc<dyn Repository>,
}

impl TipService {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }

    pub async fn register_user(&self, user: NewUser) -> Result<User, StoreError> {
        let created = self.store.create_user(user).await?;
        tracing::info!(username = %created.username, wallet = %created.wallet_address, "user created");
        Ok(created)
    }

    pub async fn record_tip(&self, tip: NewTip) -> Result<Tip, StoreError> {
        let created = self.store.create_tip(tip).await?;
        tracing::info!(
            from = %created.from_address,
            to = %created.to_address,
            amount = %created.amount,
            tx_hash = %created.tx_hash,
            "tip recorded"
        );
        Ok(created)
    }

    pub async fn profile_by_wallet(&self, wallet_address: &str) -> Result<Option<UserProfile>, StoreError> {
        match self.store.find_user_by_wallet(wallet_address).await? {
            Some(user) => self.with_recent_tips(user).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn profile_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        match self.store.find_user_by_username(username).await? {
            Some(user) => self.with_recent_tips(user).await.map(Some),
            None => Ok(None),
        }
    }

    /// 주소가 보냈거나 받은 팁 (최신순)
    pub async fn tips_for_address(
        &self,
        address: &str,
        page: Option<Page>,
    ) -> Result<Vec<TipWithParties>, StoreError> {
        let tips = self.store.tips_involving(address, page).await?;
        let owners = self
            .owners_of(tips.iter().flat_map(|t| [&t.from_address, &t.to_address]))
            .await?;

        Ok(tips
            .into_iter()
            .map(|tip| TipWithParties {
                from_user: owners.get(&tip.from_address).cloned(),
                to_user: owners.get(&tip.to_address).cloned(),
                tip,
            })
            .collect())
    }

    /// 주소가 받은 팁 (최신순)
    pub async fn tips_received_by(
        &self,
        address: &str,
        page: Option<Page>,
    ) -> Result<Vec<ReceivedTip>, StoreError> {
        let tips = self.store.tips_received(address, page).await?;
        let owners = self.owners_of(tips.iter().map(|t| &t.from_address)).await?;

        Ok(tips
            .into_iter()
            .map(|tip| ReceivedTip {
                from_user: owners.get(&tip.from_address).cloned(),
                tip,
            })
            .collect())
    }

    async fn with_recent_tips(&self, user: User) -> Result<UserProfile, StoreError> {
        let tips_received = self
            .store
            .tips_received(&user.wallet_address, Some(Page::first(PROFILE_RECENT_TIPS)))
            .await?;
        Ok(UserProfile { user, tips_received })
    }

    async fn owners_of<'a>(
        &self,
        addresses: impl Iterator<Item = &'a String>,
    ) -> Result<HashMap<String, User>, StoreError> {
        let unique: Vec<String> = addresses.cloned().collect::<BTreeSet<_>>().into_iter().collect();
        let users = self.store.find_users_by_wallets(&unique).await?;
        Ok(users
            .into_iter()
            .map(|u| (u.wallet_address.clone(), u))
            .collect())
    }
}
