//! InMemory UserDirectory 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{UserDirectory, UserId, UserProfile};

/// インメモリのユーザープロフィール一覧
#[derive(Default)]
pub struct InMemoryUserDirectory {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory with known profiles
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.user_id.clone(), profile))
            .collect();
        Self {
            profiles: RwLock::new(profiles),
        }
    }

    pub async fn upsert(&self, profile: UserProfile) {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.user_id.clone(), profile);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_profile(&self, user_id: &UserId) -> Option<UserProfile> {
        let profiles = self.profiles.read().await;
        profiles.get(user_id).cloned()
    }
}
