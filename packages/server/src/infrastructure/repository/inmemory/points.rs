//! InMemory PointsService 実装
//!
//! ポイント台帳は外部サービスの責務ですが、サーバー単体で起動・テストできるように
//! 最小限のインメモリ実装を用意しています。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;

use crate::domain::{PointsAction, PointsError, PointsService, UserId};

/// Debates a user may host per calendar day (UTC).
const DAILY_HOSTING_LIMIT: u32 = 1;

#[derive(Debug, Default, Clone)]
struct PointsAccount {
    points: i64,
    debates_hosted_today: u32,
    last_debate_host_date: Option<NaiveDate>,
    muted_until: Option<DateTime<Utc>>,
}

/// インメモリのポイント台帳
#[derive(Default)]
pub struct InMemoryPointsService {
    accounts: Mutex<HashMap<UserId, PointsAccount>>,
}

impl InMemoryPointsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance (0 for unknown users)
    pub async fn points_of(&self, user_id: &UserId) -> i64 {
        let accounts = self.accounts.lock().await;
        accounts.get(user_id).map_or(0, |account| account.points)
    }

    /// Apply a moderation mute until `until`
    pub async fn mute_until(&self, user_id: &UserId, until: DateTime<Utc>) {
        let mut accounts = self.accounts.lock().await;
        accounts.entry(user_id.clone()).or_default().muted_until = Some(until);
    }
}

#[async_trait]
impl PointsService for InMemoryPointsService {
    async fn award(&self, user_id: &UserId, action: PointsAction) -> Result<(), PointsError> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts.entry(user_id.clone()).or_default();
        account.points += action.points();
        tracing::info!(
            user_id = %user_id,
            ?action,
            balance = account.points,
            "Points awarded"
        );
        Ok(())
    }

    async fn can_host_debate(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, PointsError> {
        let accounts = self.accounts.lock().await;
        let Some(account) = accounts.get(user_id) else {
            return Ok(true);
        };
        if account.last_debate_host_date != Some(now.date_naive()) {
            return Ok(true);
        }
        Ok(account.debates_hosted_today < DAILY_HOSTING_LIMIT)
    }

    async fn record_debate_host(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<(), PointsError> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts.entry(user_id.clone()).or_default();
        let today = now.date_naive();
        if account.last_debate_host_date == Some(today) {
            account.debates_hosted_today += 1;
        } else {
            account.debates_hosted_today = 1;
        }
        account.last_debate_host_date = Some(today);
        Ok(())
    }

    async fn refund_debate_host(&self, user_id: &UserId) -> Result<(), PointsError> {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(user_id) {
            account.debates_hosted_today = account.debates_hosted_today.saturating_sub(1);
        }
        Ok(())
    }

    async fn is_temporarily_muted(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, PointsError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .get(user_id)
            .and_then(|account| account.muted_until)
            .is_some_and(|until| now < until))
    }
}
