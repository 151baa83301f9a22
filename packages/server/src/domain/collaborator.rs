//! 外部コラボレーターのインターフェース
//!
//! ユーザー情報やポイント台帳は別サービスの責務です。この crate は
//! 狭いインターフェース越しに呼び出すだけで、実装は持ちません
//! （スタンドアロン起動用のインメモリ実装は Infrastructure 層にあります）。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{entity::UserProfile, error::PointsError, value_object::UserId};

/// Gamification actions this hub reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointsAction {
    /// One-time reward for joining a debate
    DebateJoin,
    /// Awarded to the winner of a debate
    DebateWin,
}

impl PointsAction {
    /// Points credited for the action
    pub fn points(self) -> i64 {
        match self {
            Self::DebateJoin => 5,
            Self::DebateWin => 10,
        }
    }
}

/// User profile lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns `None` for users the directory does not know.
    async fn get_profile(&self, user_id: &UserId) -> Option<UserProfile>;
}

/// Points / moderation ledger
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointsService: Send + Sync {
    async fn award(&self, user_id: &UserId, action: PointsAction) -> Result<(), PointsError>;

    async fn can_host_debate(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, PointsError>;

    async fn record_debate_host(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<(), PointsError>;

    /// Give back one hosting slot for today (no-op when none is used).
    async fn refund_debate_host(&self, user_id: &UserId) -> Result<(), PointsError>;

    async fn is_temporarily_muted(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, PointsError>;
}
