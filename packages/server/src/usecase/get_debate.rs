//! UseCase: ディベート取得（ステータスの遅延更新を含む）
//!
//! ステータスは時刻によって変化しますが、タイマーは持ちません。読み取りのたびに
//! 現在時刻と比較し、変化していれば永続化して `debate:status_changed` を通知します。

use std::sync::Arc;

use agora_shared::time::Clock;
use chrono::{DateTime, Utc};

use crate::domain::{
    Debate, DebateId, DebateRepository, RoomBroadcaster, RoomEvent, RoomId, StatusTransition,
    UserDirectory, UserId, UserProfile,
};

use super::{error::DebateError, locks::DebateLocks};

/// A debate together with its host's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct DebateDetail {
    pub debate: Debate,
    pub host: UserProfile,
}

/// Publish `debate:status_changed` for a transition.
pub(crate) fn announce_transition(
    broadcaster: &dyn RoomBroadcaster,
    debate_id: &DebateId,
    transition: StatusTransition,
) {
    tracing::info!(
        debate_id = %debate_id,
        old_status = %transition.old,
        status = %transition.new,
        "Debate status changed"
    );
    broadcaster.publish(
        &RoomId::from(debate_id),
        RoomEvent::StatusChanged {
            debate_id: debate_id.clone(),
            status: transition.new,
            old_status: transition.old,
        },
    );
}

/// Load a debate under its lock, persisting and announcing a lazy status change.
pub(crate) async fn load_refreshed(
    repository: &dyn DebateRepository,
    broadcaster: &dyn RoomBroadcaster,
    locks: &DebateLocks,
    debate_id: &DebateId,
    now: DateTime<Utc>,
) -> Result<Debate, DebateError> {
    let _guard = locks.acquire(debate_id).await;
    let mut debate = repository.get_debate(debate_id).await?;
    if let Some(transition) = debate.refresh_status(now) {
        repository.update_debate(debate.clone()).await?;
        announce_transition(broadcaster, debate_id, transition);
    }
    Ok(debate)
}

/// The host's profile, or a placeholder for unknown hosts.
pub(crate) async fn host_profile(user_directory: &dyn UserDirectory, host_id: &UserId) -> UserProfile {
    match user_directory.get_profile(host_id).await {
        Some(profile) => profile,
        None => UserProfile::fallback(host_id),
    }
}

/// ディベート取得のユースケース
pub struct GetDebateUseCase {
    repository: Arc<dyn DebateRepository>,
    user_directory: Arc<dyn UserDirectory>,
    broadcaster: Arc<dyn RoomBroadcaster>,
    locks: Arc<DebateLocks>,
    clock: Arc<dyn Clock>,
}

impl GetDebateUseCase {
    pub fn new(
        repository: Arc<dyn DebateRepository>,
        user_directory: Arc<dyn UserDirectory>,
        broadcaster: Arc<dyn RoomBroadcaster>,
        locks: Arc<DebateLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            user_directory,
            broadcaster,
            locks,
            clock,
        }
    }

    pub async fn execute(&self, debate_id: &DebateId) -> Result<DebateDetail, DebateError> {
        let debate = load_refreshed(
            self.repository.as_ref(),
            self.broadcaster.as_ref(),
            &self.locks,
            debate_id,
            self.clock.now(),
        )
        .await?;
        let host = host_profile(self.user_directory.as_ref(), &debate.host_id).await;
        Ok(DebateDetail { debate, host })
    }
}
