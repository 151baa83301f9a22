//! UseCase: 自分のミュート切り替え

use std::sync::Arc;

use crate::domain::{DebateId, DebateRepository, RosterEntry, UserId};

use super::{error::DebateError, locks::DebateLocks, roster::RosterPublisher};

/// 自分のミュート切り替えのユースケース
pub struct SelfMuteUseCase {
    repository: Arc<dyn DebateRepository>,
    roster: Arc<RosterPublisher>,
    locks: Arc<DebateLocks>,
}

impl SelfMuteUseCase {
    pub fn new(
        repository: Arc<dyn DebateRepository>,
        roster: Arc<RosterPublisher>,
        locks: Arc<DebateLocks>,
    ) -> Self {
        Self {
            repository,
            roster,
            locks,
        }
    }

    /// ホストにミュートされている間はミュート解除できない（状態は変わらない）
    pub async fn execute(
        &self,
        debate_id: &DebateId,
        user_id: &UserId,
        muted: bool,
    ) -> Result<Vec<RosterEntry>, DebateError> {
        let _guard = self.locks.acquire(debate_id).await;

        let mut participant = self
            .repository
            .get_participants(debate_id)
            .await?
            .into_iter()
            .find(|p| &p.user_id == user_id)
            .ok_or_else(|| DebateError::ParticipantNotFound(user_id.to_string()))?;

        participant.set_self_muted(muted)?;
        self.repository.update_participant(participant).await?;
        tracing::info!(
            debate_id = %debate_id,
            user_id = %user_id,
            muted,
            "Self mute changed"
        );

        self.roster.publish(debate_id).await
    }
}
