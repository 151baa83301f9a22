//! UseCase: ディベート退出処理
//!
//! 退出は論理削除（`left_at` の記録）です。論理削除の書き込みに失敗した場合は
//! 物理削除にフォールバックし、退出が失われないようにします。

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::domain::{DebateId, DebateRepository, RosterEntry, UserId};

use super::{error::DebateError, locks::DebateLocks, roster::RosterPublisher};

/// ディベート退出のユースケース
pub struct LeaveDebateUseCase {
    repository: Arc<dyn DebateRepository>,
    roster: Arc<RosterPublisher>,
    locks: Arc<DebateLocks>,
    clock: Arc<dyn Clock>,
}

impl LeaveDebateUseCase {
    pub fn new(
        repository: Arc<dyn DebateRepository>,
        roster: Arc<RosterPublisher>,
        locks: Arc<DebateLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            roster,
            locks,
            clock,
        }
    }

    /// 退出を実行（参加していなければ何もせず成功）
    pub async fn execute(
        &self,
        debate_id: &DebateId,
        user_id: &UserId,
    ) -> Result<Vec<RosterEntry>, DebateError> {
        let _guard = self.locks.acquire(debate_id).await;

        let active = self
            .repository
            .get_participants(debate_id)
            .await?
            .into_iter()
            .find(|p| &p.user_id == user_id);

        match active {
            Some(mut participant) => {
                participant.leave(self.clock.now());
                if let Err(e) = self.repository.update_participant(participant).await {
                    tracing::warn!(
                        debate_id = %debate_id,
                        user_id = %user_id,
                        "Soft leave failed, removing participant: {}",
                        e
                    );
                    self.repository
                        .remove_participant(debate_id, user_id)
                        .await?;
                }
                tracing::info!(debate_id = %debate_id, user_id = %user_id, "Participant left");
            }
            None => {
                tracing::debug!(
                    debate_id = %debate_id,
                    user_id = %user_id,
                    "Leave ignored: not an active participant"
                );
            }
        }

        self.roster.publish(debate_id).await
    }
}
