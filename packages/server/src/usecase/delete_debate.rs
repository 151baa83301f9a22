//! UseCase: ディベートの削除
//!
//! 開始前（SCHEDULED）のディベートを削除した場合は、その日のホスト枠を返却します。
//! 返却に失敗しても削除自体は成功扱いです。

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::domain::{DebateId, DebateRepository, DebateStatus, PointsService, UserId};

use super::{error::DebateError, locks::DebateLocks};

/// ディベート削除のユースケース
pub struct DeleteDebateUseCase {
    repository: Arc<dyn DebateRepository>,
    points: Arc<dyn PointsService>,
    locks: Arc<DebateLocks>,
    clock: Arc<dyn Clock>,
}

impl DeleteDebateUseCase {
    pub fn new(
        repository: Arc<dyn DebateRepository>,
        points: Arc<dyn PointsService>,
        locks: Arc<DebateLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            points,
            locks,
            clock,
        }
    }

    /// ホストのみ実行可能
    pub async fn execute(&self, debate_id: &DebateId, actor: &UserId) -> Result<(), DebateError> {
        let _guard = self.locks.acquire(debate_id).await;

        let mut debate = self.repository.get_debate(debate_id).await?;
        if !debate.is_host(actor) {
            return Err(DebateError::NotHost);
        }
        debate.refresh_status(self.clock.now());

        self.repository.delete_debate(debate_id).await?;
        tracing::info!(debate_id = %debate_id, status = %debate.status, "Debate deleted");

        if debate.status == DebateStatus::Scheduled
            && let Err(e) = self.points.refund_debate_host(&debate.host_id).await
        {
            tracing::warn!(
                host_id = %debate.host_id,
                "Failed to refund hosting slot: {}",
                e
            );
        }
        Ok(())
    }
}
