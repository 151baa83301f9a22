//! UseCase: ホストによるミュート切り替え
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - HostMuteUseCase::execute() メソッド
//! - ホストミュートと self-mute の優先関係
//!
//! ### どのような状況を想定しているか
//! - 正常系：ホストが参加者をミュート → 参加者の unmute が拒否 → ホストが解除 → unmute 成功
//! - 異常系：ホスト以外による操作、自分自身を対象にした操作

use std::sync::Arc;

use crate::domain::{DebateId, DebateRepository, RosterEntry, UserId};

use super::{error::DebateError, locks::DebateLocks, roster::RosterPublisher};

/// ホストによるミュート切り替えのユースケース
pub struct HostMuteUseCase {
    repository: Arc<dyn DebateRepository>,
    roster: Arc<RosterPublisher>,
    locks: Arc<DebateLocks>,
}

impl HostMuteUseCase {
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

    /// ホストが他の参加者の `is_muted_by_host` を切り替える
    ///
    /// 対象の `is_self_muted` は変更しない。
    pub async fn execute(
        &self,
        debate_id: &DebateId,
        actor: &UserId,
        target: &UserId,
        muted: bool,
    ) -> Result<Vec<RosterEntry>, DebateError> {
        let _guard = self.locks.acquire(debate_id).await;

        let debate = self.repository.get_debate(debate_id).await?;
        if !debate.is_host(actor) {
            return Err(DebateError::NotHost);
        }
        if actor == target {
            return Err(DebateError::Validation(
                "host cannot mute themselves".to_string(),
            ));
        }

        let mut participant = self
            .repository
            .get_participants(debate_id)
            .await?
            .into_iter()
            .find(|p| &p.user_id == target)
            .ok_or_else(|| DebateError::ParticipantNotFound(target.to_string()))?;

        participant.set_muted_by_host(muted)?;
        self.repository.update_participant(participant).await?;
        tracing::info!(
            debate_id = %debate_id,
            host_id = %actor,
            target_user_id = %target,
            muted,
            "Host mute changed"
        );

        self.roster.publish(debate_id).await
    }
}
