//! UseCase: ディベート参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinDebateUseCase::execute() メソッド
//! - 初回参加・退出後の再参加・参加中の side 変更
//!
//! ### なぜこのテストが必要か
//! - 参加ポイント（DEBATE_JOIN）は全参加履歴に記録がない場合だけ付与される
//! - agree / disagree の集計値が active な参加者数と常に一致することを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：初回参加、再参加、side 変更
//! - 異常系：存在しないディベート
//! - エッジケース：ポイント付与の失敗（参加自体は成功する）

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::domain::{
    DebateId, DebateRepository, Participant, PointsAction, PointsService, RoomBroadcaster,
    RoomEvent, RoomId, RosterEntry, Side, UserId,
};

use super::{error::DebateError, locks::DebateLocks, roster::RosterPublisher};

/// Where a join request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSource {
    /// `debate:join_room` frame. The hub already announced the connection.
    Socket,
    /// HTTP join, announced to the room with `user-joined {userId, side}`.
    Http,
}

/// ディベート参加のユースケース
pub struct JoinDebateUseCase {
    repository: Arc<dyn DebateRepository>,
    points: Arc<dyn PointsService>,
    broadcaster: Arc<dyn RoomBroadcaster>,
    roster: Arc<RosterPublisher>,
    locks: Arc<DebateLocks>,
    clock: Arc<dyn Clock>,
}

impl JoinDebateUseCase {
    pub fn new(
        repository: Arc<dyn DebateRepository>,
        points: Arc<dyn PointsService>,
        broadcaster: Arc<dyn RoomBroadcaster>,
        roster: Arc<RosterPublisher>,
        locks: Arc<DebateLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            points,
            broadcaster,
            roster,
            locks,
            clock,
        }
    }

    /// 参加・再参加・side 変更を実行
    ///
    /// # Arguments
    ///
    /// * `debate_id` - 参加するディベート
    /// * `user_id` - 参加するユーザー
    /// * `side` - 選択する side（`None` なら現在の side を維持）
    /// * `source` - リクエストの経路
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<RosterEntry>)` - 更新後の参加者一覧
    /// * `Err(DebateError)` - ディベートが存在しない等
    pub async fn execute(
        &self,
        debate_id: &DebateId,
        user_id: &UserId,
        side: Option<Side>,
        source: JoinSource,
    ) -> Result<Vec<RosterEntry>, DebateError> {
        let _guard = self.locks.acquire(debate_id).await;
        let now = self.clock.now();

        let debate = self.repository.get_debate(debate_id).await?;
        let history = self.repository.get_all_participants(debate_id).await?;

        let side = match history.into_iter().find(|p| &p.user_id == user_id) {
            None => {
                let participant = Participant::join(&debate, user_id.clone(), side, now);
                let side = participant.side;
                self.repository.add_participant(participant).await?;
                tracing::info!(
                    debate_id = %debate_id,
                    user_id = %user_id,
                    side = side.map(Side::as_str),
                    "Participant joined"
                );

                if let Err(e) = self.points.award(user_id, PointsAction::DebateJoin).await {
                    tracing::warn!(user_id = %user_id, "Failed to award join points: {}", e);
                }
                side
            }
            Some(mut participant) => {
                let mut changed = false;
                if !participant.is_active() {
                    participant.rejoin(now);
                    changed = true;
                    tracing::info!(debate_id = %debate_id, user_id = %user_id, "Participant rejoined");
                }
                if let Some(side) = side {
                    changed |= participant.pick_side(side)?;
                }

                let side = participant.side;
                if changed {
                    self.repository.update_participant(participant).await?;
                } else {
                    tracing::debug!(debate_id = %debate_id, user_id = %user_id, "Join was a no-op");
                }
                side
            }
        };

        if source == JoinSource::Http {
            self.broadcaster.publish(
                &RoomId::from(debate_id),
                RoomEvent::UserJoined {
                    user_id: user_id.clone(),
                    side,
                },
            );
        }
        self.roster.publish(debate_id).await
    }
}
