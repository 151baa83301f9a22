//! UseCase: ディベート勝者へのポイント付与

use std::sync::Arc;

use crate::domain::{DebateId, DebateRepository, PointsAction, PointsService, UserId};

use super::error::DebateError;

/// 勝者ポイント付与のユースケース
pub struct AwardDebateWinUseCase {
    repository: Arc<dyn DebateRepository>,
    points: Arc<dyn PointsService>,
}

impl AwardDebateWinUseCase {
    pub fn new(repository: Arc<dyn DebateRepository>, points: Arc<dyn PointsService>) -> Self {
        Self { repository, points }
    }

    /// ディベートが存在する場合のみ `DEBATE_WIN` を付与する
    pub async fn execute(&self, debate_id: &DebateId, winner: &UserId) -> Result<(), DebateError> {
        self.repository.get_debate(debate_id).await?;
        self.points.award(winner, PointsAction::DebateWin).await?;
        tracing::info!(debate_id = %debate_id, winner = %winner, "Debate win awarded");
        Ok(())
    }
}
