//! UseCase: 参加者一覧取得

use std::sync::Arc;

use crate::domain::{DebateId, RosterEntry};

use super::{error::DebateError, roster::RosterPublisher};

/// 参加者一覧取得のユースケース（ブロードキャストはしない）
pub struct GetParticipantsUseCase {
    roster: Arc<RosterPublisher>,
}

impl GetParticipantsUseCase {
    pub fn new(roster: Arc<RosterPublisher>) -> Self {
        Self { roster }
    }

    pub async fn execute(&self, debate_id: &DebateId) -> Result<Vec<RosterEntry>, DebateError> {
        self.roster.snapshot(debate_id).await
    }
}
