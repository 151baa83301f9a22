//! Active roster snapshot and `debate:participants_updated` publishing.

use std::sync::Arc;

use crate::domain::{
    DebateId, DebateRepository, RoomBroadcaster, RoomEvent, RoomId, RosterEntry, UserDirectory,
    UserProfile,
};

use super::error::DebateError;

/// 参加者一覧（プロフィール付き）の構築とブロードキャスト
pub struct RosterPublisher {
    repository: Arc<dyn DebateRepository>,
    user_directory: Arc<dyn UserDirectory>,
    broadcaster: Arc<dyn RoomBroadcaster>,
}

impl RosterPublisher {
    pub fn new(
        repository: Arc<dyn DebateRepository>,
        user_directory: Arc<dyn UserDirectory>,
        broadcaster: Arc<dyn RoomBroadcaster>,
    ) -> Self {
        Self {
            repository,
            user_directory,
            broadcaster,
        }
    }

    /// Active participants enriched with profile data, in join order.
    pub async fn snapshot(&self, debate_id: &DebateId) -> Result<Vec<RosterEntry>, DebateError> {
        let participants = self.repository.get_participants(debate_id).await?;

        let mut roster = Vec::with_capacity(participants.len());
        for participant in participants {
            let profile = match self.user_directory.get_profile(&participant.user_id).await {
                Some(profile) => profile,
                None => UserProfile::fallback(&participant.user_id),
            };
            roster.push(RosterEntry {
                participant,
                profile,
            });
        }
        Ok(roster)
    }

    /// Recompute the snapshot and send it to the debate's room.
    pub async fn publish(&self, debate_id: &DebateId) -> Result<Vec<RosterEntry>, DebateError> {
        let roster = self.snapshot(debate_id).await?;
        self.broadcaster.publish(
            &RoomId::from(debate_id),
            RoomEvent::ParticipantsUpdated {
                participants: roster.clone(),
            },
        );
        tracing::debug!(
            debate_id = %debate_id,
            participants = roster.len(),
            "Roster published"
        );
        Ok(roster)
    }
}
