//! Conversion logic between DTOs and domain entities.

use crate::domain::{Debate, RoomEvent, RosterEntry, SpeakRequest, UserProfile};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Debate> for dto::DebatePayload {
    fn from(model: &Debate) -> Self {
        Self {
            id: model.id.to_string(),
            title: model.title.clone(),
            description: model.description.clone(),
            category: model.category.clone(),
            host_id: model.host_id.to_string(),
            debate_type: model.debate_type,
            status: model.status,
            start_time: model.start_time,
            end_time: model.end_time,
            duration_minutes: model.duration_minutes,
            show_in_pulse: model.show_in_pulse,
            agree_count: model.agree_count,
            disagree_count: model.disagree_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&RosterEntry> for dto::ParticipantPayload {
    fn from(entry: &RosterEntry) -> Self {
        let participant = &entry.participant;
        Self {
            id: participant.id.to_string(),
            user_id: participant.user_id.to_string(),
            debate_id: participant.debate_id.to_string(),
            role: participant.role,
            side: participant
                .side
                .map(|side| side.as_str().to_string())
                .unwrap_or_default(),
            is_self_muted: participant.is_self_muted,
            is_muted_by_host: participant.is_muted_by_host,
            joined_at: participant.joined_at,
            display_name: entry.profile.display_name.clone(),
            handle: entry.profile.handle.clone(),
            avatar: entry.profile.avatar_url.clone(),
        }
    }
}

impl From<RoomEvent> for dto::ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::UserJoined { user_id, side } => Self::UserJoined {
                user_id: user_id.into_string(),
                side,
            },
            RoomEvent::UserLeft { user_id } => Self::UserLeft {
                user_id: user_id.into_string(),
            },
            RoomEvent::ParticipantsUpdated { participants } => Self::ParticipantsUpdated {
                participants: participants.iter().map(Into::into).collect(),
            },
            RoomEvent::StatusChanged {
                debate_id,
                status,
                old_status,
            } => Self::StatusChanged {
                debate_id: debate_id.into_string(),
                status,
                old_status,
            },
            RoomEvent::DebateCreated { debate } => Self::DebateCreated {
                debate: debate.as_ref().into(),
            },
        }
    }
}

impl From<&SpeakRequest> for http::SpeakRequestDto {
    fn from(model: &SpeakRequest) -> Self {
        Self {
            id: model.id.to_string(),
            debate_id: model.debate_id.to_string(),
            user_id: model.user_id.to_string(),
            status: model.status,
            created_at: model.created_at,
        }
    }
}

impl From<&UserProfile> for http::HostProfileDto {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.user_id.to_string(),
            display_name: profile.display_name.clone(),
            handle: profile.handle.clone(),
            avatar: profile.avatar_url.clone(),
        }
    }
}
