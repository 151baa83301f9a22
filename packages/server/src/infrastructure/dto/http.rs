//! HTTP API request / response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::SpeakRequestStatus;

use super::websocket::{DebatePayload, ParticipantPayload};

// ========================================
// Requests
// ========================================

/// `POST /api/debates`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDebateRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub host_id: String,
    /// `PUBLIC` or `PRIVATE`
    #[serde(rename = "type")]
    pub debate_type: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub show_in_pulse: bool,
}

/// Body carrying only the acting user (end, leave, speak request).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActionRequest {
    pub user_id: String,
}

/// `POST /api/debates/{id}/join`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinDebateRequest {
    pub user_id: String,
    #[serde(default)]
    pub side: String,
}

/// `PATCH /api/debates/{id}/participants`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMuteRequest {
    pub host_id: String,
    pub user_id: String,
    pub is_muted_by_host: bool,
}

/// `PATCH /api/debates/{id}/self-mute`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfMuteRequest {
    pub user_id: String,
    pub is_self_muted: bool,
}

/// `GET /api/debates` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDebatesQuery {
    /// `SCHEDULED`, `ACTIVE` or `ENDED`; empty means all
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// `POST /api/debates/{id}/award-win`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardWinRequest {
    pub winner_id: String,
}

/// `PATCH /api/debates/{id}/speak-requests/{request_id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSpeakRequestRequest {
    pub host_id: String,
    /// `approved` or `denied`
    pub status: String,
}

// ========================================
// Responses
// ========================================

/// Public profile of a debate host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostProfileDto {
    pub id: String,
    pub display_name: String,
    pub handle: String,
    pub avatar: String,
}

/// `GET /api/debates/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebateDetailResponse {
    #[serde(flatten)]
    pub debate: DebatePayload,
    pub host: HostProfileDto,
}

/// `GET /api/debates`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebateListResponse {
    pub debates: Vec<DebateDetailResponse>,
    pub limit: usize,
    pub offset: usize,
}

/// Plain acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Active roster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantsResponse {
    pub participants: Vec<ParticipantPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakRequestDto {
    pub id: String,
    pub debate_id: String,
    pub user_id: String,
    pub status: SpeakRequestStatus,
    pub created_at: DateTime<Utc>,
}

/// One room as seen by the hub (`GET /debug/rooms`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatsDto {
    pub room_id: String,
    pub connections: usize,
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
