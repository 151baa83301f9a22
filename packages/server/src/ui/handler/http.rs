//! HTTP API endpoint handlers.
//!
//! Every handler converts raw request fields into domain types at the edge,
//! calls one use case, and maps the result back into a DTO. Failures become
//! an [`ApiError`] carrying `{ "error": message }`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{
        DebateId, DebateStatus, DebateType, RosterEntry, Side, SpeakRequestId,
        SpeakRequestStatus, UserId, ValueObjectError,
    },
    infrastructure::dto::{
        http::{
            AwardWinRequest, CreateDebateRequest, DebateDetailResponse, DebateListResponse,
            ErrorResponse, HostMuteRequest, JoinDebateRequest, ListDebatesQuery,
            MessageResponse, ParticipantsResponse, ResolveSpeakRequestRequest, RoomStatsDto,
            SelfMuteRequest, SpeakRequestDto, UserActionRequest,
        },
        websocket::{DebatePayload, ParticipantPayload},
    },
    ui::state::AppState,
    usecase::{CreateDebate, DebateDetail, DebateError, DebatePage, JoinSource},
};

/// HTTP-facing error: a status code plus a message for the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<DebateError> for ApiError {
    fn from(e: DebateError) -> Self {
        let status = match &e {
            DebateError::DebateNotFound(_)
            | DebateError::ParticipantNotFound(_)
            | DebateError::SpeakRequestNotFound(_) => StatusCode::NOT_FOUND,
            DebateError::NotHost
            | DebateError::MutedByHost
            | DebateError::HostTemporarilyMuted
            | DebateError::HostingLimitReached => StatusCode::FORBIDDEN,
            DebateError::InvalidInput(_) | DebateError::Validation(_) => StatusCode::BAD_REQUEST,
            DebateError::Conflict(_)
            | DebateError::AlreadyResolved
            | DebateError::ParticipantInactive => StatusCode::CONFLICT,
            DebateError::Points(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", e);
        }
        Self::new(status, e.to_string())
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(e: ValueObjectError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn roster_response(roster: &[RosterEntry]) -> Json<ParticipantsResponse> {
    Json(ParticipantsResponse {
        participants: roster.iter().map(ParticipantPayload::from).collect(),
    })
}

fn detail_response(detail: &DebateDetail) -> DebateDetailResponse {
    DebateDetailResponse {
        debate: DebatePayload::from(&detail.debate),
        host: (&detail.host).into(),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint: hub room membership counts
pub async fn debug_rooms(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<RoomStatsDto>>> {
    let rooms = state.hub.inspect().await.map_err(|e| {
        tracing::error!("Failed to inspect hub: {}", e);
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
    })?;

    let rooms = rooms
        .into_iter()
        .map(|room| RoomStatsDto {
            room_id: room.room_id.into_string(),
            connections: room.connections,
        })
        .collect();
    Ok(Json(rooms))
}

/// `POST /api/debates`
pub async fn create_debate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDebateRequest>,
) -> ApiResult<(StatusCode, Json<DebatePayload>)> {
    let input = CreateDebate {
        title: request.title,
        description: request.description,
        category: request.category,
        host_id: UserId::new(request.host_id)?,
        debate_type: DebateType::parse(&request.debate_type)?,
        start_time: request.start_time,
        duration_minutes: request.duration_minutes,
        show_in_pulse: request.show_in_pulse,
    };
    let debate = state.create_debate_usecase.execute(input).await?;
    Ok((StatusCode::CREATED, Json(DebatePayload::from(&debate))))
}

/// `GET /api/debates?status=&limit=&offset=`
pub async fn list_debates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListDebatesQuery>,
) -> ApiResult<Json<DebateListResponse>> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(DebateStatus::parse(raw)?),
    };
    let page = DebatePage::new(status, query.limit, query.offset);
    let listing = state.list_debates_usecase.execute(page).await?;

    Ok(Json(DebateListResponse {
        debates: listing.debates.iter().map(detail_response).collect(),
        limit: listing.limit,
        offset: listing.offset,
    }))
}

/// `GET /api/debates/{id}`
pub async fn get_debate(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
) -> ApiResult<Json<DebateDetailResponse>> {
    let debate_id = DebateId::new(debate_id)?;
    let detail = state.get_debate_usecase.execute(&debate_id).await?;
    Ok(Json(detail_response(&detail)))
}

/// `DELETE /api/debates/{id}`
pub async fn delete_debate(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
    Json(request): Json<UserActionRequest>,
) -> ApiResult<StatusCode> {
    let debate_id = DebateId::new(debate_id)?;
    let actor = UserId::new(request.user_id)?;
    state
        .delete_debate_usecase
        .execute(&debate_id, &actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/debates/{id}/award-win`
pub async fn award_debate_win(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
    Json(request): Json<AwardWinRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let debate_id = DebateId::new(debate_id)?;
    let winner = UserId::new(request.winner_id)?;
    state.award_win_usecase.execute(&debate_id, &winner).await?;
    Ok(Json(MessageResponse {
        message: "Points awarded for winning debate".to_string(),
    }))
}

/// `POST /api/debates/{id}/end`
pub async fn end_debate(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
    Json(request): Json<UserActionRequest>,
) -> ApiResult<Json<DebatePayload>> {
    let debate_id = DebateId::new(debate_id)?;
    let actor = UserId::new(request.user_id)?;
    let debate = state.end_debate_usecase.execute(&debate_id, &actor).await?;
    Ok(Json(DebatePayload::from(&debate)))
}

/// `POST /api/debates/{id}/join`
pub async fn join_debate(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
    Json(request): Json<JoinDebateRequest>,
) -> ApiResult<Json<ParticipantsResponse>> {
    let debate_id = DebateId::new(debate_id)?;
    let user_id = UserId::new(request.user_id)?;
    let side = Side::parse(&request.side)?;

    let roster = state
        .join_debate_usecase
        .execute(&debate_id, &user_id, side, JoinSource::Http)
        .await?;
    Ok(roster_response(&roster))
}

/// `POST /api/debates/{id}/leave`
pub async fn leave_debate(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
    Json(request): Json<UserActionRequest>,
) -> ApiResult<Json<ParticipantsResponse>> {
    let debate_id = DebateId::new(debate_id)?;
    let user_id = UserId::new(request.user_id)?;
    let roster = state
        .leave_debate_usecase
        .execute(&debate_id, &user_id)
        .await?;
    Ok(roster_response(&roster))
}

/// `GET /api/debates/{id}/participants`
pub async fn get_participants(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
) -> ApiResult<Json<ParticipantsResponse>> {
    let debate_id = DebateId::new(debate_id)?;
    let roster = state.get_participants_usecase.execute(&debate_id).await?;
    Ok(roster_response(&roster))
}

/// `PATCH /api/debates/{id}/participants`
pub async fn host_mute(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
    Json(request): Json<HostMuteRequest>,
) -> ApiResult<Json<ParticipantsResponse>> {
    let debate_id = DebateId::new(debate_id)?;
    let host_id = UserId::new(request.host_id)?;
    let target = UserId::new(request.user_id)?;
    let roster = state
        .host_mute_usecase
        .execute(&debate_id, &host_id, &target, request.is_muted_by_host)
        .await?;
    Ok(roster_response(&roster))
}

/// `PATCH /api/debates/{id}/self-mute`
pub async fn self_mute(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
    Json(request): Json<SelfMuteRequest>,
) -> ApiResult<Json<ParticipantsResponse>> {
    let debate_id = DebateId::new(debate_id)?;
    let user_id = UserId::new(request.user_id)?;
    let roster = state
        .self_mute_usecase
        .execute(&debate_id, &user_id, request.is_self_muted)
        .await?;
    Ok(roster_response(&roster))
}

/// `POST /api/debates/{id}/speak-requests`
pub async fn create_speak_request(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
    Json(request): Json<UserActionRequest>,
) -> ApiResult<(StatusCode, Json<SpeakRequestDto>)> {
    let debate_id = DebateId::new(debate_id)?;
    let user_id = UserId::new(request.user_id)?;
    let created = state
        .speak_request_usecase
        .create(&debate_id, &user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(SpeakRequestDto::from(&created))))
}

/// `GET /api/debates/{id}/speak-requests`
pub async fn list_speak_requests(
    State(state): State<Arc<AppState>>,
    Path(debate_id): Path<String>,
) -> ApiResult<Json<Vec<SpeakRequestDto>>> {
    let debate_id = DebateId::new(debate_id)?;
    let requests = state.speak_request_usecase.list(&debate_id).await?;
    Ok(Json(requests.iter().map(SpeakRequestDto::from).collect()))
}

/// `PATCH /api/debates/{id}/speak-requests/{request_id}`
pub async fn resolve_speak_request(
    State(state): State<Arc<AppState>>,
    Path((debate_id, request_id)): Path<(String, String)>,
    Json(request): Json<ResolveSpeakRequestRequest>,
) -> ApiResult<Json<SpeakRequestDto>> {
    let debate_id = DebateId::new(debate_id)?;
    let request_id = SpeakRequestId::new(request_id)?;
    let host_id = UserId::new(request.host_id)?;
    let resolution = SpeakRequestStatus::parse_resolution(&request.status)?;

    let resolved = state
        .speak_request_usecase
        .resolve(&debate_id, &request_id, &host_id, resolution)
        .await?;
    Ok(Json(SpeakRequestDto::from(&resolved)))
}

/// `DELETE /api/debates/{id}/speak-requests/{request_id}`
pub async fn delete_speak_request(
    State(state): State<Arc<AppState>>,
    Path((debate_id, request_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let debate_id = DebateId::new(debate_id)?;
    let request_id = SpeakRequestId::new(request_id)?;
    state
        .speak_request_usecase
        .delete(&debate_id, &request_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
