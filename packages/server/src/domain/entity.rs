//! Entity 定義
//!
//! ディベート・参加者・発言リクエストの状態と、その状態遷移ルールを保持します。
//! ここに置くのは副作用のない純粋なロジックのみで、永続化やブロードキャストは
//! UseCase 層が担当します。

use chrono::{DateTime, Duration, Utc};

use super::{
    error::DomainError,
    value_object::{
        DebateId, DebateStatus, DebateType, ParticipantId, ParticipantRole, Side,
        SpeakRequestId, SpeakRequestStatus, UserId,
    },
};

/// Start times further than this in the future produce a `SCHEDULED` debate.
const SCHEDULE_THRESHOLD_MINUTES: i64 = 1;

/// A status change observed on a debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub old: DebateStatus,
    pub new: DebateStatus,
}

/// Aggregate per-side head count of active participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideTally {
    pub agree: u32,
    pub disagree: u32,
}

impl SideTally {
    /// Count active participants on each countable side.
    pub fn from_participants<'a>(participants: impl IntoIterator<Item = &'a Participant>) -> Self {
        participants
            .into_iter()
            .filter(|p| p.is_active())
            .fold(Self::default(), |mut tally, p| {
                match p.side {
                    Some(Side::Agree) => tally.agree += 1,
                    Some(Side::Disagree) => tally.disagree += 1,
                    Some(Side::Neutral) | None => {}
                }
                tally
            })
    }
}

/// Input for scheduling a new debate (already validated).
#[derive(Debug, Clone)]
pub struct NewDebate {
    pub title: String,
    pub description: String,
    pub category: String,
    pub host_id: UserId,
    pub debate_type: DebateType,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub show_in_pulse: bool,
}

/// A time-boxed debate session.
#[derive(Debug, Clone, PartialEq)]
pub struct Debate {
    pub id: DebateId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub host_id: UserId,
    pub debate_type: DebateType,
    pub status: DebateStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub show_in_pulse: bool,
    pub agree_count: u32,
    pub disagree_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debate {
    /// Schedule a new debate.
    ///
    /// The end time is `start + duration`. A start more than a minute ahead of
    /// `now` yields `SCHEDULED`, anything else starts `ACTIVE`. Private debates
    /// never show in the pulse feed.
    pub fn schedule(input: NewDebate, now: DateTime<Utc>) -> Self {
        let end_time = input.start_time + Duration::minutes(i64::from(input.duration_minutes));
        let status = if input.start_time > now + Duration::minutes(SCHEDULE_THRESHOLD_MINUTES) {
            DebateStatus::Scheduled
        } else {
            DebateStatus::Active
        };
        let show_in_pulse = match input.debate_type {
            DebateType::Public => input.show_in_pulse,
            DebateType::Private => false,
        };

        Self {
            id: DebateId::generate(),
            title: input.title,
            description: input.description,
            category: input.category,
            host_id: input.host_id,
            debate_type: input.debate_type,
            status,
            start_time: input.start_time,
            end_time: Some(end_time),
            duration_minutes: input.duration_minutes,
            show_in_pulse,
            agree_count: 0,
            disagree_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_host(&self, user_id: &UserId) -> bool {
        &self.host_id == user_id
    }

    /// Recompute the time-driven status against `now`.
    ///
    /// Returns the transition when the status changed. A debate whose start and
    /// end have both passed moves straight to `ENDED`.
    pub fn refresh_status(&mut self, now: DateTime<Utc>) -> Option<StatusTransition> {
        let old = self.status;

        if self.status == DebateStatus::Scheduled && now > self.start_time {
            self.status = DebateStatus::Active;
        }
        if self.status == DebateStatus::Active
            && let Some(end_time) = self.end_time
            && now > end_time
        {
            self.status = DebateStatus::Ended;
        }

        (old != self.status).then(|| {
            self.updated_at = now;
            StatusTransition {
                old,
                new: self.status,
            }
        })
    }

    /// Host-driven early end.
    ///
    /// Returns `Ok(None)` when the debate had already ended.
    pub fn end(
        &mut self,
        actor: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<StatusTransition>, DomainError> {
        if !self.is_host(actor) {
            return Err(DomainError::NotHost);
        }
        if self.status == DebateStatus::Ended {
            return Ok(None);
        }

        let old = self.status;
        self.status = DebateStatus::Ended;
        if self.end_time.is_none_or(|end_time| end_time > now) {
            self.end_time = Some(now);
        }
        self.updated_at = now;

        Ok(Some(StatusTransition {
            old,
            new: DebateStatus::Ended,
        }))
    }

    pub fn apply_tally(&mut self, tally: SideTally) {
        self.agree_count = tally.agree;
        self.disagree_count = tally.disagree;
    }
}

/// One user's membership record in one debate. Never hard-deleted by leave.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub debate_id: DebateId,
    pub user_id: UserId,
    pub role: ParticipantRole,
    pub side: Option<Side>,
    pub is_self_muted: bool,
    pub is_muted_by_host: bool,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// First-time join. Participants start self-muted.
    pub fn join(debate: &Debate, user_id: UserId, side: Option<Side>, now: DateTime<Utc>) -> Self {
        let role = if debate.is_host(&user_id) {
            ParticipantRole::Host
        } else {
            ParticipantRole::User
        };

        Self {
            id: ParticipantId::generate(),
            debate_id: debate.id.clone(),
            user_id,
            role,
            side,
            is_self_muted: true,
            is_muted_by_host: false,
            joined_at: now,
            left_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.left_at.is_none()
    }

    /// Re-enter after a soft-leave. Mute state and side are kept.
    pub fn rejoin(&mut self, now: DateTime<Utc>) {
        self.left_at = None;
        self.joined_at = now;
    }

    /// Soft-leave. Returns `false` when already left.
    pub fn leave(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.left_at = Some(now);
        true
    }

    /// Pick or switch sides. Returns whether anything changed.
    pub fn pick_side(&mut self, side: Side) -> Result<bool, DomainError> {
        if !self.is_active() {
            return Err(DomainError::ParticipantInactive);
        }
        if self.side == Some(side) {
            return Ok(false);
        }
        self.side = Some(side);
        Ok(true)
    }

    /// Toggle the participant's own mute.
    ///
    /// Unmuting is refused while the host mute is in force.
    pub fn set_self_muted(&mut self, muted: bool) -> Result<bool, DomainError> {
        if !self.is_active() {
            return Err(DomainError::ParticipantInactive);
        }
        if !muted && self.is_muted_by_host {
            return Err(DomainError::MutedByHost);
        }
        let changed = self.is_self_muted != muted;
        self.is_self_muted = muted;
        Ok(changed)
    }

    /// Toggle the host mute. Leaves `is_self_muted` untouched.
    pub fn set_muted_by_host(&mut self, muted: bool) -> Result<bool, DomainError> {
        if !self.is_active() {
            return Err(DomainError::ParticipantInactive);
        }
        let changed = self.is_muted_by_host != muted;
        self.is_muted_by_host = muted;
        Ok(changed)
    }
}

/// A participant's request for the floor.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakRequest {
    pub id: SpeakRequestId,
    pub debate_id: DebateId,
    pub user_id: UserId,
    pub status: SpeakRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl SpeakRequest {
    pub fn new(debate_id: DebateId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: SpeakRequestId::generate(),
            debate_id,
            user_id,
            status: SpeakRequestStatus::Pending,
            created_at: now,
        }
    }

    /// Resolve a pending request. A request resolves exactly once.
    pub fn resolve(&mut self, resolution: SpeakRequestStatus) -> Result<(), DomainError> {
        if self.status != SpeakRequestStatus::Pending
            || resolution == SpeakRequestStatus::Pending
        {
            return Err(DomainError::AlreadyResolved);
        }
        self.status = resolution;
        Ok(())
    }
}

/// Display data for a user, owned by the user service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub handle: String,
    pub avatar_url: String,
}

impl UserProfile {
    /// Placeholder profile for users the directory does not know.
    pub fn fallback(user_id: &UserId) -> Self {
        let display_name = match user_id.as_str() {
            "demo-user" | "guest" => "Demo User",
            _ => "Unknown User",
        };

        Self {
            user_id: user_id.clone(),
            display_name: display_name.to_string(),
            handle: "unknown".to_string(),
            avatar_url: format!(
                "https://ui-avatars.com/api/?name={}&background=random",
                display_name.replace(' ', "+")
            ),
        }
    }
}

/// An active participant joined with their profile, ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub participant: Participant,
    pub profile: UserProfile,
}
