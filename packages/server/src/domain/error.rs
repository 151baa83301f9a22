//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    EmptyId(&'static str),

    #[error("side must be 'agree', 'disagree', or 'neutral' (got '{0}')")]
    InvalidSide(String),

    #[error("type must be 'PUBLIC' or 'PRIVATE' (got '{0}')")]
    InvalidDebateType(String),

    #[error("status must be 'approved' or 'denied' (got '{0}')")]
    InvalidResolution(String),

    #[error("status must be 'SCHEDULED', 'ACTIVE', or 'ENDED' (got '{0}')")]
    InvalidDebateStatus(String),
}

/// Entity の状態遷移エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Self-unmute attempted while the host mute is in force
    #[error("cannot unmute: muted by host")]
    MutedByHost,

    /// Host-only action attempted by someone else
    #[error("only the debate host can do this")]
    NotHost,

    /// Operation requires an active (not left) participant
    #[error("participant has left the debate")]
    ParticipantInactive,

    /// Speak request already approved or denied
    #[error("speak request already resolved")]
    AlreadyResolved,
}

/// Repository のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("debate not found: {0}")]
    DebateNotFound(String),

    #[error("debate already exists: {0}")]
    DebateAlreadyExists(String),

    #[error("participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("participant already exists: {0}")]
    ParticipantAlreadyExists(String),

    #[error("speak request not found: {0}")]
    SpeakRequestNotFound(String),

    #[error("speak request already exists: {0}")]
    SpeakRequestAlreadyExists(String),
}

/// Points service (external collaborator) failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("points service error: {0}")]
pub struct PointsError(pub String);
