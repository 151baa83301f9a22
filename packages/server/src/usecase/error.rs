//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{DomainError, PointsError, RepositoryError, ValueObjectError};

/// ディベート操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebateError {
    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),

    #[error("{0}")]
    Validation(String),

    #[error("debate not found: {0}")]
    DebateNotFound(String),

    #[error("participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("speak request not found: {0}")]
    SpeakRequestNotFound(String),

    #[error("only the debate host can do this")]
    NotHost,

    #[error("cannot unmute: muted by host")]
    MutedByHost,

    #[error("you are temporarily muted and cannot create debates")]
    HostTemporarilyMuted,

    #[error("daily debate hosting limit reached")]
    HostingLimitReached,

    #[error("participant has left the debate")]
    ParticipantInactive,

    #[error("speak request already resolved")]
    AlreadyResolved,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Points(#[from] PointsError),
}

impl From<RepositoryError> for DebateError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::DebateNotFound(id) => Self::DebateNotFound(id),
            RepositoryError::ParticipantNotFound(id) => Self::ParticipantNotFound(id),
            RepositoryError::SpeakRequestNotFound(id) => Self::SpeakRequestNotFound(id),
            RepositoryError::DebateAlreadyExists(_)
            | RepositoryError::ParticipantAlreadyExists(_)
            | RepositoryError::SpeakRequestAlreadyExists(_) => Self::Conflict(e.to_string()),
        }
    }
}

impl From<DomainError> for DebateError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::MutedByHost => Self::MutedByHost,
            DomainError::NotHost => Self::NotHost,
            DomainError::ParticipantInactive => Self::ParticipantInactive,
            DomainError::AlreadyResolved => Self::AlreadyResolved,
        }
    }
}
