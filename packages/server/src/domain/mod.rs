//! Domain layer: entities, value objects, and the ports the use cases depend on.

pub mod broadcaster;
pub mod collaborator;
pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use broadcaster::{RoomBroadcaster, RoomEvent};
pub use collaborator::{PointsAction, PointsService, UserDirectory};
pub use entity::{
    Debate, NewDebate, Participant, RosterEntry, SideTally, SpeakRequest, StatusTransition,
    UserProfile,
};
pub use error::{DomainError, PointsError, RepositoryError, ValueObjectError};
pub use repository::DebateRepository;
#[cfg(test)]
pub use broadcaster::MockRoomBroadcaster;
#[cfg(test)]
pub use collaborator::{MockPointsService, MockUserDirectory};
#[cfg(test)]
pub use repository::MockDebateRepository;

pub use value_object::{
    DEBATES_LIST_ROOM, DebateId, DebateStatus, DebateType, ParticipantId, ParticipantRole, RoomId,
    Side, SpeakRequestId, SpeakRequestStatus, UserId,
};
