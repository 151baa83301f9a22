//! UseCase layer: debate room operations.
//!
//! Every use case depends on the domain ports only. Operations that
//! read-modify-write one debate hold that debate's [`DebateLocks`] guard for
//! the whole sequence, including the follow-up roster publish.

pub mod award_win;
pub mod create_debate;
pub mod delete_debate;
pub mod end_debate;
pub mod error;
pub mod get_debate;
pub mod get_participants;
pub mod host_mute;
pub mod join_debate;
pub mod leave_debate;
pub mod list_debates;
pub mod locks;
pub mod roster;
pub mod self_mute;
pub mod speak_request;

#[cfg(test)]
pub(crate) mod fixture;

pub use award_win::AwardDebateWinUseCase;
pub use create_debate::{CreateDebate, CreateDebateUseCase};
pub use delete_debate::DeleteDebateUseCase;
pub use end_debate::EndDebateUseCase;
pub use error::DebateError;
pub use get_debate::{DebateDetail, GetDebateUseCase};
pub use get_participants::GetParticipantsUseCase;
pub use host_mute::HostMuteUseCase;
pub use join_debate::{JoinDebateUseCase, JoinSource};
pub use leave_debate::LeaveDebateUseCase;
pub use list_debates::{DebateListing, DebatePage, ListDebatesUseCase};
pub use locks::{DebateLockGuard, DebateLocks};
pub use roster::RosterPublisher;
pub use self_mute::SelfMuteUseCase;
pub use speak_request::SpeakRequestUseCase;
