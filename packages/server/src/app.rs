//! Dependency wiring.
//!
//! Builds every use case over one set of collaborators, binds the debate
//! command handler into a fresh hub, and returns the state the router needs
//! together with the hub dispatcher the caller must spawn.

use std::sync::Arc;

use agora_shared::time::{Clock, SystemClock};

use crate::{
    domain::{DebateRepository, PointsService, RoomBroadcaster, UserDirectory},
    infrastructure::{
        dto::websocket::DebateCommand,
        hub::{ConnectionConfig, Hub},
        repository::{InMemoryDebateRepository, InMemoryPointsService, InMemoryUserDirectory},
    },
    ui::{DebateFrameHandler, state::AppState},
    usecase::{
        AwardDebateWinUseCase, CreateDebateUseCase, DebateLocks, DeleteDebateUseCase,
        EndDebateUseCase, GetDebateUseCase, GetParticipantsUseCase, HostMuteUseCase,
        JoinDebateUseCase, LeaveDebateUseCase, ListDebatesUseCase, RosterPublisher,
        SelfMuteUseCase, SpeakRequestUseCase,
    },
};

/// External collaborators the use cases run against.
#[derive(Clone)]
pub struct Dependencies {
    pub repository: Arc<dyn DebateRepository>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub points: Arc<dyn PointsService>,
    pub clock: Arc<dyn Clock>,
}

impl Dependencies {
    /// In-memory collaborators on the system clock.
    pub fn in_memory() -> Self {
        Self {
            repository: Arc::new(InMemoryDebateRepository::new()),
            user_directory: Arc::new(InMemoryUserDirectory::new()),
            points: Arc::new(InMemoryPointsService::new()),
            clock: Arc::new(SystemClock),
        }
    }
}

/// Build the application state and the hub dispatcher.
///
/// The returned [`Hub`] must be spawned with [`Hub::run`] before any
/// connection is accepted.
pub fn assemble(deps: Dependencies, connection_config: ConnectionConfig) -> (Arc<AppState>, Hub) {
    let (hub_handle, mut hub) = Hub::new();
    let broadcaster: Arc<dyn RoomBroadcaster> = Arc::new(hub_handle.clone());
    let locks = Arc::new(DebateLocks::new());
    let roster = Arc::new(RosterPublisher::new(
        deps.repository.clone(),
        deps.user_directory.clone(),
        broadcaster.clone(),
    ));

    let join_debate_usecase = Arc::new(JoinDebateUseCase::new(
        deps.repository.clone(),
        deps.points.clone(),
        broadcaster.clone(),
        roster.clone(),
        locks.clone(),
        deps.clock.clone(),
    ));
    let leave_debate_usecase = Arc::new(LeaveDebateUseCase::new(
        deps.repository.clone(),
        roster.clone(),
        locks.clone(),
        deps.clock.clone(),
    ));
    let self_mute_usecase = Arc::new(SelfMuteUseCase::new(
        deps.repository.clone(),
        roster.clone(),
        locks.clone(),
    ));
    let host_mute_usecase = Arc::new(HostMuteUseCase::new(
        deps.repository.clone(),
        roster.clone(),
        locks.clone(),
    ));

    let frame_handler = Arc::new(DebateFrameHandler::new(
        join_debate_usecase.clone(),
        leave_debate_usecase.clone(),
        self_mute_usecase.clone(),
        host_mute_usecase.clone(),
    ));
    for message_type in DebateCommand::MESSAGE_TYPES {
        hub.register_handler(message_type, frame_handler.clone());
    }

    let state = AppState {
        hub: hub_handle,
        connection_config,
        create_debate_usecase: Arc::new(CreateDebateUseCase::new(
            deps.repository.clone(),
            deps.points.clone(),
            broadcaster.clone(),
            deps.clock.clone(),
        )),
        get_debate_usecase: Arc::new(GetDebateUseCase::new(
            deps.repository.clone(),
            deps.user_directory.clone(),
            broadcaster.clone(),
            locks.clone(),
            deps.clock.clone(),
        )),
        list_debates_usecase: Arc::new(ListDebatesUseCase::new(
            deps.repository.clone(),
            deps.user_directory.clone(),
            broadcaster.clone(),
            locks.clone(),
            deps.clock.clone(),
        )),
        end_debate_usecase: Arc::new(EndDebateUseCase::new(
            deps.repository.clone(),
            broadcaster,
            locks.clone(),
            deps.clock.clone(),
        )),
        delete_debate_usecase: Arc::new(DeleteDebateUseCase::new(
            deps.repository.clone(),
            deps.points.clone(),
            locks.clone(),
            deps.clock.clone(),
        )),
        award_win_usecase: Arc::new(AwardDebateWinUseCase::new(
            deps.repository.clone(),
            deps.points.clone(),
        )),
        join_debate_usecase,
        leave_debate_usecase,
        get_participants_usecase: Arc::new(GetParticipantsUseCase::new(roster)),
        host_mute_usecase,
        self_mute_usecase,
        speak_request_usecase: Arc::new(SpeakRequestUseCase::new(
            deps.repository,
            locks,
            deps.clock,
        )),
    };

    (Arc::new(state), hub)
}
