//! Shared application state.

use std::sync::Arc;

use crate::{
    infrastructure::hub::{ConnectionConfig, HubHandle},
    usecase::{
        AwardDebateWinUseCase, CreateDebateUseCase, DeleteDebateUseCase, EndDebateUseCase,
        GetDebateUseCase, GetParticipantsUseCase, HostMuteUseCase, JoinDebateUseCase,
        LeaveDebateUseCase, ListDebatesUseCase, SelfMuteUseCase, SpeakRequestUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// Hub（ルームレジストリへの入口）
    pub hub: HubHandle,
    /// 接続ごとのタイミング・キュー設定
    pub connection_config: ConnectionConfig,
    pub create_debate_usecase: Arc<CreateDebateUseCase>,
    pub get_debate_usecase: Arc<GetDebateUseCase>,
    pub list_debates_usecase: Arc<ListDebatesUseCase>,
    pub end_debate_usecase: Arc<EndDebateUseCase>,
    pub delete_debate_usecase: Arc<DeleteDebateUseCase>,
    pub award_win_usecase: Arc<AwardDebateWinUseCase>,
    pub join_debate_usecase: Arc<JoinDebateUseCase>,
    pub leave_debate_usecase: Arc<LeaveDebateUseCase>,
    pub get_participants_usecase: Arc<GetParticipantsUseCase>,
    pub host_mute_usecase: Arc<HostMuteUseCase>,
    pub self_mute_usecase: Arc<SelfMuteUseCase>,
    pub speak_request_usecase: Arc<SpeakRequestUseCase>,
}
