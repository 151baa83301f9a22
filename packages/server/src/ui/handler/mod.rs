//! Request handlers.

pub mod debate_frame;
pub mod http;
pub mod websocket;

pub use debate_frame::DebateFrameHandler;
pub use http::{
    ApiError, award_debate_win, create_debate, create_speak_request, debug_rooms, delete_debate,
    delete_speak_request, end_debate, get_debate, get_participants, health_check, host_mute,
    join_debate, leave_debate, list_debates, list_speak_requests, resolve_speak_request,
    self_mute,
};
pub use websocket::websocket_handler;
