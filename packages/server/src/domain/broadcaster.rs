//! Room broadcaster 定義
//!
//! UseCase 層がルームへイベントを通知するためのインターフェース。
//! 実装（Hub）は Infrastructure 層にあり、イベントをワイヤ形式にエンコードして
//! ルーム内の全接続にファンアウトします。

use super::{
    entity::{Debate, RosterEntry},
    value_object::{DebateId, DebateStatus, RoomId, Side, UserId},
};

/// Typed events published to a room.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// A user entered the room (`user-joined`)
    UserJoined {
        user_id: UserId,
        side: Option<Side>,
    },
    /// A user left the room (`user-left`)
    UserLeft { user_id: UserId },
    /// Active roster snapshot (`debate:participants_updated`)
    ParticipantsUpdated { participants: Vec<RosterEntry> },
    /// Debate lifecycle change (`debate:status_changed`)
    StatusChanged {
        debate_id: DebateId,
        status: DebateStatus,
        old_status: DebateStatus,
    },
    /// New debate announced on the list room (`debate:created`)
    DebateCreated { debate: Box<Debate> },
}

/// Fan-out port.
///
/// `publish` never blocks: the event is queued for the hub dispatcher and
/// delivered to every member of `room_id`.
#[cfg_attr(test, mockall::automock)]
pub trait RoomBroadcaster: Send + Sync {
    fn publish(&self, room_id: &RoomId, event: RoomEvent);
}
