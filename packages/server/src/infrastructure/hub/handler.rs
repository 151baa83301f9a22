//! Inbound frame handlers.
//!
//! A handler is bound to one message `type` before the dispatcher starts and
//! runs on the dispatcher task, to completion, before the frame is fanned out.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{RoomId, UserId};

use super::connection::ConnectionId;

/// Where an inbound frame came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerContext {
    pub room_id: RoomId,
    pub sender: UserId,
    pub connection_id: ConnectionId,
}

/// Side effect bound to one inbound message type.
#[async_trait]
pub trait FrameHandler: Send + Sync {
    /// `body` is the full inbound object with `senderId` already stamped.
    async fn handle(&self, ctx: HandlerContext, body: &Value);
}
