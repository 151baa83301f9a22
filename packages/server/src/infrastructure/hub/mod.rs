//! Room registry and fan-out.
//!
//! - `connection`: hub-side connection handle, delivery queue, liveness
//! - `handler`: per-type inbound frame handlers
//! - `dispatcher`: the single-task dispatcher and its cloneable handle

pub mod connection;
pub mod dispatcher;
pub mod handler;

pub use connection::{
    Connection, ConnectionConfig, ConnectionId, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_PONG_WAIT,
    DEFAULT_SEND_QUEUE_CAPACITY, DEFAULT_WRITE_WAIT, DeliveryError, Liveness, Outbox,
};
pub use dispatcher::{Broadcast, Hub, HubError, HubHandle, HubRequest, Origin, RoomStats};
pub use handler::{FrameHandler, HandlerContext};
