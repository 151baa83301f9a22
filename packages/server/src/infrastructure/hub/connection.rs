//! Hub-side view of one WebSocket connection.
//!
//! The UI layer owns the socket and runs the read / write loops. The hub only
//! holds the sending half of a bounded delivery queue; dropping a
//! [`Connection`] closes that queue, which the write loop observes as the
//! signal to send a close frame and stop.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use thiserror::Error;
use tokio::{sync::mpsc, time::Instant};
use uuid::Uuid;

use crate::domain::{RoomId, UserId};

/// Default read deadline measured from the last inbound frame.
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);
/// Default bound on a single flush.
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);
/// Default per-connection delivery queue length.
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 256;
/// Default maximum inbound message size in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4096;

/// Per-connection timing and sizing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub pong_wait: Duration,
    /// Always 9/10 of `pong_wait`
    pub ping_period: Duration,
    pub write_wait: Duration,
    pub send_queue_capacity: usize,
    pub max_message_size: usize,
}

impl ConnectionConfig {
    pub fn new(
        pong_wait: Duration,
        write_wait: Duration,
        send_queue_capacity: usize,
        max_message_size: usize,
    ) -> Self {
        Self {
            pong_wait,
            ping_period: pong_wait * 9 / 10,
            write_wait,
            send_queue_capacity: send_queue_capacity.max(1),
            max_message_size,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_PONG_WAIT,
            DEFAULT_WRITE_WAIT,
            DEFAULT_SEND_QUEUE_CAPACITY,
            DEFAULT_MAX_MESSAGE_SIZE,
        )
    }
}

/// Identifies one network session (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a payload could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("delivery queue is full")]
    QueueFull,

    #[error("delivery queue is closed")]
    QueueClosed,
}

/// Receiving half of a connection's delivery queue, drained by the write loop.
pub type Outbox = mpsc::Receiver<Arc<str>>;

/// A registered member of a room.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub room_id: RoomId,
    pub user_id: UserId,
    queue: mpsc::Sender<Arc<str>>,
}

impl Connection {
    /// Create a connection and the outbox its write loop drains.
    pub fn open(room_id: RoomId, user_id: UserId, queue_capacity: usize) -> (Self, Outbox) {
        let (queue, outbox) = mpsc::channel(queue_capacity.max(1));
        let connection = Self {
            id: ConnectionId::generate(),
            room_id,
            user_id,
            queue,
        };
        (connection, outbox)
    }

    /// Queue a payload without waiting.
    pub fn deliver(&self, payload: Arc<str>) -> Result<(), DeliveryError> {
        self.queue.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::QueueClosed,
        })
    }
}

/// Last-seen tracking shared by a connection's read and write loops.
///
/// Any inbound frame (pongs included) refreshes it. The read loop derives its
/// deadline from it and the write loop only pings once the peer has been
/// quiet for a full ping period.
#[derive(Debug)]
pub struct Liveness {
    origin: Instant,
    last_seen_ms: AtomicU64,
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_seen_ms: AtomicU64::new(0),
        }
    }

    pub fn touch(&self) {
        let elapsed = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_seen_ms.store(elapsed, Ordering::Relaxed);
    }

    pub fn last_seen(&self) -> Instant {
        self.origin + Duration::from_millis(self.last_seen_ms.load(Ordering::Relaxed))
    }

    pub fn idle_for(&self) -> Duration {
        Instant::now().saturating_duration_since(self.last_seen())
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
