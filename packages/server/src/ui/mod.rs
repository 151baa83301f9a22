//! UI layer: HTTP and WebSocket surface.

mod handler;
mod server;
mod signal;
pub mod state;

pub use handler::{ApiError, DebateFrameHandler};
pub use server::Server;
