//! Live debate room hub.
//!
//! Room-scoped pub/sub over WebSocket with per-debate participant state
//! (sides, mutes, speak requests) and an HTTP API over the same use cases.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod app;
pub mod config;
