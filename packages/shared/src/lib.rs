//! Shared utilities for the Agora server.
//!
//! - `logger`: tracing subscriber setup
//! - `time`: clock abstraction for testability

pub mod logger;
pub mod time;
