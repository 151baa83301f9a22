//! Data Transfer Objects (DTOs) for the debate hub.
//!
//! DTOs are organized by protocol:
//! - `websocket`: inbound frames and outbound room envelopes
//! - `http`: HTTP API request / response bodies
//! - `conversion`: Domain Model ⇔ DTO conversions

pub mod conversion;
pub mod http;
pub mod websocket;
