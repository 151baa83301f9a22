//! Infrastructure layer: in-memory adapters, the hub, and wire DTOs.

pub mod dto;
pub mod hub;
pub mod repository;
