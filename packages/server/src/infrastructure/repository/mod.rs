//! Repository implementations.

pub mod inmemory;

pub use inmemory::{InMemoryDebateRepository, InMemoryPointsService, InMemoryUserDirectory};
