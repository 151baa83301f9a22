//! In-memory implementations of the domain ports.

pub mod debate;
pub mod points;
pub mod user;

pub use debate::InMemoryDebateRepository;
pub use points::InMemoryPointsService;
pub use user::InMemoryUserDirectory;
