//! Business logic behind the route handlers.
//!
//! Lookups are mocked; the AI services delegate to the structured generation
//! client carried in the application context.

pub mod ai;
pub mod health;
pub mod sessions;
pub mod users;

pub use health::{health_response, HealthError, HealthProbe, HealthStatus, ProcessProbe};
pub use sessions::{session_by_id, GameSession};
pub use users::{all_users, user_by_id, User};
