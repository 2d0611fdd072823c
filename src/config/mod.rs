//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → consumed once at startup by the server and the generation client
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; route registration happens once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AppConfig, GenerationConfig, ListenerConfig, ObservabilityConfig, RoutesConfig, TimeoutConfig,
};
