//! Anansys game backend library.
//!
//! A file-based HTTP backend: every file under `routes/` becomes a route,
//! with its URL derived from the file's path. Services behind the routes
//! cover user and game-session lookups, health, and AI-driven mystery
//! creation through a structured generation client.

// Core subsystems
pub mod catalog;
pub mod config;
pub mod context;
pub mod http;
pub mod routing;
pub mod services;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub mod cli;

pub use catalog::RouteCatalog;
pub use config::AppConfig;
pub use context::AppContext;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
