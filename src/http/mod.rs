//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware, built-in routes)
//!     → [routing table dispatches to a route handler]
//!     → request.rs (params, decoded body)
//!     → response.rs (status, body, error envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::RouteRequest;
pub use response::{ApiError, ResponseBody, RouteResponse};
pub use server::HttpServer;
