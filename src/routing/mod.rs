//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     routes/ directory
//!     → discovery.rs (find route files)
//!     → pattern.rs (file path → URL pattern)
//!     → module.rs (load module, detect implemented verbs)
//!     → loader.rs (resolve options, register)
//!     → table.rs (reject duplicates, compile axum Router)
//!
//! Incoming Request (method, path)
//!     → axum match on compiled patterns
//!     → table.rs adapter (params, body, schema, timeout)
//!     → route handler
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Capability detection through a trait, not export reflection
//! - Duplicate registrations rejected, first wins

pub mod discovery;
pub mod loader;
pub mod module;
pub mod pattern;
pub mod table;

pub use discovery::{find_route_files, RouteFile};
pub use loader::{load_routes, LoadReport};
pub use module::{
    handler, BodySchema, Handler, HandlerResult, ModuleError, ModuleSource, RouteModule,
    RouteOptions, RouteSchema, Verb,
};
pub use pattern::{PatternError, RoutePattern};
pub use table::{RegistrationError, RouteTable};
