//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) generated per request and echoed back
//! - Metrics are cheap (atomic increments); recording without an installed
//!   exporter is a no-op

pub mod logging;
pub mod metrics;
