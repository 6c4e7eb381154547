//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! HTTP layer adds:
//!     → x-request-id on every request and response
//!     → TraceLayer spans per request
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metrics are cheap (atomic increments) and off unless enabled

pub mod logging;
pub mod metrics;
