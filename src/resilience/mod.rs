//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to identity or storage:
//!     → timeouts.rs (connect + total deadline on the shared client)
//!     → single attempt; failure goes straight back to the caller
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: a struggling dependency is not sent extra load
//! - Dropping the inbound request drops its in-flight outbound calls

pub mod timeouts;

pub use timeouts::outbound_client;
