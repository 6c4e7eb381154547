//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight short-circuit, origin echo)
//!     → session.rs (required headers, identity service verdict)
//!         → headers.rs (relay trust-bearing headers outbound)
//!     → Pass to application handler
//!         → token.rs (unverified user id hint, on demand)
//! ```
//!
//! # Design Decisions
//! - Fail closed: one identity call per request, no retries, any error rejects
//! - The identity service is the only authority on sessions
//! - Token claims read here are advisory and never authorize anything

pub mod cors;
pub mod headers;
pub mod session;
pub mod token;

pub use cors::CorsGate;
pub use headers::RelayedHeaders;
pub use session::{IdentityClient, SessionValidator};
pub use token::{extract_user_id, strip_bearer_prefix, TokenError, UserId};
