//! Timeout enforcement for outbound calls.
//!
//! # Responsibilities
//! - Build the shared outbound HTTP client with connect and total deadlines
//!
//! # Design Decisions
//! - Every outbound call has a deadline; the transport default is never relied on
//! - Timed-out calls surface as transport failures, same as refused connections

use std::time::Duration;

use crate::config::TimeoutConfig;

/// Build the client used for identity and storage calls.
pub fn outbound_client(config: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_secs))
        .timeout(Duration::from_secs(config.outbound_secs))
        .build()
}
