//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that service base URLs parse and can be joined onto
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("storage.base_url must end with '/', got '{0}'")]
    StorageBaseWithoutSlash(String),

    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("session.public_path must start with '/', got '{0}'")]
    RelativePublicPath(String),

    #[error("listener.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if Url::parse(&config.identity.base_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "identity.base_url",
            value: config.identity.base_url.clone(),
        });
    }

    match Url::parse(&config.storage.base_url) {
        Ok(_) if !config.storage.base_url.ends_with('/') => {
            errors.push(ValidationError::StorageBaseWithoutSlash(
                config.storage.base_url.clone(),
            ));
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidUrl {
            field: "storage.base_url",
            value: config.storage.base_url.clone(),
        }),
    }

    if let Some(public) = &config.session.public_path {
        if !public.starts_with('/') {
            errors.push(ValidationError::RelativePublicPath(public.clone()));
        }
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("connect_secs", timeouts.connect_secs),
        ("outbound_secs", timeouts.outbound_secs),
        ("inbound_secs", timeouts.inbound_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.identity.base_url = "not a url".into();
        config.storage.base_url = "http://storage:8082/api".into();
        config.timeouts.outbound_secs = 0;
        config.session.public_path = Some("health".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroTimeout("outbound_secs")));
        assert!(errors.contains(&ValidationError::StorageBaseWithoutSlash(
            "http://storage:8082/api".into()
        )));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
