//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes, addresses)
//! - Check each vhost declares an app
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SwitchConfig → Result<(), Vec<ValidationError>>
//! - Host grammar and app shapes are checked at registration, not here

use std::net::SocketAddr;

use axum::http::StatusCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::SwitchConfig;

/// A single semantic problem in the config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &SwitchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than zero",
        ));
    }

    if StatusCode::from_u16(config.fallback.status).is_err() {
        errors.push(ValidationError::new(
            "fallback.status",
            format!("{} is not an HTTP status code", config.fallback.status),
        ));
    }

    if let Err(e) = EnvFilter::try_new(&config.observability.log_level) {
        errors.push(ValidationError::new(
            "observability.log_level",
            e.to_string(),
        ));
    }

    for (i, vhost) in config.vhosts.iter().enumerate() {
        if vhost.app.is_none() {
            errors.push(ValidationError::new(format!("vhosts[{i}].app"), "missing"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
