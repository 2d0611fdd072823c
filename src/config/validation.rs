//! Semantic configuration validation.
//!
//! # Responsibilities
//! - Check addresses parse before anything binds
//! - Check generation parameters are within the API's accepted ranges
//! - Collect every problem instead of stopping at the first

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Most generation calls one request makes in sequence (game state manager,
/// then narrator).
pub const MAX_CHAINED_GENERATIONS: u64 = 2;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("generation.base_url '{0}' is not a valid URL")]
    InvalidBaseUrl(String),

    #[error("generation.temperature {0} is outside 0.0..=2.0")]
    TemperatureOutOfRange(f32),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("timeouts.request_secs ({request}) must be at least {MAX_CHAINED_GENERATIONS} x generation.timeout_secs ({generation})")]
    RequestShorterThanGeneration { request: u64, generation: u64 },

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let generation = &config.generation;
    if url::Url::parse(&generation.base_url).is_err() {
        errors.push(ValidationError::InvalidBaseUrl(generation.base_url.clone()));
    }
    if !(0.0..=2.0).contains(&generation.temperature) {
        errors.push(ValidationError::TemperatureOutOfRange(generation.temperature));
    }
    if generation.max_tokens == 0 {
        errors.push(ValidationError::Zero("generation.max_tokens"));
    }
    if generation.timeout_secs == 0 {
        errors.push(ValidationError::Zero("generation.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    } else if config.timeouts.request_secs < generation.timeout_secs.saturating_mul(MAX_CHAINED_GENERATIONS) {
        errors.push(ValidationError::RequestShorterThanGeneration {
            request: config.timeouts.request_secs,
            generation: generation.timeout_secs,
        });
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::UnknownLogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
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
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_bad_bind_address() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "localhost".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidAddress { field: "listener.bind_address", .. }]
        ));
    }

    #[test]
    fn test_request_timeout_must_cover_generation() {
        let mut config = AppConfig::default();
        config.timeouts.request_secs = 10;
        config.generation.timeout_secs = 30;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::RequestShorterThanGeneration {
                request: 10,
                generation: 30
            }]
        );
    }

    #[test]
    fn test_request_timeout_must_cover_chained_generations() {
        let mut config = AppConfig::default();
        config.timeouts.request_secs = 3;
        config.generation.timeout_secs = 2;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::RequestShorterThanGeneration {
                request: 3,
                generation: 2
            }]
        );

        config.timeouts.request_secs = 4;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
