//! Configuration validation.
//!
//! # Responsibilities
//! - Parse duration strings into `Duration`
//! - Validate value ranges (interval and timeouts > 0)
//! - Require at least one endpoint, and one entry point when filtering
//! - Reject header names/values the HTTP client would refuse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProviderConfig → Result<Settings, Vec<ValidationError>>
//! - Runs before the provider is allowed to start

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::time::Instant;

use reqwest::header::{HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::{FetchConfig, ProviderConfig, TransformPolicy};
use crate::registry::EndpointRegistry;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid duration '{value}': {reason}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be greater than 0")]
    NonPositiveDuration(&'static str),

    #[error("{field}: duration '{value}' is too large")]
    DurationOutOfRange { field: &'static str, value: String },

    #[error("providerName must not be empty")]
    EmptyProviderName,

    #[error("must provide at least 1 endpoint")]
    NoEndpoints,

    #[error("must provide at least 1 entrypoint when filtering by entrypoint")]
    NoEntrypoints,

    #[error("endpoints.{0}: endpoint address is empty")]
    EmptyAddress(String),

    #[error("endpoints.{endpoint}: invalid header '{header}'")]
    InvalidHeader { endpoint: String, header: String },

    #[error("fetch.path must start with '/', got '{0}'")]
    InvalidFetchPath(String),
}

/// Validated, typed view of a `ProviderConfig`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider_name: String,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    pub emit_timeout: Duration,
    pub policy: TransformPolicy,
    pub entrypoints: BTreeSet<String>,
    pub endpoints: EndpointRegistry,
    pub skip_empty_cycles: bool,
    pub fetch: FetchConfig,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProviderConfig) -> Result<Settings, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let poll_interval = positive_duration("pollInterval", &config.poll_interval, &mut errors);
    let poll_timeout = positive_duration("pollTimeout", &config.poll_timeout, &mut errors);
    let emit_timeout = positive_duration("emitTimeout", &config.emit_timeout, &mut errors);

    if config.provider_name.trim().is_empty() {
        errors.push(ValidationError::EmptyProviderName);
    }

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    if config.policy == TransformPolicy::FilterEntrypoints && config.entrypoints.is_empty() {
        errors.push(ValidationError::NoEntrypoints);
    }

    for (name, endpoint) in &config.endpoints {
        if endpoint.endpoint.trim().is_empty() {
            errors.push(ValidationError::EmptyAddress(name.clone()));
        }
        for (header, value) in &endpoint.headers {
            let valid = HeaderName::from_bytes(header.as_bytes()).is_ok()
                && HeaderValue::from_str(value).is_ok();
            if !valid {
                errors.push(ValidationError::InvalidHeader {
                    endpoint: name.clone(),
                    header: header.clone(),
                });
            }
        }
    }

    if !config.fetch.path.starts_with('/') {
        errors.push(ValidationError::InvalidFetchPath(config.fetch.path.clone()));
    }

    match (poll_interval, poll_timeout, emit_timeout) {
        (Some(poll_interval), Some(poll_timeout), Some(emit_timeout)) if errors.is_empty() => {
            Ok(Settings {
                provider_name: config.provider_name.clone(),
                poll_interval,
                poll_timeout,
                emit_timeout,
                policy: config.policy,
                entrypoints: config.entrypoints.iter().cloned().collect(),
                endpoints: EndpointRegistry::from_config(&config.endpoints),
                skip_empty_cycles: config.skip_empty_cycles,
                fetch: config.fetch.clone(),
            })
        }
        _ => Err(errors),
    }
}

fn positive_duration(
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Duration> {
    match humantime::parse_duration(value.trim()) {
        Ok(d) if d.is_zero() => {
            errors.push(ValidationError::NonPositiveDuration(field));
            None
        }
        // The driver schedules its first tick at now + interval and the
        // next one an interval later; both must stay representable.
        Ok(d) if Instant::now().checked_add(d).and_then(|t| t.checked_add(d)).is_none() => {
            errors.push(ValidationError::DurationOutOfRange {
                field,
                value: value.to_string(),
            });
            None
        }
        Ok(d) => Some(d),
        Err(e) => {
            errors.push(ValidationError::InvalidDuration {
                field,
                value: value.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}
