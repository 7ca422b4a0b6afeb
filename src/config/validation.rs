//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every extra redaction pattern compiles
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate adapter registrations
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LoggingConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{AdapterKind, LoggingConfig};
use crate::redaction::SecretPattern;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem, keyed by its dotted config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed config for semantic errors.
pub fn validate_config(config: &LoggingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.callbacks.timeout_ms == 0 {
        errors.push(ValidationError::new(
            "callbacks.timeout_ms",
            "must be greater than zero",
        ));
    }

    let mut seen = HashSet::new();
    for kind in &config.callbacks.adapters {
        if !seen.insert(*kind) {
            errors.push(ValidationError::new(
                "callbacks.adapters",
                format!("{kind:?} is registered more than once"),
            ));
        }
    }

    for (i, extra) in config.redaction.extra_patterns.iter().enumerate() {
        let field = format!("redaction.extra_patterns[{i}]");
        if extra.name.trim().is_empty() {
            errors.push(ValidationError::new(&field, "name must not be empty"));
        }
        if let Err(e) = SecretPattern::new(extra.name.clone(), &extra.pattern) {
            errors.push(ValidationError::new(&field, e.to_string()));
        }
    }

    if config.callbacks.adapters.contains(&AdapterKind::Langfuse) {
        if let Err(e) = Url::parse(&config.langfuse.host) {
            errors.push(ValidationError::new(
                "langfuse.host",
                format!("invalid URL {:?}: {e}", config.langfuse.host),
            ));
        }
        if config.langfuse.request_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "langfuse.request_timeout_secs",
                "must be greater than zero",
            ));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!(
                "unknown level {:?}, expected one of {}",
                config.observability.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "invalid socket address {:?}",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
