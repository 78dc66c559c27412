//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (gas limits > 0, known log level)
//! - Check endpoints parse as URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AdapterConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::blockchain::ClientOptions;
use crate::config::schema::AdapterConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &AdapterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_endpoint(&mut errors, "iotex.endpoint", &ClientOptions::from(&config.iotex));
    check_endpoint(
        &mut errors,
        "filecoin.endpoint",
        &ClientOptions::from(&config.filecoin),
    );

    if config.iotex.transfer_gas_limit == 0 {
        errors.push(ValidationError::new("iotex.transfer_gas_limit", "must be > 0"));
    }
    if config.iotex.execution_gas_limit == 0 {
        errors.push(ValidationError::new("iotex.execution_gas_limit", "must be > 0"));
    }
    if config.filecoin.transfer_gas_limit == 0 || config.filecoin.transfer_gas_limit > i64::MAX as u64 {
        errors.push(ValidationError::new(
            "filecoin.transfer_gas_limit",
            "must be > 0 and fit in i64",
        ));
    }
    if config.filecoin.execution_gas_limit == 0 || config.filecoin.execution_gas_limit > i64::MAX as u64 {
        errors.push(ValidationError::new(
            "filecoin.execution_gas_limit",
            "must be > 0 and fit in i64",
        ));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(errors: &mut Vec<ValidationError>, field: &str, opts: &ClientOptions) {
    if opts.endpoint.trim().is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
        return;
    }
    if let Err(e) = url::Url::parse(&opts.endpoint_url()) {
        errors.push(ValidationError::new(field, format!("invalid endpoint: {}", e)));
    }
}
