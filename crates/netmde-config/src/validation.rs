// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! All problems are collected before failing so a single run reports every
//! bad value.

use crate::{ConfigError, ConfigResult, NetmdeConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    OutOfRange { field: String, reason: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, reason } => {
                write!(f, "Configuration value {} out of range: {}", field, reason)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &NetmdeConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every validation problem of `config`, in section order
pub fn collect_errors(config: &NetmdeConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_embedding(config, &mut errors);
    validate_random_network(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn out_of_range(field: &str, reason: &str) -> ConfigValidationError {
    ConfigValidationError::OutOfRange {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_embedding(config: &NetmdeConfig, errors: &mut Vec<ConfigValidationError>) {
    let embedding = &config.embedding;

    if embedding.repr_dim != 2 && embedding.repr_dim != 3 {
        errors.push(out_of_range("embedding.repr_dim", "must be 2 or 3"));
    }
    for (field, value) in [
        ("embedding.attraction_step", embedding.attraction_step),
        ("embedding.repulsion_step", embedding.repulsion_step),
        ("embedding.negative_step", embedding.negative_step),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(out_of_range(field, "must be finite and non-negative"));
        }
    }
    if !(0.0..=1.0).contains(&embedding.negative_fraction) {
        errors.push(out_of_range(
            "embedding.negative_fraction",
            "must be between 0.0 and 1.0",
        ));
    }
}

fn validate_random_network(config: &NetmdeConfig, errors: &mut Vec<ConfigValidationError>) {
    let random = &config.random_network;

    if !(0.0..=1.0).contains(&random.connection_probability) {
        errors.push(out_of_range(
            "random_network.connection_probability",
            "must be between 0.0 and 1.0",
        ));
    }
    if !random.max_dist.is_finite() || random.max_dist <= 0.0 {
        errors.push(out_of_range(
            "random_network.max_dist",
            "must be finite and positive",
        ));
    }
}

fn validate_logging(config: &NetmdeConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.system.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "system.log_level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: "must be 'text' or 'json'".to_string(),
        });
    }
    if config.logging.file_logging && config.logging.log_dir.is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.log_dir".to_string(),
            reason: "required when file_logging is enabled".to_string(),
        });
    }
}
