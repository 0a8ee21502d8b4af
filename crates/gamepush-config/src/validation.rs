// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, parseable cron expressions, and sane offsets.

use crate::diagnostic::ConfigError;
use crate::model::GamepushConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &GamepushConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.service.log_level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "service.log_level `{}` must be one of {}",
            config.service.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if !(-12..=14).contains(&config.service.utc_offset_hours) {
        fail(format!(
            "service.utc_offset_hours must be between -12 and 14, got {}",
            config.service.utc_offset_hours
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.wechat.api_base.trim().is_empty() {
        fail("wechat.api_base must not be empty".to_string());
    }

    if config.catalog.api_url.trim().is_empty() {
        fail("catalog.api_url must not be empty".to_string());
    }

    if config.catalog.store_url.trim().is_empty() {
        fail("catalog.store_url must not be empty".to_string());
    }

    for (key, secs) in [
        ("wechat.timeout_secs", config.wechat.timeout_secs),
        ("qq.timeout_secs", config.qq.timeout_secs),
        ("catalog.timeout_secs", config.catalog.timeout_secs),
    ] {
        if secs == 0 {
            fail(format!("{key} must be at least 1"));
        }
    }

    let schedule = &config.schedule;
    for (key, expr) in [
        ("schedule.refresh", &schedule.refresh),
        ("schedule.dispatch_current", &schedule.dispatch_current),
        ("schedule.dispatch_next", &schedule.dispatch_next),
        ("schedule.retry", &schedule.retry),
    ] {
        if let Err(e) = expr.parse::<croner::Cron>() {
            fail(format!("{key} `{expr}` is not a valid cron expression: {e}"));
        }
    }

    if config.gateway.enabled {
        if config.gateway.port == 0 {
            fail("gateway.port must not be 0".to_string());
        }
        if config.gateway.host.trim().is_empty() {
            fail("gateway.host must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
