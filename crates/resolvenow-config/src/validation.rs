// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ResolveNowConfig;

/// Shortest accepted HMAC signing key, in bytes.
pub const MIN_SIGNING_KEY_LEN: usize = 16;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &ResolveNowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        fail(format!(
            "server.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.server.log_level
        ));
    }

    if let Some(key) = &config.auth.signing_key
        && key.len() < MIN_SIGNING_KEY_LEN
    {
        fail(format!(
            "auth.signing_key must be at least {MIN_SIGNING_KEY_LEN} bytes, got {}",
            key.len()
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.realtime.session_buffer == 0 {
        fail("realtime.session_buffer must be at least 1".to_string());
    }

    if config.attachments.max_files == 0 {
        fail("attachments.max_files must be at least 1".to_string());
    }
    if config.attachments.max_file_bytes == 0 {
        fail("attachments.max_file_bytes must be at least 1".to_string());
    }
    if config.attachments.allowed_extensions.is_empty() {
        fail("attachments.allowed_extensions must list at least one extension".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
