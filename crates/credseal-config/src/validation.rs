// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.
//! Key presence is not required here: operator commands such as `keygen` run
//! without a key. The codec startup check enforces presence before any request
//! is served.

use crate::diagnostic::ConfigError;
use crate::model::CredsealConfig;

/// Length in bytes of the process-wide symmetric key.
pub const KEY_LEN: usize = 32;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors rather than failing fast.
pub fn validate_config(config: &CredsealConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(key) = config.codec.key.as_deref() {
        if let Some(problem) = key_material_problem(key) {
            errors.push(ConfigError::Validation {
                message: format!("codec.key {problem}"),
            });
        }
    }

    if config.materializer.directory.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "materializer.directory must not be empty".to_string(),
        });
    }

    let extension = config.materializer.file_extension.as_str();
    if extension.is_empty()
        || !extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "materializer.file_extension `{extension}` must be non-empty and contain only letters, digits, `_` or `-`"
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` must be one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Describe why key material is unusable, or `None` if it is well formed.
///
/// The description mentions lengths only, never the material itself.
pub fn key_material_problem(material: &str) -> Option<String> {
    let material = material.trim();
    if material.is_empty() {
        return Some("must not be empty".to_string());
    }
    let is_hex_key =
        material.len() == KEY_LEN * 2 && material.chars().all(|c| c.is_ascii_hexdigit());
    if is_hex_key || material.len() == KEY_LEN {
        return None;
    }
    Some(format!(
        "must be {} hex characters or exactly {KEY_LEN} bytes, got {} bytes",
        KEY_LEN * 2,
        material.len()
    ))
}
