// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for credseal.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level credseal configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// Every section is optional; only `codec.key` has no usable default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredsealConfig {
    /// Envelope codec settings.
    #[serde(default)]
    pub codec: CodecConfig,

    /// Ephemeral credential file settings.
    #[serde(default)]
    pub materializer: MaterializerConfig,

    /// Credential store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Envelope codec configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// Process-wide symmetric key: 64 hex characters or exactly 32 bytes of text.
    ///
    /// Normally supplied through `CREDSEAL_CODEC_KEY` rather than a file.
    #[serde(default)]
    pub key: Option<String>,

    /// Re-seal blobs found in a legacy shape under the current scheme on read.
    #[serde(default = "default_reseal_legacy")]
    pub reseal_legacy: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            key: None,
            reseal_legacy: default_reseal_legacy(),
        }
    }
}

// Key material must never reach logs, even through `{:?}` on the whole config.
impl fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecConfig")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("reseal_legacy", &self.reseal_legacy)
            .finish()
    }
}

fn default_reseal_legacy() -> bool {
    true
}

/// Ephemeral credential file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MaterializerConfig {
    /// Directory holding materialized credential files. Created on first use.
    #[serde(default = "default_materializer_directory")]
    pub directory: String,

    /// Extension appended to every materialized file name.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

impl Default for MaterializerConfig {
    fn default() -> Self {
        Self {
            directory: default_materializer_directory(),
            file_extension: default_file_extension(),
        }
    }
}

fn default_materializer_directory() -> String {
    std::env::temp_dir().join("credseal").display().to_string()
}

fn default_file_extension() -> String {
    "json".to_string()
}

/// Credential store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite credential database.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("credseal").join("credentials.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "credentials.db".to_string())
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
