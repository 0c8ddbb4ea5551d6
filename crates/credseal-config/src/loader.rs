// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./credseal.toml` > `~/.config/credseal/credseal.toml`
//! > `/etc/credseal/credseal.toml`, with environment variable overrides via the
//! `CREDSEAL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CredsealConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/credseal/credseal.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "credseal.toml";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "CREDSEAL_";

/// Path of the per-user XDG configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("credseal").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/credseal/credseal.toml`
/// 3. `~/.config/credseal/credseal.toml`
/// 4. `./credseal.toml`
/// 5. `CREDSEAL_*` environment variables
pub fn load_config() -> Result<CredsealConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CredsealConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CredsealConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CredsealConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CredsealConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CredsealConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because field names contain
/// underscores: `CREDSEAL_CODEC_RESEAL_LEGACY` must become
/// `codec.reseal_legacy`, not `codec.reseal.legacy`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| {
        let mapped = key
            .as_str()
            .replacen("codec_", "codec.", 1)
            .replacen("materializer_", "materializer.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
