// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations. `main` owns stdin/stdout; these take and
//! return plain values.

use std::path::PathBuf;

use credseal_codec::{CredentialCodec, Key, parse_envelope_shape};
use credseal_config::CredsealConfig;
use credseal_core::{CredentialError, StoredBlob};
use credseal_storage::SqliteCredentialStore;
use credseal_vault::{KeyCheckStatus, MigrationReport, mask_secret, vault_from_config};
use tracing::info;

/// Fresh random key in the hex form accepted by `codec.key`.
pub fn keygen() -> Result<String, CredentialError> {
    Ok(Key::generate()?.to_hex().as_str().to_string())
}

/// Seal stdin bytes. A single trailing newline is dropped.
pub fn seal(codec: &CredentialCodec, input: &[u8]) -> Result<String, CredentialError> {
    let plaintext = input.strip_suffix(b"\n").unwrap_or(input);
    Ok(codec.seal_secret(plaintext)?.to_storage_string())
}

/// Open a blob read from stdin; masked unless `reveal`.
pub fn open(codec: &CredentialCodec, input: &str, reveal: bool) -> Result<Vec<u8>, CredentialError> {
    let opened = codec.open_classified(&blob_from_input(input))?;
    if reveal {
        return Ok(opened.plaintext.expose().to_vec());
    }
    let text = String::from_utf8_lossy(opened.plaintext.expose());
    Ok(format!("{} ({})", mask_secret(&text), opened.shape).into_bytes())
}

/// Shape label of a blob read from stdin. Needs no key.
pub fn inspect(input: &str) -> &'static str {
    parse_envelope_shape(&blob_from_input(input)).label()
}

/// Run the legacy re-seal sweep over a SQLite credential store.
///
/// With `record_key_check`, a store without a key check first records the
/// configured key as its own.
pub async fn migrate(
    config: &CredsealConfig,
    database: Option<PathBuf>,
    record_key_check: bool,
) -> Result<MigrationReport, CredentialError> {
    let path = database.unwrap_or_else(|| PathBuf::from(&config.storage.database_path));
    let store = SqliteCredentialStore::open(&path).await?;
    let vault = vault_from_config(config, store)?;
    if record_key_check && vault.record_key_check().await? == KeyCheckStatus::Match {
        info!(path = %path.display(), "credential store key check recorded or confirmed");
    }
    info!(path = %path.display(), "starting legacy credential migration");
    vault.migrate_legacy_blobs().await
}

/// Effective configuration as TOML, with the key redacted.
pub fn show_config(config: &CredsealConfig) -> Result<String, CredentialError> {
    let mut redacted = config.clone();
    if redacted.codec.key.is_some() {
        redacted.codec.key = Some("[REDACTED]".to_string());
    }
    toml::to_string_pretty(&redacted)
        .map_err(|e| CredentialError::Internal(format!("failed to render config: {e}")))
}

fn blob_from_input(input: &str) -> StoredBlob {
    StoredBlob::Serialized(input.trim().to_string())
}
