// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account credential lifecycle: link, open, materialize, unlink.
//!
//! Request handlers go through [`CredentialVault`] instead of touching the
//! codec, store and materializer separately:
//! - linking seals the plaintext and replaces the stored blob wholesale
//! - opening classifies and decrypts whatever shape the row holds
//! - legacy rows are re-sealed under the current scheme on read
//!
//! A re-seal only happens when the store's recorded key check matches the
//! process key, and only replaces the exact blob that was read. The replaced
//! legacy blob is kept by the store, and opening falls back to it when the
//! current blob no longer decrypts.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use credseal_codec::{CredentialCodec, OpenedSecret};
use credseal_core::{
    AccountId, CredentialError, CredentialStore, PlaintextSecret, StoredBlob, TenantId,
};
use credseal_materialize::{Materializer, ScopeKey};
use tracing::{debug, info, warn};

pub(crate) const KEY_MISMATCH: &str =
    "codec.key does not match the key check recorded in the credential store";

/// How the process key relates to the key check recorded in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCheckStatus {
    /// The store records this key.
    Match,
    /// The store records a different key.
    Mismatch,
    /// The store has no key check yet.
    Unrecorded,
}

/// A decrypted credential together with the blob it came from.
pub(crate) struct StoredSecret {
    /// The blob as read; the expected value of a conditional re-seal.
    pub(crate) blob: StoredBlob,
    pub(crate) opened: OpenedSecret,
}

/// Codec, store and materializer for one process.
pub struct CredentialVault<S> {
    codec: Arc<CredentialCodec>,
    store: S,
    materializer: Materializer,
    reseal_legacy: bool,
}

impl<S> std::fmt::Debug for CredentialVault<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("materializer", &self.materializer)
            .field("reseal_legacy", &self.reseal_legacy)
            .finish_non_exhaustive()
    }
}

impl<S: CredentialStore> CredentialVault<S> {
    /// Legacy re-seal on read is enabled by default.
    pub fn new(codec: Arc<CredentialCodec>, store: S, materializer: Materializer) -> Self {
        Self {
            codec,
            store,
            materializer,
            reseal_legacy: true,
        }
    }

    pub fn with_legacy_reseal(mut self, enabled: bool) -> Self {
        self.reseal_legacy = enabled;
        self
    }

    pub fn codec(&self) -> &CredentialCodec {
        &self.codec
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn materializer(&self) -> &Materializer {
        &self.materializer
    }

    /// Compare the process key with the key check recorded in the store.
    pub async fn key_check_status(&self) -> Result<KeyCheckStatus, CredentialError> {
        Ok(match self.store.get_key_check().await? {
            Some(recorded) if recorded == self.codec.key_check() => KeyCheckStatus::Match,
            Some(_) => KeyCheckStatus::Mismatch,
            None => KeyCheckStatus::Unrecorded,
        })
    }

    /// Record the process key as the store's key unless one is recorded.
    ///
    /// Returns [`KeyCheckStatus::Mismatch`] when another key got there first.
    pub async fn record_key_check(&self) -> Result<KeyCheckStatus, CredentialError> {
        let ours = self.codec.key_check();
        let recorded = self.store.record_key_check(&ours).await?;
        Ok(if recorded == ours {
            KeyCheckStatus::Match
        } else {
            KeyCheckStatus::Mismatch
        })
    }

    /// Seal and store a credential. Re-linking replaces the previous blob.
    ///
    /// Fails with a configuration error when the store belongs to another key.
    pub async fn link_account(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        plaintext: &[u8],
    ) -> Result<(), CredentialError> {
        if self.record_key_check().await? == KeyCheckStatus::Mismatch {
            warn!(tenant = %tenant, account = %account, "refusing to link account under a mismatched key");
            return Err(CredentialError::Configuration(KEY_MISMATCH.to_string()));
        }
        let blob = self.codec.seal_secret(plaintext)?;
        self.store.put_stored_blob(tenant, account, blob).await?;
        info!(tenant = %tenant, account = %account, "account credential linked");
        Ok(())
    }

    /// Delete a stored credential. Returns whether one existed.
    pub async fn unlink_account(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<bool, CredentialError> {
        let existed = self.store.delete_stored_blob(tenant, account).await?;
        info!(tenant = %tenant, account = %account, existed, "account credential unlinked");
        Ok(existed)
    }

    /// Fetch and decrypt an account's credential.
    pub async fn open_account_secret(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<PlaintextSecret, CredentialError> {
        let stored = self.open_stored(tenant, account).await?;

        if stored.opened.legacy && self.reseal_legacy {
            if let Err(err) = self.reseal_if_verified(tenant, account, &stored).await {
                warn!(
                    tenant = %tenant,
                    account = %account,
                    error_kind = err.kind(),
                    "failed to re-seal legacy credential; keeping stored blob"
                );
            }
        }

        Ok(stored.opened.plaintext)
    }

    /// Open the account credential and pass a materialized file path to `f`.
    pub async fn with_account_file<T, F>(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        operation: &str,
        f: F,
    ) -> Result<T, CredentialError>
    where
        F: FnOnce(&Path) -> T,
    {
        let secret = self.open_account_secret(tenant, account).await?;
        let scope = ScopeKey::new(operation, tenant, account);
        self.materializer
            .with_materialized_file(secret.expose(), &scope, f)
    }

    /// Async form of [`CredentialVault::with_account_file`].
    pub async fn with_account_file_async<T, F, Fut>(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        operation: &str,
        f: F,
    ) -> Result<T, CredentialError>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = T>,
    {
        let secret = self.open_account_secret(tenant, account).await?;
        let scope = ScopeKey::new(operation, tenant, account);
        self.materializer
            .with_materialized_file_async(secret.expose(), &scope, f)
            .await
    }

    pub(crate) async fn open_stored(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<StoredSecret, CredentialError> {
        let blob = self
            .store
            .get_stored_blob(tenant, account)
            .await?
            .ok_or_else(|| CredentialError::AccountNotLinked {
                tenant: tenant.clone(),
                account: account.clone(),
            })?;

        let err = match self.codec.open_classified(&blob) {
            Ok(opened) => return Ok(StoredSecret { blob, opened }),
            Err(err) => err,
        };

        if matches!(err, CredentialError::Decrypt(_)) {
            if let Some(opened) = self.open_superseded(tenant, account).await? {
                return Ok(StoredSecret { blob, opened });
            }
        }

        warn!(
            tenant = %tenant,
            account = %account,
            error_kind = err.kind(),
            "failed to open account credential"
        );
        Err(err)
    }

    /// Open the blob kept from before the first re-seal. The result is marked
    /// legacy so that a verified re-seal replaces the unreadable current blob.
    async fn open_superseded(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<OpenedSecret>, CredentialError> {
        let Some(superseded) = self.store.get_superseded_blob(tenant, account).await? else {
            return Ok(None);
        };
        match self.codec.open_classified(&superseded) {
            Ok(mut opened) => {
                warn!(
                    tenant = %tenant,
                    account = %account,
                    from_shape = opened.shape,
                    "current credential blob failed to decrypt; opened superseded blob"
                );
                opened.legacy = true;
                Ok(Some(opened))
            }
            Err(_) => Ok(None),
        }
    }

    async fn reseal_if_verified(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        stored: &StoredSecret,
    ) -> Result<(), CredentialError> {
        match self.key_check_status().await? {
            KeyCheckStatus::Match => {
                self.reseal(tenant, account, stored).await?;
            }
            KeyCheckStatus::Mismatch => warn!(
                tenant = %tenant,
                account = %account,
                "process key does not match the store key check; legacy credential left in place"
            ),
            KeyCheckStatus::Unrecorded => debug!(
                tenant = %tenant,
                account = %account,
                "no key check recorded; legacy credential left in place"
            ),
        }
        Ok(())
    }

    /// Replace the blob that was read with a fresh seal of its plaintext.
    ///
    /// Returns `false` when the row changed since it was read.
    pub(crate) async fn reseal(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        stored: &StoredSecret,
    ) -> Result<bool, CredentialError> {
        let replacement = self.codec.seal_secret(stored.opened.plaintext.expose())?;
        let replaced = self
            .store
            .replace_stored_blob_if(tenant, account, &stored.blob, replacement)
            .await?;
        if replaced {
            debug!(
                tenant = %tenant,
                account = %account,
                from_shape = stored.opened.shape,
                "re-sealed legacy credential"
            );
        } else {
            debug!(
                tenant = %tenant,
                account = %account,
                "credential changed since it was read; re-seal skipped"
            );
        }
        Ok(replaced)
    }
}

/// Mask a secret for operator display: `"EAAB...9xYz"`.
///
/// Values shorter than 10 characters are fully masked as `"****"`.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
