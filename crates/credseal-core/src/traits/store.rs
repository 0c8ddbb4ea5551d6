// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential store adapter trait for persistence backends.

use async_trait::async_trait;

use crate::error::CredentialError;
use crate::types::{AccountId, StoredBlob, TenantId};

/// Persistence of the opaque blob field of tenant account records.
///
/// The codec never talks to a database directly; it reads and replaces whole
/// blobs through this trait. Implementations must treat the blob as opaque
/// and return it exactly as stored.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the stored blob for an account, or `None` if it was never linked.
    async fn get_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<StoredBlob>, CredentialError>;

    /// Insert or wholesale replace the stored blob for an account.
    ///
    /// A re-link starts over: any superseded blob kept by
    /// [`CredentialStore::replace_stored_blob_if`] is discarded.
    async fn put_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        blob: StoredBlob,
    ) -> Result<(), CredentialError>;

    /// Atomically replace the stored blob only if it still equals `expected`.
    ///
    /// Returns `false` and changes nothing when the record is gone or holds a
    /// different blob. On success the replaced blob is kept as the account's
    /// superseded blob, unless one is already kept, so the first value ever
    /// replaced this way stays recoverable.
    async fn replace_stored_blob_if(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        expected: &StoredBlob,
        replacement: StoredBlob,
    ) -> Result<bool, CredentialError>;

    /// The blob kept by the first successful
    /// [`CredentialStore::replace_stored_blob_if`] since the last link.
    async fn get_superseded_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<StoredBlob>, CredentialError>;

    /// The key fingerprint recorded for this store, if any.
    async fn get_key_check(&self) -> Result<Option<String>, CredentialError>;

    /// Record `check` as the store's key fingerprint unless one is already
    /// recorded. Returns the fingerprint in effect afterwards.
    async fn record_key_check(&self, check: &str) -> Result<String, CredentialError>;

    /// Delete the stored blob. Returns whether a record existed.
    async fn delete_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<bool, CredentialError>;

    /// List every linked account, ordered by tenant then account.
    async fn list_accounts(&self) -> Result<Vec<(TenantId, AccountId)>, CredentialError>;
}
