// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store wrappers that inject write failures and concurrent re-links.

use std::sync::Mutex;

use async_trait::async_trait;
use credseal_core::{AccountId, CredentialError, CredentialStore, StoredBlob, TenantId};
use credseal_storage::MemoryCredentialStore;

/// Reads pass through; every blob write fails.
pub(crate) struct ReadOnlyStore(pub(crate) MemoryCredentialStore);

/// Puts `relink` into the store right after the first read returns, as a
/// tenant re-linking the account mid-request would.
pub(crate) struct RelinkOnReadStore {
    pub(crate) inner: MemoryCredentialStore,
    pub(crate) relink: Mutex<Option<StoredBlob>>,
}

impl RelinkOnReadStore {
    pub(crate) fn new(inner: MemoryCredentialStore, relink: StoredBlob) -> Self {
        Self {
            inner,
            relink: Mutex::new(Some(relink)),
        }
    }
}

fn read_only() -> CredentialError {
    CredentialError::Store {
        source: "database is read-only".into(),
    }
}

#[async_trait]
impl CredentialStore for ReadOnlyStore {
    async fn get_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<StoredBlob>, CredentialError> {
        self.0.get_stored_blob(tenant, account).await
    }

    async fn put_stored_blob(
        &self,
        _tenant: &TenantId,
        _account: &AccountId,
        _blob: StoredBlob,
    ) -> Result<(), CredentialError> {
        Err(read_only())
    }

    async fn replace_stored_blob_if(
        &self,
        _tenant: &TenantId,
        _account: &AccountId,
        _expected: &StoredBlob,
        _replacement: StoredBlob,
    ) -> Result<bool, CredentialError> {
        Err(read_only())
    }

    async fn get_superseded_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<StoredBlob>, CredentialError> {
        self.0.get_superseded_blob(tenant, account).await
    }

    async fn get_key_check(&self) -> Result<Option<String>, CredentialError> {
        self.0.get_key_check().await
    }

    async fn record_key_check(&self, _check: &str) -> Result<String, CredentialError> {
        Err(read_only())
    }

    async fn delete_stored_blob(
        &self,
        _tenant: &TenantId,
        _account: &AccountId,
    ) -> Result<bool, CredentialError> {
        Err(read_only())
    }

    async fn list_accounts(&self) -> Result<Vec<(TenantId, AccountId)>, CredentialError> {
        self.0.list_accounts().await
    }
}

#[async_trait]
impl CredentialStore for RelinkOnReadStore {
    async fn get_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<StoredBlob>, CredentialError> {
        let read = self.inner.get_stored_blob(tenant, account).await?;
        let relink = self.relink.lock().unwrap().take();
        if let Some(blob) = relink {
            self.inner.put_stored_blob(tenant, account, blob).await?;
        }
        Ok(read)
    }

    async fn put_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        blob: StoredBlob,
    ) -> Result<(), CredentialError> {
        self.inner.put_stored_blob(tenant, account, blob).await
    }

    async fn replace_stored_blob_if(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        expected: &StoredBlob,
        replacement: StoredBlob,
    ) -> Result<bool, CredentialError> {
        self.inner
            .replace_stored_blob_if(tenant, account, expected, replacement)
            .await
    }

    async fn get_superseded_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<StoredBlob>, CredentialError> {
        self.inner.get_superseded_blob(tenant, account).await
    }

    async fn get_key_check(&self) -> Result<Option<String>, CredentialError> {
        self.inner.get_key_check().await
    }

    async fn record_key_check(&self, check: &str) -> Result<String, CredentialError> {
        self.inner.record_key_check(check).await
    }

    async fn delete_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<bool, CredentialError> {
        self.inner.delete_stored_blob(tenant, account).await
    }

    async fn list_accounts(&self) -> Result<Vec<(TenantId, AccountId)>, CredentialError> {
        self.inner.list_accounts().await
    }
}
