// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory credential store for tests and single-process tools.

use std::collections::BTreeMap;

use async_trait::async_trait;
use credseal_core::{AccountId, CredentialError, CredentialStore, StoredBlob, TenantId};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Record {
    blob: StoredBlob,
    superseded: Option<StoredBlob>,
}

/// A `CredentialStore` backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    records: RwLock<BTreeMap<(TenantId, AccountId), Record>>,
    key_check: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<StoredBlob>, CredentialError> {
        let records = self.records.read().await;
        Ok(records
            .get(&(tenant.clone(), account.clone()))
            .map(|record| record.blob.clone()))
    }

    async fn put_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        blob: StoredBlob,
    ) -> Result<(), CredentialError> {
        self.records.write().await.insert(
            (tenant.clone(), account.clone()),
            Record {
                blob,
                superseded: None,
            },
        );
        Ok(())
    }

    async fn replace_stored_blob_if(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        expected: &StoredBlob,
        replacement: StoredBlob,
    ) -> Result<bool, CredentialError> {
        let mut records = self.records.write().await;
        match records.get_mut(&(tenant.clone(), account.clone())) {
            Some(record) if record.blob == *expected => {
                let previous = std::mem::replace(&mut record.blob, replacement);
                record.superseded.get_or_insert(previous);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_superseded_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<StoredBlob>, CredentialError> {
        let records = self.records.read().await;
        Ok(records
            .get(&(tenant.clone(), account.clone()))
            .and_then(|record| record.superseded.clone()))
    }

    async fn get_key_check(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.key_check.read().await.clone())
    }

    async fn record_key_check(&self, check: &str) -> Result<String, CredentialError> {
        let mut key_check = self.key_check.write().await;
        Ok(key_check.get_or_insert_with(|| check.to_string()).clone())
    }

    async fn delete_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<bool, CredentialError> {
        let removed = self
            .records
            .write()
            .await
            .remove(&(tenant.clone(), account.clone()));
        Ok(removed.is_some())
    }

    async fn list_accounts(&self) -> Result<Vec<(TenantId, AccountId)>, CredentialError> {
        Ok(self.records.read().await.keys().cloned().collect())
    }
}
