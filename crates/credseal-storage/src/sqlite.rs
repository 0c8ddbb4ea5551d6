// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite credential store.
//!
//! All statements run on tokio-rusqlite's single background thread. The blob
//! is stored as text together with a `blob_kind` marker so that object-valued
//! blobs come back as objects. Conditional replacement runs in an immediate
//! transaction, so writers in other processes cannot interleave.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use credseal_core::{AccountId, CredentialError, CredentialStore, StoredBlob, TenantId};
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tokio_rusqlite::Connection;
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS credential_accounts (
    tenant_id  TEXT NOT NULL,
    account_id TEXT NOT NULL,
    blob_kind  TEXT NOT NULL CHECK (blob_kind IN ('text', 'json')),
    blob       TEXT NOT NULL,
    superseded_kind TEXT CHECK (superseded_kind IN ('text', 'json')),
    superseded_blob TEXT,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (tenant_id, account_id)
);

CREATE TABLE IF NOT EXISTS credential_store_meta (
    name  TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

const META_KEY_CHECK: &str = "key_check";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const KIND_TEXT: &str = "text";
const KIND_JSON: &str = "json";

/// `CredentialStore` over a `credential_accounts` table.
pub struct SqliteCredentialStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCredentialStore").finish_non_exhaustive()
    }
}

impl SqliteCredentialStore {
    /// Open (creating if needed) the database file and its schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| CredentialError::Store {
                        source: Box::new(e),
                    })?;
            }
        }
        let conn = Connection::open(path)
            .await
            .map_err(|e| CredentialError::Store {
                source: Box::new(e),
            })?;
        let store = Self { conn };
        store.initialize(true).await?;
        debug!(path = %path.display(), "credential store opened");
        Ok(store)
    }

    /// In-memory database, for tests.
    pub async fn open_in_memory() -> Result<Self, CredentialError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| CredentialError::Store {
                source: Box::new(e),
            })?;
        let store = Self { conn };
        store.initialize(false).await?;
        Ok(store)
    }

    async fn initialize(&self, wal: bool) -> Result<(), CredentialError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal {
                    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                }
                conn.busy_timeout(BUSY_TIMEOUT)?;
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn get_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<StoredBlob>, CredentialError> {
        let tenant = tenant.as_str().to_string();
        let account = account.as_str().to_string();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(String, String)>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT blob_kind, blob FROM credential_accounts
                     WHERE tenant_id = ?1 AND account_id = ?2",
                )?;
                let result = stmt.query_row(params![tenant, account], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                });
                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)?;

        row.map(|(kind, text)| decode_blob(&kind, text)).transpose()
    }

    async fn put_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        blob: StoredBlob,
    ) -> Result<(), CredentialError> {
        let tenant_id = tenant.as_str().to_string();
        let account_id = account.as_str().to_string();
        let (kind, text) = blob_columns(&blob);
        let updated_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO credential_accounts (tenant_id, account_id, blob_kind, blob, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (tenant_id, account_id) DO UPDATE SET
                         blob_kind = excluded.blob_kind,
                         blob = excluded.blob,
                         superseded_kind = NULL,
                         superseded_blob = NULL,
                         updated_at = excluded.updated_at",
                    params![tenant_id, account_id, kind, text, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(tenant = %tenant, account = %account, "stored credential blob");
        Ok(())
    }

    async fn replace_stored_blob_if(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        expected: &StoredBlob,
        replacement: StoredBlob,
    ) -> Result<bool, CredentialError> {
        let tenant_id = tenant.as_str().to_string();
        let account_id = account.as_str().to_string();
        let expected = expected.clone();
        let (kind, text) = blob_columns(&replacement);
        let updated_at = chrono::Utc::now().to_rfc3339();

        let replaced = self
            .conn
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let current: Option<(String, String)> = tx
                    .query_row(
                        "SELECT blob_kind, blob FROM credential_accounts
                         WHERE tenant_id = ?1 AND account_id = ?2",
                        params![tenant_id, account_id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
                let matches = current
                    .as_ref()
                    .is_some_and(|(kind, text)| row_matches(kind, text, &expected));
                if !matches {
                    return Ok(false);
                }
                tx.execute(
                    "UPDATE credential_accounts SET
                         superseded_kind = COALESCE(superseded_kind, blob_kind),
                         superseded_blob = COALESCE(superseded_blob, blob),
                         blob_kind = ?3,
                         blob = ?4,
                         updated_at = ?5
                     WHERE tenant_id = ?1 AND account_id = ?2",
                    params![tenant_id, account_id, kind, text, updated_at],
                )?;
                tx.commit()?;
                Ok(true)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(tenant = %tenant, account = %account, replaced, "conditional credential blob replace");
        Ok(replaced)
    }

    async fn get_superseded_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<StoredBlob>, CredentialError> {
        let tenant = tenant.as_str().to_string();
        let account = account.as_str().to_string();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(String, String)>, rusqlite::Error> {
                conn.query_row(
                    "SELECT superseded_kind, superseded_blob FROM credential_accounts
                     WHERE tenant_id = ?1 AND account_id = ?2
                       AND superseded_kind IS NOT NULL AND superseded_blob IS NOT NULL",
                    params![tenant, account],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?;

        row.map(|(kind, text)| decode_blob(&kind, text)).transpose()
    }

    async fn get_key_check(&self) -> Result<Option<String>, CredentialError> {
        self.conn
            .call(|conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM credential_store_meta WHERE name = ?1",
                    params![META_KEY_CHECK],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn record_key_check(&self, check: &str) -> Result<String, CredentialError> {
        let check = check.to_string();
        self.conn
            .call(move |conn| -> Result<String, rusqlite::Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                tx.execute(
                    "INSERT INTO credential_store_meta (name, value) VALUES (?1, ?2)
                     ON CONFLICT (name) DO NOTHING",
                    params![META_KEY_CHECK, check],
                )?;
                let recorded: String = tx.query_row(
                    "SELECT value FROM credential_store_meta WHERE name = ?1",
                    params![META_KEY_CHECK],
                    |row| row.get(0),
                )?;
                tx.commit()?;
                Ok(recorded)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete_stored_blob(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<bool, CredentialError> {
        let tenant_id = tenant.as_str().to_string();
        let account_id = account.as_str().to_string();
        let deleted = self
            .conn
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "DELETE FROM credential_accounts WHERE tenant_id = ?1 AND account_id = ?2",
                    params![tenant_id, account_id],
                )
            })
            .await
            .map_err(map_tr_err)?;
        debug!(tenant = %tenant, account = %account, deleted, "deleted credential blob");
        Ok(deleted > 0)
    }

    async fn list_accounts(&self) -> Result<Vec<(TenantId, AccountId)>, CredentialError> {
        let rows = self
            .conn
            .call(|conn| -> Result<Vec<(String, String)>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT tenant_id, account_id FROM credential_accounts
                     ORDER BY tenant_id, account_id",
                )?;
                let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
                let mut accounts = Vec::new();
                for row in rows {
                    accounts.push(row?);
                }
                Ok(accounts)
            })
            .await
            .map_err(map_tr_err)?;

        Ok(rows
            .into_iter()
            .map(|(tenant, account)| (TenantId::new(tenant), AccountId::new(account)))
            .collect())
    }
}

fn blob_columns(blob: &StoredBlob) -> (&'static str, String) {
    let kind = match blob {
        StoredBlob::Serialized(_) => KIND_TEXT,
        StoredBlob::Structured(_) => KIND_JSON,
    };
    (kind, blob.to_storage_string())
}

/// Whether a stored row holds `expected`. JSON rows compare as parsed objects.
fn row_matches(kind: &str, text: &str, expected: &StoredBlob) -> bool {
    match expected {
        StoredBlob::Serialized(expected) => kind == KIND_TEXT && text == expected,
        StoredBlob::Structured(expected) => {
            kind == KIND_JSON
                && matches!(
                    serde_json::from_str::<serde_json::Value>(text),
                    Ok(serde_json::Value::Object(map)) if map == *expected
                )
        }
    }
}

fn decode_blob(kind: &str, text: String) -> Result<StoredBlob, CredentialError> {
    match kind {
        KIND_JSON => match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(serde_json::Value::Object(map)) => Ok(StoredBlob::Structured(map)),
            _ => Err(CredentialError::Store {
                source: "credential row marked json does not hold a JSON object".into(),
            }),
        },
        _ => Ok(StoredBlob::Serialized(text)),
    }
}

/// Convert tokio-rusqlite errors to `CredentialError::Store`.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> CredentialError {
    CredentialError::Store {
        source: format!("credential database error: {e}").into(),
    }
}
