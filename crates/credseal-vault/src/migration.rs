// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sweep that re-seals every legacy-shaped blob under the current scheme.
//!
//! Runs independently of the on-read re-seal setting, but only under a
//! process key that matches the store's recorded key check. Rows that fail
//! to open are reported and left untouched, and rows re-linked while the
//! sweep runs are skipped.

use std::fmt;

use credseal_core::{AccountId, CredentialError, CredentialStore, TenantId};
use tracing::{info, warn};

use crate::vault::{CredentialVault, KEY_MISMATCH, KeyCheckStatus};

const KEY_UNRECORDED: &str =
    "the credential store has no key check recorded; record the process key before migrating";

/// An account the sweep could not upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFailure {
    pub tenant: TenantId,
    pub account: AccountId,
    /// Error class from [`CredentialError::kind`].
    pub error_kind: &'static str,
}

/// Report of what the sweep did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Accounts whose legacy blob was replaced.
    pub resealed: Vec<(TenantId, AccountId)>,
    /// Accounts already in the current shape.
    pub current: Vec<(TenantId, AccountId)>,
    /// Accounts whose blob changed between the read and the write back.
    pub skipped: Vec<(TenantId, AccountId)>,
    /// Accounts that could not be opened or written back.
    pub failed: Vec<MigrationFailure>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resealed {}, already current {}, skipped {}, failed {}",
            self.resealed.len(),
            self.current.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

enum Outcome {
    Resealed,
    Current,
    Skipped,
}

impl<S: CredentialStore> CredentialVault<S> {
    /// Re-seal every legacy blob in the store.
    ///
    /// Refuses to start unless the store's key check matches the process key.
    /// After that only a failure to list accounts aborts the sweep.
    pub async fn migrate_legacy_blobs(&self) -> Result<MigrationReport, CredentialError> {
        match self.key_check_status().await? {
            KeyCheckStatus::Match => {}
            KeyCheckStatus::Mismatch => {
                return Err(CredentialError::Configuration(KEY_MISMATCH.to_string()));
            }
            KeyCheckStatus::Unrecorded => {
                return Err(CredentialError::Configuration(KEY_UNRECORDED.to_string()));
            }
        }

        let mut report = MigrationReport::default();

        for (tenant, account) in self.store().list_accounts().await? {
            let outcome = match self.open_stored(&tenant, &account).await {
                Ok(stored) if stored.opened.legacy => {
                    self.reseal(&tenant, &account, &stored)
                        .await
                        .map(|replaced| {
                            if replaced {
                                Outcome::Resealed
                            } else {
                                Outcome::Skipped
                            }
                        })
                }
                Ok(_) => Ok(Outcome::Current),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(Outcome::Resealed) => report.resealed.push((tenant, account)),
                Ok(Outcome::Current) => report.current.push((tenant, account)),
                Ok(Outcome::Skipped) => report.skipped.push((tenant, account)),
                // Unlinked between listing and reading.
                Err(CredentialError::AccountNotLinked { .. }) => {}
                Err(err) => {
                    warn!(
                        tenant = %tenant,
                        account = %account,
                        error_kind = err.kind(),
                        "legacy credential migration failed"
                    );
                    report.failed.push(MigrationFailure {
                        tenant,
                        account,
                        error_kind: err.kind(),
                    });
                }
            }
        }

        info!(
            resealed = report.resealed.len(),
            current = report.current.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "legacy credential migration finished"
        );
        Ok(report)
    }
}
