// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Naming scope for a materialized credential file.

use chrono::{DateTime, Utc};
use credseal_core::{AccountId, TenantId};

/// Longest sanitized name component kept in a file name.
const MAX_COMPONENT_LEN: usize = 64;

/// Identifies one external call that needs a credential file.
///
/// File names are `<operation>-<tenant>-<account>-<timestamp_nanos>-<seq>`,
/// with every component reduced to `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeKey {
    operation: String,
    tenant: String,
    account: String,
    timestamp_nanos: i64,
}

impl ScopeKey {
    /// Scope stamped with the current time.
    pub fn new(operation: &str, tenant: &TenantId, account: &AccountId) -> Self {
        Self::at(operation, tenant, account, Utc::now())
    }

    /// Scope stamped with an explicit time.
    pub fn at(operation: &str, tenant: &TenantId, account: &AccountId, at: DateTime<Utc>) -> Self {
        let timestamp_nanos = at
            .timestamp_nanos_opt()
            .unwrap_or_else(|| at.timestamp_micros().saturating_mul(1_000));
        Self {
            operation: sanitize(operation),
            tenant: sanitize(tenant.as_str()),
            account: sanitize(account.as_str()),
            timestamp_nanos,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// File name without extension for the given sequence number.
    pub fn file_stem(&self, seq: u64) -> String {
        format!(
            "{}-{}-{}-{}-{seq}",
            self.operation, self.tenant, self.account, self.timestamp_nanos
        )
    }
}

fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .take(MAX_COMPONENT_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}
