// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used throughout credseal.

use std::fmt;

use secrecy::{ExposeSecret, SecretSlice};
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

/// Identifier of a tenant (company) in the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a connected third-party account within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The value persisted in an account record.
///
/// Rows written over the years hold either a serialized string (JSON envelope
/// or bare hex ciphertext) or an already-parsed JSON object, depending on the
/// column type and the writer. The untagged representation accepts both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredBlob {
    /// A string column value of unknown shape.
    Serialized(String),
    /// A JSON object column value.
    Structured(serde_json::Map<String, serde_json::Value>),
}

impl StoredBlob {
    /// Render the blob as the text written to a string column.
    pub fn to_storage_string(&self) -> String {
        match self {
            Self::Serialized(text) => text.clone(),
            Self::Structured(map) => serde_json::Value::Object(map.clone()).to_string(),
        }
    }
}

impl From<String> for StoredBlob {
    fn from(text: String) -> Self {
        Self::Serialized(text)
    }
}

impl From<&str> for StoredBlob {
    fn from(text: &str) -> Self {
        Self::Serialized(text.to_string())
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for StoredBlob {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self::Structured(map)
    }
}

/// Decrypted credential bytes: a bearer token or a service-account key document.
///
/// The buffer is zeroized on drop and `Debug` output is redacted. The only way
/// to reach the bytes is [`PlaintextSecret::expose`].
pub struct PlaintextSecret(SecretSlice<u8>);

impl PlaintextSecret {
    /// Wrap decrypted bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(SecretSlice::from(bytes))
    }

    /// Borrow the plaintext bytes.
    pub fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }

    /// Borrow the plaintext as UTF-8, for bearer tokens handed to HTTP clients.
    pub fn expose_str(&self) -> Result<&str, CredentialError> {
        std::str::from_utf8(self.expose())
            .map_err(|_| CredentialError::Internal("decrypted credential is not valid UTF-8".into()))
    }

    pub fn len(&self) -> usize {
        self.expose().len()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl fmt::Debug for PlaintextSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlaintextSecret([REDACTED])")
    }
}

impl From<Vec<u8>> for PlaintextSecret {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for PlaintextSecret {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}
