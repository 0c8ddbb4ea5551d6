// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the credential protection subsystem.
//!
//! Display strings never contain plaintext, key material, or the stored blob
//! itself. Callers that surface errors to end users should use
//! [`CredentialError::user_message`], which deliberately collapses format and
//! decrypt failures into a single remediation.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::{AccountId, TenantId};

/// User-facing message for every failure that is fixed by re-linking the account.
pub const RECONFIGURE_MESSAGE: &str = "credentials may need to be reconfigured";

/// User-facing message for failures the user cannot fix themselves.
pub const INTERNAL_MESSAGE: &str = "internal error";

/// Decryption of a recognized envelope failed.
///
/// CBC without a MAC offers exactly one failure signal: invalid PKCS#7 padding
/// after decryption. A wrong key or tampered ciphertext is reported this way
/// most of the time, but roughly one in 256 wrong keys yields valid padding
/// and therefore garbage plaintext that cannot be detected here.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecryptError {
    /// Padding check failed -- wrong key or tampered ciphertext.
    #[error("credential decryption failed -- wrong key or tampered ciphertext")]
    AuthOrKeyMismatch,
}

/// A stored blob did not match any recognized envelope shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("stored credential is not a recognized envelope: {reason}")]
pub struct EnvelopeFormatError {
    reason: String,
}

impl EnvelopeFormatError {
    /// Create a format error with a non-secret reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason the blob was rejected.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Filesystem failure while materializing or releasing a credential file.
#[derive(Debug, Error)]
pub enum MaterializationError {
    /// The scoped temporary directory could not be created.
    #[error("failed to create credential directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The credential file could not be created or written.
    #[error("failed to write credential file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The credential file could not be removed.
    #[error("failed to remove credential file {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl MaterializationError {
    /// The path the failed operation targeted.
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateDir { path, .. } | Self::Write { path, .. } | Self::Remove { path, .. } => {
                path
            }
        }
    }
}

/// The primary error type for every credseal operation.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Missing or malformed key material. Fatal at boot.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The stored blob matched none of the recognized shapes.
    #[error(transparent)]
    EnvelopeFormat(#[from] EnvelopeFormatError),

    /// The blob was recognized but could not be decrypted.
    #[error(transparent)]
    Decrypt(#[from] DecryptError),

    /// Creating or deleting an ephemeral credential file failed.
    #[error(transparent)]
    Materialization(#[from] MaterializationError),

    /// The store has no blob for this tenant and account.
    #[error("no credential linked for tenant {tenant} account {account}")]
    AccountNotLinked { tenant: TenantId, account: AccountId },

    /// The credential store adapter failed.
    #[error("credential store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors (RNG failure, invalid UTF-8 token).
    #[error("internal error: {0}")]
    Internal(String),
}

impl CredentialError {
    /// Whether the remediation is to re-link the third-party account.
    pub fn requires_relink(&self) -> bool {
        matches!(
            self,
            Self::EnvelopeFormat(_) | Self::Decrypt(_) | Self::AccountNotLinked { .. }
        )
    }

    /// The message shown to end users.
    ///
    /// Format and decrypt failures share one message so the response never
    /// reveals which storage shape was encountered.
    pub fn user_message(&self) -> &'static str {
        if self.requires_relink() {
            RECONFIGURE_MESSAGE
        } else {
            INTERNAL_MESSAGE
        }
    }

    /// Stable short name of the error class, for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::EnvelopeFormat(_) => "envelope_format",
            Self::Decrypt(_) => "decrypt",
            Self::Materialization(_) => "materialization",
            Self::AccountNotLinked { .. } => "account_not_linked",
            Self::Store { .. } => "store",
            Self::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_and_decrypt_share_user_message() {
        let format = CredentialError::from(EnvelopeFormatError::new("not hex"));
        let decrypt = CredentialError::from(DecryptError::AuthOrKeyMismatch);
        assert_eq!(format.user_message(), decrypt.user_message());
        assert_eq!(format.user_message(), RECONFIGURE_MESSAGE);
        assert_ne!(format.kind(), decrypt.kind());
    }

    #[test]
    fn materialization_is_internal_to_users() {
        let err = CredentialError::from(MaterializationError::Remove {
            path: "/tmp/credseal/x.json".into(),
            source: std::io::Error::other("busy"),
        });
        assert!(!err.requires_relink());
        assert_eq!(err.user_message(), INTERNAL_MESSAGE);
        assert!(err.to_string().contains("/tmp/credseal/x.json"));
    }

    #[test]
    fn configuration_is_not_relinkable() {
        let err = CredentialError::Configuration("codec.key is missing".into());
        assert!(!err.requires_relink());
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn envelope_format_error_exposes_reason() {
        let err = EnvelopeFormatError::new("missing `encrypted` field");
        assert_eq!(err.reason(), "missing `encrypted` field");
        assert!(err.to_string().contains("missing `encrypted` field"));
    }
}
