// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `CredentialCodec`: the process-wide seal/open entry point.

use credseal_config::model::CodecConfig;
use credseal_core::{CredentialError, EnvelopeFormatError, PlaintextSecret, StoredBlob};
use tracing::{debug, warn};

use crate::crypto;
use crate::key::Key;
use crate::legacy;
use crate::shape::{EnvelopeShape, parse_envelope_shape};

/// Seals new secrets and opens stored blobs of every recognized shape.
///
/// Built once at boot and shared behind an `Arc`; holds no mutable state.
#[derive(Debug)]
pub struct CredentialCodec {
    key: Key,
}

/// A decrypted secret together with how it was stored.
#[derive(Debug)]
pub struct OpenedSecret {
    pub plaintext: PlaintextSecret,
    /// Label of the shape the blob matched.
    pub shape: &'static str,
    /// True when the blob should be re-sealed under the current scheme.
    pub legacy: bool,
}

impl CredentialCodec {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    /// Build from the `[codec]` config section. A missing key is fatal.
    pub fn from_config(config: &CodecConfig) -> Result<Self, CredentialError> {
        let material = config
            .key
            .as_deref()
            .ok_or_else(|| CredentialError::Configuration("codec.key is not set".to_string()))?;
        Ok(Self::new(Key::from_config_str(material)?))
    }

    /// Fingerprint of the process key, recorded in and compared against the
    /// credential store.
    pub fn key_check(&self) -> String {
        self.key.check()
    }

    /// Seal plaintext into the blob written to an account record.
    pub fn seal_secret(&self, plaintext: &[u8]) -> Result<StoredBlob, CredentialError> {
        let envelope = crypto::seal(plaintext, &self.key)?;
        let text = serde_json::to_string(&envelope)
            .map_err(|e| CredentialError::Internal(format!("failed to encode envelope: {e}")))?;
        Ok(StoredBlob::Serialized(text))
    }

    /// Open a stored blob of any recognized shape.
    pub fn open_secret(&self, blob: &StoredBlob) -> Result<PlaintextSecret, CredentialError> {
        self.open_classified(blob).map(|opened| opened.plaintext)
    }

    /// Open a stored blob and report which shape it was in.
    pub fn open_classified(&self, blob: &StoredBlob) -> Result<OpenedSecret, CredentialError> {
        let shape = parse_envelope_shape(blob);
        let label = shape.label();
        debug!(shape = label, "classified stored credential");

        let result = match &shape {
            EnvelopeShape::SerializedCurrent(envelope)
            | EnvelopeShape::StructuredCurrent(envelope) => crypto::open(envelope, &self.key),
            EnvelopeShape::SerializedLegacy { ciphertext }
            | EnvelopeShape::PlainLegacy { ciphertext }
            | EnvelopeShape::StructuredLegacy { ciphertext } => {
                legacy::open_legacy(ciphertext, &self.key)
            }
            EnvelopeShape::Unrecognized { reason } => Err(EnvelopeFormatError::new(*reason).into()),
        };

        match result {
            Ok(plaintext) => Ok(OpenedSecret {
                plaintext,
                shape: label,
                legacy: shape.is_legacy(),
            }),
            Err(err) => {
                match &err {
                    CredentialError::EnvelopeFormat(format) => {
                        warn!(shape = label, reason = format.reason(), "stored credential has an unrecognized format");
                    }
                    CredentialError::Decrypt(_) => {
                        warn!(shape = label, "stored credential failed to decrypt");
                    }
                    _ => {}
                }
                Err(err)
            }
        }
    }
}
