// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide symmetric key.

use std::fmt;

use credseal_config::validation::{KEY_LEN, key_material_problem};
use credseal_core::CredentialError;
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

const KEY_CHECK_LABEL: &[u8] = b"credseal key check v1";
const KEY_CHECK_LEN: usize = 16;

/// A 256-bit AES key plus the configured material it was decoded from.
///
/// The legacy no-IV decoder derives its key from the configured material
/// verbatim, so both forms are retained. Debug output omits both.
pub struct Key {
    bytes: Zeroizing<[u8; KEY_LEN]>,
    material: Zeroizing<Vec<u8>>,
}

impl Key {
    /// Decode key material from configuration.
    ///
    /// Accepts 64 hex characters (decoded to 32 bytes) or exactly 32 bytes of
    /// text (used as-is). Surrounding whitespace is ignored.
    pub fn from_config_str(material: &str) -> Result<Self, CredentialError> {
        if let Some(problem) = key_material_problem(material) {
            return Err(CredentialError::Configuration(format!("codec.key {problem}")));
        }
        let material = material.trim();

        let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
        if material.len() == KEY_LEN * 2 {
            hex::decode_to_slice(material, bytes.as_mut_slice()).map_err(|_| {
                CredentialError::Configuration("codec.key is not valid hex".to_string())
            })?;
        } else {
            bytes.copy_from_slice(material.as_bytes());
        }

        Ok(Self {
            bytes,
            material: Zeroizing::new(material.as_bytes().to_vec()),
        })
    }

    /// Build a key from raw bytes. The bytes double as the legacy material.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
            material: Zeroizing::new(bytes.to_vec()),
        }
    }

    /// Generate a random key from the system CSPRNG.
    pub fn generate() -> Result<Self, CredentialError> {
        let mut bytes = [0u8; KEY_LEN];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| CredentialError::Internal("failed to generate random key".to_string()))?;
        let key = Self::from_bytes(bytes);
        zeroize::Zeroize::zeroize(&mut bytes);
        Ok(key)
    }

    /// Lowercase hex form, as accepted by [`Key::from_config_str`].
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes.as_slice()))
    }

    /// Non-secret fingerprint identifying this key: truncated HMAC-SHA256
    /// of a fixed label, hex encoded.
    pub fn check(&self) -> String {
        let mac = hmac::Key::new(hmac::HMAC_SHA256, self.bytes.as_slice());
        let tag = hmac::sign(&mac, KEY_CHECK_LABEL);
        hex::encode(&tag.as_ref()[..KEY_CHECK_LEN])
    }

    pub(crate) fn cipher_key(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub(crate) fn legacy_material(&self) -> &[u8] {
        &self.material
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key([REDACTED])")
    }
}
