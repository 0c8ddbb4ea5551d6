// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-CBC seal/open operations.
//!
//! Every call to [`seal`] draws a fresh random 128-bit IV from the system
//! CSPRNG. There is no MAC: the PKCS#7 padding check in [`open`] is the only
//! tamper or wrong-key signal, and it misses about one case in 256.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use credseal_core::{CredentialError, DecryptError, EnvelopeFormatError, PlaintextSecret};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};

use crate::key::Key;

/// IV length in bytes.
pub const IV_LEN: usize = 16;

/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Output of [`seal`]: hex ciphertext and hex IV.
///
/// Serializes as `{"iv": "...", "encrypted": "..."}`, the shape written to
/// account records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub iv: String,
    #[serde(rename = "encrypted")]
    pub ciphertext: String,
}

/// Encrypt plaintext under the key with a fresh random IV.
pub fn seal(plaintext: &[u8], key: &Key) -> Result<Envelope, CredentialError> {
    let mut iv = [0u8; IV_LEN];
    SystemRandom::new()
        .fill(&mut iv)
        .map_err(|_| CredentialError::Internal("failed to generate random IV".to_string()))?;

    let cipher = Aes256CbcEnc::new_from_slices(key.cipher_key(), &iv)
        .map_err(|_| CredentialError::Internal("invalid AES-256-CBC key or IV length".to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Ok(Envelope {
        iv: hex::encode(iv),
        ciphertext: hex::encode(ciphertext),
    })
}

/// Decrypt an envelope produced by [`seal`].
///
/// Malformed hex, a wrong-sized IV, or a ciphertext that is not a whole
/// number of blocks is an [`EnvelopeFormatError`]; a failed padding check
/// after decryption is [`DecryptError::AuthOrKeyMismatch`].
pub fn open(envelope: &Envelope, key: &Key) -> Result<PlaintextSecret, CredentialError> {
    let iv = hex::decode(envelope.iv.trim())
        .map_err(|_| EnvelopeFormatError::new("`iv` is not valid hex"))?;
    if iv.len() != IV_LEN {
        return Err(EnvelopeFormatError::new(format!(
            "`iv` must be {IV_LEN} bytes, got {}",
            iv.len()
        ))
        .into());
    }
    let ciphertext = decode_ciphertext(&envelope.ciphertext)?;
    decrypt_cbc(key.cipher_key(), &iv, &ciphertext)
}

/// Decode hex ciphertext and check it is a non-empty whole number of blocks.
pub(crate) fn decode_ciphertext(ciphertext_hex: &str) -> Result<Vec<u8>, EnvelopeFormatError> {
    let ciphertext = hex::decode(ciphertext_hex.trim())
        .map_err(|_| EnvelopeFormatError::new("ciphertext is not valid hex"))?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(EnvelopeFormatError::new(format!(
            "ciphertext must be a non-empty multiple of {BLOCK_LEN} bytes, got {}",
            ciphertext.len()
        )));
    }
    Ok(ciphertext)
}

/// AES-256-CBC decrypt with PKCS#7 unpadding.
pub(crate) fn decrypt_cbc(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<PlaintextSecret, CredentialError> {
    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| CredentialError::Internal("invalid AES-256-CBC key or IV length".to_string()))?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| DecryptError::AuthOrKeyMismatch)?;
    Ok(PlaintextSecret::new(plaintext))
}
