// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoder for ciphertext written before per-record IVs were stored.
//!
//! Those records were encrypted with a key and IV derived from the configured
//! key material through OpenSSL's `EVP_BytesToKey` (MD5, one iteration, no
//! salt). This module only decrypts; nothing is ever written in this form.

use credseal_core::{CredentialError, PlaintextSecret};
use zeroize::Zeroizing;

use crate::crypto::{IV_LEN, decode_ciphertext, decrypt_cbc};
use crate::key::Key;

const DERIVED_KEY_LEN: usize = 32;
const MD5_LEN: usize = 16;

/// Derive `(key, iv)` from a password the way `EVP_BytesToKey(MD5)` does.
///
/// `D_1 = MD5(password)`, `D_i = MD5(D_{i-1} || password)`, concatenated until
/// 48 bytes are available.
pub(crate) fn bytes_to_key(password: &[u8]) -> (Zeroizing<[u8; DERIVED_KEY_LEN]>, [u8; IV_LEN]) {
    let mut derived = Zeroizing::new([0u8; DERIVED_KEY_LEN + IV_LEN]);
    let mut previous: Option<[u8; MD5_LEN]> = None;
    let mut filled = 0;

    while filled < derived.len() {
        let mut ctx = md5::Context::new();
        if let Some(prev) = previous {
            ctx.consume(prev);
        }
        ctx.consume(password);
        let digest = ctx.compute().0;

        let take = MD5_LEN.min(derived.len() - filled);
        derived[filled..filled + take].copy_from_slice(&digest[..take]);
        filled += take;
        previous = Some(digest);
    }

    let mut key = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    key.copy_from_slice(&derived[..DERIVED_KEY_LEN]);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&derived[DERIVED_KEY_LEN..]);
    (key, iv)
}

/// Decrypt a legacy hex ciphertext under the configured key material.
pub fn open_legacy(ciphertext_hex: &str, key: &Key) -> Result<PlaintextSecret, CredentialError> {
    let ciphertext = decode_ciphertext(ciphertext_hex)?;
    let (derived_key, iv) = bytes_to_key(key.legacy_material());
    decrypt_cbc(derived_key.as_slice(), &iv, &ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "credseal-fixture-key-32-bytes!!!";

    #[test]
    fn derivation_matches_openssl() {
        // openssl enc -aes-256-cbc -md md5 -nosalt -P -pass pass:credseal-fixture-key-32-bytes!!!
        let (key, iv) = bytes_to_key(TEST_KEY.as_bytes());
        assert_eq!(
            hex::encode(key.as_slice()),
            "9ff60d60b1c94c0deaae6906ede08f0a8b8dd6417963efe879de73c2359bb60c"
        );
        assert_eq!(hex::encode(iv), "4c98581803f99340236663e186e5e14f");
    }

    #[test]
    fn legacy_ciphertext_decrypts() {
        let key = Key::from_config_str(TEST_KEY).unwrap();
        let plaintext = open_legacy(
            "e8203aff878216f06de0b7b87469341749928ae63569653cb44817590cf54bd7",
            &key,
        )
        .unwrap();
        assert_eq!(plaintext.expose(), b"legacy-wrapped-token");
    }

    #[test]
    fn hex_configured_key_uses_material_as_password() {
        let key = Key::from_config_str(
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        )
        .unwrap();
        let plaintext = open_legacy(
            "54b228d96574c5fd5f14a3a9e2f4a9ec2bee8beeab3b0f18468fe5da34079977",
            &key,
        )
        .unwrap();
        assert_eq!(plaintext.expose(), b"hex-configured-legacy");
    }

    #[test]
    fn wrong_key_fails_padding() {
        let key = Key::from_config_str("a-completely-different-key-32byt").unwrap();
        let err = open_legacy(
            "e8203aff878216f06de0b7b87469341749928ae63569653cb44817590cf54bd7",
            &key,
        )
        .unwrap_err();
        assert!(matches!(err, CredentialError::Decrypt(_)));
    }

    #[test]
    fn odd_length_is_format_error() {
        let key = Key::from_config_str(TEST_KEY).unwrap();
        let err = open_legacy("abc", &key).unwrap_err();
        assert!(matches!(err, CredentialError::EnvelopeFormat(_)));
    }
}
