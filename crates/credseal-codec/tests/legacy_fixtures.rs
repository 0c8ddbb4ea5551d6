// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture tests for every stored shape.
//!
//! The ciphertexts were produced with `openssl enc -aes-256-cbc` (explicit IV
//! for current envelopes, `-md md5 -nosalt -pass` for the derived-IV shapes).

use credseal_codec::{CredentialCodec, Key};
use credseal_core::{CredentialError, StoredBlob};
use proptest::prelude::*;
use serde_json::json;

const TEST_KEY: &str = "credseal-fixture-key-32-bytes!!!";
const WRONG_KEY: &str = "a-completely-different-key-32byt";
const HEX_KEY: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

const FIXED_IV: &str = "000102030405060708090a0b0c0d0e0f";
const CURRENT_CT: &str = "4fe0d6a1ffc9a602e71961cd91b3d3d1dc322dc3e1f0a80b1de33226ef2402b6";
const LEGACY_TOKEN_CT: &str = "e8203aff878216f06de0b7b87469341749928ae63569653cb44817590cf54bd7";
const LEGACY_SERVICE_ACCOUNT_CT: &str = "b1bb16cb4daaae930783d15f5321188785ca12ab87d0e435fd8128a7458b56c60be3e18f17b60faa071b13e884ff6134959388b75d996f1a8c3860e965dee136";
const LEGACY_STRUCTURED_CT: &str = "1d59a72e70dce92e02a70fe599389d8885363b318e9a4406c1c6c3aff3b4c047";

fn codec(material: &str) -> CredentialCodec {
    CredentialCodec::new(Key::from_config_str(material).unwrap())
}

fn object(value: serde_json::Value) -> StoredBlob {
    match value {
        serde_json::Value::Object(map) => StoredBlob::Structured(map),
        other => panic!("not an object: {other}"),
    }
}

fn fixtures() -> Vec<(&'static str, StoredBlob, &'static [u8])> {
    vec![
        (
            "serialized-current",
            StoredBlob::from(format!(
                r#"{{"iv":"{FIXED_IV}","encrypted":"{CURRENT_CT}"}}"#
            )),
            &b"ad-platform-token-123"[..],
        ),
        (
            "serialized-legacy",
            StoredBlob::from(format!(r#"{{"encrypted":"{LEGACY_TOKEN_CT}"}}"#)),
            &b"legacy-wrapped-token"[..],
        ),
        (
            "plain-legacy",
            StoredBlob::from(LEGACY_SERVICE_ACCOUNT_CT),
            &br#"{"type":"service_account","project_id":"acme-analytics"}"#[..],
        ),
        (
            "structured-current",
            object(json!({"iv": FIXED_IV, "encrypted": CURRENT_CT})),
            &b"ad-platform-token-123"[..],
        ),
        (
            "structured-legacy",
            object(json!({"encrypted": LEGACY_STRUCTURED_CT, "iv": null})),
            &b"legacy-structured-token"[..],
        ),
    ]
}

#[test]
fn every_shape_decodes_its_fixture() {
    let codec = codec(TEST_KEY);
    for (label, blob, expected) in fixtures() {
        let opened = codec
            .open_classified(&blob)
            .unwrap_or_else(|e| panic!("{label}: {e}"));
        assert_eq!(opened.shape, label);
        assert_eq!(opened.plaintext.expose(), expected, "{label}");
        assert_eq!(opened.legacy, label.ends_with("legacy"), "{label}");
    }
}

#[test]
fn wrong_key_is_decrypt_error_for_every_shape() {
    let codec = codec(WRONG_KEY);
    for (label, blob, _) in fixtures() {
        let err = codec.open_secret(&blob).unwrap_err();
        assert!(
            matches!(err, CredentialError::Decrypt(_)),
            "{label}: expected decrypt error, got {err:?}"
        );
        assert!(err.requires_relink());
    }
}

#[test]
fn hex_configured_key_opens_both_schemes() {
    let codec = codec(HEX_KEY);

    let current = StoredBlob::from(format!(
        r#"{{"iv":"{FIXED_IV}","encrypted":"d99b7bd0db942bc2e8f257dec07b40f06d5636d5e23e9a071a911d71701fecc5"}}"#
    ));
    assert_eq!(
        codec.open_secret(&current).unwrap().expose(),
        b"hex-configured-secret"
    );

    let legacy =
        StoredBlob::from("54b228d96574c5fd5f14a3a9e2f4a9ec2bee8beeab3b0f18468fe5da34079977");
    assert_eq!(
        codec.open_secret(&legacy).unwrap().expose(),
        b"hex-configured-legacy"
    );
}

#[test]
fn garbage_is_format_error_not_decrypt_error() {
    let err = codec(TEST_KEY)
        .open_secret(&StoredBlob::from("not-json-and-not-hex!!"))
        .unwrap_err();
    assert!(matches!(err, CredentialError::EnvelopeFormat(_)));
    assert_eq!(
        err.user_message(),
        CredentialError::from(credseal_core::DecryptError::AuthOrKeyMismatch).user_message()
    );
}

#[test]
fn empty_plaintext_fixture_decodes_to_empty() {
    let blob = StoredBlob::from(format!(
        r#"{{"iv":"{FIXED_IV}","encrypted":"699c3dc1fcc232a421986c848c5086e5"}}"#
    ));
    assert!(codec(TEST_KEY).open_secret(&blob).unwrap().is_empty());
}

proptest! {
    #[test]
    fn seal_then_open_returns_plaintext(plaintext in proptest::collection::vec(any::<u8>(), 0..512)) {
        let codec = codec(TEST_KEY);
        let blob = codec.seal_secret(&plaintext).unwrap();
        let opened = codec.open_secret(&blob).unwrap();
        prop_assert_eq!(opened.expose(), plaintext.as_slice());
    }

    #[test]
    fn random_wrong_key_never_returns_plaintext(
        plaintext in proptest::collection::vec(any::<u8>(), 1..64),
        wrong in proptest::array::uniform32(any::<u8>()),
    ) {
        let blob = codec(TEST_KEY).seal_secret(&plaintext).unwrap();
        let other = CredentialCodec::new(Key::from_bytes(wrong));
        match other.open_secret(&blob) {
            Ok(opened) => prop_assert_ne!(opened.expose(), plaintext.as_slice()),
            Err(err) => prop_assert!(matches!(err, CredentialError::Decrypt(_))),
        }
    }
}
