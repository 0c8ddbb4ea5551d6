// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boot-time construction of the process-wide codec and vault.

use std::sync::Arc;

use credseal_codec::CredentialCodec;
use credseal_config::CredsealConfig;
use credseal_core::{CredentialError, CredentialStore};
use credseal_materialize::Materializer;
use tracing::info;

use crate::vault::CredentialVault;

const SELF_TEST_PLAINTEXT: &[u8] = b"credseal-startup-self-test";

/// Build the codec from configuration and prove it can round-trip.
///
/// A missing or malformed key is a [`CredentialError::Configuration`]; the
/// caller is expected to abort the process.
pub fn codec_startup_check(config: &CredsealConfig) -> Result<Arc<CredentialCodec>, CredentialError> {
    let codec = CredentialCodec::from_config(&config.codec)?;

    let sealed = codec.seal_secret(SELF_TEST_PLAINTEXT)?;
    if codec.open_secret(&sealed)?.expose() != SELF_TEST_PLAINTEXT {
        return Err(CredentialError::Internal(
            "credential codec self-test returned different bytes".to_string(),
        ));
    }

    info!(
        reseal_legacy = config.codec.reseal_legacy,
        "credential codec ready"
    );
    Ok(Arc::new(codec))
}

/// Build a vault over `store` from configuration.
pub fn vault_from_config<S: CredentialStore>(
    config: &CredsealConfig,
    store: S,
) -> Result<CredentialVault<S>, CredentialError> {
    let codec = codec_startup_check(config)?;
    Ok(
        CredentialVault::new(codec, store, Materializer::from_config(&config.materializer))
            .with_legacy_reseal(config.codec.reseal_legacy),
    )
}
