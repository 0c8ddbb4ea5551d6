// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The credential vault used by request handlers.
//!
//! Wraps the process-wide [`credseal_codec::CredentialCodec`], a
//! [`credseal_core::CredentialStore`] and a
//! [`credseal_materialize::Materializer`], and carries the legacy re-seal
//! migration and the boot-time startup check.

pub mod migration;
pub mod startup;
pub mod vault;

#[cfg(test)]
mod test_stores;

pub use migration::{MigrationFailure, MigrationReport};
pub use startup::{codec_startup_check, vault_from_config};
pub use vault::{CredentialVault, KeyCheckStatus, mask_secret};
