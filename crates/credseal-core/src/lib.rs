// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the credseal credential protection subsystem.
//!
//! This crate provides the error taxonomy, identifier and blob types, and the
//! store adapter trait shared by every other credseal crate. It performs no
//! cryptography and no I/O of its own.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{
    CredentialError, DecryptError, EnvelopeFormatError, MaterializationError,
    INTERNAL_MESSAGE, RECONFIGURE_MESSAGE,
};
pub use traits::CredentialStore;
pub use types::{AccountId, PlaintextSecret, StoredBlob, TenantId};
