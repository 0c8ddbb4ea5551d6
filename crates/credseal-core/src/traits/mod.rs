// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented outside the core.

pub mod store;

pub use store::CredentialStore;
