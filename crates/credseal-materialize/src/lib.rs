// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral credential files for clients that only accept a path.
//!
//! Plaintext is written to an owner-only file in a dedicated directory and
//! removed once the consuming call finishes, fails, panics, or is cancelled.
//! [`Materializer::with_materialized_file`] is the intended entry point.

pub mod file;
pub mod scope;
pub mod scoped;

pub use file::{Materializer, TempCredentialFile};
pub use scope::ScopeKey;
