// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential store adapters.
//!
//! Both adapters persist only the opaque blob of each `(tenant, account)`
//! record. The SQLite adapter serializes access through `tokio-rusqlite`'s
//! single background thread.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCredentialStore;
pub use sqlite::SqliteCredentialStore;
