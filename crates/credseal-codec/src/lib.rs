// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope codec for stored third-party credentials.
//!
//! New secrets are sealed with AES-256-CBC under a random IV and stored as a
//! JSON envelope. Opening accepts that envelope plus the older shapes written
//! before IVs were persisted, detected by [`parse_envelope_shape`].

pub mod codec;
pub mod crypto;
pub mod key;
pub mod legacy;
pub mod shape;

pub use codec::{CredentialCodec, OpenedSecret};
pub use crypto::{Envelope, open, seal};
pub use key::Key;
pub use shape::{EnvelopeShape, parse_envelope_shape};
