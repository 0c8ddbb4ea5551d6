// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of stored blobs into the storage shapes seen in the wild.
//!
//! Classification never fails and never touches key material; decoding and
//! decryption happen afterwards in [`crate::codec`].

use credseal_core::StoredBlob;
use serde_json::{Map, Value};

use crate::crypto::{BLOCK_LEN, Envelope};

/// One recognized storage shape, or the reason none matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// JSON text `{"iv": .., "encrypted": ..}`.
    SerializedCurrent(Envelope),
    /// JSON text with `encrypted` and no usable `iv`.
    SerializedLegacy { ciphertext: String },
    /// Bare hex ciphertext with no JSON wrapper.
    PlainLegacy { ciphertext: String },
    /// JSON object column with `iv` and `encrypted`.
    StructuredCurrent(Envelope),
    /// JSON object column with only `encrypted`.
    StructuredLegacy { ciphertext: String },
    /// None of the above. The reason never includes blob contents.
    Unrecognized { reason: &'static str },
}

impl EnvelopeShape {
    /// Stable label for logs and the `inspect` command.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SerializedCurrent(_) => "serialized-current",
            Self::SerializedLegacy { .. } => "serialized-legacy",
            Self::PlainLegacy { .. } => "plain-legacy",
            Self::StructuredCurrent(_) => "structured-current",
            Self::StructuredLegacy { .. } => "structured-legacy",
            Self::Unrecognized { .. } => "unrecognized",
        }
    }

    /// Whether the blob was written by the derived-IV scheme.
    pub fn is_legacy(&self) -> bool {
        matches!(
            self,
            Self::SerializedLegacy { .. } | Self::PlainLegacy { .. } | Self::StructuredLegacy { .. }
        )
    }
}

enum ObjectShape {
    Current(Envelope),
    Legacy(String),
    Unrecognized(&'static str),
}

/// Classify a stored blob. First match wins.
pub fn parse_envelope_shape(blob: &StoredBlob) -> EnvelopeShape {
    match blob {
        StoredBlob::Structured(map) => match classify_object(map) {
            ObjectShape::Current(envelope) => EnvelopeShape::StructuredCurrent(envelope),
            ObjectShape::Legacy(ciphertext) => EnvelopeShape::StructuredLegacy { ciphertext },
            ObjectShape::Unrecognized(reason) => EnvelopeShape::Unrecognized { reason },
        },
        StoredBlob::Serialized(text) => classify_text(text, true),
    }
}

fn classify_text(text: &str, unwrap_string: bool) -> EnvelopeShape {
    let trimmed = text.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => match classify_object(&map) {
            ObjectShape::Current(envelope) => EnvelopeShape::SerializedCurrent(envelope),
            ObjectShape::Legacy(ciphertext) => EnvelopeShape::SerializedLegacy { ciphertext },
            ObjectShape::Unrecognized(reason) => EnvelopeShape::Unrecognized { reason },
        },
        // A stringified envelope stored as a JSON string literal.
        Ok(Value::String(inner)) if unwrap_string => classify_text(&inner, false),
        _ => classify_plain(trimmed),
    }
}

fn classify_plain(trimmed: &str) -> EnvelopeShape {
    if trimmed.is_empty() {
        return EnvelopeShape::Unrecognized {
            reason: "blob is empty",
        };
    }
    if !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return EnvelopeShape::Unrecognized {
            reason: "blob is neither a JSON envelope nor hex ciphertext",
        };
    }
    if trimmed.len() % (BLOCK_LEN * 2) != 0 {
        return EnvelopeShape::Unrecognized {
            reason: "hex ciphertext is not a whole number of cipher blocks",
        };
    }
    EnvelopeShape::PlainLegacy {
        ciphertext: trimmed.to_string(),
    }
}

fn classify_object(map: &Map<String, Value>) -> ObjectShape {
    let ciphertext = match map.get("encrypted") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::String(_)) => return ObjectShape::Unrecognized("`encrypted` is empty"),
        Some(_) => return ObjectShape::Unrecognized("`encrypted` is not a string"),
        None => return ObjectShape::Unrecognized("object has no `encrypted` field"),
    };

    match map.get("iv") {
        None | Some(Value::Null) => ObjectShape::Legacy(ciphertext),
        Some(Value::String(iv)) if iv.trim().is_empty() => ObjectShape::Legacy(ciphertext),
        Some(Value::String(iv)) => ObjectShape::Current(Envelope {
            iv: iv.clone(),
            ciphertext,
        }),
        Some(_) => ObjectShape::Unrecognized("`iv` is not a string"),
    }
}
