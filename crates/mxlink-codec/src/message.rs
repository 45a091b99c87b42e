// SPDX-License-Identifier: Apache-2.0
//! Wire message shape.
//!
//! A message is a JSON object whose top-level keys are concrete type tags
//! (plus the reserved `version` scalar), each holding a mapping from a
//! message-local slot name to a record payload. Link fields inside payloads
//! are pointer objects (`{"$ref": "/Type/slot"}`) or arrays thereof.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CodecError;

/// One type bucket: slot name → record payload.
pub type Bucket = BTreeMap<String, Value>;

/// A complete wire message.
///
/// `BTreeMap` buckets keep serialized output deterministic. The `version`
/// key is a scalar sibling of the type buckets on the wire, never a bucket
/// itself; both codec directions skip it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireMessage {
    /// Message format version, emitted on export and ignored on import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Type buckets, keyed by concrete type tag or base-kind stub tag.
    #[serde(flatten)]
    pub buckets: BTreeMap<String, Bucket>,
}

impl WireMessage {
    /// Parses a message from JSON text.
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the message to JSON text.
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns one record payload, if present.
    #[must_use]
    pub fn record(&self, type_tag: &str, slot: &str) -> Option<&Value> {
        self.buckets.get(type_tag)?.get(slot)
    }

    /// Returns `true` when the message carries no record at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(BTreeMap::is_empty)
    }
}

/// Converts a stored-field name (`source_id`) to its wire spelling
/// (`sourceId`).
pub(crate) fn wire_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
