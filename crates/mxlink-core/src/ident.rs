// SPDX-License-Identifier: Apache-2.0
//! Identifier and base-kind types.

use serde::{Deserialize, Serialize};

/// Stable string identifier for a record.
///
/// Identifiers are globally unique within a record's [`BaseKind`] and
/// immutable after creation. Creators may assign any non-empty string;
/// [`RecordId::new_random`] produces a fresh UUIDv4 hex string for records
/// that arrive without one.
///
/// Tooling must not assume that an identifier is a UUID, only that it is
/// stable and unique within its base kind.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps an existing identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier (UUIDv4, hex, no hyphens).
    #[must_use]
    pub fn new_random() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    /// A fresh random identifier, mirroring "assigned by the creator if
    /// absent": records constructed without an explicit id get a unique one.
    fn default() -> Self {
        Self::new_random()
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The four abstract record categories the registry is partitioned by.
///
/// Every concrete record type belongs to exactly one base kind; the kind is
/// fixed per subtype and immutable. The kind tags double as the reserved
/// stub-bucket names in wire messages.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum BaseKind {
    /// An experiment or calculation producing datasets.
    Job,
    /// Data produced or consumed by a job.
    Dataset,
    /// A sample container or location (dewar, puck, pin, drop, ...).
    LogisticalSample,
    /// Sample content (what is in the containers).
    PreparedSample,
}

impl BaseKind {
    /// All base kinds, in registry partition order.
    pub const ALL: [Self; 4] = [
        Self::Job,
        Self::Dataset,
        Self::LogisticalSample,
        Self::PreparedSample,
    ];

    /// Returns the wire type-tag for this kind.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Job => "Job",
            Self::Dataset => "Dataset",
            Self::LogisticalSample => "LogisticalSample",
            Self::PreparedSample => "PreparedSample",
        }
    }

    /// Parses a wire type-tag back into a kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Job" => Some(Self::Job),
            "Dataset" => Some(Self::Dataset),
            "LogisticalSample" => Some(Self::LogisticalSample),
            "PreparedSample" => Some(Self::PreparedSample),
            _ => None,
        }
    }
}

impl core::fmt::Display for BaseKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Handle to a registered record: base kind plus identifier.
///
/// The link accessor layer traffics exclusively in keys; application code
/// never needs to hold a record reference across operations, which keeps the
/// registry the single owner of every live record.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct RecordKey {
    /// Base kind whose registry partition holds the record.
    pub kind: BaseKind,
    /// Identifier of the record within that partition.
    pub id: RecordId,
}

impl RecordKey {
    /// Builds a key from its parts.
    #[must_use]
    pub fn new(kind: BaseKind, id: RecordId) -> Self {
        Self { kind, id }
    }
}

impl core::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
