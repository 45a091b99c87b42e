// SPDX-License-Identifier: Apache-2.0
//! Record capability trait and the factory seam to the generated-class layer.

use std::any::Any;

use serde_json::Value;
use thiserror::Error;

use crate::ident::{BaseKind, RecordId, RecordKey};

/// View of one forward link field on a record.
///
/// Reverse links are never stored, so they have no field view; they are
/// derived by the accessor layer from the opposite side's forward fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardField<'a> {
    /// The record does not carry a field with this name.
    Unknown,
    /// Single-cardinality foreign key (`None` = unset).
    Single(Option<&'a RecordId>),
    /// Multiple-cardinality foreign-key list, in insertion order.
    Multiple(&'a [RecordId]),
}

/// Error raised by record-side field access.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The record does not carry a field with this name.
    #[error("record has no link field '{field}'")]
    UnknownField {
        /// Name of the missing field.
        field: String,
    },
    /// The field exists but has the other cardinality.
    #[error("link field '{field}' has the wrong cardinality for this operation")]
    WrongShape {
        /// Name of the mismatched field.
        field: String,
    },
    /// Attribute snapshot or overwrite failed to (de)serialize.
    #[error("attribute serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Capability set shared by every live record.
///
/// The accessor layer only ever needs "is a record of base kind K, with an
/// identifier, with a concrete type tag, with named foreign-key fields" —
/// never the full concrete type. Concrete structs live in the generated-class
/// layer (`mxlink-model`) and implement this trait; application code that
/// wants the concrete type downcasts through [`RecordObject::as_any`].
///
/// Invariants
/// - `identifier`, `base_kind` and `concrete_type` are immutable after
///   construction.
/// - Multiple-cardinality fields contain no duplicate identifiers.
/// - [`RecordObject::replace_attributes`] must leave the identifier intact.
pub trait RecordObject {
    /// Stable identifier, unique within the record's base kind.
    fn identifier(&self) -> &RecordId;

    /// Base kind the record belongs to.
    fn base_kind(&self) -> BaseKind;

    /// Concrete subtype tag, used to select the constructor on
    /// deserialization and as the wire bucket name.
    fn concrete_type(&self) -> &'static str;

    /// Returns a view of the named forward link field.
    fn forward_field(&self, field: &str) -> ForwardField<'_>;

    /// Stores (or clears) a single-cardinality foreign key.
    fn set_single_id(&mut self, field: &str, value: Option<RecordId>) -> Result<(), FieldError>;

    /// Replaces a multiple-cardinality foreign-key list.
    fn set_multiple_ids(&mut self, field: &str, values: Vec<RecordId>) -> Result<(), FieldError>;

    /// Serializes the record's full attribute set (links as raw identifiers).
    fn to_value(&self) -> Result<Value, FieldError>;

    /// Overwrites every attribute from a JSON snapshot, in place.
    ///
    /// The record's identity (and identifier) is preserved so externally held
    /// keys remain valid. Used by the `update_old` clash policy.
    fn replace_attributes(&mut self, value: &Value) -> Result<(), FieldError>;

    /// Upcast for concrete-type downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for concrete-type downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the record's registry handle.
    fn record_key(&self) -> RecordKey {
        RecordKey::new(self.base_kind(), self.identifier().clone())
    }
}

/// Error raised by the record factory.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// No constructor is registered for the concrete type tag.
    #[error("unknown concrete record type '{type_tag}'")]
    UnknownType {
        /// The unrecognized tag.
        type_tag: String,
    },
    /// The payload did not deserialize into the concrete type.
    #[error("payload for '{type_tag}' is malformed: {source}")]
    Malformed {
        /// Concrete type tag being constructed.
        type_tag: String,
        /// Underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Constructor seam supplied by the generated-class layer.
///
/// The core never constructs a record without going through this
/// collaborator: the codec resolves each payload's `concrete_type` tag to a
/// constructor here.
pub trait RecordFactory {
    /// Builds a boxed record from its concrete type tag and JSON attributes
    /// (links already converted to raw identifiers).
    fn build(&self, type_tag: &str, value: &Value) -> Result<Box<dyn RecordObject>, FactoryError>;

    /// Returns the base kind for a concrete type tag, or `None` if the tag
    /// is not a known record type.
    fn base_kind_of(&self, type_tag: &str) -> Option<BaseKind>;
}
