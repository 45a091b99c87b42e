// SPDX-License-Identifier: Apache-2.0
//! Wire-level error taxonomy.

use thiserror::Error;

use mxlink_core::{FactoryError, FieldError, RecordId, RecordKey, RegistryError};

/// Error raised by the import and export transforms.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A record payload in the message is not a JSON object.
    #[error("record '{type_tag}/{slot}' is not a JSON object")]
    MalformedRecord {
        /// Type bucket the payload sits in.
        type_tag: String,
        /// Message-local slot name.
        slot: String,
    },
    /// A base-kind stub record arrived without an identifier.
    ///
    /// Stubs exist only to be dereferenced, so an identifier-less stub can
    /// never serve its purpose. Always fatal.
    #[error("stub record '{type_tag}/{slot}' carries no identifier")]
    MissingIdentifier {
        /// Base-kind stub bucket name.
        type_tag: String,
        /// Message-local slot name.
        slot: String,
    },
    /// A type bucket's tag names neither a constructible type nor a
    /// base-kind stub container.
    #[error("unknown record type '{type_tag}'")]
    UnknownType {
        /// The unrecognized type tag.
        type_tag: String,
    },
    /// A link field carried something other than the expected pointer
    /// object (single) or array of pointer objects (multiple).
    #[error("malformed reference in field '{field}' of '{type_tag}/{slot}'")]
    MalformedRef {
        /// Type bucket of the offending record.
        type_tag: String,
        /// Message-local slot name.
        slot: String,
        /// Wire name of the pointer field.
        field: String,
    },
    /// A pointer does not resolve against any slot of the same message.
    ///
    /// Indicates a malformed message; fatal.
    #[error("reference '{pointer}' in '{type_tag}/{slot}' does not resolve within the message")]
    UnresolvableReference {
        /// The pointer text as it appeared on the wire.
        pointer: String,
        /// Type bucket of the referring record.
        type_tag: String,
        /// Message-local slot name of the referring record.
        slot: String,
    },
    /// An incoming identifier collides with a live record, under the
    /// `Error` clash policy.
    #[error("identifier '{id}' already live in the registry")]
    IdentifierClash {
        /// The clashing identifier.
        id: RecordId,
    },
    /// An export root is not live in the registry.
    #[error("export root {key} is not registered")]
    RootNotRegistered {
        /// The missing root.
        key: RecordKey,
    },
    /// Registration failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A record constructor rejected its payload.
    #[error(transparent)]
    Factory(#[from] FactoryError),
    /// Record-side field access failed.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// JSON (de)serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
