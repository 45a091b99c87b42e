// SPDX-License-Identifier: Apache-2.0
//! mxlink-core: identifier registry and data-driven link layer for
//! laboratory record graphs.
//!
//! Records (Jobs, Datasets, LogisticalSamples, PreparedSamples) reference one
//! another by stable string identifiers. This crate owns the live-record
//! registry, the static link specification, and the generic accessor layer
//! that reads and mutates links through named roles. Concrete record types
//! and the wire codec live in sibling crates.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]

mod ident;
mod links;
mod linkspec;
mod record;
mod registry;

/// Identifier newtypes and base-kind partitioning.
pub use ident::{BaseKind, RecordId, RecordKey};
/// Generic link accessors for the four link shapes.
pub use links::{LinkAccessor, LinkError};
/// Static link specification table.
pub use linkspec::{Cardinality, LinkEntry, LinkRole, LinkTable, SpecError, TypeLinks};
/// Record capability trait and the factory seam.
pub use record::{FactoryError, FieldError, ForwardField, RecordFactory, RecordObject};
/// Live-record registry.
pub use registry::{Registry, RegistryError};
