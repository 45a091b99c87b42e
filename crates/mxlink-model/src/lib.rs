// SPDX-License-Identifier: Apache-2.0
//! Concrete laboratory record types for the mxlink record graph.
//!
//! This crate supplies the data model layer: serde-backed structs for jobs,
//! datasets, logistical samples, and prepared samples, each implementing
//! [`mxlink_core::RecordObject`], plus the [`Catalog`] factory and the
//! built-in link table the accessor layer and codec run against.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]

use std::collections::BTreeMap;

mod catalog;
mod datasets;
mod jobs;
mod logistics;
mod macros;
mod samples;

/// Free-form keyword-value extension data carried on every record type.
pub type Extensions = BTreeMap<String, serde_json::Value>;

pub use catalog::{Catalog, CONCRETE_TYPES};
pub use datasets::{CollectionSweep, ReflectionSet};
pub use jobs::{JobStatus, MxExperiment, MxProcessing};
pub use logistics::{Dewar, Pin, Puck};
pub use samples::{MacromoleculeSample, Medium};
