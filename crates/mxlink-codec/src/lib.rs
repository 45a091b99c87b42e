// SPDX-License-Identifier: Apache-2.0
//! mxlink-codec: JSON interchange codec for laboratory record graphs.
//!
//! Converts between the identifier-keyed in-memory form ([`mxlink_core`]
//! registry + records) and a nested wire message whose links are resolvable
//! `$ref` pointers. Import runs each record through policy-driven clash
//! resolution before registration; export synthesizes minimal stubs for
//! link targets outside the exported set so every emitted pointer resolves
//! within the message.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]

mod error;
mod export;
mod import;
mod merge;
mod message;

pub use error::CodecError;
pub use export::export;
pub use import::import;
pub use merge::ClashPolicy;
pub use message::{Bucket, WireMessage};

/// Version scalar emitted in exported messages.
pub const WIRE_VERSION: &str = "0.1.0";
