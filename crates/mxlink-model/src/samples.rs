// SPDX-License-Identifier: Apache-2.0
//! PreparedSample subtypes: sample content, as opposed to the containers it
//! travels in. Prepared samples declare no forward links; other kinds point
//! at them.

use serde::{Deserialize, Serialize};

use mxlink_core::RecordId;

use crate::macros::record_object;
use crate::Extensions;

/// A sample containing a macromolecule of interest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MacromoleculeSample {
    /// Permanent unique identifier.
    pub uuid: RecordId,
    /// Human-readable sample name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Name of the macromolecule the sample contains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macromolecule_name: Option<String>,
    /// Relative radiation sensitivity, 1.0 = standard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radiation_sensitivity: Option<f64>,
    /// Keyword-value extension data; use is accepted but discouraged.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

record_object!(
    MacromoleculeSample,
    kind: PreparedSample,
    singles: [],
    multiples: []
);

/// A crystallization medium or buffer sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Medium {
    /// Permanent unique identifier.
    pub uuid: RecordId,
    /// Human-readable medium name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// pH of the medium.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    /// Keyword-value extension data; use is accepted but discouraged.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

record_object!(
    Medium,
    kind: PreparedSample,
    singles: [],
    multiples: []
);
