// SPDX-License-Identifier: Apache-2.0
//! Dataset subtypes: data produced or consumed by jobs.

use serde::{Deserialize, Serialize};

use mxlink_core::RecordId;

use crate::macros::record_object;
use crate::Extensions;

/// A single sweep of diffraction images.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CollectionSweep {
    /// Permanent unique identifier.
    pub uuid: RecordId,
    /// Job that created this dataset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<RecordId>,
    /// Sample container or location the sweep pertains to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistical_sample_id: Option<RecordId>,
    /// Dataset this one was derived from (e.g. after image pruning).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from_id: Option<RecordId>,
    /// Role relative to the source job ("Result", "Characterisation", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Rotation axis the sweep scanned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_axis: Option<String>,
    /// Exposure time per image, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,
    /// Oscillation width per image, in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<f64>,
    /// Number of images in the sweep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_images: Option<u32>,
    /// Keyword-value extension data; use is accepted but discouraged.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

record_object!(
    CollectionSweep,
    kind: Dataset,
    singles: [source_id, logistical_sample_id, derived_from_id],
    multiples: []
);

/// A set of integrated or merged reflections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReflectionSet {
    /// Permanent unique identifier.
    pub uuid: RecordId,
    /// Job that created this dataset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<RecordId>,
    /// Sample container or location the reflections pertain to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistical_sample_id: Option<RecordId>,
    /// Dataset this one was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from_id: Option<RecordId>,
    /// Role relative to the source job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// High resolution limit, in ångström.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_high: Option<f64>,
    /// Low resolution limit, in ångström.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_low: Option<f64>,
    /// Space group name (e.g. "P 21 21 21").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_group_name: Option<String>,
    /// Keyword-value extension data; use is accepted but discouraged.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

record_object!(
    ReflectionSet,
    kind: Dataset,
    singles: [source_id, logistical_sample_id, derived_from_id],
    multiples: []
);
