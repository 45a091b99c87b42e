// SPDX-License-Identifier: Apache-2.0
//! LogisticalSample subtypes: containers and locations, from dewars down to
//! pins. Containers nest through the `container` link.

use serde::{Deserialize, Serialize};

use mxlink_core::RecordId;

use crate::macros::record_object;
use crate::Extensions;

/// A shipping dewar holding pucks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Dewar {
    /// Permanent unique identifier.
    pub uuid: RecordId,
    /// Prepared sample applying to this container and all its contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_id: Option<RecordId>,
    /// Containing logistical sample, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<RecordId>,
    /// Barcode printed on the dewar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    /// Identifier of an attached tracking device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_device: Option<String>,
    /// Keyword-value extension data; use is accepted but discouraged.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

record_object!(
    Dewar,
    kind: LogisticalSample,
    singles: [sample_id, container_id],
    multiples: []
);

/// A puck holding sample pins, usually inside a dewar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Puck {
    /// Permanent unique identifier.
    pub uuid: RecordId,
    /// Prepared sample applying to this container and all its contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_id: Option<RecordId>,
    /// Containing logistical sample (typically a dewar).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<RecordId>,
    /// Puck model designation (e.g. "Unipuck").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puck_type: Option<String>,
    /// Keyword-value extension data; use is accepted but discouraged.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

record_object!(
    Puck,
    kind: LogisticalSample,
    singles: [sample_id, container_id],
    multiples: []
);

/// A sample pin, usually mounted in a puck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Pin {
    /// Permanent unique identifier.
    pub uuid: RecordId,
    /// Prepared sample mounted on this pin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_id: Option<RecordId>,
    /// Containing logistical sample (typically a puck).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<RecordId>,
    /// Position of the pin within its puck, 1-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_in_puck: Option<u32>,
    /// Keyword-value extension data; use is accepted but discouraged.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

record_object!(
    Pin,
    kind: LogisticalSample,
    singles: [sample_id, container_id],
    multiples: []
);
