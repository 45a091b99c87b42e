// SPDX-License-Identifier: Apache-2.0
//! Job subtypes: experiments and calculations producing datasets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mxlink_core::RecordId;

use crate::macros::record_object;
use crate::Extensions;

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Template to start other jobs from; never run.
    Template,
    /// Fully specified and ready to run.
    Ready,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Stopped before completion.
    Aborted,
}

/// A crystallography data-acquisition experiment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MxExperiment {
    /// Permanent unique identifier.
    pub uuid: RecordId,
    /// Prepared sample the experiment ran on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_id: Option<RecordId>,
    /// Sample container or location relevant to the experiment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistical_sample_id: Option<RecordId>,
    /// Datasets consumed as input.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_data_ids: Vec<RecordId>,
    /// Datasets used as reference (e.g. for comparison or scaling).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_data_ids: Vec<RecordId>,
    /// Datasets acting as acquisition templates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_data_ids: Vec<RecordId>,
    /// Actual starting time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Actual finishing time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Job lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_status: Option<JobStatus>,
    /// Experiment strategy descriptor (e.g. "native", "SAD", "phasing").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_strategy: Option<String>,
    /// Resolution the experiment aimed for, in ångström.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_resolution: Option<f64>,
    /// Keyword-value extension data; use is accepted but discouraged.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

record_object!(
    MxExperiment,
    kind: Job,
    singles: [sample_id, logistical_sample_id],
    multiples: [input_data_ids, reference_data_ids, template_data_ids]
);

/// A data-processing or structure-solution calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MxProcessing {
    /// Permanent unique identifier.
    pub uuid: RecordId,
    /// Prepared sample the processed data derives from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_id: Option<RecordId>,
    /// Sample container or location relevant to the calculation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistical_sample_id: Option<RecordId>,
    /// Datasets consumed as input.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_data_ids: Vec<RecordId>,
    /// Reference datasets (e.g. for consistent indexing).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_data_ids: Vec<RecordId>,
    /// Template datasets the calculation was started from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_data_ids: Vec<RecordId>,
    /// Actual starting time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Actual finishing time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Job lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_status: Option<JobStatus>,
    /// Name of the processing program (e.g. "autoPROC", "XDS").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_program: Option<String>,
    /// Keyword-value extension data; use is accepted but discouraged.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

record_object!(
    MxProcessing,
    kind: Job,
    singles: [sample_id, logistical_sample_id],
    multiples: [input_data_ids, reference_data_ids, template_data_ids]
);
