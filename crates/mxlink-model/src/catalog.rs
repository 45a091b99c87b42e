// SPDX-License-Identifier: Apache-2.0
//! Record factory and the built-in link table.
//!
//! This is the collaborator surface the codec consumes: every concrete type
//! tag resolves to a constructor here, and the link table is the load-once
//! description of every type's links.

use serde::de::DeserializeOwned;
use serde_json::Value;

use mxlink_core::{
    BaseKind, Cardinality, FactoryError, LinkEntry, LinkRole, LinkTable, RecordFactory,
    RecordObject, SpecError, TypeLinks,
};

use crate::datasets::{CollectionSweep, ReflectionSet};
use crate::jobs::{MxExperiment, MxProcessing};
use crate::logistics::{Dewar, Pin, Puck};
use crate::samples::{MacromoleculeSample, Medium};

/// All concrete record type tags this catalog can construct.
pub const CONCRETE_TYPES: [&str; 9] = [
    "MxExperiment",
    "MxProcessing",
    "CollectionSweep",
    "ReflectionSet",
    "Dewar",
    "Puck",
    "Pin",
    "MacromoleculeSample",
    "Medium",
];

/// Factory over the built-in concrete record types.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    /// Creates the catalog.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the validated link table for the built-in types.
    ///
    /// Load once at startup; the table is immutable afterwards.
    pub fn link_table() -> Result<LinkTable, SpecError> {
        let mut declarations = Vec::new();
        for tag in ["MxExperiment", "MxProcessing"] {
            declarations.push(TypeLinks {
                concrete_type: tag.to_owned(),
                base_kind: BaseKind::Job,
                links: job_links(),
            });
        }
        for tag in ["CollectionSweep", "ReflectionSet"] {
            declarations.push(TypeLinks {
                concrete_type: tag.to_owned(),
                base_kind: BaseKind::Dataset,
                links: dataset_links(),
            });
        }
        for tag in ["Dewar", "Puck", "Pin"] {
            declarations.push(TypeLinks {
                concrete_type: tag.to_owned(),
                base_kind: BaseKind::LogisticalSample,
                links: logistical_sample_links(),
            });
        }
        for tag in ["MacromoleculeSample", "Medium"] {
            declarations.push(TypeLinks {
                concrete_type: tag.to_owned(),
                base_kind: BaseKind::PreparedSample,
                links: prepared_sample_links(),
            });
        }
        LinkTable::new(declarations)
    }
}

impl RecordFactory for Catalog {
    fn build(&self, type_tag: &str, value: &Value) -> Result<Box<dyn RecordObject>, FactoryError> {
        match type_tag {
            "MxExperiment" => build_as::<MxExperiment>(type_tag, value),
            "MxProcessing" => build_as::<MxProcessing>(type_tag, value),
            "CollectionSweep" => build_as::<CollectionSweep>(type_tag, value),
            "ReflectionSet" => build_as::<ReflectionSet>(type_tag, value),
            "Dewar" => build_as::<Dewar>(type_tag, value),
            "Puck" => build_as::<Puck>(type_tag, value),
            "Pin" => build_as::<Pin>(type_tag, value),
            "MacromoleculeSample" => build_as::<MacromoleculeSample>(type_tag, value),
            "Medium" => build_as::<Medium>(type_tag, value),
            _ => Err(FactoryError::UnknownType {
                type_tag: type_tag.to_owned(),
            }),
        }
    }

    fn base_kind_of(&self, type_tag: &str) -> Option<BaseKind> {
        match type_tag {
            "MxExperiment" | "MxProcessing" => Some(BaseKind::Job),
            "CollectionSweep" | "ReflectionSet" => Some(BaseKind::Dataset),
            "Dewar" | "Puck" | "Pin" => Some(BaseKind::LogisticalSample),
            "MacromoleculeSample" | "Medium" => Some(BaseKind::PreparedSample),
            _ => None,
        }
    }
}

fn build_as<T>(type_tag: &str, value: &Value) -> Result<Box<dyn RecordObject>, FactoryError>
where
    T: DeserializeOwned + RecordObject + 'static,
{
    serde_json::from_value::<T>(value.clone())
        .map(|record| Box::new(record) as Box<dyn RecordObject>)
        .map_err(|source| FactoryError::Malformed {
            type_tag: type_tag.to_owned(),
            source,
        })
}

fn forward_single(
    name: &str,
    target_kind: BaseKind,
    field: &str,
    ref_name: &str,
    reverse_name: &str,
) -> LinkEntry {
    LinkEntry {
        name: name.to_owned(),
        target_kind,
        target_types: Vec::new(),
        cardinality: Cardinality::Single,
        read_only: false,
        role: LinkRole::Forward {
            field: field.to_owned(),
            ref_name: ref_name.to_owned(),
            reverse_name: Some(reverse_name.to_owned()),
        },
    }
}

fn forward_multiple(
    name: &str,
    target_kind: BaseKind,
    field: &str,
    ref_name: &str,
    reverse_name: &str,
) -> LinkEntry {
    LinkEntry {
        name: name.to_owned(),
        target_kind,
        target_types: Vec::new(),
        cardinality: Cardinality::Multiple,
        read_only: false,
        role: LinkRole::Forward {
            field: field.to_owned(),
            ref_name: ref_name.to_owned(),
            reverse_name: Some(reverse_name.to_owned()),
        },
    }
}

fn reverse(
    name: &str,
    target_kind: BaseKind,
    forward_field: &str,
    forward_cardinality: Cardinality,
    read_only: bool,
) -> LinkEntry {
    LinkEntry {
        name: name.to_owned(),
        target_kind,
        target_types: Vec::new(),
        cardinality: forward_cardinality,
        read_only,
        role: LinkRole::Reverse {
            forward_field: forward_field.to_owned(),
            forward_cardinality,
        },
    }
}

fn job_links() -> Vec<LinkEntry> {
    vec![
        forward_single(
            "sample",
            BaseKind::PreparedSample,
            "sample_id",
            "sampleRef",
            "jobs",
        ),
        forward_single(
            "logistical_sample",
            BaseKind::LogisticalSample,
            "logistical_sample_id",
            "logisticalSampleRef",
            "jobs",
        ),
        forward_multiple(
            "input_data",
            BaseKind::Dataset,
            "input_data_ids",
            "inputDataRefs",
            "input_for",
        ),
        forward_multiple(
            "reference_data",
            BaseKind::Dataset,
            "reference_data_ids",
            "referenceDataRefs",
            "reference_for",
        ),
        forward_multiple(
            "template_data",
            BaseKind::Dataset,
            "template_data_ids",
            "templateDataRefs",
            "template_for",
        ),
        reverse(
            "results",
            BaseKind::Dataset,
            "source_id",
            Cardinality::Single,
            false,
        ),
    ]
}

fn dataset_links() -> Vec<LinkEntry> {
    vec![
        forward_single("source", BaseKind::Job, "source_id", "sourceRef", "results"),
        forward_single(
            "logistical_sample",
            BaseKind::LogisticalSample,
            "logistical_sample_id",
            "logisticalSampleRef",
            "datasets",
        ),
        forward_single(
            "derived_from",
            BaseKind::Dataset,
            "derived_from_id",
            "derivedFromRef",
            "derived_datasets",
        ),
        reverse(
            "derived_datasets",
            BaseKind::Dataset,
            "derived_from_id",
            Cardinality::Single,
            false,
        ),
        // Mutate these from the owning Job's forward side only.
        reverse(
            "input_for",
            BaseKind::Job,
            "input_data_ids",
            Cardinality::Multiple,
            true,
        ),
        reverse(
            "reference_for",
            BaseKind::Job,
            "reference_data_ids",
            Cardinality::Multiple,
            true,
        ),
        reverse(
            "template_for",
            BaseKind::Job,
            "template_data_ids",
            Cardinality::Multiple,
            true,
        ),
    ]
}

fn logistical_sample_links() -> Vec<LinkEntry> {
    vec![
        forward_single(
            "sample",
            BaseKind::PreparedSample,
            "sample_id",
            "sampleRef",
            "logistical_samples",
        ),
        forward_single(
            "container",
            BaseKind::LogisticalSample,
            "container_id",
            "containerRef",
            "contents",
        ),
        reverse(
            "contents",
            BaseKind::LogisticalSample,
            "container_id",
            Cardinality::Single,
            false,
        ),
        reverse(
            "jobs",
            BaseKind::Job,
            "logistical_sample_id",
            Cardinality::Single,
            false,
        ),
        reverse(
            "datasets",
            BaseKind::Dataset,
            "logistical_sample_id",
            Cardinality::Single,
            false,
        ),
    ]
}

fn prepared_sample_links() -> Vec<LinkEntry> {
    vec![
        reverse(
            "logistical_samples",
            BaseKind::LogisticalSample,
            "sample_id",
            Cardinality::Single,
            false,
        ),
        reverse(
            "jobs",
            BaseKind::Job,
            "sample_id",
            Cardinality::Single,
            false,
        ),
    ]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn builtin_link_table_validates() {
        let table = match Catalog::link_table() {
            Ok(t) => t,
            Err(e) => panic!("built-in table failed validation: {e}"),
        };
        assert!(table.entry("MxExperiment", "results").is_some());
        assert!(table.entry("CollectionSweep", "source").is_some());
        assert_eq!(table.base_kind_of("Pin"), Some(BaseKind::LogisticalSample));
    }

    #[test]
    fn factory_knows_every_declared_type() {
        let catalog = Catalog::new();
        for tag in CONCRETE_TYPES {
            assert!(catalog.base_kind_of(tag).is_some(), "missing {tag}");
        }
        assert!(catalog.base_kind_of("WellDrop").is_none());
    }
}
