// SPDX-License-Identifier: Apache-2.0
//! Clash policy and link-merge behavior on import.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use mxlink_codec::{import, ClashPolicy, CodecError, WireMessage};
use mxlink_core::{BaseKind, LinkTable, RecordId, RecordObject, Registry};
use mxlink_model::{Catalog, CollectionSweep, MxExperiment};

fn table() -> LinkTable {
    Catalog::link_table().unwrap()
}

fn seed_sweep(registry: &mut Registry, id: &str, role: &str) {
    registry
        .register(Box::new(CollectionSweep {
            uuid: RecordId::from(id),
            role: Some(role.to_owned()),
            ..CollectionSweep::default()
        }))
        .unwrap();
}

fn seed_job(registry: &mut Registry, id: &str, inputs: &[&str]) {
    registry
        .register(Box::new(MxExperiment {
            uuid: RecordId::from(id),
            input_data_ids: inputs.iter().map(|i| RecordId::from(*i)).collect(),
            ..MxExperiment::default()
        }))
        .unwrap();
}

fn run_import(registry: &mut Registry, table: &LinkTable, text: &str, policy: ClashPolicy, merge: bool) -> Result<(), CodecError> {
    let message = WireMessage::from_json(text).unwrap();
    import(registry, table, &Catalog::new(), message, policy, merge).map(|_| ())
}

fn sweep_role(registry: &Registry, id: &str) -> Option<String> {
    registry
        .lookup(BaseKind::Dataset, &RecordId::from(id))
        .and_then(|r| r.as_any().downcast_ref::<CollectionSweep>())
        .and_then(|s| s.role.clone())
}

fn job_inputs(registry: &Registry, id: &str) -> Vec<RecordId> {
    registry
        .lookup(BaseKind::Job, &RecordId::from(id))
        .and_then(|r| r.as_any().downcast_ref::<MxExperiment>())
        .map(|j| j.input_data_ids.clone())
        .unwrap_or_default()
}

const CLASHING_SWEEP: &str = r#"{
    "CollectionSweep": { "D1": { "uuid": "d1", "role": "Characterisation" } }
}"#;

#[test]
fn reject_new_keeps_the_existing_record_untouched() {
    let table = table();
    let mut registry = Registry::new();
    seed_sweep(&mut registry, "d1", "Result");

    run_import(&mut registry, &table, CLASHING_SWEEP, ClashPolicy::RejectNew, false).unwrap();
    assert_eq!(sweep_role(&registry, "d1").as_deref(), Some("Result"));
    assert_eq!(registry.len(BaseKind::Dataset), 1);
}

#[test]
fn update_old_overwrites_attributes_in_place() {
    let table = table();
    let mut registry = Registry::new();
    seed_sweep(&mut registry, "d1", "Result");

    run_import(&mut registry, &table, CLASHING_SWEEP, ClashPolicy::UpdateOld, false).unwrap();
    assert_eq!(sweep_role(&registry, "d1").as_deref(), Some("Characterisation"));
    let record = registry
        .lookup(BaseKind::Dataset, &RecordId::from("d1"))
        .unwrap();
    assert_eq!(record.identifier(), &RecordId::from("d1"));
    assert_eq!(registry.len(BaseKind::Dataset), 1);
}

#[test]
fn error_policy_fails_the_whole_import_atomically() {
    let table = table();
    let mut registry = Registry::new();
    seed_sweep(&mut registry, "d1", "Result");

    // One clashing record plus one brand-new one; nothing may land.
    let text = r#"{
        "CollectionSweep": {
            "D1": { "uuid": "d1", "role": "Characterisation" },
            "D2": { "uuid": "d2", "role": "Result" }
        }
    }"#;
    let result = run_import(&mut registry, &table, text, ClashPolicy::Error, false);
    assert!(matches!(result, Err(CodecError::IdentifierClash { .. })));
    assert_eq!(registry.len(BaseKind::Dataset), 1);
    assert!(registry
        .lookup(BaseKind::Dataset, &RecordId::from("d2"))
        .is_none());
    assert_eq!(sweep_role(&registry, "d1").as_deref(), Some("Result"));
}

#[test]
fn error_policy_rejects_duplicates_within_one_message() {
    let table = table();
    let mut registry = Registry::new();

    // Two slots carrying the same identifier; the registry starts empty, so
    // only the in-message scan can catch this before anything registers.
    let text = r#"{
        "CollectionSweep": {
            "D1": { "uuid": "dup", "role": "Characterisation" },
            "D2": { "uuid": "dup", "role": "Result" }
        }
    }"#;
    let result = run_import(&mut registry, &table, text, ClashPolicy::Error, false);
    assert!(matches!(result, Err(CodecError::IdentifierClash { .. })));
    assert!(registry.is_empty());
}

const MERGING_JOB: &str = r#"{
    "MxExperiment": {
        "J1": {
            "uuid": "j1",
            "inputDataRefs": [
                { "$ref": "/CollectionSweep/B" },
                { "$ref": "/CollectionSweep/C" }
            ]
        }
    },
    "CollectionSweep": {
        "B": { "uuid": "b" },
        "C": { "uuid": "c" }
    }
}"#;

#[test]
fn reject_new_unions_job_data_links_when_merging_is_requested() {
    let table = table();
    let mut registry = Registry::new();
    seed_sweep(&mut registry, "a", "Result");
    seed_sweep(&mut registry, "b", "Result");
    seed_job(&mut registry, "j1", &["a", "b"]);

    run_import(&mut registry, &table, MERGING_JOB, ClashPolicy::RejectNew, true).unwrap();
    // Retained order first, incoming novelty appended once.
    assert_eq!(
        job_inputs(&registry, "j1"),
        vec![RecordId::from("a"), RecordId::from("b"), RecordId::from("c")]
    );
    // The non-clashing sweep from the message was still registered.
    assert!(registry
        .lookup(BaseKind::Dataset, &RecordId::from("c"))
        .is_some());
}

#[test]
fn update_old_unions_job_data_links_when_merging_is_requested() {
    let table = table();
    let mut registry = Registry::new();
    seed_sweep(&mut registry, "a", "Result");
    seed_sweep(&mut registry, "b", "Result");
    seed_job(&mut registry, "j1", &["a", "b"]);

    run_import(&mut registry, &table, MERGING_JOB, ClashPolicy::UpdateOld, true).unwrap();
    assert_eq!(
        job_inputs(&registry, "j1"),
        vec![RecordId::from("a"), RecordId::from("b"), RecordId::from("c")]
    );
}

#[test]
fn without_merging_reject_new_leaves_links_alone_and_update_old_replaces_them() {
    let table = table();

    let mut rejecting = Registry::new();
    seed_job(&mut rejecting, "j1", &["a"]);
    run_import(&mut rejecting, &table, MERGING_JOB, ClashPolicy::RejectNew, false).unwrap();
    assert_eq!(job_inputs(&rejecting, "j1"), vec![RecordId::from("a")]);

    let mut updating = Registry::new();
    seed_job(&mut updating, "j1", &["a"]);
    run_import(&mut updating, &table, MERGING_JOB, ClashPolicy::UpdateOld, false).unwrap();
    assert_eq!(
        job_inputs(&updating, "j1"),
        vec![RecordId::from("b"), RecordId::from("c")]
    );
}

#[test]
fn merging_is_idempotent() {
    let table = table();
    let mut registry = Registry::new();
    seed_job(&mut registry, "j1", &["b", "c"]);
    seed_sweep(&mut registry, "b", "Result");
    seed_sweep(&mut registry, "c", "Result");

    run_import(&mut registry, &table, MERGING_JOB, ClashPolicy::RejectNew, true).unwrap();
    assert_eq!(
        job_inputs(&registry, "j1"),
        vec![RecordId::from("b"), RecordId::from("c")]
    );
}
