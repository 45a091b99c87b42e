// SPDX-License-Identifier: Apache-2.0
//! Link accessor behavior over the built-in link table.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use mxlink_core::{
    BaseKind, Cardinality, LinkAccessor, LinkError, LinkEntry, LinkRole, LinkTable, RecordId,
    RecordKey, RecordObject, Registry, TypeLinks,
};
use mxlink_model::{Catalog, CollectionSweep, MacromoleculeSample, MxExperiment, Pin, Puck};

fn table() -> LinkTable {
    Catalog::link_table().unwrap()
}

fn job(registry: &mut Registry, id: &str) -> RecordKey {
    let record = MxExperiment {
        uuid: RecordId::from(id),
        ..MxExperiment::default()
    };
    registry.register(Box::new(record)).unwrap()
}

fn sweep(registry: &mut Registry, id: &str) -> RecordKey {
    let record = CollectionSweep {
        uuid: RecordId::from(id),
        ..CollectionSweep::default()
    };
    registry.register(Box::new(record)).unwrap()
}

fn pin(registry: &mut Registry, id: &str) -> RecordKey {
    let record = Pin {
        uuid: RecordId::from(id),
        ..Pin::default()
    };
    registry.register(Box::new(record)).unwrap()
}

fn ids(records: &[&dyn RecordObject]) -> Vec<RecordId> {
    records.iter().map(|r| r.identifier().clone()).collect()
}

#[test]
fn single_forward_set_get_and_paired_reverse() {
    let table = table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let j = job(&mut registry, "j1");
    let p = pin(&mut registry, "p1");

    links
        .set_single(&mut registry, &j, "logistical_sample", Some(&p))
        .unwrap();
    let got = links
        .get_single(&registry, &j, "logistical_sample")
        .unwrap()
        .unwrap();
    assert_eq!(got.identifier(), &p.id);

    let jobs = links.get_reverse(&registry, &p, "jobs").unwrap();
    assert_eq!(ids(&jobs), vec![j.id.clone()]);

    links
        .set_single(&mut registry, &j, "logistical_sample", None)
        .unwrap();
    assert!(links
        .get_single(&registry, &j, "logistical_sample")
        .unwrap()
        .is_none());
    assert!(links.get_reverse(&registry, &p, "jobs").unwrap().is_empty());
}

#[test]
fn assigning_the_wrong_kind_is_a_type_mismatch() {
    let table = table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let j = job(&mut registry, "j1");
    let p = pin(&mut registry, "p1");

    // "sample" expects a PreparedSample; a Pin is a LogisticalSample.
    let result = links.set_single(&mut registry, &j, "sample", Some(&p));
    assert!(matches!(result, Err(LinkError::TypeMismatch { .. })));
}

#[test]
fn dangling_forward_reference_reads_as_none() {
    let table = table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let j = job(&mut registry, "j1");
    let sample_key = registry
        .register(Box::new(MacromoleculeSample {
            uuid: RecordId::from("s1"),
            ..MacromoleculeSample::default()
        }))
        .unwrap();

    links
        .set_single(&mut registry, &j, "sample", Some(&sample_key))
        .unwrap();
    registry.unregister(sample_key.kind, &sample_key.id).unwrap();
    assert!(links.get_single(&registry, &j, "sample").unwrap().is_none());
}

#[test]
fn append_and_remove_preserve_order_and_police_membership() {
    let table = table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let j = job(&mut registry, "j1");
    let d1 = sweep(&mut registry, "d1");
    let d2 = sweep(&mut registry, "d2");
    let d3 = sweep(&mut registry, "d3");

    for d in [&d1, &d2, &d3] {
        links.append(&mut registry, &j, "input_data", d).unwrap();
    }
    let got = links.get_multiple(&registry, &j, "input_data").unwrap();
    assert_eq!(ids(&got), vec![d1.id.clone(), d2.id.clone(), d3.id.clone()]);

    let again = links.append(&mut registry, &j, "input_data", &d2);
    assert!(matches!(again, Err(LinkError::AlreadyLinked { .. })));

    links.remove(&mut registry, &j, "input_data", &d2).unwrap();
    let got = links.get_multiple(&registry, &j, "input_data").unwrap();
    assert_eq!(ids(&got), vec![d1.id.clone(), d3.id.clone()]);

    let gone = links.remove(&mut registry, &j, "input_data", &d2);
    assert!(matches!(gone, Err(LinkError::NotLinked { .. })));
}

#[test]
fn append_then_remove_is_a_no_op() {
    let table = table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let j = job(&mut registry, "j1");
    let d1 = sweep(&mut registry, "d1");
    let d2 = sweep(&mut registry, "d2");

    links.set_multiple(&mut registry, &j, "input_data", &[d1.clone()]).unwrap();
    links.append(&mut registry, &j, "input_data", &d2).unwrap();
    links.remove(&mut registry, &j, "input_data", &d2).unwrap();
    let got = links.get_multiple(&registry, &j, "input_data").unwrap();
    assert_eq!(ids(&got), vec![d1.id.clone()]);
}

#[test]
fn set_multiple_collapses_duplicates_to_first_occurrence() {
    let table = table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let j = job(&mut registry, "j1");
    let d1 = sweep(&mut registry, "d1");
    let d2 = sweep(&mut registry, "d2");

    links
        .set_multiple(
            &mut registry,
            &j,
            "input_data",
            &[d1.clone(), d2.clone(), d1.clone()],
        )
        .unwrap();
    let got = links.get_multiple(&registry, &j, "input_data").unwrap();
    assert_eq!(ids(&got), vec![d1.id.clone(), d2.id.clone()]);
}

#[test]
fn reverse_replace_set_cascades_to_omitted_records() {
    let table = table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let j = job(&mut registry, "j1");
    let d1 = sweep(&mut registry, "d1");
    let d2 = sweep(&mut registry, "d2");
    let d3 = sweep(&mut registry, "d3");

    for d in [&d1, &d2, &d3] {
        links.set_single(&mut registry, d, "source", Some(&j)).unwrap();
    }
    let results = links.get_reverse(&registry, &j, "results").unwrap();
    assert_eq!(results.len(), 3);

    // Replacing the set unlinks d2, which was not in the assigned list.
    links
        .set_reverse(&mut registry, &j, "results", &[d1.clone(), d3.clone()])
        .unwrap();
    let results = links.get_reverse(&registry, &j, "results").unwrap();
    assert_eq!(ids(&results), vec![d1.id.clone(), d3.id.clone()]);
    assert!(links.get_single(&registry, &d2, "source").unwrap().is_none());
    assert!(links.get_single(&registry, &d1, "source").unwrap().is_some());
}

#[test]
fn read_only_reverse_links_refuse_mutation() {
    let table = table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let j = job(&mut registry, "j1");
    let d = sweep(&mut registry, "d1");

    links.append(&mut registry, &j, "input_data", &d).unwrap();
    let input_for = links.get_reverse(&registry, &d, "input_for").unwrap();
    assert_eq!(ids(&input_for), vec![j.id.clone()]);

    let result = links.set_reverse(&mut registry, &d, "input_for", &[j.clone()]);
    assert!(matches!(result, Err(LinkError::ReadOnlyLink { .. })));
}

/// A table where the Dataset-side reverse of the Job's `input_data` link is
/// writable, unlike the built-in one.
fn writable_reverse_table() -> LinkTable {
    LinkTable::new(vec![
        TypeLinks {
            concrete_type: "MxExperiment".to_owned(),
            base_kind: BaseKind::Job,
            links: vec![LinkEntry {
                name: "input_data".to_owned(),
                target_kind: BaseKind::Dataset,
                target_types: Vec::new(),
                cardinality: Cardinality::Multiple,
                read_only: false,
                role: LinkRole::Forward {
                    field: "input_data_ids".to_owned(),
                    ref_name: "inputDataRefs".to_owned(),
                    reverse_name: Some("feeds".to_owned()),
                },
            }],
        },
        TypeLinks {
            concrete_type: "CollectionSweep".to_owned(),
            base_kind: BaseKind::Dataset,
            links: vec![LinkEntry {
                name: "feeds".to_owned(),
                target_kind: BaseKind::Job,
                target_types: Vec::new(),
                cardinality: Cardinality::Multiple,
                read_only: false,
                role: LinkRole::Reverse {
                    forward_field: "input_data_ids".to_owned(),
                    forward_cardinality: Cardinality::Multiple,
                },
            }],
        },
    ])
    .unwrap()
}

fn job_with_inputs(registry: &mut Registry, id: &str, inputs: &[&str]) -> RecordKey {
    let record = MxExperiment {
        uuid: RecordId::from(id),
        input_data_ids: inputs.iter().map(|i| RecordId::from(*i)).collect(),
        ..MxExperiment::default()
    };
    registry.register(Box::new(record)).unwrap()
}

fn inputs_of(registry: &Registry, key: &RecordKey) -> Vec<RecordId> {
    registry
        .lookup(key.kind, &key.id)
        .and_then(|r| r.as_any().downcast_ref::<MxExperiment>())
        .map(|j| j.input_data_ids.clone())
        .unwrap_or_default()
}

#[test]
fn writable_multiple_reverse_appends_to_assigned_and_unlinks_omitted_jobs() {
    let table = writable_reverse_table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let d = sweep(&mut registry, "d1");
    // j1 links d1 but is omitted; j2 already links it; j3 does not yet.
    let j1 = job_with_inputs(&mut registry, "j1", &["d1"]);
    let j2 = job_with_inputs(&mut registry, "j2", &["x9", "d1"]);
    let j3 = job_with_inputs(&mut registry, "j3", &["x9"]);

    links
        .set_reverse(&mut registry, &d, "feeds", &[j2.clone(), j3.clone()])
        .unwrap();

    assert!(inputs_of(&registry, &j1).is_empty());
    // Already-linked lists stay untouched; new membership is appended.
    assert_eq!(
        inputs_of(&registry, &j2),
        vec![RecordId::from("x9"), RecordId::from("d1")]
    );
    assert_eq!(
        inputs_of(&registry, &j3),
        vec![RecordId::from("x9"), RecordId::from("d1")]
    );
    let feeds = links.get_reverse(&registry, &d, "feeds").unwrap();
    assert_eq!(ids(&feeds), vec![j2.id.clone(), j3.id.clone()]);
}

#[test]
fn container_nesting_reads_back_through_contents() {
    let table = table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let puck = registry
        .register(Box::new(Puck {
            uuid: RecordId::from("puck1"),
            ..Puck::default()
        }))
        .unwrap();
    let p1 = pin(&mut registry, "pin1");
    let p2 = pin(&mut registry, "pin2");

    links.set_single(&mut registry, &p1, "container", Some(&puck)).unwrap();
    links.set_single(&mut registry, &p2, "container", Some(&puck)).unwrap();
    let contents = links.get_reverse(&registry, &puck, "contents").unwrap();
    assert_eq!(ids(&contents), vec![p1.id.clone(), p2.id.clone()]);
}

#[test]
fn unknown_link_and_unregistered_owner_are_reported() {
    let table = table();
    let links = LinkAccessor::new(&table);
    let mut registry = Registry::new();
    let j = job(&mut registry, "j1");

    let unknown = links.get_single(&registry, &j, "nonsense");
    assert!(matches!(unknown, Err(LinkError::UnknownLink { .. })));

    let ghost = RecordKey::new(BaseKind::Job, RecordId::from("ghost"));
    let missing = links.get_single(&registry, &ghost, "sample");
    assert!(matches!(missing, Err(LinkError::OwnerNotRegistered { .. })));
}
