// SPDX-License-Identifier: Apache-2.0
//! Export transform: flat identifier-keyed records → wire message.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::debug;

use mxlink_core::{
    BaseKind, ForwardField, LinkRole, LinkTable, RecordId, RecordKey, Registry,
};

use crate::error::CodecError;
use crate::message::{wire_field_name, Bucket, WireMessage};

/// Identifier → (bucket tag, slot name) over the export set.
type SlotIndex = BTreeMap<RecordId, (String, String)>;

/// Exports the given roots as a self-contained wire message.
///
/// Each root occupies a slot named `{TypeTag}{ordinal}` (1-based, per type,
/// in root order; duplicate roots collapse into one slot). Forward link
/// targets inside the set become pointers to their slots; targets live in
/// the registry but outside the set become minimal stubs in their base-kind
/// bucket, slot-named by identifier; dangling targets are omitted.
pub fn export(
    registry: &Registry,
    table: &LinkTable,
    roots: &[RecordKey],
) -> Result<WireMessage, CodecError> {
    debug!(roots = roots.len(), "exporting wire message");
    let (index, ordered) = assign_slots(registry, roots)?;
    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();
    for key in &ordered {
        let Some(record) = registry.lookup(key.kind, &key.id) else {
            continue;
        };
        let tag = record.concrete_type();
        let mut value = record.to_value()?;
        let Some(object) = value.as_object_mut() else {
            return Err(CodecError::MalformedRecord {
                type_tag: tag.to_owned(),
                slot: key.id.to_string(),
            });
        };
        for entry in table.forward_entries(tag) {
            let LinkRole::Forward {
                field, ref_name, ..
            } = &entry.role
            else {
                continue;
            };
            object.remove(&wire_field_name(field));
            match record.forward_field(field) {
                ForwardField::Single(Some(id)) => {
                    if let Some(pointer) =
                        pointer_for(id, entry.target_kind, registry, &index, &mut buckets)
                    {
                        object.insert(ref_name.clone(), pointer);
                    }
                }
                ForwardField::Multiple(ids) => {
                    let pointers: Vec<Value> = ids
                        .iter()
                        .filter_map(|id| {
                            pointer_for(id, entry.target_kind, registry, &index, &mut buckets)
                        })
                        .collect();
                    if !pointers.is_empty() {
                        object.insert(ref_name.clone(), Value::Array(pointers));
                    }
                }
                _ => {}
            }
        }
        if let Some((_, slot)) = index.get(&key.id) {
            buckets
                .entry(tag.to_owned())
                .or_default()
                .insert(slot.clone(), value);
        }
    }
    Ok(WireMessage {
        version: Some(crate::WIRE_VERSION.to_owned()),
        buckets,
    })
}

/// Names a slot for every distinct root and rejects unregistered ones.
fn assign_slots(
    registry: &Registry,
    roots: &[RecordKey],
) -> Result<(SlotIndex, Vec<RecordKey>), CodecError> {
    let mut index = SlotIndex::new();
    let mut ordered = Vec::new();
    let mut counters: BTreeMap<&str, usize> = BTreeMap::new();
    for key in roots {
        let record =
            registry
                .lookup(key.kind, &key.id)
                .ok_or_else(|| CodecError::RootNotRegistered {
                    key: key.clone(),
                })?;
        if index.contains_key(&key.id) {
            continue;
        }
        let tag = record.concrete_type();
        let counter = counters.entry(tag).or_insert(0);
        *counter += 1;
        index.insert(key.id.clone(), (tag.to_owned(), format!("{tag}{counter}")));
        ordered.push(key.clone());
    }
    Ok((index, ordered))
}

/// Builds the pointer object for one link target, synthesizing a stub when
/// the target is live but outside the export set. Dangling targets yield
/// `None`.
fn pointer_for(
    id: &RecordId,
    target_kind: BaseKind,
    registry: &Registry,
    index: &SlotIndex,
    buckets: &mut BTreeMap<String, Bucket>,
) -> Option<Value> {
    if let Some((tag, slot)) = index.get(id) {
        return Some(json!({ "mxlimsType": tag, "$ref": format!("/{tag}/{slot}") }));
    }
    registry.lookup(target_kind, id)?;
    let kind_tag = target_kind.tag();
    buckets
        .entry(kind_tag.to_owned())
        .or_default()
        .entry(id.as_str().to_owned())
        .or_insert_with(|| json!({ "mxlimsBaseType": kind_tag, "uuid": id.as_str() }));
    Some(json!({
        "mxlimsType": kind_tag,
        "$ref": format!("/{kind_tag}/{}", id.as_str()),
    }))
}
