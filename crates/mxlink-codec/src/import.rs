// SPDX-License-Identifier: Apache-2.0
//! Import transform: wire message → flat identifier-keyed records.
//!
//! Pointers resolve against the message's own slots, stub buckets included,
//! so an incoming message never requires a pre-populated registry to make
//! sense. The stub buckets themselves are discarded once dereferencing is
//! done.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::debug;

use mxlink_core::{
    BaseKind, Cardinality, LinkRole, LinkTable, RecordFactory, RecordId, RecordKey, Registry,
};

use crate::error::CodecError;
use crate::merge::{resolve_clash, ClashPolicy};
use crate::message::{wire_field_name, Bucket, WireMessage};

/// Message-local pointer index: (type tag, slot) → identifier.
type SlotIndex = BTreeMap<(String, String), RecordId>;

/// Imports a wire message into the registry.
///
/// Records missing an identifier receive a fresh random one, pointers are
/// replaced by the referenced records' identifiers, stub buckets are
/// dropped, and each remaining record passes through clash resolution
/// before registration. Under [`ClashPolicy::Error`] clash detection
/// precedes all registration, so a failed import leaves the registry
/// unchanged.
///
/// Returns the keys of every record registered or updated in place, in
/// bucket order.
pub fn import(
    registry: &mut Registry,
    table: &LinkTable,
    factory: &dyn RecordFactory,
    message: WireMessage,
    policy: ClashPolicy,
    merge_links: bool,
) -> Result<Vec<RecordKey>, CodecError> {
    let WireMessage { mut buckets, .. } = message;
    debug!(buckets = buckets.len(), "importing wire message");
    let slots = assign_identifiers(&mut buckets, factory)?;
    resolve_references(&mut buckets, table, &slots)?;
    buckets.retain(|tag, _| BaseKind::from_tag(tag).is_none());
    if policy == ClashPolicy::Error {
        scan_for_clashes(registry, factory, &buckets)?;
    }
    register_records(registry, factory, buckets, policy, merge_links)
}

/// First pass: every payload must be an object, every stub must carry an
/// identifier, every other record gets one assigned if absent. Builds the
/// slot index the pointer pass resolves against.
fn assign_identifiers(
    buckets: &mut BTreeMap<String, Bucket>,
    factory: &dyn RecordFactory,
) -> Result<SlotIndex, CodecError> {
    let mut slots = SlotIndex::new();
    for (tag, bucket) in buckets.iter_mut() {
        let is_stub = BaseKind::from_tag(tag).is_some();
        if !is_stub && factory.base_kind_of(tag).is_none() {
            return Err(CodecError::UnknownType {
                type_tag: tag.clone(),
            });
        }
        for (slot, payload) in bucket.iter_mut() {
            let Some(object) = payload.as_object_mut() else {
                return Err(CodecError::MalformedRecord {
                    type_tag: tag.clone(),
                    slot: slot.clone(),
                });
            };
            let id = match object.get("uuid").and_then(Value::as_str) {
                Some(text) if !text.is_empty() => RecordId::from(text),
                _ if is_stub => {
                    return Err(CodecError::MissingIdentifier {
                        type_tag: tag.clone(),
                        slot: slot.clone(),
                    });
                }
                _ => {
                    let id = RecordId::new_random();
                    object.insert("uuid".to_owned(), Value::String(id.as_str().to_owned()));
                    id
                }
            };
            slots.insert((tag.clone(), slot.clone()), id);
        }
    }
    Ok(slots)
}

/// Second pass: replace each declared forward pointer field with the raw
/// identifier (or list) of the slot it resolves to.
fn resolve_references(
    buckets: &mut BTreeMap<String, Bucket>,
    table: &LinkTable,
    slots: &SlotIndex,
) -> Result<(), CodecError> {
    for (tag, bucket) in buckets.iter_mut() {
        if BaseKind::from_tag(tag).is_some() {
            continue;
        }
        for (slot, payload) in bucket.iter_mut() {
            let Some(object) = payload.as_object_mut() else {
                continue;
            };
            for entry in table.forward_entries(tag) {
                let LinkRole::Forward {
                    field, ref_name, ..
                } = &entry.role
                else {
                    continue;
                };
                let Some(raw) = object.remove(ref_name) else {
                    continue;
                };
                let converted = match entry.cardinality {
                    Cardinality::Single => {
                        let id = resolve_pointer(&raw, slots)
                            .map_err(|fault| fault.into_error(tag, slot, field))?;
                        Value::String(id)
                    }
                    Cardinality::Multiple => {
                        let Some(items) = raw.as_array() else {
                            return Err(CodecError::MalformedRef {
                                type_tag: tag.clone(),
                                slot: slot.clone(),
                                field: field.clone(),
                            });
                        };
                        let mut ids = Vec::with_capacity(items.len());
                        for item in items {
                            let id = resolve_pointer(item, slots)
                                .map_err(|fault| fault.into_error(tag, slot, field))?;
                            ids.push(Value::String(id));
                        }
                        Value::Array(ids)
                    }
                };
                object.insert(wire_field_name(field), converted);
            }
        }
    }
    Ok(())
}

enum PointerFault {
    Malformed,
    Unresolvable(String),
}

impl PointerFault {
    fn into_error(self, type_tag: &str, slot: &str, field: &str) -> CodecError {
        match self {
            Self::Malformed => CodecError::MalformedRef {
                type_tag: type_tag.to_owned(),
                slot: slot.to_owned(),
                field: field.to_owned(),
            },
            Self::Unresolvable(pointer) => CodecError::UnresolvableReference {
                pointer,
                type_tag: type_tag.to_owned(),
                slot: slot.to_owned(),
            },
        }
    }
}

/// Resolves one pointer object against the slot index.
fn resolve_pointer(value: &Value, slots: &SlotIndex) -> Result<String, PointerFault> {
    let pointer = value
        .get("$ref")
        .and_then(Value::as_str)
        .ok_or(PointerFault::Malformed)?;
    let (tag, slot) = parse_pointer(pointer).ok_or(PointerFault::Malformed)?;
    slots
        .get(&(tag.to_owned(), slot.to_owned()))
        .map(|id| id.as_str().to_owned())
        .ok_or_else(|| PointerFault::Unresolvable(pointer.to_owned()))
}

/// Accepts `/Type/slot` and `#/Type/slot`; exactly two non-empty segments.
fn parse_pointer(pointer: &str) -> Option<(&str, &str)> {
    let rest = pointer.strip_prefix('#').unwrap_or(pointer);
    let rest = rest.strip_prefix('/')?;
    let (tag, slot) = rest.split_once('/')?;
    (!tag.is_empty() && !slot.is_empty() && !slot.contains('/')).then_some((tag, slot))
}

/// Whole-import clash pre-scan for the `Error` policy.
///
/// Rejects an identifier that is already live in the registry, and equally an
/// identifier that appears twice within the message itself; either would
/// otherwise surface mid-registration and leave a partial import behind.
fn scan_for_clashes(
    registry: &Registry,
    factory: &dyn RecordFactory,
    buckets: &BTreeMap<String, Bucket>,
) -> Result<(), CodecError> {
    let mut seen: BTreeSet<(BaseKind, RecordId)> = BTreeSet::new();
    for (tag, bucket) in buckets {
        let Some(kind) = factory.base_kind_of(tag) else {
            continue;
        };
        for payload in bucket.values() {
            if let Some(id) = payload_identifier(payload) {
                if registry.lookup(kind, &id).is_some() || !seen.insert((kind, id.clone())) {
                    return Err(CodecError::IdentifierClash { id });
                }
            }
        }
    }
    Ok(())
}

fn payload_identifier(payload: &Value) -> Option<RecordId> {
    payload.get("uuid").and_then(Value::as_str).map(RecordId::from)
}

fn register_records(
    registry: &mut Registry,
    factory: &dyn RecordFactory,
    buckets: BTreeMap<String, Bucket>,
    policy: ClashPolicy,
    merge_links: bool,
) -> Result<Vec<RecordKey>, CodecError> {
    let mut keys = Vec::new();
    for (tag, bucket) in buckets {
        let Some(kind) = factory.base_kind_of(&tag) else {
            continue;
        };
        for (slot, payload) in bucket {
            let Some(id) = payload_identifier(&payload) else {
                return Err(CodecError::MissingIdentifier {
                    type_tag: tag.clone(),
                    slot,
                });
            };
            if registry.lookup(kind, &id).is_some() {
                keys.push(resolve_clash(
                    registry,
                    kind,
                    &id,
                    &payload,
                    policy,
                    merge_links,
                )?);
            } else {
                let record = factory.build(&tag, &payload)?;
                keys.push(registry.register(record)?);
            }
        }
    }
    debug!(count = keys.len(), "imported records");
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::parse_pointer;

    #[test]
    fn pointer_forms_with_and_without_fragment_prefix() {
        assert_eq!(parse_pointer("/Job/Job1"), Some(("Job", "Job1")));
        assert_eq!(parse_pointer("#/Job/Job1"), Some(("Job", "Job1")));
        assert_eq!(parse_pointer("Job/Job1"), None);
        assert_eq!(parse_pointer("/Job"), None);
        assert_eq!(parse_pointer("/Job/a/b"), None);
        assert_eq!(parse_pointer("//slot"), None);
    }
}
