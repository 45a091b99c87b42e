// SPDX-License-Identifier: Apache-2.0
//! Clash resolution when an incoming identifier is already live.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use mxlink_core::{BaseKind, ForwardField, RecordId, RecordKey, Registry};

use crate::error::CodecError;
use crate::message::wire_field_name;

/// How an import reacts when an incoming record's identifier is already
/// live in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClashPolicy {
    /// Discard the incoming record and keep the existing one untouched.
    RejectNew,
    /// Overwrite the existing record's attributes in place, preserving its
    /// identity, then discard the incoming record.
    UpdateOld,
    /// Fail the whole import; nothing is registered.
    Error,
}

/// Job link lists that are unioned instead of replaced when the caller
/// requests link merging.
const MERGED_JOB_FIELDS: [&str; 3] = ["input_data_ids", "reference_data_ids", "template_data_ids"];

/// Resolves one import-time identifier clash.
///
/// The caller has already established that a record of `kind` with `id` is
/// live; `payload` is the incoming record's converted (identifier-keyed)
/// JSON form.
pub(crate) fn resolve_clash(
    registry: &mut Registry,
    kind: BaseKind,
    id: &RecordId,
    payload: &Value,
    policy: ClashPolicy,
    merge_links: bool,
) -> Result<RecordKey, CodecError> {
    match policy {
        ClashPolicy::Error => Err(CodecError::IdentifierClash { id: id.clone() }),
        ClashPolicy::RejectNew => {
            warn!(%id, %kind, "identifier already live; discarding incoming record");
            if merge_links {
                union_incoming_lists(registry, kind, id, payload)?;
            }
            Ok(RecordKey::new(kind, id.clone()))
        }
        ClashPolicy::UpdateOld => {
            update_in_place(registry, kind, id, payload, merge_links)?;
            Ok(RecordKey::new(kind, id.clone()))
        }
    }
}

/// Unions the incoming payload's merge-eligible lists into the retained
/// record, keeping the retained order and appending novelties.
fn union_incoming_lists(
    registry: &mut Registry,
    kind: BaseKind,
    id: &RecordId,
    payload: &Value,
) -> Result<(), CodecError> {
    if kind != BaseKind::Job {
        return Ok(());
    }
    let Some(record) = registry.lookup_mut(kind, id) else {
        return Ok(());
    };
    for field in MERGED_JOB_FIELDS {
        let incoming = incoming_list(payload, field)?;
        if incoming.is_empty() {
            continue;
        }
        let mut merged = match record.forward_field(field) {
            ForwardField::Multiple(ids) => ids.to_vec(),
            _ => continue,
        };
        let retained_len = merged.len();
        for candidate in incoming {
            if !merged.contains(&candidate) {
                merged.push(candidate);
            }
        }
        if merged.len() != retained_len {
            record.set_multiple_ids(field, merged)?;
        }
    }
    Ok(())
}

/// Replaces the retained record's attributes with the incoming ones, then
/// restores the union of the pre-replacement and incoming lists where link
/// merging is requested.
fn update_in_place(
    registry: &mut Registry,
    kind: BaseKind,
    id: &RecordId,
    payload: &Value,
    merge_links: bool,
) -> Result<(), CodecError> {
    let retained: Vec<(&str, Vec<RecordId>)> = if merge_links && kind == BaseKind::Job {
        let mut lists = Vec::new();
        if let Some(record) = registry.lookup(kind, id) {
            for field in MERGED_JOB_FIELDS {
                if let ForwardField::Multiple(ids) = record.forward_field(field) {
                    lists.push((field, ids.to_vec()));
                }
            }
        }
        lists
    } else {
        Vec::new()
    };
    let Some(record) = registry.lookup_mut(kind, id) else {
        return Ok(());
    };
    record.replace_attributes(payload)?;
    for (field, mut merged) in retained {
        let incoming = match record.forward_field(field) {
            ForwardField::Multiple(ids) => ids.to_vec(),
            _ => continue,
        };
        for candidate in incoming {
            if !merged.contains(&candidate) {
                merged.push(candidate);
            }
        }
        record.set_multiple_ids(field, merged)?;
    }
    Ok(())
}

fn incoming_list(payload: &Value, field: &str) -> Result<Vec<RecordId>, CodecError> {
    match payload.get(wire_field_name(field)) {
        Some(value) => Ok(serde_json::from_value(value.clone())?),
        None => Ok(Vec::new()),
    }
}
