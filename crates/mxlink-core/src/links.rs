// SPDX-License-Identifier: Apache-2.0
//! Generic link accessor layer: one implementation of each link shape,
//! driven by the [`LinkTable`] instead of per-type generated code.
//!
//! Four shapes exist: single forward, multiple forward, single reverse and
//! multiple reverse. Forward links read and write the owning record's stored
//! foreign keys; reverse links scan the target kind's registry partition at
//! query time and are never stored, so they cannot go stale.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::ident::{BaseKind, RecordId, RecordKey};
use crate::linkspec::{Cardinality, LinkEntry, LinkRole, LinkTable};
use crate::record::{FieldError, ForwardField, RecordObject};
use crate::registry::Registry;

/// Error raised by link accessor operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The owning type declares no link with this name.
    #[error("type '{concrete_type}' declares no link '{link}'")]
    UnknownLink {
        /// Concrete type of the owning record.
        concrete_type: String,
        /// The undeclared link name.
        link: String,
    },
    /// The owning record is not live in the registry.
    #[error("owner record {key} is not registered")]
    OwnerNotRegistered {
        /// Key that failed to resolve.
        key: RecordKey,
    },
    /// An assigned target record is not live in the registry.
    #[error("target record {key} is not registered")]
    TargetNotRegistered {
        /// Key that failed to resolve.
        key: RecordKey,
    },
    /// An assigned record is not an accepted target for the link.
    #[error("link '{link}' expects a {expected} target, got {found}")]
    TypeMismatch {
        /// Link name.
        link: String,
        /// Declared target base kind.
        expected: BaseKind,
        /// Kind and concrete type actually assigned.
        found: String,
    },
    /// The operation does not match the link's cardinality or direction.
    #[error("link '{link}' does not support this operation (wrong shape)")]
    WrongShape {
        /// Link name.
        link: String,
    },
    /// The link is declared read-only; mutate from the forward side.
    #[error("link '{link}' is read-only")]
    ReadOnlyLink {
        /// Link name.
        link: String,
    },
    /// Append of an identifier already present in a multiple forward link.
    #[error("cannot append to '{link}': '{id}' is already linked")]
    AlreadyLinked {
        /// Link name.
        link: String,
        /// The already-present identifier.
        id: RecordId,
    },
    /// Removal of an identifier absent from a multiple forward link.
    #[error("cannot remove from '{link}': '{id}' is not linked")]
    NotLinked {
        /// Link name.
        link: String,
        /// The absent identifier.
        id: RecordId,
    },
    /// Record-side field access failed (spec/record mismatch).
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Data-driven accessor for every declared link on every record type.
///
/// Borrows the immutable [`LinkTable`]; each operation additionally takes the
/// registry (shared for reads, exclusive for writes) plus the owning record's
/// key and the link name. Dangling forward references are tolerated at read
/// time: lookups silently yield nothing for them.
#[derive(Debug, Clone, Copy)]
pub struct LinkAccessor<'t> {
    table: &'t LinkTable,
}

impl<'t> LinkAccessor<'t> {
    /// Creates an accessor over a validated link table.
    #[must_use]
    pub fn new(table: &'t LinkTable) -> Self {
        Self { table }
    }

    /// Returns the underlying link table.
    #[must_use]
    pub fn table(&self) -> &'t LinkTable {
        self.table
    }

    fn entry_for(
        &self,
        registry: &Registry,
        owner: &RecordKey,
        link: &str,
    ) -> Result<&'t LinkEntry, LinkError> {
        let record = registry
            .lookup(owner.kind, &owner.id)
            .ok_or_else(|| LinkError::OwnerNotRegistered { key: owner.clone() })?;
        self.table
            .entry(record.concrete_type(), link)
            .ok_or_else(|| LinkError::UnknownLink {
                concrete_type: record.concrete_type().to_owned(),
                link: link.to_owned(),
            })
    }

    fn forward_entry(
        &self,
        registry: &Registry,
        owner: &RecordKey,
        link: &str,
        cardinality: Cardinality,
        for_write: bool,
    ) -> Result<(&'t LinkEntry, &'t str), LinkError> {
        let entry = self.entry_for(registry, owner, link)?;
        if for_write && entry.read_only {
            return Err(LinkError::ReadOnlyLink {
                link: link.to_owned(),
            });
        }
        if entry.cardinality != cardinality {
            return Err(LinkError::WrongShape {
                link: link.to_owned(),
            });
        }
        match &entry.role {
            LinkRole::Forward { field, .. } => Ok((entry, field)),
            LinkRole::Reverse { .. } => Err(LinkError::WrongShape {
                link: link.to_owned(),
            }),
        }
    }

    // ── Single forward ──────────────────────────────────────────────

    /// Reads a single forward link: the stored foreign key resolved through
    /// the registry. Unset or dangling references yield `None`.
    pub fn get_single<'r>(
        &self,
        registry: &'r Registry,
        owner: &RecordKey,
        link: &str,
    ) -> Result<Option<&'r dyn RecordObject>, LinkError> {
        let (entry, field) = self.forward_entry(registry, owner, link, Cardinality::Single, false)?;
        let record = registry
            .lookup(owner.kind, &owner.id)
            .ok_or_else(|| LinkError::OwnerNotRegistered { key: owner.clone() })?;
        match record.forward_field(field) {
            ForwardField::Single(id) => {
                Ok(id.and_then(|id| registry.lookup(entry.target_kind, id)))
            }
            ForwardField::Multiple(_) => Err(LinkError::WrongShape {
                link: link.to_owned(),
            }),
            ForwardField::Unknown => Err(FieldError::UnknownField {
                field: field.to_owned(),
            }
            .into()),
        }
    }

    /// Writes (or clears) a single forward link after validating the target.
    pub fn set_single(
        &self,
        registry: &mut Registry,
        owner: &RecordKey,
        link: &str,
        target: Option<&RecordKey>,
    ) -> Result<(), LinkError> {
        let (entry, field) = self.forward_entry(registry, owner, link, Cardinality::Single, true)?;
        let id = match target {
            Some(key) => Some(check_target(registry, entry, key)?.identifier().clone()),
            None => None,
        };
        let field = field.to_owned();
        let record = registry
            .lookup_mut(owner.kind, &owner.id)
            .ok_or_else(|| LinkError::OwnerNotRegistered { key: owner.clone() })?;
        record.set_single_id(&field, id)?;
        Ok(())
    }

    // ── Multiple forward ────────────────────────────────────────────

    /// Reads a multiple forward link, mapping each stored identifier through
    /// the registry and silently dropping unresolved ones.
    pub fn get_multiple<'r>(
        &self,
        registry: &'r Registry,
        owner: &RecordKey,
        link: &str,
    ) -> Result<Vec<&'r dyn RecordObject>, LinkError> {
        let (entry, field) =
            self.forward_entry(registry, owner, link, Cardinality::Multiple, false)?;
        let record = registry
            .lookup(owner.kind, &owner.id)
            .ok_or_else(|| LinkError::OwnerNotRegistered { key: owner.clone() })?;
        match record.forward_field(field) {
            ForwardField::Multiple(ids) => Ok(ids
                .iter()
                .filter_map(|id| registry.lookup(entry.target_kind, id))
                .collect()),
            ForwardField::Single(_) => Err(LinkError::WrongShape {
                link: link.to_owned(),
            }),
            ForwardField::Unknown => Err(FieldError::UnknownField {
                field: field.to_owned(),
            }
            .into()),
        }
    }

    /// Replaces a multiple forward link with the given targets, validating
    /// each. Duplicate keys collapse to their first occurrence.
    pub fn set_multiple(
        &self,
        registry: &mut Registry,
        owner: &RecordKey,
        link: &str,
        targets: &[RecordKey],
    ) -> Result<(), LinkError> {
        let (entry, field) =
            self.forward_entry(registry, owner, link, Cardinality::Multiple, true)?;
        let mut seen = BTreeSet::new();
        let mut ids = Vec::with_capacity(targets.len());
        for key in targets {
            let id = check_target(registry, entry, key)?.identifier().clone();
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
        let field = field.to_owned();
        let record = registry
            .lookup_mut(owner.kind, &owner.id)
            .ok_or_else(|| LinkError::OwnerNotRegistered { key: owner.clone() })?;
        record.set_multiple_ids(&field, ids)?;
        Ok(())
    }

    /// Appends one target to a multiple forward link.
    ///
    /// # Errors
    ///
    /// [`LinkError::AlreadyLinked`] if the target's identifier is already in
    /// the stored list.
    pub fn append(
        &self,
        registry: &mut Registry,
        owner: &RecordKey,
        link: &str,
        target: &RecordKey,
    ) -> Result<(), LinkError> {
        let (entry, field) =
            self.forward_entry(registry, owner, link, Cardinality::Multiple, true)?;
        let id = check_target(registry, entry, target)?.identifier().clone();
        let mut ids = stored_multiple(registry, owner, link, field)?;
        if ids.contains(&id) {
            return Err(LinkError::AlreadyLinked {
                link: link.to_owned(),
                id,
            });
        }
        ids.push(id);
        let field = field.to_owned();
        let record = registry
            .lookup_mut(owner.kind, &owner.id)
            .ok_or_else(|| LinkError::OwnerNotRegistered { key: owner.clone() })?;
        record.set_multiple_ids(&field, ids)?;
        Ok(())
    }

    /// Removes one target from a multiple forward link, preserving the order
    /// of the remaining identifiers.
    ///
    /// # Errors
    ///
    /// [`LinkError::NotLinked`] if the target's identifier is absent.
    pub fn remove(
        &self,
        registry: &mut Registry,
        owner: &RecordKey,
        link: &str,
        target: &RecordKey,
    ) -> Result<(), LinkError> {
        let (_, field) = self.forward_entry(registry, owner, link, Cardinality::Multiple, true)?;
        let id = target.id.clone();
        let mut ids = stored_multiple(registry, owner, link, field)?;
        let before = ids.len();
        ids.retain(|stored| *stored != id);
        if ids.len() == before {
            return Err(LinkError::NotLinked {
                link: link.to_owned(),
                id,
            });
        }
        let field = field.to_owned();
        let record = registry
            .lookup_mut(owner.kind, &owner.id)
            .ok_or_else(|| LinkError::OwnerNotRegistered { key: owner.clone() })?;
        record.set_multiple_ids(&field, ids)?;
        Ok(())
    }

    // ── Reverse (derived) ───────────────────────────────────────────

    /// Reads a reverse link: scans the target kind's registry partition for
    /// records whose forward field points back at the owner.
    ///
    /// Always returns a list, even when the paired forward link is
    /// single-valued: nothing prevents several records from pointing at the
    /// same target. Cost is O(size of the target partition).
    pub fn get_reverse<'r>(
        &self,
        registry: &'r Registry,
        owner: &RecordKey,
        link: &str,
    ) -> Result<Vec<&'r dyn RecordObject>, LinkError> {
        let entry = self.entry_for(registry, owner, link)?;
        let LinkRole::Reverse {
            forward_field,
            forward_cardinality,
        } = &entry.role
        else {
            return Err(LinkError::WrongShape {
                link: link.to_owned(),
            });
        };
        let me = &owner.id;
        Ok(registry
            .iter(entry.target_kind)
            .filter(|record| match record.forward_field(forward_field) {
                ForwardField::Single(id) => {
                    *forward_cardinality == Cardinality::Single && id == Some(me)
                }
                ForwardField::Multiple(ids) => {
                    *forward_cardinality == Cardinality::Multiple && ids.contains(me)
                }
                ForwardField::Unknown => false,
            })
            .collect())
    }

    /// Replaces the full reverse set of a link.
    ///
    /// Every assigned candidate's forward field is pointed at the owner;
    /// every other record currently pointing back is unlinked. This is
    /// "replace the whole set", not an incremental diff, and deliberately
    /// mutates third-party records omitted from the assigned list.
    pub fn set_reverse(
        &self,
        registry: &mut Registry,
        owner: &RecordKey,
        link: &str,
        targets: &[RecordKey],
    ) -> Result<(), LinkError> {
        let entry = self.entry_for(registry, owner, link)?;
        if entry.read_only {
            return Err(LinkError::ReadOnlyLink {
                link: link.to_owned(),
            });
        }
        let LinkRole::Reverse {
            forward_field,
            forward_cardinality,
        } = entry.role.clone()
        else {
            return Err(LinkError::WrongShape {
                link: link.to_owned(),
            });
        };
        let mut assigned = BTreeSet::new();
        for key in targets {
            check_target(registry, entry, key)?;
            assigned.insert(key.id.clone());
        }
        let me = &owner.id;

        // Plan phase (shared borrows only): decide the new forward value for
        // every record of the target kind whose field must change.
        let mut writes: Vec<(RecordId, Write)> = Vec::new();
        for record in registry.iter(entry.target_kind) {
            let id = record.identifier();
            match (record.forward_field(&forward_field), forward_cardinality) {
                (ForwardField::Single(current), Cardinality::Single) => {
                    let points_at_me = current == Some(me);
                    if assigned.contains(id) && !points_at_me {
                        writes.push((id.clone(), Write::Single(Some(me.clone()))));
                    } else if !assigned.contains(id) && points_at_me {
                        writes.push((id.clone(), Write::Single(None)));
                    }
                }
                (ForwardField::Multiple(ids), Cardinality::Multiple) => {
                    let contains_me = ids.contains(me);
                    if assigned.contains(id) && !contains_me {
                        let mut ids = ids.to_vec();
                        ids.push(me.clone());
                        writes.push((id.clone(), Write::Multiple(ids)));
                    } else if !assigned.contains(id) && contains_me {
                        let ids = ids
                            .iter()
                            .filter(|stored| *stored != me)
                            .cloned()
                            .collect();
                        writes.push((id.clone(), Write::Multiple(ids)));
                    }
                }
                // Records of the target kind that do not carry the forward
                // field (or carry it with another shape) are left alone
                // unless explicitly assigned.
                (_, _) => {
                    if assigned.contains(id) {
                        return Err(FieldError::UnknownField {
                            field: forward_field.clone(),
                        }
                        .into());
                    }
                }
            }
        }

        // Apply phase (exclusive borrows, one record at a time).
        for (id, write) in writes {
            let Some(record) = registry.lookup_mut(entry.target_kind, &id) else {
                continue;
            };
            match write {
                Write::Single(value) => record.set_single_id(&forward_field, value)?,
                Write::Multiple(values) => record.set_multiple_ids(&forward_field, values)?,
            }
        }
        Ok(())
    }
}

/// Planned forward-field write, produced under shared borrows and applied
/// under an exclusive one.
enum Write {
    Single(Option<RecordId>),
    Multiple(Vec<RecordId>),
}

/// Validates an assigned target against a link entry's kind and accepted
/// concrete types.
fn check_target<'r>(
    registry: &'r Registry,
    entry: &LinkEntry,
    target: &RecordKey,
) -> Result<&'r dyn RecordObject, LinkError> {
    if target.kind != entry.target_kind {
        return Err(LinkError::TypeMismatch {
            link: entry.name.clone(),
            expected: entry.target_kind,
            found: target.kind.to_string(),
        });
    }
    let record = registry
        .lookup(target.kind, &target.id)
        .ok_or_else(|| LinkError::TargetNotRegistered {
            key: target.clone(),
        })?;
    if !entry.target_types.is_empty()
        && !entry
            .target_types
            .iter()
            .any(|t| t == record.concrete_type())
    {
        return Err(LinkError::TypeMismatch {
            link: entry.name.clone(),
            expected: entry.target_kind,
            found: format!("{}/{}", target.kind, record.concrete_type()),
        });
    }
    Ok(record)
}

/// Snapshot of the stored identifier list of a multiple forward field.
fn stored_multiple(
    registry: &Registry,
    owner: &RecordKey,
    link: &str,
    field: &str,
) -> Result<Vec<RecordId>, LinkError> {
    let record = registry
        .lookup(owner.kind, &owner.id)
        .ok_or_else(|| LinkError::OwnerNotRegistered { key: owner.clone() })?;
    match record.forward_field(field) {
        ForwardField::Multiple(ids) => Ok(ids.to_vec()),
        ForwardField::Single(_) => Err(LinkError::WrongShape {
            link: link.to_owned(),
        }),
        ForwardField::Unknown => Err(FieldError::UnknownField {
            field: field.to_owned(),
        }
        .into()),
    }
}
