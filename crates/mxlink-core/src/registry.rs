// SPDX-License-Identifier: Apache-2.0
//! In-memory identifier registry: one id → record map per base kind.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ident::{BaseKind, RecordId, RecordKey};
use crate::record::RecordObject;

/// Error returned by [`Registry::register`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A live record of the same base kind already holds this identifier.
    ///
    /// Always fatal and never auto-resolved: it signals a caller invariant
    /// violation, distinct from a message-import clash (which is handled by
    /// the clash policy before registration is attempted).
    #[error("{kind} with identifier '{id}' already exists")]
    DuplicateIdentifier {
        /// Base kind whose partition holds the clashing entry.
        kind: BaseKind,
        /// The identifier already in use.
        id: RecordId,
    },
}

/// Process-local cache of live records, partitioned by base kind.
///
/// The registry is the single owner of every live record; membership is the
/// sole ownership signal (no weak-map semantics, no implicit eviction).
/// It is an injectable service object with no hidden statics, so tests run
/// with isolated registries. Single-writer: one import/export operation is
/// expected to complete before the next begins; each public method is an
/// atomic unit an external lock can be taken around.
#[derive(Default)]
pub struct Registry {
    jobs: BTreeMap<RecordId, Box<dyn RecordObject>>,
    datasets: BTreeMap<RecordId, Box<dyn RecordObject>>,
    logistical_samples: BTreeMap<RecordId, Box<dyn RecordObject>>,
    prepared_samples: BTreeMap<RecordId, Box<dyn RecordObject>>,
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("jobs", &self.jobs.len())
            .field("datasets", &self.datasets.len())
            .field("logistical_samples", &self.logistical_samples.len())
            .field("prepared_samples", &self.prepared_samples.len())
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, kind: BaseKind) -> &BTreeMap<RecordId, Box<dyn RecordObject>> {
        match kind {
            BaseKind::Job => &self.jobs,
            BaseKind::Dataset => &self.datasets,
            BaseKind::LogisticalSample => &self.logistical_samples,
            BaseKind::PreparedSample => &self.prepared_samples,
        }
    }

    fn partition_mut(&mut self, kind: BaseKind) -> &mut BTreeMap<RecordId, Box<dyn RecordObject>> {
        match kind {
            BaseKind::Job => &mut self.jobs,
            BaseKind::Dataset => &mut self.datasets,
            BaseKind::LogisticalSample => &mut self.logistical_samples,
            BaseKind::PreparedSample => &mut self.prepared_samples,
        }
    }

    /// Inserts a record into its base kind's partition.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateIdentifier`] if the identifier is already
    /// live in that partition; the registry is left unchanged and the
    /// rejected record is dropped.
    pub fn register(&mut self, record: Box<dyn RecordObject>) -> Result<RecordKey, RegistryError> {
        let key = record.record_key();
        let partition = self.partition_mut(key.kind);
        if partition.contains_key(&key.id) {
            return Err(RegistryError::DuplicateIdentifier {
                kind: key.kind,
                id: key.id,
            });
        }
        partition.insert(key.id.clone(), record);
        Ok(key)
    }

    /// Type-scoped lookup. Never errors; absent means "not found".
    #[must_use]
    pub fn lookup(&self, kind: BaseKind, id: &RecordId) -> Option<&dyn RecordObject> {
        self.partition(kind).get(id).map(AsRef::as_ref)
    }

    /// Mutable type-scoped lookup.
    ///
    /// The explicit reborrow is load-bearing: `AsMut::as_mut` would yield a
    /// `'static` trait object, which cannot shrink to the borrow's lifetime
    /// behind `&mut`.
    pub fn lookup_mut<'a>(
        &'a mut self,
        kind: BaseKind,
        id: &RecordId,
    ) -> Option<&'a mut (dyn RecordObject + 'static)> {
        self.partition_mut(kind)
            .get_mut(id)
            .map(|record| &mut **record)
    }

    /// Type-agnostic lookup: searches every partition and returns the first
    /// match.
    ///
    /// The search order is unspecified; callers must not rely on it when
    /// identifiers could collide across kinds (practically they do not,
    /// since identifiers are globally unique strings).
    #[must_use]
    pub fn lookup_any(&self, id: &RecordId) -> Option<&dyn RecordObject> {
        BaseKind::ALL
            .into_iter()
            .find_map(|kind| self.lookup(kind, id))
    }

    /// Returns `true` if the keyed record is live.
    #[must_use]
    pub fn contains(&self, key: &RecordKey) -> bool {
        self.partition(key.kind).contains_key(&key.id)
    }

    /// Removes a record from its partition and returns it.
    ///
    /// Used only by the clash resolver; there is no general delete operation
    /// in this core.
    pub fn unregister(&mut self, kind: BaseKind, id: &RecordId) -> Option<Box<dyn RecordObject>> {
        self.partition_mut(kind).remove(id)
    }

    /// Iterates over all records of one base kind, in identifier order.
    pub fn iter(&self, kind: BaseKind) -> impl Iterator<Item = &dyn RecordObject> {
        self.partition(kind).values().map(AsRef::as_ref)
    }

    /// Returns the identifiers of all records of one base kind, in order.
    #[must_use]
    pub fn ids(&self, kind: BaseKind) -> Vec<RecordId> {
        self.partition(kind).keys().cloned().collect()
    }

    /// Number of live records of one base kind.
    #[must_use]
    pub fn len(&self, kind: BaseKind) -> usize {
        self.partition(kind).len()
    }

    /// Returns `true` if no record of any kind is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        BaseKind::ALL.into_iter().all(|kind| self.len(kind) == 0)
    }
}
