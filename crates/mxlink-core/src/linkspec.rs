// SPDX-License-Identifier: Apache-2.0
//! Static link specification: which fields are links, and how.
//!
//! The table is loaded once at startup from a declarative document (or built
//! programmatically by the generated-class layer) and treated as immutable.
//! Both the link accessor layer and the message codec consume it as the
//! single source of truth for link semantics.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::ident::BaseKind;

/// Cardinality of a link on its forward side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one foreign identifier.
    Single,
    /// An ordered list of foreign identifiers.
    Multiple,
}

/// Directionality of a link entry.
///
/// A forward link stores the foreign identifier(s) on the declaring record
/// and is the side that may be mutated directly. A reverse link is computed
/// by scanning the target kind's registry for records whose forward field
/// points back; it is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRole {
    /// The declaring record stores the foreign key.
    Forward {
        /// Name of the identifier field on the record (`..._id` / `..._ids`).
        field: String,
        /// Name of the pointer field in wire messages (`..._ref` / `..._refs`).
        ref_name: String,
        /// Name of the paired reverse link on the target type(s), if the
        /// reverse is modeled at all.
        reverse_name: Option<String>,
    },
    /// Derived view over the target kind's forward fields.
    Reverse {
        /// Name of the forward identifier field on the target type(s).
        forward_field: String,
        /// Cardinality of that forward field.
        forward_cardinality: Cardinality,
    },
}

/// One declared link on one record type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkEntry {
    /// Link name, unique within the declaring type.
    pub name: String,
    /// Base kind the link points at.
    pub target_kind: BaseKind,
    /// Concrete subtypes accepted as targets; empty means any subtype of
    /// `target_kind`.
    #[serde(default)]
    pub target_types: Vec<String>,
    /// Forward-side cardinality. Reverse links are always *read* as
    /// multiple, regardless of this value; see [`LinkRole::Reverse`].
    pub cardinality: Cardinality,
    /// When true only the getter is exposed; mutation must happen from the
    /// forward side.
    #[serde(default)]
    pub read_only: bool,
    /// Forward or reverse role.
    pub role: LinkRole,
}

impl LinkEntry {
    /// Returns the stored-field name when this is a forward entry.
    #[must_use]
    pub fn forward_field(&self) -> Option<&str> {
        match &self.role {
            LinkRole::Forward { field, .. } => Some(field),
            LinkRole::Reverse { .. } => None,
        }
    }
}

/// All links declared by one concrete record type.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeLinks {
    /// Concrete type tag (e.g. `MxExperiment`).
    pub concrete_type: String,
    /// Base kind of the declaring type.
    pub base_kind: BaseKind,
    /// Declared links, by link name.
    pub links: Vec<LinkEntry>,
}

/// Error raised while constructing or loading a [`LinkTable`].
#[derive(Debug, Error)]
pub enum SpecError {
    /// Two `TypeLinks` blocks declare the same concrete type.
    #[error("duplicate link declaration for type '{concrete_type}'")]
    DuplicateType {
        /// The repeated type tag.
        concrete_type: String,
    },
    /// Two links on one type share a name.
    #[error("duplicate link '{link}' on type '{concrete_type}'")]
    DuplicateLink {
        /// Declaring type tag.
        concrete_type: String,
        /// The repeated link name.
        link: String,
    },
    /// A forward link names a target type that declares no links at all.
    #[error("link '{link}' on '{concrete_type}' targets unknown type '{target_type}'")]
    UnknownTargetType {
        /// Declaring type tag.
        concrete_type: String,
        /// Link name.
        link: String,
        /// The missing target type tag.
        target_type: String,
    },
    /// A forward link's declared reverse is missing on a target type.
    #[error(
        "link '{link}' on '{concrete_type}' declares reverse '{reverse}' \
         which is missing or mismatched on target type '{target_type}'"
    )]
    MissingReverse {
        /// Declaring type tag.
        concrete_type: String,
        /// Forward link name.
        link: String,
        /// Declared reverse link name.
        reverse: String,
        /// Target type that lacks the matching reverse entry.
        target_type: String,
    },
    /// A reverse link references a forward field no target type declares.
    #[error(
        "reverse link '{link}' on '{concrete_type}' references forward field \
         '{forward_field}' which no {target_kind} type declares"
    )]
    DanglingReverse {
        /// Declaring type tag.
        concrete_type: String,
        /// Reverse link name.
        link: String,
        /// The unmatched forward field name.
        forward_field: String,
        /// Kind that was scanned for the forward declaration.
        target_kind: BaseKind,
    },
    /// The declarative document failed to parse.
    #[error("link specification document is malformed: {0}")]
    Document(#[from] serde_json::Error),
}

/// Validated, immutable link table.
///
/// Internal consistency (every declared reverse has its matching forward and
/// vice versa) is established once, at construction; operations never
/// re-validate.
#[derive(Debug, Clone)]
pub struct LinkTable {
    types: BTreeMap<String, IndexedTypeLinks>,
}

#[derive(Debug, Clone)]
struct IndexedTypeLinks {
    base_kind: BaseKind,
    links: BTreeMap<String, LinkEntry>,
}

impl LinkTable {
    /// Builds and validates a table from per-type declarations.
    pub fn new(declarations: Vec<TypeLinks>) -> Result<Self, SpecError> {
        let mut types: BTreeMap<String, IndexedTypeLinks> = BTreeMap::new();
        for decl in declarations {
            let mut links = BTreeMap::new();
            for entry in decl.links {
                if links.contains_key(&entry.name) {
                    return Err(SpecError::DuplicateLink {
                        concrete_type: decl.concrete_type,
                        link: entry.name,
                    });
                }
                links.insert(entry.name.clone(), entry);
            }
            let indexed = IndexedTypeLinks {
                base_kind: decl.base_kind,
                links,
            };
            if types.insert(decl.concrete_type.clone(), indexed).is_some() {
                return Err(SpecError::DuplicateType {
                    concrete_type: decl.concrete_type,
                });
            }
        }
        let table = Self { types };
        table.validate()?;
        Ok(table)
    }

    /// Loads a table from a declarative JSON document: an array of
    /// [`TypeLinks`] blocks.
    pub fn from_json(document: &str) -> Result<Self, SpecError> {
        let declarations: Vec<TypeLinks> = serde_json::from_str(document)?;
        Self::new(declarations)
    }

    fn validate(&self) -> Result<(), SpecError> {
        for (type_tag, decl) in &self.types {
            for entry in decl.links.values() {
                match &entry.role {
                    LinkRole::Forward {
                        field,
                        reverse_name: Some(reverse),
                        ..
                    } => self.check_reverse_pair(type_tag, decl, entry, field, reverse)?,
                    LinkRole::Forward { .. } => {}
                    LinkRole::Reverse { forward_field, .. } => {
                        self.check_forward_exists(type_tag, entry, forward_field)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_reverse_pair(
        &self,
        type_tag: &str,
        decl: &IndexedTypeLinks,
        entry: &LinkEntry,
        forward_field: &str,
        reverse: &str,
    ) -> Result<(), SpecError> {
        let target_types: Vec<&String> = if entry.target_types.is_empty() {
            self.types_of_kind(entry.target_kind).collect()
        } else {
            entry.target_types.iter().collect()
        };
        for target_type in target_types {
            let target = self.types.get(target_type).ok_or_else(|| {
                SpecError::UnknownTargetType {
                    concrete_type: type_tag.to_owned(),
                    link: entry.name.clone(),
                    target_type: target_type.clone(),
                }
            })?;
            let matches = target.links.get(reverse).is_some_and(|rev| {
                rev.target_kind == decl.base_kind
                    && rev.role
                        == LinkRole::Reverse {
                            forward_field: forward_field.to_owned(),
                            forward_cardinality: entry.cardinality,
                        }
            });
            if !matches {
                return Err(SpecError::MissingReverse {
                    concrete_type: type_tag.to_owned(),
                    link: entry.name.clone(),
                    reverse: reverse.to_owned(),
                    target_type: target_type.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_forward_exists(
        &self,
        type_tag: &str,
        entry: &LinkEntry,
        forward_field: &str,
    ) -> Result<(), SpecError> {
        let declared = self
            .types
            .values()
            .filter(|decl| decl.base_kind == entry.target_kind)
            .any(|decl| {
                decl.links
                    .values()
                    .any(|e| e.forward_field() == Some(forward_field))
            });
        if declared {
            Ok(())
        } else {
            Err(SpecError::DanglingReverse {
                concrete_type: type_tag.to_owned(),
                link: entry.name.clone(),
                forward_field: forward_field.to_owned(),
                target_kind: entry.target_kind,
            })
        }
    }

    fn types_of_kind(&self, kind: BaseKind) -> impl Iterator<Item = &String> {
        self.types
            .iter()
            .filter(move |(_, decl)| decl.base_kind == kind)
            .map(|(tag, _)| tag)
    }

    /// Looks up one link entry by declaring type and link name.
    #[must_use]
    pub fn entry(&self, concrete_type: &str, link: &str) -> Option<&LinkEntry> {
        self.types.get(concrete_type)?.links.get(link)
    }

    /// Returns the base kind a concrete type was declared with, if any.
    #[must_use]
    pub fn base_kind_of(&self, concrete_type: &str) -> Option<BaseKind> {
        self.types.get(concrete_type).map(|decl| decl.base_kind)
    }

    /// Iterates over the forward link entries of one concrete type.
    ///
    /// Yields nothing for unknown types; the codec treats such payload
    /// fields as plain data.
    pub fn forward_entries(&self, concrete_type: &str) -> impl Iterator<Item = &LinkEntry> {
        self.types
            .get(concrete_type)
            .into_iter()
            .flat_map(|decl| decl.links.values())
            .filter(|entry| matches!(entry.role, LinkRole::Forward { .. }))
    }

    /// Iterates over all link entries of one concrete type.
    pub fn entries(&self, concrete_type: &str) -> impl Iterator<Item = &LinkEntry> {
        self.types
            .get(concrete_type)
            .into_iter()
            .flat_map(|decl| decl.links.values())
    }

    /// Iterates over all declared concrete type tags.
    pub fn concrete_types(&self) -> impl Iterator<Item = &String> {
        self.types.keys()
    }
}
