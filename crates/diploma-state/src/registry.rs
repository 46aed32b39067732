//! # Student Registry
//!
//! Maps credential identifiers to [`StudentRecord`]s and keeps the
//! [`ActiveIndex`] in lockstep with the map. Presence is explicit: an
//! identifier either has a record or it does not. There is no zero-valued
//! placeholder record.
//!
//! This module enforces structure only (uniqueness, index consistency).
//! Authorisation and events live in [`crate::contract`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use diploma_core::CredentialId;

use crate::error::{RegistryError, SnapshotError};
use crate::index::{ActiveIndex, Removal};

/// Per-student state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// The credential identifier this record belongs to.
    pub id: CredentialId,
    /// Set and cleared by the authority.
    pub eligible: bool,
    /// Set on successful payment; cleared only by the authority.
    pub paid: bool,
}

impl StudentRecord {
    /// A freshly submitted record: not eligible, not paid.
    pub fn new(id: CredentialId) -> Self {
        Self {
            id,
            eligible: false,
            paid: false,
        }
    }
}

/// Record map plus active index.
///
/// Serializes as the list of records in active-sequence order; the map and
/// the index are both rebuilt from that list on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<StudentRecord>", try_from = "Vec<StudentRecord>")]
pub struct StudentRegistry {
    records: HashMap<CredentialId, StudentRecord>,
    active: ActiveIndex,
}

impl StudentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered students.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no students are registered.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Whether a record exists for `id`.
    pub fn contains(&self, id: &CredentialId) -> bool {
        self.records.contains_key(id)
    }

    /// The record for `id`, if registered.
    pub fn get(&self, id: &CredentialId) -> Option<&StudentRecord> {
        self.records.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &CredentialId) -> Option<&mut StudentRecord> {
        self.records.get_mut(id)
    }

    /// The active index backing enumeration.
    pub fn active(&self) -> &ActiveIndex {
        &self.active
    }

    /// Iterate all records in active-sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &StudentRecord> + '_ {
        self.active.iter().filter_map(|id| self.records.get(id))
    }

    /// Create a record for `id` and append it to the active index.
    pub fn insert(&mut self, id: CredentialId) -> Result<&StudentRecord, RegistryError> {
        if self.records.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered { id });
        }
        if self.active.push(id.clone()).is_none() {
            return Err(RegistryError::IndexCorrupted {
                id,
                detail: "active without a record".into(),
            });
        }
        let record = self
            .records
            .entry(id.clone())
            .or_insert_with(|| StudentRecord::new(id));
        Ok(&*record)
    }

    /// Delete the record for `id` and repair the index by swap-and-pop.
    ///
    /// The index is repaired first; it validates before mutating, so a
    /// corrupted index leaves the record in place.
    pub fn remove(&mut self, id: &CredentialId) -> Result<(StudentRecord, Removal), RegistryError> {
        if !self.records.contains_key(id) {
            return Err(RegistryError::NotFound { id: id.clone() });
        }
        let removal = self.active.swap_remove(id)?;
        let record = self
            .records
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound { id: id.clone() })?;
        Ok((record, removal))
    }

    /// Check the index invariant and that the index and map hold the same
    /// identifiers.
    pub fn check_consistency(&self) -> Result<(), String> {
        self.active.check_invariant()?;
        if self.records.len() != self.active.len() {
            return Err(format!(
                "{} records but {} active identifiers",
                self.records.len(),
                self.active.len()
            ));
        }
        for (key, record) in &self.records {
            if key != &record.id {
                return Err(format!("record for {} stored under {key}", record.id));
            }
            if !self.active.contains(key) {
                return Err(format!("{key} has a record but no active position"));
            }
        }
        Ok(())
    }
}

impl From<StudentRegistry> for Vec<StudentRecord> {
    fn from(mut registry: StudentRegistry) -> Self {
        registry
            .active
            .iter()
            .filter_map(|id| registry.records.remove(id))
            .collect()
    }
}

impl TryFrom<Vec<StudentRecord>> for StudentRegistry {
    type Error = SnapshotError;

    fn try_from(records: Vec<StudentRecord>) -> Result<Self, Self::Error> {
        let mut registry = StudentRegistry::new();
        for record in records {
            if registry.active.push(record.id.clone()).is_none() {
                return Err(SnapshotError::DuplicateIdentifier(record.id));
            }
            registry.records.insert(record.id.clone(), record);
        }
        Ok(registry)
    }
}
