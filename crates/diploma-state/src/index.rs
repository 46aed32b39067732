//! # Active Identifier Index
//!
//! A dense sequence of registered credential identifiers paired with a
//! reverse map from identifier to its 1-based position. Removal is O(1):
//! the last identifier is moved into the vacated slot and the sequence is
//! popped.
//!
//! ## Invariant
//!
//! ```text
//! for every id in positions:  sequence[positions[id] - 1] == id
//! for every p < len:          positions[sequence[p]] == p + 1
//! ```
//!
//! Positions are stored as [`NonZeroUsize`], so "position zero" is not a
//! representable value. An identifier without a stored position is absent.
//!
//! ## Serialization
//!
//! Only the sequence is persisted. The position map is rebuilt on load and
//! a sequence containing duplicates is rejected.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use diploma_core::CredentialId;

use crate::error::{RegistryError, SnapshotError};

/// Dense, removable sequence of active credential identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<CredentialId>", try_from = "Vec<CredentialId>")]
pub struct ActiveIndex {
    sequence: Vec<CredentialId>,
    positions: HashMap<CredentialId, NonZeroUsize>,
}

/// Outcome of a successful swap-and-pop removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// The 1-based position the removed identifier occupied.
    pub vacated: NonZeroUsize,
    /// The identifier moved from the tail into the vacated slot, if any.
    pub moved: Option<CredentialId>,
}

impl ActiveIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active identifiers.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether no identifiers are active.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Whether `id` is active.
    pub fn contains(&self, id: &CredentialId) -> bool {
        self.positions.contains_key(id)
    }

    /// The 1-based position of `id`, or `None` if absent.
    pub fn position(&self, id: &CredentialId) -> Option<NonZeroUsize> {
        self.positions.get(id).copied()
    }

    /// The active identifiers in sequence order.
    pub fn as_slice(&self) -> &[CredentialId] {
        &self.sequence
    }

    /// Iterate the active identifiers in sequence order.
    pub fn iter(&self) -> std::slice::Iter<'_, CredentialId> {
        self.sequence.iter()
    }

    /// Append `id` and return its 1-based position.
    ///
    /// Returns `None` without modifying the index if `id` is already active.
    pub fn push(&mut self, id: CredentialId) -> Option<NonZeroUsize> {
        if self.positions.contains_key(&id) {
            return None;
        }
        self.sequence.push(id.clone());
        // Post-append length is the new element's 1-based position.
        let pos = NonZeroUsize::new(self.sequence.len())?;
        self.positions.insert(id, pos);
        Some(pos)
    }

    /// Remove `id` by swapping the last identifier into its slot.
    ///
    /// The stored position is checked against the sequence before anything
    /// is modified, so a failure leaves the index untouched. A missing or
    /// inconsistent position is reported as [`RegistryError::IndexCorrupted`];
    /// callers confirm existence in the record map first, so this is never a
    /// user error.
    pub fn swap_remove(&mut self, id: &CredentialId) -> Result<Removal, RegistryError> {
        let vacated = self
            .positions
            .get(id)
            .copied()
            .ok_or_else(|| corrupted(id, "no active position"))?;
        let actual = vacated.get() - 1;
        if self.sequence.get(actual) != Some(id) {
            return Err(corrupted(
                id,
                &format!("position {vacated} does not hold this identifier"),
            ));
        }

        let last = self.sequence.len() - 1;
        let moved = if actual != last {
            self.sequence.swap(actual, last);
            let moved = self.sequence[actual].clone();
            self.positions.insert(moved.clone(), vacated);
            Some(moved)
        } else {
            None
        };
        self.sequence.pop();
        self.positions.remove(id);

        Ok(Removal { vacated, moved })
    }

    /// Check the bidirectional position invariant.
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariant(&self) -> Result<(), String> {
        if self.sequence.len() != self.positions.len() {
            return Err(format!(
                "sequence holds {} identifiers but {} positions are stored",
                self.sequence.len(),
                self.positions.len()
            ));
        }
        for (p, id) in self.sequence.iter().enumerate() {
            match self.positions.get(id) {
                Some(pos) if pos.get() == p + 1 => {}
                Some(pos) => {
                    return Err(format!("{id} at slot {p} but stored position is {pos}"));
                }
                None => return Err(format!("{id} at slot {p} has no stored position")),
            }
        }
        Ok(())
    }
}

fn corrupted(id: &CredentialId, detail: &str) -> RegistryError {
    RegistryError::IndexCorrupted {
        id: id.clone(),
        detail: detail.to_string(),
    }
}

impl From<ActiveIndex> for Vec<CredentialId> {
    fn from(index: ActiveIndex) -> Self {
        index.sequence
    }
}

impl TryFrom<Vec<CredentialId>> for ActiveIndex {
    type Error = SnapshotError;

    fn try_from(sequence: Vec<CredentialId>) -> Result<Self, Self::Error> {
        let mut index = ActiveIndex::new();
        for id in sequence {
            if index.push(id.clone()).is_none() {
                return Err(SnapshotError::DuplicateIdentifier(id));
            }
        }
        Ok(index)
    }
}
