//! # Diploma Ledger
//!
//! Maps diploma signatures to the credential signature recorded at
//! issuance. Writes overwrite; verification is byte equality against the
//! stored value. No cryptographic check is performed.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use diploma_core::{CredentialSignature, DiplomaSignature};

use crate::error::SnapshotError;

/// One issued diploma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub diploma_signature: DiplomaSignature,
    pub credential_signature: CredentialSignature,
}

/// Diploma signature → credential signature.
///
/// Serializes as a list of entries sorted by diploma signature bytes. A
/// list naming the same diploma twice is rejected on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<LedgerEntry>", try_from = "Vec<LedgerEntry>")]
pub struct DiplomaLedger {
    entries: HashMap<DiplomaSignature, CredentialSignature>,
}

impl DiplomaLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of issued diplomas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been issued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `credential` against `diploma`, returning the overwritten value.
    pub fn issue(
        &mut self,
        diploma: DiplomaSignature,
        credential: CredentialSignature,
    ) -> Option<CredentialSignature> {
        self.entries.insert(diploma, credential)
    }

    /// The credential signature recorded for `diploma`.
    pub fn get(&self, diploma: &DiplomaSignature) -> Option<&CredentialSignature> {
        self.entries.get(diploma)
    }

    /// True iff `diploma` was issued against exactly `credential`.
    ///
    /// An unknown diploma and a mismatch both return false.
    pub fn verify(&self, diploma: &DiplomaSignature, credential: &CredentialSignature) -> bool {
        self.entries
            .get(diploma)
            .is_some_and(|stored| stored.as_bytes() == credential.as_bytes())
    }
}

impl From<DiplomaLedger> for Vec<LedgerEntry> {
    fn from(ledger: DiplomaLedger) -> Self {
        let mut entries: Vec<LedgerEntry> = ledger
            .entries
            .into_iter()
            .map(|(diploma_signature, credential_signature)| LedgerEntry {
                diploma_signature,
                credential_signature,
            })
            .collect();
        entries.sort_by(|a, b| {
            a.diploma_signature
                .as_bytes()
                .cmp(b.diploma_signature.as_bytes())
        });
        entries
    }
}

impl TryFrom<Vec<LedgerEntry>> for DiplomaLedger {
    type Error = SnapshotError;

    fn try_from(entries: Vec<LedgerEntry>) -> Result<Self, Self::Error> {
        let mut ledger = DiplomaLedger::new();
        for entry in entries {
            match ledger.entries.entry(entry.diploma_signature) {
                Entry::Occupied(slot) => {
                    return Err(SnapshotError::DuplicateDiploma(slot.key().clone()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry.credential_signature);
                }
            }
        }
        Ok(ledger)
    }
}
