//! # Credential Registry
//!
//! The owned state object: configuration, student registry, and diploma
//! ledger. Every operation is all-or-nothing. Validation runs to completion
//! before the first mutation, and an event is published only after the
//! mutation commits.
//!
//! ## Lifecycle of one credential identifier
//!
//! ```text
//! absent ──submit──▶ registered(eligible=F, paid=F)
//!                        │  ▲
//!            set_eligible│  │set_eligible(false)
//!                        ▼  │
//!                    registered(eligible=T, paid=F) ──pay──▶ registered(T, T)
//!                                       ▲                          │
//!                                       └──────reset_payment───────┘
//!
//! remove: any registered state ──▶ absent
//! ```
//!
//! ## Caller identity
//!
//! Privileged operations compare the caller with the configured authority
//! before any other check, so an unauthorized caller learns nothing about
//! registry contents.

use serde::{Deserialize, Serialize};

use diploma_core::{
    AccountId, Amount, CredentialId, CredentialSignature, DiplomaSignature, RegistryConfig,
};

use crate::error::RegistryError;
use crate::events::{EventSink, RegistryEvent};
use crate::ledger::DiplomaLedger;
use crate::payment::{validate_payment, FundsTransfer};
use crate::registry::{StudentRecord, StudentRegistry};

/// Registry state with its immutable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRegistry {
    config: RegistryConfig,
    students: StudentRegistry,
    diplomas: DiplomaLedger,
}

impl CredentialRegistry {
    /// Create an empty registry owned by `config.authority`.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            students: StudentRegistry::new(),
            diplomas: DiplomaLedger::new(),
        }
    }

    // ─── Public reads ────────────────────────────────────────────────

    /// The exact fee a student must attach.
    pub fn fee(&self) -> Amount {
        self.config.fee
    }

    /// The privileged identity.
    pub fn authority(&self) -> &AccountId {
        &self.config.authority
    }

    /// Construction-time configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The record for `id`, if registered.
    pub fn student(&self, id: &CredentialId) -> Option<&StudentRecord> {
        self.students.get(id)
    }

    /// Every registered record, in active-sequence order.
    pub fn list_all_students(&self) -> Vec<StudentRecord> {
        self.students.iter().cloned().collect()
    }

    /// Underlying student registry.
    pub fn students(&self) -> &StudentRegistry {
        &self.students
    }

    /// Underlying diploma ledger.
    pub fn diplomas(&self) -> &DiplomaLedger {
        &self.diplomas
    }

    // ─── Student registry ────────────────────────────────────────────

    /// Register `id` with eligible and paid both false. Open to any caller.
    pub fn submit_credential(
        &mut self,
        caller: &AccountId,
        id: CredentialId,
        sink: &mut dyn EventSink,
    ) -> Result<RegistryEvent, RegistryError> {
        if let Err(err) = self.students.insert(id.clone()) {
            tracing::debug!(%caller, credential = %id, error = %err, "submission rejected");
            return Err(err);
        }
        tracing::info!(%caller, credential = %id, "credential submitted");
        Ok(emit(sink, RegistryEvent::CredentialSubmitted { id }))
    }

    /// Set a student's eligibility. Authority only.
    ///
    /// Requesting the current value changes nothing and publishes
    /// `AlreadyEligible` or `AlreadyIneligible`.
    pub fn set_eligible(
        &mut self,
        caller: &AccountId,
        id: &CredentialId,
        eligible: bool,
        sink: &mut dyn EventSink,
    ) -> Result<RegistryEvent, RegistryError> {
        self.require_authority(caller, "set_eligible")?;
        let record = self
            .students
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound { id: id.clone() })?;

        let id = id.clone();
        let event = match (record.eligible, eligible) {
            (true, true) => RegistryEvent::AlreadyEligible { id },
            (false, false) => RegistryEvent::AlreadyIneligible { id },
            (false, true) => {
                record.eligible = true;
                RegistryEvent::StudentEligible { id }
            }
            (true, false) => {
                record.eligible = false;
                RegistryEvent::StudentIneligible { id }
            }
        };

        if event.is_noop() {
            tracing::debug!(credential = %record.id, eligible, "eligibility unchanged");
        } else {
            tracing::info!(credential = %record.id, eligible, "eligibility changed");
        }
        Ok(emit(sink, event))
    }

    /// Remove a student and repair the active index. Authority only.
    pub fn remove_student(
        &mut self,
        caller: &AccountId,
        id: &CredentialId,
        sink: &mut dyn EventSink,
    ) -> Result<RegistryEvent, RegistryError> {
        self.require_authority(caller, "remove_student")?;
        let (record, removal) = self.students.remove(id).map_err(|err| {
            if let RegistryError::IndexCorrupted { detail, .. } = &err {
                tracing::error!(credential = %id, %detail, "active index corrupted");
            }
            err
        })?;
        tracing::info!(
            credential = %record.id,
            vacated = removal.vacated.get(),
            moved = removal.moved.as_ref().map(|m| m.as_str()),
            "student removed"
        );
        Ok(emit(sink, RegistryEvent::StudentRemoved { id: record.id }))
    }

    /// Clear a student's paid flag. Authority only; requires eligibility.
    pub fn reset_payment(
        &mut self,
        caller: &AccountId,
        id: &CredentialId,
        sink: &mut dyn EventSink,
    ) -> Result<RegistryEvent, RegistryError> {
        self.require_authority(caller, "reset_payment")?;
        let record = match self.students.get_mut(id) {
            Some(r) if r.eligible => r,
            _ => return Err(RegistryError::NotEligible { id: id.clone() }),
        };
        let was_paid = std::mem::replace(&mut record.paid, false);
        tracing::info!(credential = %id, was_paid, "payment reset");
        Ok(emit(sink, RegistryEvent::PaymentReset { id: id.clone() }))
    }

    // ─── Payment gate ────────────────────────────────────────────────

    /// Pay the fee for `id`, forwarding `attached` to the authority.
    ///
    /// Order: validate, transfer, commit the paid flag, publish. A failed
    /// transfer aborts with [`RegistryError::TransferFailed`] and leaves the
    /// record untouched.
    pub fn pay_for_credential(
        &mut self,
        caller: &AccountId,
        id: &CredentialId,
        attached: Amount,
        funds: &mut dyn FundsTransfer,
        sink: &mut dyn EventSink,
    ) -> Result<RegistryEvent, RegistryError> {
        let fee = self.config.fee;
        if let Err(err) = validate_payment(id, self.students.get(id), fee, attached) {
            tracing::debug!(%caller, credential = %id, %attached, error = %err, "payment rejected");
            return Err(err);
        }

        let recipient = &self.config.authority;
        if let Err(err) = funds.transfer(recipient, attached) {
            tracing::warn!(%caller, credential = %id, %recipient, error = %err, "fee transfer failed");
            return Err(RegistryError::TransferFailed {
                recipient: recipient.clone(),
                reason: err.to_string(),
            });
        }

        let record = self
            .students
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotEligible { id: id.clone() })?;
        record.paid = true;
        tracing::info!(%caller, credential = %id, amount = %attached, "payment received");
        Ok(emit(
            sink,
            RegistryEvent::PaymentReceived {
                id: id.clone(),
                payer: caller.clone(),
                amount: attached,
            },
        ))
    }

    // ─── Diploma ledger ──────────────────────────────────────────────

    /// Record a diploma against a credential signature. Authority only.
    ///
    /// Overwrites any earlier entry for the same diploma signature. The
    /// student registry is not consulted.
    pub fn issue_diploma(
        &mut self,
        caller: &AccountId,
        diploma_signature: DiplomaSignature,
        credential_signature: CredentialSignature,
        sink: &mut dyn EventSink,
    ) -> Result<RegistryEvent, RegistryError> {
        self.require_authority(caller, "issue_diploma")?;
        let previous = self
            .diplomas
            .issue(diploma_signature.clone(), credential_signature.clone());
        tracing::info!(
            diploma = %diploma_signature,
            overwrote = previous.is_some(),
            "diploma issued"
        );
        Ok(emit(
            sink,
            RegistryEvent::DiplomaIssued {
                diploma_signature,
                credential_signature,
            },
        ))
    }

    /// Whether `diploma_signature` was issued against exactly
    /// `credential_signature`. Authority only. Publishes nothing.
    pub fn verify_diploma(
        &self,
        caller: &AccountId,
        diploma_signature: &DiplomaSignature,
        credential_signature: &CredentialSignature,
    ) -> Result<bool, RegistryError> {
        self.require_authority(caller, "verify_diploma")?;
        let valid = self.diplomas.verify(diploma_signature, credential_signature);
        tracing::debug!(diploma = %diploma_signature, valid, "diploma verified");
        Ok(valid)
    }

    fn require_authority(&self, caller: &AccountId, operation: &str) -> Result<(), RegistryError> {
        if caller != &self.config.authority {
            tracing::warn!(%caller, operation, "unauthorized caller");
            return Err(RegistryError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }
}

fn emit(sink: &mut dyn EventSink, event: RegistryEvent) -> RegistryEvent {
    sink.publish(event.clone());
    event
}
