//! # Registry Runtime
//!
//! Bundles a [`CredentialRegistry`] with the collaborators it needs: an
//! [`EventLog`] as notification channel and an [`AccountBook`] as transfer
//! primitive. The bundle is the unit of persistence for the CLI and the
//! unit of locking for the HTTP service.
//!
//! Deserialization rebuilds the active index from the stored record order
//! and rejects duplicate identifiers and out-of-order event records.

use serde::{Deserialize, Serialize};

use diploma_core::{
    AccountId, Amount, CredentialId, CredentialSignature, DiplomaSignature, RegistryConfig,
};

use crate::contract::CredentialRegistry;
use crate::error::RegistryError;
use crate::events::{EventLog, RegistryEvent};
use crate::payment::AccountBook;

/// Snapshot format version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A registry together with its event history and balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRuntime {
    #[serde(default = "snapshot_version")]
    pub version: u32,
    pub registry: CredentialRegistry,
    #[serde(default)]
    pub events: EventLog,
    #[serde(default)]
    pub accounts: AccountBook,
}

fn snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

impl RegistryRuntime {
    /// A fresh runtime with an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            registry: CredentialRegistry::new(config),
            events: EventLog::new(),
            accounts: AccountBook::new(),
        }
    }

    pub fn submit_credential(
        &mut self,
        caller: &AccountId,
        id: CredentialId,
    ) -> Result<RegistryEvent, RegistryError> {
        self.registry.submit_credential(caller, id, &mut self.events)
    }

    pub fn set_eligible(
        &mut self,
        caller: &AccountId,
        id: &CredentialId,
        eligible: bool,
    ) -> Result<RegistryEvent, RegistryError> {
        self.registry
            .set_eligible(caller, id, eligible, &mut self.events)
    }

    pub fn remove_student(
        &mut self,
        caller: &AccountId,
        id: &CredentialId,
    ) -> Result<RegistryEvent, RegistryError> {
        self.registry.remove_student(caller, id, &mut self.events)
    }

    pub fn reset_payment(
        &mut self,
        caller: &AccountId,
        id: &CredentialId,
    ) -> Result<RegistryEvent, RegistryError> {
        self.registry.reset_payment(caller, id, &mut self.events)
    }

    pub fn pay_for_credential(
        &mut self,
        caller: &AccountId,
        id: &CredentialId,
        attached: Amount,
    ) -> Result<RegistryEvent, RegistryError> {
        self.registry
            .pay_for_credential(caller, id, attached, &mut self.accounts, &mut self.events)
    }

    pub fn issue_diploma(
        &mut self,
        caller: &AccountId,
        diploma_signature: DiplomaSignature,
        credential_signature: CredentialSignature,
    ) -> Result<RegistryEvent, RegistryError> {
        self.registry.issue_diploma(
            caller,
            diploma_signature,
            credential_signature,
            &mut self.events,
        )
    }

    pub fn verify_diploma(
        &self,
        caller: &AccountId,
        diploma_signature: &DiplomaSignature,
        credential_signature: &CredentialSignature,
    ) -> Result<bool, RegistryError> {
        self.registry
            .verify_diploma(caller, diploma_signature, credential_signature)
    }

    /// Balance of `account` in the runtime's account book.
    pub fn balance(&self, account: &AccountId) -> Amount {
        self.accounts.balance(account)
    }
}
