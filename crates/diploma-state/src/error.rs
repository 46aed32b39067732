//! # Registry Errors
//!
//! Every failure aborts the operation with zero side effects: no field is
//! mutated and no event is published. Errors carry the identifiers involved
//! so that callers can report them without re-reading state.

use diploma_core::{AccountId, Amount, CredentialId, DiplomaSignature};
use thiserror::Error;

/// Errors returned by registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A privileged operation was called by someone other than the authority.
    #[error("caller {caller} is not the registry authority")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
    },

    /// The credential identifier already has an active record.
    #[error("credential {id} is already registered")]
    AlreadyRegistered {
        /// The duplicate identifier.
        id: CredentialId,
    },

    /// No record exists for the credential identifier.
    #[error("credential {id} is not registered")]
    NotFound {
        /// The missing identifier.
        id: CredentialId,
    },

    /// The record is missing or not eligible.
    ///
    /// A missing record is ineligible by definition, so payment and payment
    /// reset report both cases through this variant.
    #[error("credential {id} is not eligible")]
    NotEligible {
        /// The ineligible identifier.
        id: CredentialId,
    },

    /// The fee for this credential has already been paid.
    #[error("credential {id} has already been paid for")]
    AlreadyPaid {
        /// The identifier paid for.
        id: CredentialId,
    },

    /// The attached value does not exactly match the configured fee.
    #[error("attached amount {attached} does not match fee {expected}")]
    WrongAmount {
        /// The configured fee.
        expected: Amount,
        /// The value attached to the call.
        attached: Amount,
    },

    /// Forwarding the fee to the authority failed.
    #[error("fee transfer to {recipient} failed: {reason}")]
    TransferFailed {
        /// The intended recipient.
        recipient: AccountId,
        /// Why the transfer primitive refused.
        reason: String,
    },

    /// The active-identifier index disagrees with the record map.
    ///
    /// Never caused by caller input. Indicates a corrupted snapshot or a bug.
    #[error("active index corrupted for credential {id}: {detail}")]
    IndexCorrupted {
        /// The identifier whose position is inconsistent.
        id: CredentialId,
        /// What was inconsistent.
        detail: String,
    },
}

impl RegistryError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::AlreadyRegistered { .. } => "ALREADY_REGISTERED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::NotEligible { .. } => "NOT_ELIGIBLE",
            Self::AlreadyPaid { .. } => "ALREADY_PAID",
            Self::WrongAmount { .. } => "WRONG_AMOUNT",
            Self::TransferFailed { .. } => "TRANSFER_FAILED",
            Self::IndexCorrupted { .. } => "INDEX_CORRUPTED",
        }
    }
}

/// A persisted registry snapshot failed consistency checks on load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The same identifier appears twice in the active sequence.
    #[error("credential {0} appears more than once in the active sequence")]
    DuplicateIdentifier(CredentialId),

    /// The same diploma signature appears twice in the ledger.
    #[error("diploma {0} appears more than once in the ledger")]
    DuplicateDiploma(DiplomaSignature),

    /// Event records are not in strictly increasing sequence order.
    #[error("event sequence {found} does not follow {previous}")]
    EventOutOfOrder {
        /// Sequence number of the preceding record.
        previous: u64,
        /// The offending sequence number.
        found: u64,
    },
}
