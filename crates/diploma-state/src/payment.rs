//! # Payment Gate
//!
//! Fee validation and the value-transfer primitive.
//!
//! The gate checks, in order: the record exists and is eligible, it is not
//! already paid, and the attached amount equals the fee exactly. Only then
//! is the value pushed to the authority through [`FundsTransfer`]. The paid
//! flag is committed by the caller after the transfer reports success.
//!
//! [`AccountBook`] is the in-memory ledger of balances. Accounts can be
//! marked as rejecting deposits to exercise the failed-transfer path.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use diploma_core::{AccountId, Amount, CredentialId};

use crate::error::RegistryError;
use crate::registry::StudentRecord;

// ─── Validation ──────────────────────────────────────────────────────

/// Validate a payment attempt against the current record and the fee.
///
/// A missing record is reported as [`RegistryError::NotEligible`].
pub fn validate_payment(
    id: &CredentialId,
    record: Option<&StudentRecord>,
    fee: Amount,
    attached: Amount,
) -> Result<(), RegistryError> {
    let record = match record {
        Some(r) if r.eligible => r,
        _ => return Err(RegistryError::NotEligible { id: id.clone() }),
    };
    if record.paid {
        return Err(RegistryError::AlreadyPaid { id: id.clone() });
    }
    if attached != fee {
        return Err(RegistryError::WrongAmount {
            expected: fee,
            attached,
        });
    }
    Ok(())
}

// ─── Transfer primitive ──────────────────────────────────────────────

/// Why a transfer was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The recipient refuses incoming funds.
    #[error("recipient {0} rejects deposits")]
    Rejected(AccountId),

    /// Crediting the recipient would overflow its balance.
    #[error("balance of {0} would overflow")]
    Overflow(AccountId),
}

/// Push-transfer of value to an account.
///
/// Implementations receive no handle to the registry, so a transfer cannot
/// call back into the operation that triggered it.
pub trait FundsTransfer {
    /// Move `amount` to `to`. On error nothing has moved.
    fn transfer(&mut self, to: &AccountId, amount: Amount) -> Result<(), TransferError>;
}

/// In-memory balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBook {
    #[serde(default)]
    balances: BTreeMap<AccountId, Amount>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    rejecting: BTreeSet<AccountId>,
}

impl AccountBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance of `account` (zero if never credited).
    pub fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// All non-zero balances, ordered by account.
    pub fn balances(&self) -> impl Iterator<Item = (&AccountId, Amount)> + '_ {
        self.balances.iter().map(|(a, b)| (a, *b))
    }

    /// Make `account` refuse (or accept again) incoming transfers.
    pub fn set_rejecting(&mut self, account: AccountId, rejecting: bool) {
        if rejecting {
            self.rejecting.insert(account);
        } else {
            self.rejecting.remove(&account);
        }
    }

    /// Whether `account` refuses incoming transfers.
    pub fn is_rejecting(&self, account: &AccountId) -> bool {
        self.rejecting.contains(account)
    }
}

impl FundsTransfer for AccountBook {
    fn transfer(&mut self, to: &AccountId, amount: Amount) -> Result<(), TransferError> {
        if self.rejecting.contains(to) {
            return Err(TransferError::Rejected(to.clone()));
        }
        let updated = self
            .balance(to)
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow(to.clone()))?;
        if !updated.is_zero() {
            self.balances.insert(to.clone(), updated);
        }
        Ok(())
    }
}
