//! # diploma-state: Credential Registry State Machine
//!
//! The sequential workflow of credential issuance: a student registers a
//! credential identifier, the authority marks it eligible, the student pays
//! the fee, the authority issues a diploma, and the authority later verifies
//! a diploma signature against a claimed credential signature.
//!
//! ## Modules
//!
//! - **Index** (`index.rs`): dense active-identifier sequence with 1-based
//!   reverse positions and O(1) swap-and-pop removal.
//!
//! - **Registry** (`registry.rs`): credential identifier → `StudentRecord`,
//!   kept in lockstep with the index.
//!
//! - **Payment** (`payment.rs`): fee validation, the `FundsTransfer`
//!   primitive, and the in-memory `AccountBook`.
//!
//! - **Ledger** (`ledger.rs`): diploma signature → credential signature.
//!
//! - **Events** (`events.rs`): `RegistryEvent`, the `EventSink` channel, and
//!   the in-memory `EventLog`.
//!
//! - **Contract** (`contract.rs`): `CredentialRegistry`, the owned state
//!   object exposing every operation with authorization and events.
//!
//! - **Runtime** (`runtime.rs`): registry plus event log plus account book,
//!   the serializable unit shared by the CLI and the HTTP service.
//!
//! ## Atomicity
//!
//! Operations take `&mut self` and run to completion. All checks precede
//! the first write, so a failed operation changes nothing and publishes
//! nothing. The fee transfer happens before the paid flag is committed.

pub mod contract;
pub mod error;
pub mod events;
pub mod index;
pub mod ledger;
pub mod payment;
pub mod registry;
pub mod runtime;

// ─── Re-exports ─────────────────────────────────────────────────────

pub use contract::CredentialRegistry;
pub use error::{RegistryError, SnapshotError};
pub use events::{EventLog, EventRecord, EventSink, RegistryEvent};
pub use index::{ActiveIndex, Removal};
pub use ledger::{DiplomaLedger, LedgerEntry};
pub use payment::{validate_payment, AccountBook, FundsTransfer, TransferError};
pub use registry::{StudentRecord, StudentRegistry};
pub use runtime::{RegistryRuntime, SNAPSHOT_VERSION};
