//! # diploma-core: Foundational Types for the Diploma Registry
//!
//! This crate is the leaf of the workspace. It defines the primitives that
//! every other crate builds on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `CredentialId`,
//!    `AccountId`, `DiplomaSignature`, `CredentialSignature`, all newtypes
//!    with validated constructors. A diploma signature cannot be passed
//!    where a credential signature is expected.
//!
//! 2. **Opaque signature bytes.** Signatures are stored and compared, never
//!    created or cryptographically checked. They serialize as lowercase hex.
//!
//! 3. **Integer amounts.** `Amount` wraps a `u64` in the smallest currency
//!    unit. Arithmetic is checked; there is no float anywhere.
//!
//! 4. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision.
//!
//! 5. **Immutable configuration.** `RegistryConfig` carries the authority and
//!    the fee fixed at construction.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `diploma-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod config;
pub mod error;
pub mod identity;
pub mod temporal;

pub use amount::Amount;
pub use config::RegistryConfig;
pub use error::{DiplomaError, ValidationError};
pub use identity::{AccountId, CredentialId, CredentialSignature, DiplomaSignature};
pub use temporal::Timestamp;
