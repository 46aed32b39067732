//! # diploma-cli: Diploma Registry Command-Line Interface
//!
//! Drives a [`diploma_state::RegistryRuntime`] persisted in a local JSON
//! state file. Each invocation performs one operation: load, apply, save.
//!
//! ## Subcommands
//!
//! - `init`: create the state file with an authority and a fee
//! - `submit`, `eligibility`, `remove`, `reset-payment`, `pay`: student workflow
//! - `issue`, `verify`: diploma ledger
//! - `list`, `show`, `events`, `info`: read-only views
//! - `balance`, `reject-deposits`: the in-memory account book
//!
//! ```bash
//! diploma init --authority university --fee 100
//! diploma submit --id alice --caller alice
//! diploma eligibility --id alice --caller university --grant
//! diploma pay --id alice --caller alice --amount 100
//! diploma issue --diploma-sig 0xd1 --credential-sig 0xc1 --caller university
//! diploma verify --diploma-sig 0xd1 --credential-sig 0xc1 --caller university
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: success (or diploma valid)
//! - `1`: the operation was rejected or the state file is unusable
//! - `2`: `verify` found no matching diploma

pub mod accounts;
pub mod diploma;
pub mod init;
pub mod query;
pub mod store;
pub mod student;

/// Default state file name, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = "diploma-state.json";
