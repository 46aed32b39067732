//! # Diploma Subcommands
//!
//! `issue` records a diploma signature against a credential signature.
//! `verify` checks a pair and reports through the exit code: 0 when the
//! pair was issued, 2 when it was not. Both are authority-only. Signatures
//! are hex, with or without a `0x` prefix.

use anyhow::Result;
use clap::Args;

use diploma_core::{AccountId, CredentialSignature, DiplomaSignature};

use crate::store::StateStore;

/// Exit code for a diploma that does not verify.
pub const EXIT_INVALID: u8 = 2;

/// Arguments shared by `diploma issue` and `diploma verify`.
#[derive(Args, Debug)]
pub struct DiplomaArgs {
    /// Diploma signature (hex).
    #[arg(long)]
    pub diploma_sig: DiplomaSignature,
    /// Credential signature (hex).
    #[arg(long)]
    pub credential_sig: CredentialSignature,
    /// Account performing the operation (must be the authority).
    #[arg(long)]
    pub caller: AccountId,
}

/// Execute `diploma issue`.
pub fn run_issue(args: &DiplomaArgs, store: &StateStore) -> Result<u8> {
    store.apply(|rt| {
        rt.issue_diploma(
            &args.caller,
            args.diploma_sig.clone(),
            args.credential_sig.clone(),
        )
    })?;
    println!(
        "OK: issued diploma {} for credential {}",
        args.diploma_sig, args.credential_sig
    );
    Ok(0)
}

/// Execute `diploma verify`. Read-only; the state file is never rewritten.
pub fn run_verify(args: &DiplomaArgs, store: &StateStore) -> Result<u8> {
    let runtime = store.load()?;
    let valid = runtime.verify_diploma(&args.caller, &args.diploma_sig, &args.credential_sig)?;
    if valid {
        println!("VALID: diploma {} matches credential {}", args.diploma_sig, args.credential_sig);
        Ok(0)
    } else {
        println!(
            "INVALID: diploma {} does not match credential {}",
            args.diploma_sig, args.credential_sig
        );
        Ok(EXIT_INVALID)
    }
}
