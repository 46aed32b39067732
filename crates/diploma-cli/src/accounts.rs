//! # Account Subcommands
//!
//! `balance` reads an account's balance from the state file's account
//! book. `reject-deposits` marks an account as refusing incoming funds,
//! which makes fee payments to it fail with a transfer error.

use anyhow::Result;
use clap::Args;

use diploma_core::AccountId;

use crate::store::StateStore;

/// Arguments for `diploma balance`.
#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Account to query.
    #[arg(long)]
    pub account: AccountId,
}

/// Arguments for `diploma reject-deposits`.
#[derive(Args, Debug)]
pub struct RejectDepositsArgs {
    /// Account whose deposit policy changes.
    #[arg(long)]
    pub account: AccountId,
    /// Accept deposits again instead of rejecting them.
    #[arg(long)]
    pub allow: bool,
}

/// Execute `diploma balance`.
pub fn run_balance(args: &BalanceArgs, store: &StateStore) -> Result<u8> {
    let runtime = store.load()?;
    println!("{}: {}", args.account, runtime.balance(&args.account));
    Ok(0)
}

/// Execute `diploma reject-deposits`.
pub fn run_reject_deposits(args: &RejectDepositsArgs, store: &StateStore) -> Result<u8> {
    store.update(|runtime| {
        runtime
            .accounts
            .set_rejecting(args.account.clone(), !args.allow);
        Ok(())
    })?;
    tracing::info!(account = %args.account, rejecting = !args.allow, "deposit policy changed");
    if args.allow {
        println!("OK: {} accepts deposits", args.account);
    } else {
        println!("OK: {} rejects deposits", args.account);
    }
    Ok(0)
}
