//! # Init Subcommand
//!
//! Creates a fresh state file. The authority and fee come from flags, or
//! from the YAML registry config given with the global `--config`. Flags
//! win over the config file.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;

use diploma_core::{AccountId, Amount, RegistryConfig};
use diploma_state::RegistryRuntime;

use crate::store::StateStore;

/// Arguments for `diploma init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// The authority account (overrides the config file).
    #[arg(long)]
    pub authority: Option<AccountId>,

    /// The exact payment fee in smallest units (overrides the config file).
    #[arg(long)]
    pub fee: Option<u64>,

    /// Overwrite an existing state file.
    #[arg(long)]
    pub force: bool,
}

/// Execute `diploma init`.
pub fn run_init(args: &InitArgs, store: &StateStore, config: Option<&Path>) -> Result<u8> {
    let config = resolve_config(args, config)?;

    let lock = store.lock()?;
    if store.exists() && !args.force {
        bail!(
            "state file already exists: {} (use --force to overwrite)",
            store.path().display()
        );
    }
    let runtime = RegistryRuntime::new(config.clone());
    store.write(&lock, &runtime)?;
    drop(lock);

    tracing::info!(authority = %config.authority, fee = %config.fee, "registry initialized");
    println!(
        "OK: initialized registry at {} (authority {}, fee {})",
        store.path().display(),
        config.authority,
        config.fee
    );
    Ok(0)
}

fn resolve_config(args: &InitArgs, config: Option<&Path>) -> Result<RegistryConfig> {
    let base = config.map(RegistryConfig::load).transpose()?;

    let authority = match (&args.authority, &base) {
        (Some(a), _) => a.clone(),
        (None, Some(cfg)) => cfg.authority.clone(),
        (None, None) => bail!("no authority given (use --authority or --config)"),
    };
    let fee = match (args.fee, &base) {
        (Some(units), _) => Amount::new(units),
        (None, Some(cfg)) => cfg.fee,
        (None, None) => bail!("no fee given (use --fee or --config)"),
    };
    Ok(RegistryConfig::new(authority, fee))
}
