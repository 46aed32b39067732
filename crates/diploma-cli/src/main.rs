//! # diploma CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use diploma_cli::accounts::{run_balance, run_reject_deposits, BalanceArgs, RejectDepositsArgs};
use diploma_cli::diploma::{run_issue, run_verify, DiplomaArgs};
use diploma_cli::init::{run_init, InitArgs};
use diploma_cli::query::{run_events, run_info, run_list, run_show, EventsArgs, ListArgs, ShowArgs};
use diploma_cli::store::StateStore;
use diploma_cli::student::{
    run_eligibility, run_pay, run_remove, run_reset_payment, run_submit, EligibilityArgs, PayArgs,
    SubmitArgs, TargetArgs,
};
use diploma_cli::DEFAULT_STATE_FILE;

/// Diploma registry CLI.
///
/// Registers credentials, tracks eligibility and fee payment, and issues
/// and verifies diplomas against a local state file.
#[derive(Parser, Debug)]
#[command(name = "diploma", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Registry config file (YAML) used by `init`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// State file to operate on.
    #[arg(long, global = true, default_value = DEFAULT_STATE_FILE)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new registry state file.
    Init(InitArgs),

    /// Register a credential identifier.
    Submit(SubmitArgs),

    /// Grant or revoke a student's eligibility (authority only).
    Eligibility(EligibilityArgs),

    /// Remove a student (authority only).
    Remove(TargetArgs),

    /// Clear a student's paid flag (authority only).
    ResetPayment(TargetArgs),

    /// Pay the fee for a credential.
    Pay(PayArgs),

    /// Record a diploma signature against a credential signature (authority only).
    Issue(DiplomaArgs),

    /// Check a diploma signature against a credential signature (authority only).
    Verify(DiplomaArgs),

    /// List all registered students in index order.
    List(ListArgs),

    /// Show one student record.
    Show(ShowArgs),

    /// Print the event history.
    Events(EventsArgs),

    /// Print the account balance.
    Balance(BalanceArgs),

    /// Show the registry's authority, fee, and counts.
    Info,

    /// Make an account refuse (or accept) incoming transfers.
    RejectDeposits(RejectDepositsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store = StateStore::new(&cli.state);
    tracing::debug!(state = %store.path().display(), "diploma CLI starting");

    let result = match &cli.command {
        Commands::Init(args) => run_init(args, &store, cli.config.as_deref()),
        Commands::Submit(args) => run_submit(args, &store),
        Commands::Eligibility(args) => run_eligibility(args, &store),
        Commands::Remove(args) => run_remove(args, &store),
        Commands::ResetPayment(args) => run_reset_payment(args, &store),
        Commands::Pay(args) => run_pay(args, &store),
        Commands::Issue(args) => run_issue(args, &store),
        Commands::Verify(args) => run_verify(args, &store),
        Commands::List(args) => run_list(args, &store),
        Commands::Show(args) => run_show(args, &store),
        Commands::Events(args) => run_events(args, &store),
        Commands::Balance(args) => run_balance(args, &store),
        Commands::Info => run_info(&store),
        Commands::RejectDeposits(args) => run_reject_deposits(args, &store),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
