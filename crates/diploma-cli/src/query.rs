//! # Read-Only Subcommands
//!
//! `list`, `show`, `events`, and `info`. None of them require a caller
//! identity and none rewrite the state file.

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};

use diploma_core::CredentialId;
use diploma_state::{EventRecord, StudentRecord};

use crate::store::StateStore;

/// Output format for read-only commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Arguments for `diploma list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for `diploma show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Credential identifier.
    #[arg(long)]
    pub id: CredentialId,
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for `diploma events`.
#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Only show events with a sequence number greater than this.
    #[arg(long, default_value_t = 0)]
    pub since: u64,
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Execute `diploma list`.
pub fn run_list(args: &ListArgs, store: &StateStore) -> Result<u8> {
    let runtime = store.load()?;
    let students = runtime.registry.list_all_students();
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&students)?),
        OutputFormat::Text => {
            if students.is_empty() {
                println!("No students registered.");
            }
            for (pos, record) in students.iter().enumerate() {
                println!("{:>4}  {}", pos + 1, format_record(record));
            }
        }
    }
    Ok(0)
}

/// Execute `diploma show`.
pub fn run_show(args: &ShowArgs, store: &StateStore) -> Result<u8> {
    let runtime = store.load()?;
    let Some(record) = runtime.registry.student(&args.id) else {
        bail!("credential {} is not registered", args.id);
    };
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => {
            let position = runtime
                .registry
                .students()
                .active()
                .position(&args.id)
                .map_or(0, |p| p.get());
            println!("Student: {}", record.id);
            println!("  Position: {position}");
            println!("  Eligible: {}", record.eligible);
            println!("  Paid: {}", record.paid);
        }
    }
    Ok(0)
}

/// Execute `diploma events`.
pub fn run_events(args: &EventsArgs, store: &StateStore) -> Result<u8> {
    let runtime = store.load()?;
    let records = runtime.events.since(args.since);
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Text => {
            for record in records {
                println!("{}", format_event(record));
            }
        }
    }
    Ok(0)
}

/// Execute `diploma info`.
pub fn run_info(store: &StateStore) -> Result<u8> {
    let runtime = store.load()?;
    let registry = &runtime.registry;
    println!("Registry: {}", store.path().display());
    println!("  Authority: {}", registry.authority());
    println!("  Fee: {}", registry.fee());
    println!("  Students: {}", registry.students().len());
    println!("  Diplomas: {}", registry.diplomas().len());
    println!("  Events: {}", runtime.events.len());
    Ok(0)
}

fn format_record(record: &StudentRecord) -> String {
    let flag = |set: bool, name: &str| {
        if set {
            name.to_string()
        } else {
            format!("not {name}")
        }
    };
    format!(
        "{}  [{}, {}]",
        record.id,
        flag(record.eligible, "eligible"),
        flag(record.paid, "paid")
    )
}

fn format_event(record: &EventRecord) -> String {
    format!("#{} {} {}", record.sequence, record.timestamp, record.event)
}
