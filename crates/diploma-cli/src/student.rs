//! # Student Subcommands
//!
//! Registration, eligibility, removal, and payment. Each command applies
//! one registry operation to the state file as the account named by
//! `--caller`.
//!
//! - `submit`: register a credential identifier.
//! - `eligibility`: grant or revoke eligibility (authority).
//! - `remove`: remove a student (authority).
//! - `reset-payment`: clear the paid flag (authority).
//! - `pay`: pay the fee with an attached amount.

use anyhow::Result;
use clap::{ArgGroup, Args};

use diploma_core::{AccountId, Amount, CredentialId};

use crate::store::StateStore;

/// Arguments for `diploma submit`.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Credential identifier to register.
    #[arg(long)]
    pub id: CredentialId,
    /// Account submitting the credential.
    #[arg(long)]
    pub caller: AccountId,
}

/// Arguments for `diploma eligibility`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("decision").required(true).args(["grant", "revoke"])))]
pub struct EligibilityArgs {
    /// Credential identifier.
    #[arg(long)]
    pub id: CredentialId,
    /// Account performing the change (must be the authority).
    #[arg(long)]
    pub caller: AccountId,
    /// Mark the student eligible.
    #[arg(long)]
    pub grant: bool,
    /// Mark the student ineligible.
    #[arg(long)]
    pub revoke: bool,
}

/// Arguments for commands that target one student as the authority.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Credential identifier.
    #[arg(long)]
    pub id: CredentialId,
    /// Account performing the operation (must be the authority).
    #[arg(long)]
    pub caller: AccountId,
}

/// Arguments for `diploma pay`.
#[derive(Args, Debug)]
pub struct PayArgs {
    /// Credential identifier to pay for.
    #[arg(long)]
    pub id: CredentialId,
    /// Paying account.
    #[arg(long)]
    pub caller: AccountId,
    /// Attached amount in smallest units. Must equal the fee exactly.
    #[arg(long)]
    pub amount: u64,
}

/// Execute `diploma submit`.
pub fn run_submit(args: &SubmitArgs, store: &StateStore) -> Result<u8> {
    store.apply(|rt| rt.submit_credential(&args.caller, args.id.clone()))?;
    println!("OK: submitted credential {}", args.id);
    Ok(0)
}

/// Execute `diploma eligibility`.
pub fn run_eligibility(args: &EligibilityArgs, store: &StateStore) -> Result<u8> {
    let eligible = args.grant;
    let event = store.apply(|rt| rt.set_eligible(&args.caller, &args.id, eligible))?;
    if event.is_noop() {
        println!(
            "OK: {} already {}",
            args.id,
            if eligible { "eligible" } else { "ineligible" }
        );
    } else {
        println!(
            "OK: {} is now {}",
            args.id,
            if eligible { "eligible" } else { "ineligible" }
        );
    }
    Ok(0)
}

/// Execute `diploma remove`.
pub fn run_remove(args: &TargetArgs, store: &StateStore) -> Result<u8> {
    store.apply(|rt| rt.remove_student(&args.caller, &args.id))?;
    println!("OK: removed {}", args.id);
    Ok(0)
}

/// Execute `diploma reset-payment`.
pub fn run_reset_payment(args: &TargetArgs, store: &StateStore) -> Result<u8> {
    store.apply(|rt| rt.reset_payment(&args.caller, &args.id))?;
    println!("OK: payment reset for {}", args.id);
    Ok(0)
}

/// Execute `diploma pay`.
pub fn run_pay(args: &PayArgs, store: &StateStore) -> Result<u8> {
    let amount = Amount::new(args.amount);
    store.apply(|rt| rt.pay_for_credential(&args.caller, &args.id, amount))?;
    println!("OK: payment of {amount} received for {}", args.id);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::{run_init, InitArgs};

    fn setup() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        run_init(
            &InitArgs {
                authority: Some(AccountId::new("uni").unwrap()),
                fee: Some(100),
                force: false,
            },
            &store,
            None,
        )
        .unwrap();
        (dir, store)
    }

    fn id(s: &str) -> CredentialId {
        CredentialId::new(s).unwrap()
    }

    fn acct(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn submit(store: &StateStore, s: &str) {
        run_submit(
            &SubmitArgs {
                id: id(s),
                caller: acct(s),
            },
            store,
        )
        .unwrap();
    }

    fn grant(store: &StateStore, s: &str) -> Result<u8> {
        run_eligibility(
            &EligibilityArgs {
                id: id(s),
                caller: acct("uni"),
                grant: true,
                revoke: false,
            },
            store,
        )
    }

    #[test]
    fn submit_and_grant() {
        let (_dir, store) = setup();
        submit(&store, "alice");
        assert_eq!(grant(&store, "alice").unwrap(), 0);
        assert!(store.load().unwrap().registry.student(&id("alice")).unwrap().eligible);
        // Second grant is a no-op but still succeeds.
        assert_eq!(grant(&store, "alice").unwrap(), 0);
        assert_eq!(store.load().unwrap().events.len(), 3);
    }

    #[test]
    fn duplicate_submit_fails_and_keeps_file() {
        let (_dir, store) = setup();
        submit(&store, "alice");
        let before = std::fs::read(store.path()).unwrap();
        let err = run_submit(
            &SubmitArgs {
                id: id("alice"),
                caller: acct("alice"),
            },
            &store,
        )
        .unwrap_err();
        assert!(err.to_string().contains("already registered"));
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn pay_requires_exact_fee() {
        let (_dir, store) = setup();
        submit(&store, "alice");
        grant(&store, "alice").unwrap();

        let pay = |amount| {
            run_pay(
                &PayArgs {
                    id: id("alice"),
                    caller: acct("alice"),
                    amount,
                },
                &store,
            )
        };
        assert!(pay(99).unwrap_err().to_string().contains("does not match fee"));
        assert_eq!(pay(100).unwrap(), 0);
        assert!(pay(100).unwrap_err().to_string().contains("already been paid"));
        assert_eq!(store.load().unwrap().balance(&acct("uni")), Amount::new(100));
    }

    #[test]
    fn remove_and_reset_are_authority_only() {
        let (_dir, store) = setup();
        submit(&store, "bob");
        let as_bob = TargetArgs {
            id: id("bob"),
            caller: acct("bob"),
        };
        assert!(run_remove(&as_bob, &store).is_err());
        assert!(run_reset_payment(&as_bob, &store).is_err());

        let as_uni = TargetArgs {
            id: id("bob"),
            caller: acct("uni"),
        };
        // Not eligible yet.
        assert!(run_reset_payment(&as_uni, &store).is_err());
        assert_eq!(run_remove(&as_uni, &store).unwrap(), 0);
        assert!(store.load().unwrap().registry.students().is_empty());
    }
}
