//! End-to-end credential workflows against the public `diploma-state` API.

use diploma_core::{
    AccountId, Amount, CredentialId, CredentialSignature, DiplomaSignature, RegistryConfig,
};
use diploma_state::{RegistryError, RegistryEvent, RegistryRuntime};

const FEE: u64 = 1_000;

fn acct(s: &str) -> AccountId {
    AccountId::new(s).unwrap()
}

fn cid(s: &str) -> CredentialId {
    CredentialId::new(s).unwrap()
}

fn university() -> AccountId {
    acct("university")
}

fn runtime() -> RegistryRuntime {
    RegistryRuntime::new(RegistryConfig::new(university(), Amount::new(FEE)))
}

#[test]
fn alice_end_to_end() {
    let mut rt = runtime();
    let uni = university();
    let alice = acct("alice");
    let id = cid("alice");

    rt.submit_credential(&alice, id.clone()).unwrap();

    let err = rt
        .pay_for_credential(&alice, &id, Amount::new(FEE))
        .unwrap_err();
    assert_eq!(err, RegistryError::NotEligible { id: id.clone() });

    rt.set_eligible(&uni, &id, true).unwrap();

    let before = rt.balance(&uni);
    rt.pay_for_credential(&alice, &id, Amount::new(FEE)).unwrap();
    assert!(rt.registry.student(&id).unwrap().paid);
    assert_eq!(
        rt.balance(&uni).units(),
        before.units() + FEE,
        "authority balance grows by the fee"
    );

    let sig_d = DiplomaSignature::from_hex("0xd1d1").unwrap();
    let sig_c = CredentialSignature::from_hex("0xc0c0").unwrap();
    rt.issue_diploma(&uni, sig_d.clone(), sig_c.clone()).unwrap();
    assert!(rt.verify_diploma(&uni, &sig_d, &sig_c).unwrap());
    let other = CredentialSignature::from_hex("0xc0c1").unwrap();
    assert!(!rt.verify_diploma(&uni, &sig_d, &other).unwrap());

    let names: Vec<_> = rt.events.records().iter().map(|r| r.event.name()).collect();
    assert_eq!(
        names,
        vec![
            "credential_submitted",
            "student_eligible",
            "payment_received",
            "diploma_issued",
        ]
    );
}

#[test]
fn removal_swaps_last_into_vacated_slot() {
    let mut rt = runtime();
    let uni = university();
    for s in ["a", "b", "c"] {
        rt.submit_credential(&acct(s), cid(s)).unwrap();
    }

    rt.remove_student(&uni, &cid("a")).unwrap();
    let order: Vec<_> = rt
        .registry
        .list_all_students()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(order, vec![cid("c"), cid("b")]);
    assert_eq!(
        rt.registry.students().active().position(&cid("c")).map(|p| p.get()),
        Some(1)
    );

    rt.submit_credential(&acct("a"), cid("a")).unwrap();
    let listed = rt.registry.list_all_students();
    assert_eq!(listed.len(), 3);
    assert!(!listed[2].eligible && !listed[2].paid);
    rt.registry.students().check_consistency().unwrap();
}

#[test]
fn second_submission_always_fails() {
    let mut rt = runtime();
    rt.submit_credential(&acct("x"), cid("dup")).unwrap();
    let _ = rt.registry.list_all_students();
    let _ = rt.registry.fee();
    for caller in ["x", "y", "university"] {
        assert_eq!(
            rt.submit_credential(&acct(caller), cid("dup")),
            Err(RegistryError::AlreadyRegistered { id: cid("dup") })
        );
    }
}

#[test]
fn transfer_failure_is_atomic() {
    let mut rt = runtime();
    let uni = university();
    rt.submit_credential(&acct("alice"), cid("alice")).unwrap();
    rt.set_eligible(&uni, &cid("alice"), true).unwrap();
    rt.accounts.set_rejecting(uni.clone(), true);
    let before = rt.clone();

    let err = rt
        .pay_for_credential(&acct("alice"), &cid("alice"), Amount::new(FEE))
        .unwrap_err();
    assert!(matches!(err, RegistryError::TransferFailed { .. }));
    assert_eq!(rt, before);

    rt.accounts.set_rejecting(uni.clone(), false);
    rt.pay_for_credential(&acct("alice"), &cid("alice"), Amount::new(FEE))
        .unwrap();
    assert_eq!(rt.balance(&uni), Amount::new(FEE));
}

#[test]
fn removed_student_behaves_as_never_registered() {
    let mut rt = runtime();
    let uni = university();
    rt.submit_credential(&acct("a"), cid("a")).unwrap();
    rt.set_eligible(&uni, &cid("a"), true).unwrap();
    rt.pay_for_credential(&acct("a"), &cid("a"), Amount::new(FEE))
        .unwrap();
    rt.remove_student(&uni, &cid("a")).unwrap();

    assert_eq!(
        rt.set_eligible(&uni, &cid("a"), true),
        Err(RegistryError::NotFound { id: cid("a") })
    );
    assert_eq!(
        rt.pay_for_credential(&acct("a"), &cid("a"), Amount::new(FEE)),
        Err(RegistryError::NotEligible { id: cid("a") })
    );
    assert_eq!(
        rt.remove_student(&uni, &cid("a")),
        Err(RegistryError::NotFound { id: cid("a") })
    );
    assert!(matches!(
        rt.events.last().map(|r| &r.event),
        Some(RegistryEvent::StudentRemoved { .. })
    ));
}

#[test]
fn list_never_contains_removed_identifiers() {
    let mut rt = runtime();
    let uni = university();
    let names: Vec<String> = (0..20).map(|i| format!("s{i}")).collect();
    for n in &names {
        rt.submit_credential(&acct(n), cid(n)).unwrap();
    }
    for n in names.iter().step_by(3) {
        rt.remove_student(&uni, &cid(n)).unwrap();
    }

    let listed = rt.registry.list_all_students();
    assert_eq!(listed.len(), rt.registry.students().active().len());
    for (i, n) in names.iter().enumerate() {
        let present = listed.iter().any(|r| r.id.as_str() == n);
        assert_eq!(present, i % 3 != 0, "{n}");
    }
    rt.registry.students().check_consistency().unwrap();
}
