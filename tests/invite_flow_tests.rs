use pretty_assertions::assert_eq;

use koinonia::client::{
    AcceptanceState, GateDirective, InviteGate, MemoryInviteStore, PendingInviteStore,
};
use koinonia::database::models::{AcceptFailure, AcceptOutcome, ChurchRole};

const TOKEN: &str = "123e4567-e89b-12d3-a456-426614174000";

fn return_to() -> String {
    format!("/accept-invite?token={}", TOKEN)
}

fn ready_gate() -> InviteGate<MemoryInviteStore> {
    let mut gate = InviteGate::new(Some(TOKEN), MemoryInviteStore::new());
    gate.on_session(true);
    gate
}

#[test]
fn test_rejects_anything_that_is_not_a_uuid() {
    let mut gate = InviteGate::new(Some("not-a-uuid"), MemoryInviteStore::new());

    assert_eq!(gate.state(), &AcceptanceState::InvalidToken);
    assert_eq!(gate.token(), None);
    assert_eq!(gate.on_session(true), GateDirective::None);
    assert_eq!(gate.begin_accept(), None);
    assert_eq!(gate.state(), &AcceptanceState::InvalidToken);

    let gate = InviteGate::new(None, MemoryInviteStore::new());
    assert_eq!(gate.state(), &AcceptanceState::InvalidToken);
}

#[test]
fn test_unauthenticated_visitors_are_parked_and_sent_to_login() {
    let mut store = MemoryInviteStore::new();
    let mut gate = InviteGate::new(Some(TOKEN), &mut store);

    let directive = gate.on_session(false);

    assert_eq!(
        directive,
        GateDirective::RedirectToLogin {
            return_to: return_to()
        }
    );
    assert_eq!(gate.state(), &AcceptanceState::AwaitingAuth);
    assert_eq!(gate.begin_accept(), None);

    drop(gate);
    assert_eq!(store.take(), Some(TOKEN.to_string()));
}

#[test]
fn test_signing_in_arms_the_gate() {
    let mut gate = InviteGate::new(Some(TOKEN), MemoryInviteStore::new());

    assert_eq!(gate.on_session(true), GateDirective::None);
    assert_eq!(gate.state(), &AcceptanceState::Ready);
}

#[test]
fn test_from_store_resumes_after_the_login_round_trip() {
    let mut store = MemoryInviteStore::new();
    store.save(TOKEN);

    let gate = InviteGate::from_store(store);
    assert_eq!(gate.state(), &AcceptanceState::AwaitingAuth);
    assert_eq!(gate.token(), Some(TOKEN));

    let gate = InviteGate::from_store(MemoryInviteStore::new());
    assert_eq!(gate.state(), &AcceptanceState::InvalidToken);
}

#[test]
fn test_one_attempt_in_flight_at_a_time() {
    let mut gate = ready_gate();

    assert_eq!(gate.begin_accept(), Some(TOKEN.to_string()));
    assert_eq!(gate.state(), &AcceptanceState::Processing);
    assert_eq!(gate.begin_accept(), None);
}

#[test]
fn test_acceptance_lands_on_the_role_dashboard() {
    let mut store = MemoryInviteStore::new();
    store.save(TOKEN);
    let mut gate = InviteGate::new(Some(TOKEN), &mut store);
    gate.on_session(true);
    gate.begin_accept();

    gate.resolve(&AcceptOutcome::accepted(vec![ChurchRole::Treasurer]));

    assert_eq!(
        gate.state(),
        &AcceptanceState::Accepted {
            roles: vec![ChurchRole::Treasurer],
            redirect: "/finance",
        }
    );
    assert_eq!(gate.begin_accept(), None);

    drop(gate);
    assert_eq!(store.take(), None);
}

#[test]
fn test_failures_reveal_why_and_can_be_retried() {
    let mut gate = ready_gate();
    gate.begin_accept();

    gate.resolve(&AcceptOutcome::rejected(AcceptFailure::Expired));
    assert_eq!(
        gate.state(),
        &AcceptanceState::Failed {
            message: "This invitation has expired".to_string()
        }
    );

    // A failed attempt can be re-armed straight away.
    assert_eq!(gate.begin_accept(), Some(TOKEN.to_string()));

    gate.resolve(&AcceptOutcome::rejected(AcceptFailure::AlreadyUsed));
    assert_eq!(
        gate.state(),
        &AcceptanceState::Failed {
            message: "This invitation was already used".to_string()
        }
    );
}

#[test]
fn test_transport_errors_fail_the_attempt() {
    let mut gate = ready_gate();
    gate.begin_accept();

    gate.resolve_error("connection reset by peer");

    assert_eq!(
        gate.state(),
        &AcceptanceState::Failed {
            message: "connection reset by peer".to_string()
        }
    );
}

#[test]
fn test_outcomes_are_ignored_unless_an_attempt_is_in_flight() {
    let mut gate = ready_gate();

    gate.resolve(&AcceptOutcome::accepted(vec![ChurchRole::Member]));
    assert_eq!(gate.state(), &AcceptanceState::Ready);

    gate.resolve_error("too late");
    assert_eq!(gate.state(), &AcceptanceState::Ready);
}

#[test]
fn test_switch_account_parks_the_token_and_signs_out() {
    let mut store = MemoryInviteStore::new();
    let mut gate = InviteGate::new(Some(TOKEN), &mut store);
    gate.on_session(true);

    let directive = gate.switch_account();

    assert_eq!(
        directive,
        GateDirective::SignOut {
            return_to: return_to()
        }
    );
    assert_eq!(gate.state(), &AcceptanceState::AwaitingAuth);

    // The next account signs in and picks the same invitation back up.
    assert_eq!(gate.on_session(true), GateDirective::None);
    assert_eq!(gate.state(), &AcceptanceState::Ready);

    drop(gate);
    assert_eq!(store.take(), Some(TOKEN.to_string()));
}
