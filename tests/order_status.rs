use std::str::FromStr;

use sportzone_api::models::OrderStatus;

#[test]
fn parses_the_five_statuses() {
    for (s, expected) in [
        ("Pending", OrderStatus::Pending),
        ("Processing", OrderStatus::Processing),
        ("Shipped", OrderStatus::Shipped),
        ("Delivered", OrderStatus::Delivered),
        ("Cancelled", OrderStatus::Cancelled),
    ] {
        assert_eq!(OrderStatus::from_str(s), Ok(expected));
        assert_eq!(expected.as_str(), s);
    }
}

#[test]
fn rejects_unknown_status_strings() {
    assert!(OrderStatus::from_str("Bogus").is_err());
    assert!(OrderStatus::from_str("pending").is_err());
    assert!(OrderStatus::from_str("").is_err());
}

#[test]
fn forward_transitions_are_allowed_including_skips() {
    use OrderStatus::*;
    assert!(Pending.can_transition(Processing));
    assert!(Processing.can_transition(Shipped));
    assert!(Shipped.can_transition(Delivered));
    // Skipping intermediate steps is still a forward move.
    assert!(Pending.can_transition(Shipped));
    assert!(Pending.can_transition(Delivered));
    assert!(Processing.can_transition(Delivered));
}

#[test]
fn backward_transitions_are_rejected() {
    use OrderStatus::*;
    assert!(!Processing.can_transition(Pending));
    assert!(!Shipped.can_transition(Processing));
    assert!(!Delivered.can_transition(Pending));
    assert!(!Delivered.can_transition(Shipped));
}

#[test]
fn cancel_is_reachable_from_any_non_terminal_state() {
    use OrderStatus::*;
    assert!(Pending.can_transition(Cancelled));
    assert!(Processing.can_transition(Cancelled));
    assert!(Shipped.can_transition(Cancelled));
    assert!(!Cancelled.can_transition(Cancelled));
}

#[test]
fn terminal_states_admit_nothing() {
    use OrderStatus::*;
    for next in [Pending, Processing, Shipped, Delivered, Cancelled] {
        assert!(!Delivered.can_transition(next));
        assert!(!Cancelled.can_transition(next));
    }
    assert!(Delivered.is_terminal());
    assert!(Cancelled.is_terminal());
    assert!(!Pending.is_terminal());
    assert!(!Processing.is_terminal());
    assert!(!Shipped.is_terminal());
}

#[test]
fn self_transitions_are_rejected() {
    use OrderStatus::*;
    for status in [Pending, Processing, Shipped, Delivered, Cancelled] {
        assert!(!status.can_transition(status));
    }
}
