//! Unit tests for the transient retry policy

use std::time::Duration;

use portal_loadtest::client::{FixedBackoff, RetryPolicy};

#[test]
fn test_unbounded_policy_always_yields_same_delay() {
    let policy = FixedBackoff::unbounded(Duration::from_secs(1));
    for attempt in [1, 2, 100, 1_000_000] {
        assert_eq!(policy.next_delay(attempt), Some(Duration::from_secs(1)));
    }
}

#[test]
fn test_limited_policy_gives_up_past_bound() {
    let policy = FixedBackoff::limited(Duration::from_millis(5), 2);
    assert_eq!(policy.next_delay(1), Some(Duration::from_millis(5)));
    assert_eq!(policy.next_delay(2), Some(Duration::from_millis(5)));
    assert_eq!(policy.next_delay(3), None);
}

#[test]
fn test_default_policy_is_one_second_unbounded() {
    let policy = FixedBackoff::default();
    assert_eq!(policy.next_delay(1), Some(Duration::from_secs(1)));
    assert_eq!(policy.next_delay(u32::MAX), Some(Duration::from_secs(1)));
}
