use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use promissory::{fulfilled, promise, Error};

#[derive(Debug, PartialEq)]
struct ParseFailure {
    offset: usize,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse failed at offset {}", self.offset)
    }
}

impl std::error::Error for ParseFailure {}

#[test]
fn recover_turns_a_failure_back_into_a_success() {
    let rescued = fulfilled::<u32>(Err(Error::from("gone"))).recover(|_| Ok(0));
    assert_eq!(rescued.wait(), Ok(0));
}

#[test]
fn recover_is_not_invoked_on_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let rescued = fulfilled::<u32>(Ok(8)).recover(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    });

    assert_eq!(rescued.wait(), Ok(8));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn recover_runs_exactly_once_on_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let rescued = fulfilled::<u32>(Err(Error::from("gone"))).recover(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    });

    assert_eq!(rescued.wait(), Ok(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn recover_sees_the_cancellation_error() {
    let promise = promise::<u32>();
    let rescued = promise.future().recover(|error| {
        assert!(error.is_cancelled());
        Ok(99)
    });
    promise.cancel();
    assert_eq!(rescued.wait(), Ok(99));
}

#[test]
fn recover_can_substitute_a_new_failure() {
    let error = Error::from("replacement");
    let replaced = error.clone();
    let rescued =
        fulfilled::<u32>(Err(Error::from("original"))).recover(move |_| Err(replaced.clone()));
    assert_eq!(rescued.wait(), Err(error));
}

#[test]
fn other_errors_downcast_to_their_concrete_type() {
    let future = fulfilled::<u32>(Err(Error::other(ParseFailure { offset: 12 })));
    let error = future.wait().unwrap_err();

    assert_eq!(error.downcast_ref::<ParseFailure>(), Some(&ParseFailure { offset: 12 }));
    assert_eq!(error.to_string(), "parse failed at offset 12");
    assert!(!error.is_cancelled());
    assert!(!error.is_aggregate());
}

#[test]
fn error_clones_compare_equal_distinct_payloads_do_not() {
    let error = Error::from("payload");
    assert_eq!(error, error.clone());
    assert_ne!(error, Error::from("payload"));

    assert_eq!(Error::Cancelled, Error::Cancelled);
    assert_ne!(Error::Cancelled, Error::FilterMapNone);
}

#[test]
fn aggregate_display_counts_failures() {
    let error = Error::Aggregate(vec![None, Some(Error::Cancelled), Some(Error::from("x"))]);
    assert!(error.is_aggregate());
    assert_eq!(error.to_string(), "2 of 3 combined futures failed");
}
