use std::thread;
use std::time::Duration;

use promissory::{fulfilled, promise, Error};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn fulfill_resolves_every_clone() {
    let promise = promise::<u32>();
    let a = promise.future();
    let b = a.clone();

    assert!(a.is_preparing());
    assert!(!a.is_fulfilled());

    promise.succeed(7);

    assert_eq!(a.wait(), Ok(7));
    assert_eq!(b.wait(), Ok(7));
    assert!(a.is_finished());
    assert!(a.is_fulfilled());
}

#[test]
fn failure_propagates_as_outcome() {
    let promise = promise::<u32>();
    let future = promise.future();
    let error = Error::from("no luck");
    promise.fail(error.clone());

    // Clones of one error share their payload and compare equal.
    assert_eq!(future.wait(), Err(error));
    assert_eq!(future.wait().unwrap_err().to_string(), "no luck");
}

#[test]
#[should_panic(expected = "promise fulfilled twice")]
fn double_fulfill_panics() {
    let promise = promise::<u32>();
    promise.succeed(1);
    promise.succeed(2);
}

#[test]
fn fulfill_after_cancel_is_dropped() {
    let promise = promise::<u32>();
    let future = promise.future();

    future.cancel();
    promise.succeed(3);

    assert!(future.is_cancelled());
    assert_eq!(future.wait(), Err(Error::Cancelled));
    assert_eq!(future.outcome(), Some(Err(Error::Cancelled)));
}

#[test]
fn cancel_after_finish_is_ignored() {
    let future = fulfilled::<u32>(Ok(9));
    future.cancel();
    assert!(future.is_finished());
    assert!(!future.is_cancelled());
    assert_eq!(future.wait(), Ok(9));
}

#[test]
fn cancelling_twice_is_a_noop() {
    let promise = promise::<u32>();
    let future = promise.future();
    future.cancel();
    future.cancel();
    promise.cancel();
    assert_eq!(future.wait(), Err(Error::Cancelled));
}

#[test]
fn outcome_is_none_while_pending() {
    let promise = promise::<u32>();
    let future = promise.future();
    assert_eq!(future.outcome(), None);
    promise.succeed(1);
    assert_eq!(future.outcome(), Some(Ok(1)));
}

#[test]
fn wait_timeout_expires_while_pending() {
    let promise = promise::<u32>();
    let future = promise.future();

    assert_eq!(future.wait_timeout(ms(30)), None);

    promise.succeed(5);
    assert_eq!(future.wait_timeout(ms(1000)), Some(Ok(5)));
}

#[test]
fn wait_blocks_until_another_thread_fulfills() {
    let promise = promise::<u32>();
    let future = promise.future();

    let producer = thread::spawn(move || {
        thread::sleep(ms(20));
        promise.succeed(11);
    });

    assert_eq!(future.wait(), Ok(11));
    producer.join().unwrap();
}

#[test]
fn dropping_the_last_promise_cancels() {
    let future = {
        let promise = promise::<u32>();
        promise.future()
    };
    assert_eq!(future.wait(), Err(Error::Cancelled));
}

#[test]
fn a_promise_clone_keeps_the_future_pending() {
    let promise = promise::<u32>();
    let keeper = promise.clone();
    let future = promise.future();
    drop(promise);

    assert_eq!(future.wait_timeout(ms(30)), None);
    keeper.succeed(2);
    assert_eq!(future.wait(), Ok(2));
}

#[test]
fn fulfilled_future_is_terminal_immediately() {
    let future = fulfilled::<&str>(Ok("done"));
    assert!(future.is_finished());
    assert!(!future.is_preparing());
    assert!(!future.is_executing());
    assert_eq!(future.wait(), Ok("done"));
}
