use std::thread;
use std::time::Duration;

use promissory::{fulfilled, promise, race, Error, Future, Promise};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn succeed_after(value: u32, delay: Duration) -> Future<u32> {
    let promise = promise::<u32>();
    let future = promise.future();
    thread::spawn(move || {
        thread::sleep(delay);
        promise.succeed(value);
    });
    future
}

fn fail_after(message: &'static str, delay: Duration) -> Future<u32> {
    let promise = promise::<u32>();
    let future = promise.future();
    thread::spawn(move || {
        thread::sleep(delay);
        promise.fail(Error::from(message));
    });
    future
}

#[test]
fn first_success_wins() {
    let winner = race(vec![
        succeed_after(1, ms(120)),
        succeed_after(2, ms(10)),
        succeed_after(3, ms(120)),
    ]);
    assert_eq!(winner.wait(), Ok(2));
}

#[test]
fn a_settled_input_wins_immediately() {
    let slow = promise::<u32>();
    let winner = race(vec![slow.future(), fulfilled::<u32>(Ok(7))]);
    assert_eq!(winner.wait(), Ok(7));
}

#[test]
fn failures_do_not_claim_the_race() {
    let winner = race(vec![
        fail_after("early", ms(5)),
        succeed_after(9, ms(60)),
    ]);
    assert_eq!(winner.wait(), Ok(9));
}

#[test]
fn all_failed_inputs_aggregate_in_order() {
    let first = Error::from("first");
    let second = Error::from("second");
    let winner = race(vec![
        fulfilled::<u32>(Err(first.clone())),
        fulfilled::<u32>(Err(second.clone())),
    ]);
    assert_eq!(
        winner.wait(),
        Err(Error::Aggregate(vec![Some(first), Some(second)]))
    );
}

#[test]
fn cancelled_inputs_count_as_failures() {
    let cancelled = promise::<u32>();
    let input = cancelled.future();
    cancelled.cancel();

    let winner = race(vec![input, fulfilled::<u32>(Err(Error::from("also")))]);
    match winner.wait() {
        Err(Error::Aggregate(slots)) => {
            assert_eq!(slots.len(), 2);
            assert_eq!(slots[0], Some(Error::Cancelled));
            assert!(slots[1].is_some());
        }
        other => panic!("expected an aggregate failure, got {:?}", other),
    }
}

#[test]
fn an_empty_race_fails_with_an_empty_aggregate() {
    let winner = race(Vec::<Future<u32>>::new());
    assert_eq!(winner.wait(), Err(Error::Aggregate(vec![])));
}

#[test]
fn losers_are_not_cancelled() {
    let slow = promise::<u32>();
    let slow_future = slow.future();
    let winner = race(vec![slow_future.clone(), fulfilled::<u32>(Ok(1))]);

    assert_eq!(winner.wait(), Ok(1));
    slow.succeed(2);
    assert_eq!(slow_future.wait(), Ok(2));
}

#[test]
fn many_simultaneous_successes_produce_one_winner() {
    let producers: Vec<Promise<u32>> = (0..8).map(|_| promise::<u32>()).collect();
    let winner = race(producers.iter().map(|p| p.future()).collect());

    let threads: Vec<_> = producers
        .into_iter()
        .enumerate()
        .map(|(i, producer)| {
            thread::spawn(move || {
                producer.succeed(i as u32);
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    let value = winner.wait().unwrap();
    assert!(value < 8);
}
