use std::time::Duration;

use promissory::{collect, combine, combine3, combine4, fulfilled, promise, Error};

#[test]
fn combine_pairs_two_successes() {
    let pair = combine(&fulfilled::<u32>(Ok(1)), &fulfilled::<&str>(Ok("two")));
    assert_eq!(pair.wait(), Ok((1, "two")));
}

#[test]
fn combine_waits_for_the_slower_input() {
    let slow = promise::<u32>();
    let pair = combine(&slow.future(), &fulfilled::<u32>(Ok(2)));

    assert_eq!(pair.wait_timeout(Duration::from_millis(30)), None);
    slow.succeed(1);
    assert_eq!(pair.wait(), Ok((1, 2)));
}

#[test]
fn combine_reports_failures_positionally() {
    let error = Error::from("right side");
    let pair = combine(
        &fulfilled::<u32>(Ok(1)),
        &fulfilled::<u32>(Err(error.clone())),
    );

    assert_eq!(
        pair.wait(),
        Err(Error::Aggregate(vec![None, Some(error)]))
    );
}

#[test]
fn combine_marks_cancelled_inputs_in_the_aggregate() {
    let cancelled = promise::<u32>();
    let input = cancelled.future();
    cancelled.cancel();

    let pair = combine(&input, &fulfilled::<u32>(Ok(2)));
    assert_eq!(
        pair.wait(),
        Err(Error::Aggregate(vec![Some(Error::Cancelled), None]))
    );
}

#[test]
fn combine3_and_combine4_build_wider_tuples() {
    let triple = combine3(
        &fulfilled::<u32>(Ok(1)),
        &fulfilled::<u32>(Ok(2)),
        &fulfilled::<u32>(Ok(3)),
    );
    assert_eq!(triple.wait(), Ok((1, 2, 3)));

    let quad = combine4(
        &fulfilled::<u32>(Ok(1)),
        &fulfilled::<&str>(Ok("2")),
        &fulfilled::<u32>(Ok(3)),
        &fulfilled::<bool>(Ok(true)),
    );
    assert_eq!(quad.wait(), Ok((1, "2", 3, true)));
}

#[test]
fn combine4_keeps_all_failure_slots() {
    let first = Error::from("first");
    let last = Error::from("last");
    let quad = combine4(
        &fulfilled::<u32>(Err(first.clone())),
        &fulfilled::<u32>(Ok(2)),
        &fulfilled::<u32>(Ok(3)),
        &fulfilled::<u32>(Err(last.clone())),
    );
    assert_eq!(
        quad.wait(),
        Err(Error::Aggregate(vec![Some(first), None, None, Some(last)]))
    );
}

#[test]
fn collect_preserves_input_order() {
    let all = collect(vec![
        fulfilled::<u32>(Ok(1)),
        fulfilled::<u32>(Ok(2)),
        fulfilled::<u32>(Ok(3)),
    ]);
    assert_eq!(all.wait(), Ok(vec![1, 2, 3]));
}

#[test]
fn collect_of_nothing_resolves_immediately() {
    let none = collect(Vec::<promissory::Future<u32>>::new());
    assert_eq!(none.wait(), Ok(vec![]));
}

#[test]
fn collect_aggregates_failures() {
    let error = Error::from("middle");
    let all = collect(vec![
        fulfilled::<u32>(Ok(1)),
        fulfilled::<u32>(Err(error.clone())),
        fulfilled::<u32>(Ok(3)),
    ]);
    assert_eq!(
        all.wait(),
        Err(Error::Aggregate(vec![None, Some(error), None]))
    );
}

#[test]
fn cancelling_the_combined_future_leaves_inputs_alone() {
    let left = promise::<u32>();
    let right = promise::<u32>();
    let (a, b) = (left.future(), right.future());
    let pair = combine(&a, &b);

    pair.cancel();
    left.succeed(1);
    right.succeed(2);

    assert_eq!(a.wait(), Ok(1));
    assert_eq!(b.wait(), Ok(2));
    assert_eq!(pair.wait(), Err(Error::Cancelled));
}
