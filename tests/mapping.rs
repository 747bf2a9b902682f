use promissory::{fulfilled, promise, Error, TaskQueue};

#[test]
fn map_transforms_the_success_value() {
    let promise = promise::<u32>();
    let doubled = promise.future().map(|n| Ok(n * 2));
    promise.succeed(21);
    assert_eq!(doubled.wait(), Ok(42));
}

#[test]
fn map_runs_after_an_already_settled_source() {
    let mapped = fulfilled::<u32>(Ok(3)).map(|n| Ok(n + 1));
    assert_eq!(mapped.wait(), Ok(4));
}

#[test]
fn map_skips_the_transform_on_failure() {
    let error = Error::from("upstream");
    let mapped = fulfilled::<u32>(Err(error.clone())).map(|_| -> promissory::Outcome<u32> {
        panic!("transform must not run for a failed source");
    });
    assert_eq!(mapped.wait(), Err(error));
}

#[test]
fn map_transform_error_fails_the_result() {
    let error = Error::from("bad digit");
    let parse_error = error.clone();
    let parsed = fulfilled::<&str>(Ok("x")).map(move |s| match s.parse::<i32>() {
        Ok(n) => Ok(n),
        Err(_) => Err(parse_error),
    });
    assert_eq!(parsed.wait(), Err(error));
}

#[test]
fn map_on_uses_the_given_queue() {
    let queue = TaskQueue::with_concurrency("tests/mapping", 1);
    let named = fulfilled::<u32>(Ok(1)).map_on(&queue, |n| {
        let worker = std::thread::current();
        assert_eq!(worker.name(), Some("tests/mapping/worker"));
        Ok(n + 10)
    });
    assert_eq!(named.wait(), Ok(11));
}

#[test]
fn map_can_change_the_value_type() {
    let labelled = fulfilled::<u32>(Ok(17)).map(|n| Ok(format!("#{}", n)));
    assert_eq!(labelled.wait(), Ok("#17".to_string()));
}

#[test]
fn cancelled_source_propagates_to_the_mapped_future() {
    let promise = promise::<u32>();
    let mapped = promise.future().map(|n| Ok(n * 2));
    promise.cancel();
    assert_eq!(mapped.wait(), Err(Error::Cancelled));
}

#[test]
fn cancelling_the_mapped_future_leaves_the_source_alone() {
    let promise = promise::<u32>();
    let source = promise.future();
    let mapped = source.map(|n| Ok(n * 2));

    mapped.cancel();
    promise.succeed(5);

    assert_eq!(source.wait(), Ok(5));
    assert_eq!(mapped.wait(), Err(Error::Cancelled));
}

#[test]
fn map_each_transforms_every_element() {
    let doubled = fulfilled::<Vec<u32>>(Ok(vec![1, 2, 3])).map_each(|n| Ok(n * 2));
    assert_eq!(doubled.wait(), Ok(vec![2, 4, 6]));
}

#[test]
fn map_each_fails_on_the_first_transform_error() {
    let error = Error::from("odd one out");
    let failing = error.clone();
    let checked = fulfilled::<Vec<u32>>(Ok(vec![2, 3, 4])).map_each(move |n| {
        if n % 2 == 0 {
            Ok(n)
        } else {
            Err(failing.clone())
        }
    });
    assert_eq!(checked.wait(), Err(error));
}

#[test]
fn filter_map_each_drops_absent_elements() {
    let evens = fulfilled::<Vec<u32>>(Ok(vec![1, 2, 3, 4]))
        .filter_map_each(|n| Ok(if n % 2 == 0 { Some(n) } else { None }));
    assert_eq!(evens.wait(), Ok(vec![2, 4]));
}

#[test]
fn map_each_future_gathers_in_element_order() {
    let summed = fulfilled::<Vec<u32>>(Ok(vec![1, 2, 3]))
        .map_each_future(|n| fulfilled::<u32>(Ok(n * 10)));
    assert_eq!(summed.wait(), Ok(vec![10, 20, 30]));
}

#[test]
fn map_each_future_aggregates_per_element_failures() {
    let mixed = fulfilled::<Vec<u32>>(Ok(vec![1, 2])).map_each_future(|n| {
        if n == 1 {
            fulfilled::<u32>(Ok(n))
        } else {
            fulfilled::<u32>(Err(Error::from("second")))
        }
    });

    match mixed.wait() {
        Err(Error::Aggregate(slots)) => {
            assert_eq!(slots.len(), 2);
            assert!(slots[0].is_none());
            assert!(slots[1].is_some());
        }
        other => panic!("expected an aggregate failure, got {:?}", other),
    }
}

#[test]
fn filter_map_each_future_skips_absent_futures() {
    let some = fulfilled::<Vec<u32>>(Ok(vec![1, 2, 3])).filter_map_each_future(|n| {
        if n == 2 {
            None
        } else {
            Some(fulfilled::<u32>(Ok(n)))
        }
    });
    assert_eq!(some.wait(), Ok(vec![1, 3]));
}
