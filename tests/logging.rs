use promissory::{fulfilled, promise, TaskQueue};

// Smoke test: exercises the trace-level task logging paths end to end.
// Output goes to stdout and is not asserted on; the point is that logging
// with kv pairs enabled does not disturb scheduling.
#[test]
fn tracing_does_not_disturb_scheduling() {
    femme::with_level(log::LevelFilter::Trace);

    let queue = TaskQueue::with_concurrency("tests/logging", 2);
    let source = promise::<u32>();
    let chained = source
        .future()
        .map_on(&queue, |n| Ok(n + 1))
        .map(|n| Ok(n * 2));

    let cancelled = fulfilled::<u32>(Ok(1)).map(|n| Ok(n));
    cancelled.cancel();

    source.succeed(10);
    assert_eq!(chained.wait(), Ok(22));
}
