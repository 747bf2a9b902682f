use crate::error::Error;
use crate::future::Future;
use crate::promise::promise;
use crate::queue::{self, TaskQueue};

/// Resolves with the first input to succeed.
///
/// Two tasks cooperate: a task on the global queue, dependent on every
/// input, fails the race with a positional [`Error::Aggregate`] once all
/// inputs have failed; per-input handlers on a process-wide serial
/// arbitration lane let exactly one success claim the win and cancel the
/// all-failed task. Inputs are never cancelled, winners or losers alike,
/// and `race(vec![])` resolves to `Err(Error::Aggregate(vec![]))`.
///
/// ```
/// use promissory::{fulfilled, promise, race};
///
/// let slow = promise::<u32>();
/// let winner = race(vec![slow.future(), fulfilled::<u32>(Ok(7))]);
/// assert_eq!(winner.wait(), Ok(7));
/// ```
pub fn race<T: Clone + Send + 'static>(futures: Vec<Future<T>>) -> Future<T> {
    let promise = promise();

    let anchors = futures.iter().map(|f| f.anchor()).collect();
    let inputs = futures.clone();
    let dst = promise.clone();
    let all_failed = TaskQueue::global().submit_after(
        anchors,
        Box::new(move || {
            if dst.is_terminal() {
                return;
            }
            let errors: Vec<Option<Error>> = inputs
                .iter()
                .map(|future| future.fulfilled_outcome().err())
                .collect();
            // A surviving success means a winner handler is about to claim
            // the race, or already has.
            if errors.iter().all(|slot| slot.is_some()) {
                dst.fail(Error::Aggregate(errors));
            }
        }),
    );

    for future in &futures {
        let dst = promise.clone();
        let all_failed = all_failed.clone();
        queue::arbitration().on_completion_of(future, move |completed| {
            if dst.is_terminal() {
                return;
            }
            if let Ok(value) = completed.fulfilled_outcome() {
                dst.succeed(value);
                all_failed.cancel();
            }
        });
    }

    promise.future()
}
