//! Futures backed by a blocking closure.

use crate::future::Future;
use crate::promise::Promise;
use crate::queue::TaskQueue;
use crate::state::Lifecycle;

/// Runs `work` as a task on `queue` and returns the future it fulfills.
///
/// Unlike a plain promise, the returned future's state tracks the task
/// itself: it starts out `Ready`, becomes `Executing` when the queue
/// actually starts the closure, and is terminal once `work` fulfills or
/// cancels the promise it is handed, not when `work` returns. A future
/// cancelled before the queue gets to it never runs `work` at all.
///
/// ```
/// use promissory::{blocking_on, TaskQueue};
///
/// let queue = TaskQueue::new("example");
/// let future = blocking_on(&queue, |promise| promise.succeed(6 * 7));
/// assert_eq!(future.wait(), Ok(42));
/// ```
pub fn blocking_on<T, F>(queue: &TaskQueue, work: F) -> Future<T>
where
    T: Send + 'static,
    F: FnOnce(Promise<T>) + Send + 'static,
{
    let promise = Promise::with_state(Lifecycle::Ready);
    let runner = promise.clone();
    // Held back so the job cannot start before the promise is bound.
    let handle = queue.submit_held(Box::new(move || {
        if !runner.start_executing() {
            return;
        }
        work(runner);
    }));
    promise.bind(queue, handle.core.clone());
    queue.release_hold(&handle);
    promise.future()
}
