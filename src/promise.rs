//! The write half of a future/promise pair.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::{Error, Outcome};
use crate::future::Future;
use crate::queue::{Anchor, TaskCore, TaskQueue};
use crate::state::{Lifecycle, StateCell, Step};

/// Creates a pending promise registered with the global queue.
///
/// The caller is the promise's producer and is responsible for eventually
/// driving it to a terminal state. Dropping the last `Promise` clone without
/// fulfilling it cancels the future.
///
/// # Examples
///
/// ```
/// let promise = promissory::promise::<u32>();
/// let future = promise.future();
/// promise.succeed(7);
/// assert_eq!(future.wait(), Ok(7));
/// ```
pub fn promise<T: Send + 'static>() -> Promise<T> {
    promise_on(TaskQueue::global())
}

/// Creates a pending promise registered with `queue`.
pub fn promise_on<T: Send + 'static>(queue: &TaskQueue) -> Promise<T> {
    let promise = Promise::with_state(Lifecycle::Preparing);
    let core = queue.register_anchor();
    promise.bind(queue, core);
    promise
}

/// Returns a future already settled with `outcome`.
///
/// # Examples
///
/// ```
/// let future = promissory::fulfilled::<&str>(Ok("done"));
/// assert_eq!(future.outcome(), Some(Ok("done")));
/// ```
pub fn fulfilled<T: Send + 'static>(outcome: Outcome<T>) -> Future<T> {
    fulfilled_on(TaskQueue::global(), outcome)
}

/// Returns a future already settled with `outcome`, registered with `queue`.
pub fn fulfilled_on<T: Send + 'static>(queue: &TaskQueue, outcome: Outcome<T>) -> Future<T> {
    let promise = promise_on(queue);
    promise.fulfill(outcome);
    promise.future()
}

/// State shared by a promise, its futures, and pending continuations.
pub(crate) struct Shared<T> {
    pub(crate) cell: StateCell<Outcome<T>>,
    binding: OnceCell<Anchor>,
}

impl<T> Shared<T> {
    fn new(initial: Lifecycle<Outcome<T>>) -> Shared<T> {
        Shared {
            cell: StateCell::new(initial),
            binding: OnceCell::new(),
        }
    }

    pub(crate) fn anchor(&self) -> Anchor {
        match self.binding.get() {
            Some(anchor) => anchor.clone(),
            None => panic!("future is not registered with a task queue"),
        }
    }

    /// Cancels unless already terminal. A finished outcome wins over a late
    /// cancel; cancelling twice is a no-op.
    pub(crate) fn cancel(&self) {
        self.cell.transition(|state| match state {
            Lifecycle::Finished(_) | Lifecycle::Cancelled => Step::Stay,
            _ => Step::To(Lifecycle::Cancelled),
        });
    }
}

/// Cancels the promise when the last write handle goes away unfulfilled.
struct WriteGuard<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Drop for WriteGuard<T> {
    fn drop(&mut self) {
        // Nobody is left to fulfill the promise.
        self.shared.cancel();
    }
}

/// The write-once handle that produces a [`Future`]'s outcome.
///
/// A promise is fulfilled at most once. Cancellation can land first, in
/// which case later fulfillment attempts are silently dropped; fulfilling an
/// already-finished promise is a programmer error and panics.
///
/// Cloning a `Promise` yields another write handle to the same future.
pub struct Promise<T> {
    pub(crate) shared: Arc<Shared<T>>,
    guard: Arc<WriteGuard<T>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Promise<T> {
        Promise {
            shared: self.shared.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<T> Promise<T> {
    pub(crate) fn with_state(initial: Lifecycle<Outcome<T>>) -> Promise<T> {
        let shared = Arc::new(Shared::new(initial));
        let guard = Arc::new(WriteGuard {
            shared: shared.clone(),
        });
        Promise { shared, guard }
    }

    /// Binds the promise to its queue task and starts mirroring terminal
    /// state transitions into the queue.
    pub(crate) fn bind(&self, queue: &TaskQueue, core: Arc<TaskCore>) {
        let anchor = Anchor {
            queue: queue.clone(),
            core,
        };
        let observer = {
            let anchor = anchor.clone();
            Box::new(move |flags: crate::state::Flags| {
                if flags.terminal() {
                    anchor.queue.mark_terminal(&anchor.core, flags.cancelled);
                }
            })
        };
        if self.shared.binding.set(anchor).is_err() {
            panic!("promise bound to a task twice");
        }
        self.shared.cell.set_observer(observer);
    }

    /// Settles the promise with `outcome`.
    ///
    /// Ignored if the promise was already cancelled. Panics if the promise
    /// was already finished: two producers racing to fulfill the same
    /// promise is a broken ownership contract, not a runtime condition.
    pub fn fulfill(&self, outcome: Outcome<T>) {
        self.shared.cell.transition(|state| match state {
            Lifecycle::Cancelled => Step::Stay,
            Lifecycle::Finished(_) => panic!("promise fulfilled twice"),
            _ => Step::To(Lifecycle::Finished(outcome)),
        });
    }

    /// Fulfills with a success value.
    pub fn succeed(&self, value: T) {
        self.fulfill(Ok(value));
    }

    /// Fulfills with a failure.
    pub fn fail(&self, error: Error) {
        self.fulfill(Err(error));
    }

    /// Moves a `Ready` promise to `Executing`. Returns `false` when a
    /// cancel landed first, in which case the work must not run.
    pub(crate) fn start_executing(&self) -> bool {
        self.shared.cell.transition(|state| match state {
            Lifecycle::Ready => Step::To(Lifecycle::Executing),
            _ => Step::Stay,
        })
    }

    /// Cancels the future unless it already finished.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Hands out a read view of this promise.
    pub fn future(&self) -> Future<T> {
        Future {
            shared: self.shared.clone(),
        }
    }

    /// `true` while the promise has not been registered as schedulable.
    pub fn is_preparing(&self) -> bool {
        self.shared.cell.read(|state| state.is_preparing())
    }

    /// `true` once schedulable but not yet started.
    pub fn is_ready(&self) -> bool {
        self.shared.cell.read(|state| state.is_ready())
    }

    /// `true` while the backing work is running.
    pub fn is_executing(&self) -> bool {
        self.shared.cell.read(|state| state.is_executing())
    }

    /// `true` once fulfilled with an outcome.
    pub fn is_finished(&self) -> bool {
        self.shared.cell.read(|state| state.is_finished())
    }

    /// `true` once cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.shared.cell.read(|state| state.is_cancelled())
    }

    /// `true` once terminal, i.e. finished or cancelled.
    pub fn is_terminal(&self) -> bool {
        self.shared.cell.read(|state| state.flags().terminal())
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &self.shared.cell.read(|state| state.tag()))
            .finish()
    }
}
