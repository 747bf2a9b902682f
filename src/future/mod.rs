//! The read half of a future/promise pair, and its combinators.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Outcome};
use crate::promise::Shared;
use crate::queue::Anchor;
use crate::state::Lifecycle;

mod and_then;
mod delay;
mod each;
mod ensure;
mod events;
mod filter_map;
mod interdependencies;
mod map;
mod recover;

/// A read-only handle to a value that will eventually exist.
///
/// A future is created from a [`Promise`](crate::Promise) and settles
/// exactly once, with a success value, a failure, or cancellation. Any
/// number of clones may observe it; all see the same terminal outcome.
/// Combinators build new futures by attaching continuations that run once
/// this one is terminal.
///
/// # Examples
///
/// ```
/// let promise = promissory::promise::<i32>();
/// let doubled = promise.future().map(|n| Ok(n * 2));
/// promise.succeed(21);
/// assert_eq!(doubled.wait(), Ok(42));
/// ```
pub struct Future<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Future<T> {
        Future {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Future<T> {
    /// Requests cancellation.
    ///
    /// Cooperative and best-effort: a producer already past its cancellation
    /// check will still attempt fulfillment, which is then silently dropped.
    /// If the future already finished, the outcome is immutable and this is
    /// ignored.
    pub fn cancel(&self) {
        self.shared.cancel();
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

    /// `true` once an outcome can be read: the future finished, or it was
    /// cancelled and its outcome reads as the cancellation error.
    pub fn is_fulfilled(&self) -> bool {
        self.is_terminal()
    }

    pub(crate) fn anchor(&self) -> Anchor {
        self.shared.anchor()
    }

    /// Whether the terminal outcome is a failure, without cloning the value.
    pub(crate) fn fulfilled_is_failure(&self) -> bool {
        self.shared.cell.read(|state| match state {
            Lifecycle::Finished(outcome) => outcome.is_err(),
            Lifecycle::Cancelled => true,
            _ => panic!("outcome read before the future reached a terminal state"),
        })
    }
}

impl<T: Clone> Future<T> {
    /// Returns the terminal outcome, or `None` while the future is pending.
    ///
    /// A cancelled future's outcome reads as `Err(Error::Cancelled)`.
    pub fn outcome(&self) -> Option<Outcome<T>> {
        self.shared.cell.read(|state| match state {
            Lifecycle::Finished(outcome) => Some(outcome.clone()),
            Lifecycle::Cancelled => Some(Err(Error::Cancelled)),
            _ => None,
        })
    }

    /// Blocks the calling thread until the future is terminal and returns
    /// its outcome.
    ///
    /// This is a bridge out of the promise world for callers that own a
    /// thread, such as tests and `main`. Never call it from a queue worker;
    /// continuations wait by attaching to a future, not by blocking.
    pub fn wait(&self) -> Outcome<T> {
        match self.shared.cell.block_until_terminal() {
            Some(outcome) => outcome,
            None => Err(Error::Cancelled),
        }
    }

    /// Like [`wait`](Future::wait), but gives up after `timeout` and returns
    /// `None` if the future is still pending.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome<T>> {
        self.shared
            .cell
            .block_until_terminal_timeout(timeout)
            .map(|payload| match payload {
                Some(outcome) => outcome,
                None => Err(Error::Cancelled),
            })
    }

    /// The outcome of a future known to be terminal. Continuations run
    /// strictly after their source's terminal transition, so this cannot
    /// fail there.
    pub(crate) fn fulfilled_outcome(&self) -> Outcome<T> {
        match self.outcome() {
            Some(outcome) => outcome,
            None => panic!("outcome read before the future reached a terminal state"),
        }
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("state", &self.shared.cell.read(|state| state.tag()))
            .finish()
    }
}
