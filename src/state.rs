//! The per-future lifecycle state machine.
//!
//! Every promise owns one [`StateCell`]: a mutex around the current
//! [`Lifecycle`], a condvar for blocking readers, and at most one registered
//! observer. Transitions are validated against the table in
//! [`Lifecycle::can_transition`]. A successful transition wakes blocked
//! readers and delivers a [`Flags`] snapshot to the observer *after* the
//! lock is released, so an observer may itself read the cell or request
//! another transition without deadlocking.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;

/// The lifecycle of a future, from creation to its terminal state.
pub(crate) enum Lifecycle<T> {
    /// Not yet schedulable. The initial state of a plain promise.
    Preparing,

    /// Schedulable but not started. The initial state of a blocking promise.
    Ready,

    /// Started; the outcome is not yet known.
    Executing,

    /// Terminal, carrying the final payload.
    Finished(T),

    /// Terminal; the future was cancelled before finishing.
    Cancelled,
}

impl<T> Lifecycle<T> {
    pub(crate) fn is_preparing(&self) -> bool {
        matches!(self, Lifecycle::Preparing)
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(self, Lifecycle::Ready)
    }

    pub(crate) fn is_executing(&self) -> bool {
        matches!(self, Lifecycle::Executing)
    }

    pub(crate) fn is_finished(&self) -> bool {
        matches!(self, Lifecycle::Finished(_))
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        matches!(self, Lifecycle::Cancelled)
    }

    pub(crate) fn flags(&self) -> Flags {
        Flags {
            ready: self.is_ready(),
            executing: self.is_executing(),
            finished: self.is_finished(),
            cancelled: self.is_cancelled(),
        }
    }

    pub(crate) fn tag(&self) -> &'static str {
        match self {
            Lifecycle::Preparing => "preparing",
            Lifecycle::Ready => "ready",
            Lifecycle::Executing => "executing",
            Lifecycle::Finished(_) => "finished",
            Lifecycle::Cancelled => "cancelled",
        }
    }

    /// The transition validation table.
    ///
    /// `Preparing -> Finished` and `Ready -> Finished` are tolerated: a
    /// promise is fulfilled directly from its initial state, without the
    /// queue ever starting it. Self-transitions on non-terminal states and
    /// `Cancelled -> Cancelled` are idempotent; `Finished -> Finished` is
    /// not, since re-finishing means two producers raced to fulfill.
    pub(crate) fn can_transition(&self, next: &Lifecycle<T>) -> bool {
        use Lifecycle::*;

        match (self, next) {
            // Expected.
            (Preparing, Ready)
            | (Preparing, Cancelled)
            | (Ready, Executing)
            | (Ready, Cancelled)
            | (Executing, Finished(_))
            | (Executing, Cancelled) => true,

            // Tolerated.
            (Preparing, Preparing)
            | (Ready, Ready)
            | (Executing, Executing)
            | (Cancelled, Cancelled)
            | (Preparing, Finished(_))
            | (Ready, Finished(_)) => true,

            _ => false,
        }
    }
}

/// Booleans derived from a [`Lifecycle`], captured inside a transition.
///
/// Observers must only latch monotone facts from a snapshot (the task queue
/// latches "terminal"), which makes a delayed or reordered delivery
/// harmless.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Flags {
    pub(crate) ready: bool,
    pub(crate) executing: bool,
    pub(crate) finished: bool,
    pub(crate) cancelled: bool,
}

impl Flags {
    pub(crate) fn terminal(self) -> bool {
        self.finished || self.cancelled
    }
}

/// The decision returned by a transition closure.
pub(crate) enum Step<T> {
    /// Move to the given state. The move must be legal per the table.
    To(Lifecycle<T>),

    /// Leave the state untouched.
    Stay,
}

type Observer = Box<dyn Fn(Flags) + Send + Sync>;

/// A lifecycle state behind a mutex, with change notification.
pub(crate) struct StateCell<T> {
    state: Mutex<Lifecycle<T>>,
    changed: Condvar,
    observer: OnceCell<Observer>,
}

impl<T> StateCell<T> {
    pub(crate) fn new(initial: Lifecycle<T>) -> StateCell<T> {
        StateCell {
            state: Mutex::new(initial),
            changed: Condvar::new(),
            observer: OnceCell::new(),
        }
    }

    /// Registers the observer notified after every successful transition.
    pub(crate) fn set_observer(&self, observer: Observer) {
        if self.observer.set(observer).is_err() {
            panic!("state observer registered twice");
        }
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Lifecycle<T>) -> R) -> R {
        let state = self.state.lock().unwrap();
        f(&state)
    }

    /// Runs `decide` under the lock and applies the step it returns.
    ///
    /// Returns `true` if the state changed. The flag snapshot is computed
    /// while the lock is held and handed to the observer after release.
    pub(crate) fn transition(&self, decide: impl FnOnce(&Lifecycle<T>) -> Step<T>) -> bool {
        let flags = {
            let mut state = self.state.lock().unwrap();
            match decide(&state) {
                Step::Stay => return false,
                Step::To(next) => {
                    assert!(
                        state.can_transition(&next),
                        "invalid lifecycle transition: {} -> {}",
                        state.tag(),
                        next.tag(),
                    );
                    *state = next;
                    self.changed.notify_all();
                    state.flags()
                }
            }
        };

        if let Some(observer) = self.observer.get() {
            observer(flags);
        }
        true
    }

    /// Blocks until the state is terminal.
    ///
    /// Returns the finished payload, or `None` if the future was cancelled.
    pub(crate) fn block_until_terminal(&self) -> Option<T>
    where
        T: Clone,
    {
        let mut state = self.state.lock().unwrap();
        loop {
            match &*state {
                Lifecycle::Finished(payload) => return Some(payload.clone()),
                Lifecycle::Cancelled => return None,
                _ => state = self.changed.wait(state).unwrap(),
            }
        }
    }

    /// Like [`block_until_terminal`](StateCell::block_until_terminal), but
    /// gives up once `timeout` has elapsed. The outer `None` is the timeout.
    pub(crate) fn block_until_terminal_timeout(&self, timeout: Duration) -> Option<Option<T>>
    where
        T: Clone,
    {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap();
        loop {
            match &*state {
                Lifecycle::Finished(payload) => return Some(Some(payload.clone())),
                Lifecycle::Cancelled => return Some(None),
                _ => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    let (guard, _) = self.changed.wait_timeout(state, deadline - now).unwrap();
                    state = guard;
                }
            }
        }
    }
}
