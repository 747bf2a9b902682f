//! Side-effect handlers on a future's terminal outcome.
//!
//! Each of these returns a mirror future that settles with the same outcome
//! as the source, and settles it *before* the handler runs: a handler that
//! reaches the mirror through a captured clone observes a terminal result.

use crate::error::{Error, Outcome};
use crate::future::Future;
use crate::promise::promise;
use crate::queue::TaskQueue;

impl<T: Clone + Send + 'static> Future<T> {
    /// Runs `handler` with this future's terminal outcome.
    pub fn on_completion<F>(&self, handler: F) -> Future<T>
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        self.on_completion_on(TaskQueue::global(), handler)
    }

    /// Like [`on_completion`](Future::on_completion), running `handler` on
    /// `queue`.
    pub fn on_completion_on<F>(&self, queue: &TaskQueue, handler: F) -> Future<T>
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        let promise = promise();
        let dst = promise.clone();
        queue.on_completion_of(self, move |completed| {
            if dst.is_cancelled() {
                return;
            }
            let outcome = completed.fulfilled_outcome();
            // Fulfilled before the handler runs, per the module contract.
            dst.fulfill(outcome.clone());
            handler(outcome);
        });
        promise.future()
    }

    /// Runs `handler` with this future's success value. Failures pass
    /// through without invoking it.
    pub fn on_success<F>(&self, handler: F) -> Future<T>
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.on_success_on(TaskQueue::global(), handler)
    }

    /// Like [`on_success`](Future::on_success), running `handler` on
    /// `queue`.
    pub fn on_success_on<F>(&self, queue: &TaskQueue, handler: F) -> Future<T>
    where
        F: FnOnce(T) + Send + 'static,
    {
        let promise = promise();
        let dst = promise.clone();
        queue.on_completion_of(self, move |completed| {
            if dst.is_cancelled() {
                return;
            }
            match completed.fulfilled_outcome() {
                Ok(value) => {
                    dst.succeed(value.clone());
                    handler(value);
                }
                Err(error) => dst.fail(error),
            }
        });
        promise.future()
    }

    /// Runs `handler` with this future's failure. Successes pass through
    /// without invoking it.
    pub fn on_failure<F>(&self, handler: F) -> Future<T>
    where
        F: FnOnce(Error) + Send + 'static,
    {
        self.on_failure_on(TaskQueue::global(), handler)
    }

    /// Like [`on_failure`](Future::on_failure), running `handler` on
    /// `queue`.
    pub fn on_failure_on<F>(&self, queue: &TaskQueue, handler: F) -> Future<T>
    where
        F: FnOnce(Error) + Send + 'static,
    {
        let promise = promise();
        let dst = promise.clone();
        queue.on_completion_of(self, move |completed| {
            if dst.is_cancelled() {
                return;
            }
            match completed.fulfilled_outcome() {
                Ok(value) => dst.succeed(value),
                Err(error) => {
                    dst.fail(error.clone());
                    handler(error);
                }
            }
        });
        promise.future()
    }

    /// Runs `handler` when this future's propagated failure is the
    /// cancellation error. Other failures and successes pass through
    /// without invoking it.
    pub fn on_cancel<F>(&self, handler: F) -> Future<T>
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_cancel_on(TaskQueue::global(), handler)
    }

    /// Like [`on_cancel`](Future::on_cancel), running `handler` on `queue`.
    pub fn on_cancel_on<F>(&self, queue: &TaskQueue, handler: F) -> Future<T>
    where
        F: FnOnce() + Send + 'static,
    {
        let promise = promise();
        let dst = promise.clone();
        queue.on_completion_of(self, move |completed| {
            if dst.is_cancelled() {
                return;
            }
            match completed.fulfilled_outcome() {
                Ok(value) => dst.succeed(value),
                Err(error) => {
                    let cancelled = error.is_cancelled();
                    dst.fail(error);
                    if cancelled {
                        handler();
                    }
                }
            }
        });
        promise.future()
    }
}
