use crate::error::Error;
use crate::future::Future;
use crate::promise::promise;
use crate::queue::TaskQueue;

impl<T: Clone + Send + 'static> Future<T> {
    /// Guards this future's success value behind a predicate.
    ///
    /// A rejected value becomes an [`Error::EnsureFailed`] failure; a
    /// failure passes through untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use promissory::{fulfilled, Error};
    ///
    /// let checked = fulfilled::<i32>(Ok(-4)).ensure(|n| *n >= 0);
    /// assert_eq!(checked.wait(), Err(Error::EnsureFailed));
    /// ```
    pub fn ensure<F>(&self, predicate: F) -> Future<T>
    where
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        self.ensure_on(TaskQueue::global(), predicate)
    }

    /// Like [`ensure`](Future::ensure), running `predicate` on `queue`.
    pub fn ensure_on<F>(&self, queue: &TaskQueue, predicate: F) -> Future<T>
    where
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        let promise = promise();
        let dst = promise.clone();
        queue.on_completion_of(self, move |completed| {
            if dst.is_cancelled() {
                return;
            }
            match completed.fulfilled_outcome() {
                Err(error) => dst.fail(error),
                Ok(value) => {
                    if predicate(&value) {
                        dst.succeed(value);
                    } else {
                        dst.fail(Error::EnsureFailed);
                    }
                }
            }
        });
        promise.future()
    }
}
