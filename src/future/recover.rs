use crate::error::{Error, Outcome};
use crate::future::Future;
use crate::promise::promise;
use crate::queue::TaskQueue;

impl<T: Clone + Send + 'static> Future<T> {
    /// Handles this future's failure, turning it back into a success or
    /// into a new failure.
    ///
    /// The handler runs only when the source fails or is cancelled; a
    /// success passes through untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use promissory::fulfilled;
    ///
    /// let rescued = fulfilled::<i32>(Err("boom".into())).recover(|_| Ok(0));
    /// assert_eq!(rescued.wait(), Ok(0));
    /// ```
    pub fn recover<F>(&self, handler: F) -> Future<T>
    where
        F: FnOnce(Error) -> Outcome<T> + Send + 'static,
    {
        self.recover_on(TaskQueue::global(), handler)
    }

    /// Like [`recover`](Future::recover), running `handler` on `queue`.
    pub fn recover_on<F>(&self, queue: &TaskQueue, handler: F) -> Future<T>
    where
        F: FnOnce(Error) -> Outcome<T> + Send + 'static,
    {
        let promise = promise();
        let dst = promise.clone();
        queue.on_completion_of(self, move |completed| {
            if dst.is_cancelled() {
                return;
            }
            match completed.fulfilled_outcome() {
                Ok(value) => dst.succeed(value),
                Err(error) => dst.fulfill(handler(error)),
            }
        });
        promise.future()
    }
}
