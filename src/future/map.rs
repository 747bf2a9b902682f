use crate::error::Outcome;
use crate::future::Future;
use crate::promise::promise;
use crate::queue::TaskQueue;

impl<T: Clone + Send + 'static> Future<T> {
    /// Transforms this future's success value.
    ///
    /// A failure of this future, and any `Err` returned by `transform`,
    /// becomes the returned future's failure. The transform runs on the
    /// global queue.
    ///
    /// # Examples
    ///
    /// ```
    /// let future = promissory::fulfilled::<i32>(Ok(2)).map(|n| Ok(n * 2));
    /// assert_eq!(future.wait(), Ok(4));
    /// ```
    pub fn map<U, F>(&self, transform: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Outcome<U> + Send + 'static,
    {
        self.map_on(TaskQueue::global(), transform)
    }

    /// Like [`map`](Future::map), running `transform` on `queue`.
    pub fn map_on<U, F>(&self, queue: &TaskQueue, transform: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Outcome<U> + Send + 'static,
    {
        let promise = promise();
        let dst = promise.clone();
        queue.on_completion_of(self, move |completed| {
            if dst.is_cancelled() {
                return;
            }
            match completed.fulfilled_outcome() {
                Err(error) => dst.fail(error),
                Ok(value) => dst.fulfill(transform(value)),
            }
        });
        promise.future()
    }
}
