use crate::future::Future;
use crate::promise::promise;
use crate::queue::TaskQueue;

impl<T: Clone + Send + 'static> Future<T> {
    /// Chains this future into the one returned by `transform`, flattening
    /// one level of nesting.
    ///
    /// On success, `transform` produces the next future and the result
    /// mirrors that future's outcome; on failure, the failure propagates
    /// untouched and `transform` never runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use promissory::fulfilled;
    ///
    /// let chained = fulfilled::<i32>(Ok(2)).and_then(|n| fulfilled::<i32>(Ok(n + 1)));
    /// assert_eq!(chained.wait(), Ok(3));
    /// ```
    pub fn and_then<U, F>(&self, transform: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Future<U> + Send + 'static,
    {
        self.and_then_on(TaskQueue::global(), transform)
    }

    /// Like [`and_then`](Future::and_then), running `transform` on `queue`.
    pub fn and_then_on<U, F>(&self, queue: &TaskQueue, transform: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Future<U> + Send + 'static,
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
                    let next = transform(value);
                    TaskQueue::global().on_completion_of(&next, move |next| {
                        dst.fulfill(next.fulfilled_outcome());
                    });
                }
            }
        });
        promise.future()
    }
}
