use crate::error::{Error, Outcome};
use crate::future::Future;
use crate::promise::promise;
use crate::queue::TaskQueue;

impl<T: Clone + Send + 'static> Future<T> {
    /// Transforms this future's success value, failing with
    /// [`Error::FilterMapNone`] when the transform produces no value.
    ///
    /// # Examples
    ///
    /// ```
    /// use promissory::{fulfilled, Error};
    ///
    /// let parsed = fulfilled::<&str>(Ok("7")).filter_map(|s| Ok(s.parse::<i32>().ok()));
    /// assert_eq!(parsed.wait(), Ok(7));
    ///
    /// let missing = fulfilled::<&str>(Ok("x")).filter_map(|s| Ok(s.parse::<i32>().ok()));
    /// assert_eq!(missing.wait(), Err(Error::FilterMapNone));
    /// ```
    pub fn filter_map<U, F>(&self, transform: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Outcome<Option<U>> + Send + 'static,
    {
        self.filter_map_on(TaskQueue::global(), transform)
    }

    /// Like [`filter_map`](Future::filter_map), running `transform` on
    /// `queue`.
    pub fn filter_map_on<U, F>(&self, queue: &TaskQueue, transform: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Outcome<Option<U>> + Send + 'static,
    {
        let promise = promise();
        let dst = promise.clone();
        queue.on_completion_of(self, move |completed| {
            if dst.is_cancelled() {
                return;
            }
            match completed.fulfilled_outcome() {
                Err(error) => dst.fail(error),
                Ok(value) => match transform(value) {
                    Ok(Some(next)) => dst.succeed(next),
                    Ok(None) => dst.fail(Error::FilterMapNone),
                    Err(error) => dst.fail(error),
                },
            }
        });
        promise.future()
    }
}
