use std::time::Duration;

use crate::future::Future;
use crate::promise::promise;
use crate::queue::TaskQueue;
use crate::timer;

impl<T: Clone + Send + 'static> Future<T> {
    /// Holds back this future's success value for `interval` after it
    /// resolves.
    ///
    /// A failure propagates immediately. Cancelling the returned future
    /// during the wait wins: the late fulfillment is dropped by the
    /// promise's own guard, not by the timer.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// let later = promissory::fulfilled::<u8>(Ok(1)).delay(Duration::from_millis(5));
    /// assert_eq!(later.wait(), Ok(1));
    /// ```
    pub fn delay(&self, interval: Duration) -> Future<T> {
        self.delay_on(TaskQueue::global(), interval)
    }

    /// Like [`delay`](Future::delay), observing this future on `queue`.
    pub fn delay_on(&self, queue: &TaskQueue, interval: Duration) -> Future<T> {
        let promise = promise();
        let dst = promise.clone();
        queue.on_completion_of(self, move |completed| {
            match completed.fulfilled_outcome() {
                Err(error) => dst.fail(error),
                Ok(value) => timer::after(interval, move || {
                    if dst.is_cancelled() {
                        return;
                    }
                    dst.succeed(value);
                }),
            }
        });
        promise.future()
    }
}
