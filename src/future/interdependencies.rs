use crate::future::Future;
use crate::queue::TaskQueue;

impl<T: Send + 'static> Future<T> {
    /// Cancels this future as soon as `other` settles with a failure.
    ///
    /// Cancellation of `other` counts as a failure here, since its outcome
    /// reads as `Err(Error::Cancelled)`. A success of `other` leaves this
    /// future alone. The futures may live on different queues.
    ///
    /// ```
    /// use promissory::{fulfilled, promise, Error};
    ///
    /// let gate = promise::<u32>();
    /// let work = gate.future();
    /// work.cancel_on_failure_of(&fulfilled::<u32>(Err(Error::from("boom"))));
    /// assert_eq!(work.wait(), Err(Error::Cancelled));
    /// ```
    pub fn cancel_on_failure_of<U: Send + 'static>(&self, other: &Future<U>) {
        let target = self.clone();
        TaskQueue::global().on_completion_of(other, move |completed| {
            if completed.fulfilled_is_failure() {
                target.cancel();
            }
        });
    }
}
