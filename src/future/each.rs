//! Element-wise combinators over futures of collections.

use crate::combine::collect;
use crate::error::Outcome;
use crate::future::Future;
use crate::promise::promise;
use crate::queue::TaskQueue;

impl<C, T> Future<C>
where
    C: IntoIterator<Item = T> + Clone + Send + 'static,
    T: Send + 'static,
{
    /// Applies a fallible transform to every element of this future's
    /// collection. The first transform error fails the whole result.
    ///
    /// # Examples
    ///
    /// ```
    /// let doubled = promissory::fulfilled::<Vec<i32>>(Ok(vec![1, 2, 3]))
    ///     .map_each(|n| Ok(n * 2));
    /// assert_eq!(doubled.wait(), Ok(vec![2, 4, 6]));
    /// ```
    pub fn map_each<U, F>(&self, transform: F) -> Future<Vec<U>>
    where
        U: Send + 'static,
        F: FnMut(T) -> Outcome<U> + Send + 'static,
    {
        self.map_each_on(TaskQueue::global(), transform)
    }

    /// Like [`map_each`](Future::map_each), running `transform` on `queue`.
    pub fn map_each_on<U, F>(&self, queue: &TaskQueue, mut transform: F) -> Future<Vec<U>>
    where
        U: Send + 'static,
        F: FnMut(T) -> Outcome<U> + Send + 'static,
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
                    let mapped: Outcome<Vec<U>> = value.into_iter().map(&mut transform).collect();
                    dst.fulfill(mapped);
                }
            }
        });
        promise.future()
    }

    /// Applies a transform to every element, dropping the elements for
    /// which it produces no value.
    ///
    /// Unlike the scalar [`filter_map`](Future::filter_map), an absent
    /// element is not an error here; it is simply left out of the result.
    pub fn filter_map_each<U, F>(&self, transform: F) -> Future<Vec<U>>
    where
        U: Send + 'static,
        F: FnMut(T) -> Outcome<Option<U>> + Send + 'static,
    {
        self.filter_map_each_on(TaskQueue::global(), transform)
    }

    /// Like [`filter_map_each`](Future::filter_map_each), running
    /// `transform` on `queue`.
    pub fn filter_map_each_on<U, F>(&self, queue: &TaskQueue, mut transform: F) -> Future<Vec<U>>
    where
        U: Send + 'static,
        F: FnMut(T) -> Outcome<Option<U>> + Send + 'static,
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
                    let mut kept = Vec::new();
                    for element in value {
                        match transform(element) {
                            Ok(Some(next)) => kept.push(next),
                            Ok(None) => {}
                            Err(error) => {
                                dst.fail(error);
                                return;
                            }
                        }
                    }
                    dst.succeed(kept);
                }
            }
        });
        promise.future()
    }

    /// Maps every element to a future and fans the results back in.
    ///
    /// The result succeeds with the collected values in element order, or
    /// fails with the positional [`Error::Aggregate`](crate::Error::Aggregate)
    /// of the per-element futures.
    pub fn map_each_future<U, F>(&self, transform: F) -> Future<Vec<U>>
    where
        U: Clone + Send + 'static,
        F: FnMut(T) -> Future<U> + Send + 'static,
    {
        self.map_each_future_on(TaskQueue::global(), transform)
    }

    /// Like [`map_each_future`](Future::map_each_future), running
    /// `transform` on `queue`.
    pub fn map_each_future_on<U, F>(&self, queue: &TaskQueue, mut transform: F) -> Future<Vec<U>>
    where
        U: Clone + Send + 'static,
        F: FnMut(T) -> Future<U> + Send + 'static,
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
                    let futures: Vec<Future<U>> = value.into_iter().map(&mut transform).collect();
                    let gathered = collect(futures);
                    TaskQueue::global().on_completion_of(&gathered, move |gathered| {
                        dst.fulfill(gathered.fulfilled_outcome());
                    });
                }
            }
        });
        promise.future()
    }

    /// Maps every element to an optional future, dropping the absent ones,
    /// and fans the rest back in as in
    /// [`map_each_future`](Future::map_each_future).
    pub fn filter_map_each_future<U, F>(&self, transform: F) -> Future<Vec<U>>
    where
        U: Clone + Send + 'static,
        F: FnMut(T) -> Option<Future<U>> + Send + 'static,
    {
        self.filter_map_each_future_on(TaskQueue::global(), transform)
    }

    /// Like [`filter_map_each_future`](Future::filter_map_each_future),
    /// running `transform` on `queue`.
    pub fn filter_map_each_future_on<U, F>(
        &self,
        queue: &TaskQueue,
        mut transform: F,
    ) -> Future<Vec<U>>
    where
        U: Clone + Send + 'static,
        F: FnMut(T) -> Option<Future<U>> + Send + 'static,
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
                    let futures: Vec<Future<U>> =
                        value.into_iter().filter_map(&mut transform).collect();
                    let gathered = collect(futures);
                    TaskQueue::global().on_completion_of(&gathered, move |gathered| {
                        dst.fulfill(gathered.fulfilled_outcome());
                    });
                }
            }
        });
        promise.future()
    }
}
