use crate::error::Error;
use crate::future::Future;

use super::fan_in;

/// Collects a homogeneous set of futures into a future of all success
/// values, in input order.
///
/// If any input fails, the result is an [`Error::Aggregate`] with one slot
/// per input. An empty input resolves immediately to `Ok(vec![])`.
///
/// ```
/// use promissory::{collect, fulfilled};
///
/// let all = collect(vec![fulfilled::<u32>(Ok(1)), fulfilled::<u32>(Ok(2))]);
/// assert_eq!(all.wait(), Ok(vec![1, 2]));
/// ```
pub fn collect<T: Clone + Send + 'static>(futures: Vec<Future<T>>) -> Future<Vec<T>> {
    let anchors = futures.iter().map(|f| f.anchor()).collect();
    fan_in(anchors, move || {
        let gathered: Result<Vec<T>, Error> = futures
            .iter()
            .map(|future| future.fulfilled_outcome())
            .collect();
        match gathered {
            Ok(values) => Ok(values),
            Err(_) => Err(Error::Aggregate(
                futures
                    .iter()
                    .map(|future| future.fulfilled_outcome().err())
                    .collect(),
            )),
        }
    })
}
