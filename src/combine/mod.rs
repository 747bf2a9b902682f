//! Fan-in combinators: waiting on several futures at once.
//!
//! All of these resolve through a single task on the global queue whose
//! dependencies are the input futures' underlying tasks, so the reducing
//! closure only ever reads terminal outcomes. Failures are reported
//! positionally through [`Error::Aggregate`]: one slot per input,
//! `Some(err)` where that input failed and `None` where it succeeded.
//! Cancelling the combined future does not cancel the inputs.

use crate::error::{Error, Outcome};
use crate::future::Future;
use crate::promise::promise;
use crate::queue::{Anchor, TaskQueue};

mod collect;
mod race;

pub use collect::collect;
pub use race::race;

/// Combines two futures into a future of their paired success values.
///
/// ```
/// use promissory::{combine, fulfilled};
///
/// let pair = combine(&fulfilled::<u32>(Ok(1)), &fulfilled::<&str>(Ok("two")));
/// assert_eq!(pair.wait(), Ok((1, "two")));
/// ```
pub fn combine<A, B>(a: &Future<A>, b: &Future<B>) -> Future<(A, B)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    let (a, b) = (a.clone(), b.clone());
    fan_in(vec![a.anchor(), b.anchor()], move || {
        match (a.fulfilled_outcome(), b.fulfilled_outcome()) {
            (Ok(a), Ok(b)) => Ok((a, b)),
            (a, b) => Err(Error::Aggregate(vec![a.err(), b.err()])),
        }
    })
}

/// Combines three futures into a future of their success triple.
pub fn combine3<A, B, C>(a: &Future<A>, b: &Future<B>, c: &Future<C>) -> Future<(A, B, C)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
{
    let (a, b, c) = (a.clone(), b.clone(), c.clone());
    fan_in(vec![a.anchor(), b.anchor(), c.anchor()], move || {
        match (a.fulfilled_outcome(), b.fulfilled_outcome(), c.fulfilled_outcome()) {
            (Ok(a), Ok(b), Ok(c)) => Ok((a, b, c)),
            (a, b, c) => Err(Error::Aggregate(vec![a.err(), b.err(), c.err()])),
        }
    })
}

/// Combines four futures into a future of their success quadruple.
pub fn combine4<A, B, C, D>(
    a: &Future<A>,
    b: &Future<B>,
    c: &Future<C>,
    d: &Future<D>,
) -> Future<(A, B, C, D)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    D: Clone + Send + 'static,
{
    let (a, b, c, d) = (a.clone(), b.clone(), c.clone(), d.clone());
    fan_in(vec![a.anchor(), b.anchor(), c.anchor(), d.anchor()], move || {
        let outcomes = (
            a.fulfilled_outcome(),
            b.fulfilled_outcome(),
            c.fulfilled_outcome(),
            d.fulfilled_outcome(),
        );
        match outcomes {
            (Ok(a), Ok(b), Ok(c), Ok(d)) => Ok((a, b, c, d)),
            (a, b, c, d) => Err(Error::Aggregate(vec![a.err(), b.err(), c.err(), d.err()])),
        }
    })
}

/// Resolves `reduce()` once every anchored task is terminal.
fn fan_in<T, F>(anchors: Vec<Anchor>, reduce: F) -> Future<T>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Outcome<T> + Send + 'static,
{
    let promise = promise();
    let dst = promise.clone();
    TaskQueue::global().submit_after(
        anchors,
        Box::new(move || {
            if dst.is_cancelled() {
                return;
            }
            dst.fulfill(reduce());
        }),
    );
    promise.future()
}
