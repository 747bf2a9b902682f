//! Thread-based futures and promises with dependency-aware task queues.
//!
//! A [`Promise`] is the write-once handle a producer fulfills; its
//! [`Future`] is the read side consumers clone, inspect, block on, and
//! chain combinators off. Every future is registered as a task on a
//! [`TaskQueue`]; continuations are tasks that depend on their source's
//! task and only run once it is terminal, so a combinator closure always
//! observes a settled outcome.
//!
//! ```
//! use promissory::{promise, Error};
//!
//! let order = promise::<u32>();
//! let label = order
//!     .future()
//!     .map(|id| Ok(format!("order #{}", id)))
//!     .recover(|_: Error| Ok("no order".to_string()));
//!
//! order.succeed(17);
//! assert_eq!(label.wait(), Ok("order #17".to_string()));
//! ```
//!
//! Fan-in lives at the crate root: [`combine`], [`combine3`],
//! [`combine4`], [`collect`], and [`race`]. [`blocking_on`] runs a
//! blocking closure as a queue task and hands it a promise to fulfill.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod blocking;
mod combine;
mod error;
mod future;
mod promise;
mod queue;
mod state;
mod timer;
mod utils;

pub use crate::blocking::blocking_on;
pub use crate::combine::{collect, combine, combine3, combine4, race};
pub use crate::error::{Error, Outcome};
pub use crate::future::Future;
pub use crate::promise::{fulfilled, fulfilled_on, promise, promise_on, Promise};
pub use crate::queue::{TaskHandle, TaskQueue};
