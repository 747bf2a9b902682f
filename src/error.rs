//! The crate's error type and outcome alias.

use std::error;
use std::fmt;
use std::sync::Arc;

/// The result of a completed future: a value or an [`Error`].
///
/// `Outcome` is also the return type of fallible transform closures passed
/// to combinators such as [`map`](crate::Future::map).
pub type Outcome<T> = std::result::Result<T, Error>;

/// An error produced or propagated by a future.
///
/// Errors are cheap to clone: the [`Other`](Error::Other) payload is shared
/// behind an `Arc`, so clones of one error compare equal to each other.
#[derive(Clone, Debug)]
pub enum Error {
    /// The future was cancelled before it finished.
    Cancelled,

    /// A `filter_map` transform produced no value.
    FilterMapNone,

    /// An `ensure` predicate rejected an otherwise successful value.
    EnsureFailed,

    /// Positional per-input failures from a fan-in combinator.
    ///
    /// One slot per input future, in input order: `Some(error)` where that
    /// input failed (cancelled inputs read as `Some(Error::Cancelled)`) and
    /// `None` where it succeeded.
    Aggregate(Vec<Option<Error>>),

    /// An error produced by a user-supplied closure.
    Other(Arc<dyn error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an arbitrary error.
    pub fn other(err: impl error::Error + Send + Sync + 'static) -> Error {
        Error::Other(Arc::new(err))
    }

    /// Returns `true` if this is the cancellation error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Returns `true` for an aggregated fan-in failure.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Error::Aggregate(_))
    }

    /// Attempts to view an [`Other`](Error::Other) payload as a concrete
    /// error type.
    pub fn downcast_ref<E: error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Other(err) => err.downcast_ref(),
            _ => None,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::Cancelled, Error::Cancelled) => true,
            (Error::FilterMapNone, Error::FilterMapNone) => true,
            (Error::EnsureFailed, Error::EnsureFailed) => true,
            (Error::Aggregate(a), Error::Aggregate(b)) => a == b,
            (Error::Other(a), Error::Other(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Cancelled => write!(f, "future was cancelled"),
            Error::FilterMapNone => write!(f, "filter_map transform returned no value"),
            Error::EnsureFailed => write!(f, "ensure predicate rejected the value"),
            Error::Aggregate(slots) => {
                let failed = slots.iter().filter(|slot| slot.is_some()).count();
                write!(f, "{} of {} combined futures failed", failed, slots.len())
            }
            Error::Other(err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(&**err),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(message: String) -> Error {
        Error::Other(Arc::new(Message(message)))
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Error {
        Error::from(message.to_string())
    }
}

/// A plain string error, used by the `From` conversions.
#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl error::Error for Message {}
