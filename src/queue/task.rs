use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use crossbeam_utils::atomic::AtomicCell;

/// A unique identifier for a task.
#[derive(Eq, PartialEq, Clone, Copy, Hash, Debug)]
pub(crate) struct TaskId(pub(crate) u64);

impl TaskId {
    /// Generates a new `TaskId`.
    pub(crate) fn generate() -> TaskId {
        static COUNTER: AtomicCell<u64> = AtomicCell::new(1);

        let id = COUNTER.fetch_add(1);
        if id > u64::max_value() / 2 {
            std::process::abort();
        }
        TaskId(id)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const TERMINAL: u8 = 1;
const CANCELLED: u8 = 1 << 1;

/// Identity and terminal flags of a task, shared between the queue's table
/// and any handles.
///
/// The core outlives its table entry, so a handle to an already-reaped task
/// still reads accurate flags. Slot reuse cannot alias a stale handle: every
/// lookup compares the table entry's id against the core's.
pub(crate) struct TaskCore {
    pub(crate) id: TaskId,
    pub(crate) slot: usize,
    flags: AtomicU8,
}

impl TaskCore {
    pub(crate) fn new(id: TaskId, slot: usize) -> TaskCore {
        TaskCore {
            id,
            slot,
            flags: AtomicU8::new(0),
        }
    }

    /// Latches the terminal flags. Terminal is permanent; this is never
    /// called twice for the same task.
    pub(crate) fn settle(&self, cancelled: bool) {
        let flags = if cancelled {
            TERMINAL | CANCELLED
        } else {
            TERMINAL
        };
        self.flags.store(flags, Ordering::SeqCst);
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.flags.load(Ordering::SeqCst) & TERMINAL != 0
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.flags.load(Ordering::SeqCst) & CANCELLED != 0
    }
}

impl fmt::Debug for TaskCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCore")
            .field("id", &self.id)
            .field("terminal", &self.is_terminal())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
