//! The timer thread behind the `delay` combinator.
//!
//! One dedicated thread owns a min-heap of deadlines and parks until the
//! earliest one. Actions fire no earlier than their deadline. There is no
//! cancellation here: a delayed fulfillment that lost to a cancel is dropped
//! by the destination promise's own fulfillment guard.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_utils::sync::{Parker, Unparker};
use once_cell::sync::Lazy;

use crate::utils::abort_on_panic;

type Action = Box<dyn FnOnce() + Send>;

struct Deadline {
    at: Instant,
    seq: u64,
    action: Action,
}

// Ordered by deadline, earliest first; `seq` keeps equal deadlines stable.
impl Ord for Deadline {
    fn cmp(&self, other: &Deadline) -> Ordering {
        other.at.cmp(&self.at).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Deadline {
    fn partial_cmp(&self, other: &Deadline) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Deadline {
    fn eq(&self, other: &Deadline) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Deadline {}

struct TimerState {
    deadlines: BinaryHeap<Deadline>,
    seq: u64,
}

struct Timer {
    state: Mutex<TimerState>,
    unparker: Unparker,
}

static TIMER: Lazy<Timer> = Lazy::new(|| {
    let parker = Parker::new();
    let unparker = parker.unparker().clone();

    thread::Builder::new()
        .name("promissory/timer".to_string())
        .spawn(move || abort_on_panic(|| timer_loop(parker)))
        .expect("cannot start the timer thread");

    Timer {
        state: Mutex::new(TimerState {
            deadlines: BinaryHeap::new(),
            seq: 0,
        }),
        unparker,
    }
});

/// Runs `action` once, no earlier than `dur` from now.
pub(crate) fn after(dur: Duration, action: impl FnOnce() + Send + 'static) {
    let timer = &*TIMER;
    {
        let mut state = timer.state.lock().unwrap();
        let seq = state.seq;
        state.seq += 1;
        state.deadlines.push(Deadline {
            at: Instant::now() + dur,
            seq,
            action: Box::new(action),
        });
    }
    timer.unparker.unpark();
}

fn timer_loop(parker: Parker) {
    loop {
        let mut due: Vec<Action> = Vec::new();
        let next = {
            let mut state = TIMER.state.lock().unwrap();
            let now = Instant::now();
            while state
                .deadlines
                .peek()
                .map_or(false, |deadline| deadline.at <= now)
            {
                if let Some(deadline) = state.deadlines.pop() {
                    due.push(deadline.action);
                }
            }
            state.deadlines.peek().map(|deadline| deadline.at)
        };

        for action in due {
            action();
        }

        match next {
            Some(at) => {
                let now = Instant::now();
                if at > now {
                    parker.park_timeout(at - now);
                }
            }
            None => parker.park(),
        }
    }
}
