//! Dependency-aware task queues.
//!
//! A [`TaskQueue`] owns a table of tasks and a dynamically sized pool of
//! named worker threads fed over an unbuffered channel. A task runs only
//! once all of its dependency tasks have reached a terminal state.
//! Promise-backed tasks ("anchors") never run at all: they exist purely as
//! dependency targets until the promise's state machine reports them
//! terminal.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use kv_log_macro::trace;
use log::log_enabled;
use once_cell::sync::Lazy;
use slab::Slab;

use crate::future::Future;
use crate::utils::{abort_on_panic, random};

mod task;

pub(crate) use task::TaskCore;
use task::TaskId;

/// The process-wide default queue, initialized on first use.
static GLOBAL: Lazy<TaskQueue> = Lazy::new(|| TaskQueue::new("promissory/global"));

/// The serial lane used to arbitrate race winners.
static ARBITRATION: Lazy<TaskQueue> =
    Lazy::new(|| TaskQueue::with_concurrency("promissory/race", 1));

/// Returns the process-wide serial arbitration lane.
pub(crate) fn arbitration() -> &'static TaskQueue {
    &ARBITRATION
}

pub(crate) type Job = Box<dyn FnOnce() + Send>;
type Watcher = Box<dyn FnOnce() + Send>;

/// A task's registration on some queue: what a continuation depends on.
#[derive(Clone)]
pub(crate) struct Anchor {
    pub(crate) queue: TaskQueue,
    pub(crate) core: Arc<TaskCore>,
}

/// A named task queue with a concurrency cap and dependency edges.
///
/// Cloning a `TaskQueue` yields another handle to the same queue.
///
/// # Examples
///
/// ```
/// use promissory::TaskQueue;
///
/// let queue = TaskQueue::with_concurrency("docs/queue", 2);
/// let task = queue.submit(|| {});
/// while !task.is_finished() {
///     std::thread::yield_now();
/// }
/// ```
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    concurrency: usize,
    sender: Sender<Work>,
    receiver: Receiver<Work>,
    state: Mutex<State>,
}

struct State {
    tasks: Slab<Entry>,
    runnable: VecDeque<(usize, TaskId)>,
    running: usize,
}

struct Entry {
    core: Arc<TaskCore>,
    job: Option<Job>,
    deps_remaining: usize,
    watchers: Vec<Watcher>,
    /// `true` for ordinary jobs, which are terminal once they return.
    /// Anchors and blocking tasks turn terminal through their promise.
    finishes_on_return: bool,
    running: bool,
    cancelled: bool,
}

/// A job handed to a worker thread.
struct Work {
    slot: usize,
    core: Arc<TaskCore>,
    job: Job,
    finishes_on_return: bool,
}

impl TaskQueue {
    /// Creates a queue running up to one task per CPU.
    pub fn new(name: &str) -> TaskQueue {
        TaskQueue::with_concurrency(name, num_cpus::get().max(1))
    }

    /// Creates a queue running at most `concurrency` tasks at once.
    ///
    /// `concurrency = 1` gives a serial lane.
    pub fn with_concurrency(name: &str, concurrency: usize) -> TaskQueue {
        assert!(concurrency > 0, "queue concurrency must be at least 1");
        let (sender, receiver) = bounded(0);
        TaskQueue {
            inner: Arc::new(Inner {
                name: name.to_string(),
                concurrency,
                sender,
                receiver,
                state: Mutex::new(State {
                    tasks: Slab::new(),
                    runnable: VecDeque::new(),
                    running: 0,
                }),
            }),
        }
    }

    /// Returns the process-wide default queue.
    ///
    /// Promises and combinators target this queue unless an explicit one is
    /// supplied per call.
    pub fn global() -> &'static TaskQueue {
        &GLOBAL
    }

    /// The queue's name, used to label its worker threads.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The queue's concurrency cap.
    pub fn concurrency(&self) -> usize {
        self.inner.concurrency
    }

    /// Submits an independent task. It runs as soon as a lane is free.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> TaskHandle {
        self.insert(Some(Box::new(job)), Vec::new(), true, false)
    }

    /// Submits a task that runs `handler` exactly once, after `future` has
    /// reached a terminal state.
    ///
    /// The handler observes a terminal outcome: it runs even when the future
    /// was cancelled rather than finished, and never before either. Its
    /// handle on the source future is released as soon as it has run.
    pub fn on_completion_of<T, F>(&self, future: &Future<T>, handler: F) -> TaskHandle
    where
        T: Send + 'static,
        F: FnOnce(&Future<T>) + Send + 'static,
    {
        let source = future.clone();
        self.submit_after(vec![future.anchor()], Box::new(move || handler(&source)))
    }

    /// Submits a task that runs only after every dependency is terminal.
    /// Dependencies already reaped count as satisfied.
    pub(crate) fn submit_after(&self, deps: Vec<Anchor>, job: Job) -> TaskHandle {
        self.insert(Some(job), deps, true, false)
    }

    /// Registers a task that never runs; it turns terminal when the promise
    /// bound to it does.
    pub(crate) fn register_anchor(&self) -> Arc<TaskCore> {
        self.insert(None, Vec::new(), false, false).core
    }

    /// Submits a blocking-variant job, held back until
    /// [`release_hold`](TaskQueue::release_hold). The task stays alive past
    /// the job's return, until its promise turns terminal.
    pub(crate) fn submit_held(&self, job: Job) -> TaskHandle {
        self.insert(Some(job), Vec::new(), false, true)
    }

    pub(crate) fn release_hold(&self, handle: &TaskHandle) {
        self.release_dependency(&handle.core);
    }

    fn insert(
        &self,
        job: Option<Job>,
        deps: Vec<Anchor>,
        finishes_on_return: bool,
        held: bool,
    ) -> TaskHandle {
        let id = TaskId::generate();
        let deps_remaining = deps.len() + held as usize;
        let runnable_now = job.is_some() && deps_remaining == 0;

        let core = {
            let mut state = self.inner.state.lock().unwrap();
            let vacant = state.tasks.vacant_entry();
            let slot = vacant.key();
            let core = Arc::new(TaskCore::new(id, slot));
            vacant.insert(Entry {
                core: core.clone(),
                job,
                deps_remaining,
                watchers: Vec::new(),
                finishes_on_return,
                running: false,
                cancelled: false,
            });
            if runnable_now {
                state.runnable.push_back((slot, id));
            }
            core
        };

        if log_enabled!(log::Level::Trace) {
            trace!("task submitted", { task_id: id.0, queue: self.name() });
        }

        for dep in deps {
            let watcher: Watcher = {
                let queue = self.clone();
                let core = core.clone();
                Box::new(move || queue.release_dependency(&core))
            };
            dep.queue.on_terminal(&dep.core, watcher);
        }

        if runnable_now {
            self.tick();
        }
        TaskHandle {
            queue: self.clone(),
            core,
        }
    }

    /// Runs `watcher` once the given task is terminal; immediately if it
    /// already is.
    pub(crate) fn on_terminal(&self, core: &Arc<TaskCore>, watcher: Watcher) {
        let run_now = {
            let mut state = self.inner.state.lock().unwrap();
            match state.tasks.get_mut(core.slot) {
                Some(entry) if entry.core.id == core.id => {
                    entry.watchers.push(watcher);
                    None
                }
                _ => Some(watcher),
            }
        };
        if let Some(watcher) = run_now {
            watcher();
        }
    }

    fn release_dependency(&self, core: &Arc<TaskCore>) {
        let became_runnable = {
            let mut state = self.inner.state.lock().unwrap();
            let state = &mut *state;
            match state.tasks.get_mut(core.slot) {
                Some(entry) if entry.core.id == core.id => {
                    entry.deps_remaining -= 1;
                    if entry.deps_remaining == 0 && entry.job.is_some() {
                        state.runnable.push_back((core.slot, core.id));
                        true
                    } else {
                        false
                    }
                }
                _ => false,
            }
        };
        if became_runnable {
            self.tick();
        }
    }

    /// Marks a task terminal on behalf of its promise. Idempotent: late or
    /// repeated notifications find the entry gone and return.
    pub(crate) fn mark_terminal(&self, core: &Arc<TaskCore>, cancelled: bool) {
        let watchers = {
            let mut state = self.inner.state.lock().unwrap();
            let matches = state
                .tasks
                .get(core.slot)
                .map_or(false, |entry| entry.core.id == core.id);
            if !matches {
                return;
            }
            let entry = state.tasks.remove(core.slot);
            core.settle(cancelled);
            entry.watchers
        };

        if log_enabled!(log::Level::Trace) {
            trace!("task finished", {
                task_id: core.id.0,
                queue: self.name(),
                cancelled: cancelled,
            });
        }

        for watcher in watchers {
            watcher();
        }
        self.tick();
    }

    /// Dispatches runnable tasks while lanes are free.
    fn tick(&self) {
        loop {
            let work = {
                let mut state = self.inner.state.lock().unwrap();
                if state.running >= self.inner.concurrency {
                    return;
                }
                let (slot, id) = match state.runnable.pop_front() {
                    Some(pair) => pair,
                    None => return,
                };
                let state = &mut *state;
                let entry = match state.tasks.get_mut(slot) {
                    Some(entry) if entry.core.id == id => entry,
                    // The task was cancelled or reaped while queued.
                    _ => continue,
                };
                let job = match entry.job.take() {
                    Some(job) => job,
                    None => continue,
                };
                entry.running = true;
                let core = entry.core.clone();
                let finishes_on_return = entry.finishes_on_return;
                state.running += 1;
                Work {
                    slot,
                    core,
                    job,
                    finishes_on_return,
                }
            };

            if log_enabled!(log::Level::Trace) {
                trace!("task running", { task_id: work.core.id.0, queue: self.name() });
            }
            self.dispatch(work);
        }
    }

    /// Hands work to the pool. The channel is unbuffered: if no worker is
    /// free to take the job right now, spin one up and hand it over.
    fn dispatch(&self, work: Work) {
        if let Err(err) = self.inner.sender.try_send(work) {
            self.spawn_worker();
            self.inner.sender.send(err.into_inner()).unwrap();
        }
    }

    fn spawn_worker(&self) {
        let queue = self.clone();
        thread::Builder::new()
            .name(format!("{}/worker", self.inner.name))
            .spawn(move || {
                // Stagger idle retirement so workers don't all exit at once.
                let wait_limit = Duration::from_millis(1000 + u64::from(random(10_000)));

                while let Ok(work) = queue.inner.receiver.recv_timeout(wait_limit) {
                    let Work {
                        slot,
                        core,
                        job,
                        finishes_on_return,
                    } = work;
                    abort_on_panic(job);
                    queue.task_returned(slot, &core, finishes_on_return);
                }
            })
            .expect("cannot start a worker thread");
    }

    /// Bookkeeping after a job returns: the lane frees up, and ordinary
    /// tasks turn terminal. Blocking tasks stay in the table until their
    /// promise settles them.
    fn task_returned(&self, slot: usize, core: &Arc<TaskCore>, finishes_on_return: bool) {
        let watchers = {
            let mut state = self.inner.state.lock().unwrap();
            state.running -= 1;
            let matches = state
                .tasks
                .get(slot)
                .map_or(false, |entry| entry.core.id == core.id);
            if !matches {
                Vec::new()
            } else if finishes_on_return {
                let entry = state.tasks.remove(slot);
                core.settle(entry.cancelled);
                entry.watchers
            } else {
                if let Some(entry) = state.tasks.get_mut(slot) {
                    entry.running = false;
                }
                Vec::new()
            }
        };

        if finishes_on_return && log_enabled!(log::Level::Trace) {
            trace!("task finished", {
                task_id: core.id.0,
                queue: self.name(),
                cancelled: core.is_cancelled(),
            });
        }

        for watcher in watchers {
            watcher();
        }
        self.tick();
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("name", &self.inner.name)
            .field("concurrency", &self.inner.concurrency)
            .finish()
    }
}

/// A handle to a submitted task.
///
/// The handle observes the task's lifecycle and can request cooperative
/// cancellation; dropping it does not affect the task.
#[derive(Clone)]
pub struct TaskHandle {
    queue: TaskQueue,
    pub(crate) core: Arc<TaskCore>,
}

impl TaskHandle {
    /// Requests cooperative cancellation.
    ///
    /// A task that has not started yet will never run its job. A task
    /// already running is left to finish and is recorded as cancelled
    /// afterwards.
    pub fn cancel(&self) {
        let watchers = {
            let mut state = self.queue.inner.state.lock().unwrap();
            let matches = state
                .tasks
                .get(self.core.slot)
                .map_or(false, |entry| entry.core.id == self.core.id);
            if !matches {
                return;
            }
            if state.tasks[self.core.slot].running {
                state.tasks[self.core.slot].cancelled = true;
                Vec::new()
            } else {
                let entry = state.tasks.remove(self.core.slot);
                self.core.settle(true);
                entry.watchers
            }
        };

        if log_enabled!(log::Level::Trace) {
            trace!("task cancelled", { task_id: self.core.id.0, queue: self.queue.name() });
        }

        for watcher in watchers {
            watcher();
        }
        self.queue.tick();
    }

    /// `true` once the task is terminal, whether it ran to completion, was
    /// fulfilled, or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.core.is_terminal()
    }

    /// `true` if the task was cancelled before completing.
    pub fn is_cancelled(&self) -> bool {
        self.core.is_cancelled()
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("task_id", &self.core.id)
            .field("queue", &self.queue.name())
            .finish()
    }
}
