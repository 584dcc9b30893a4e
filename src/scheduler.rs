use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{AbortHandle, Abortable};
use futures::task::{Spawn, SpawnExt};
use futures_timer::Delay;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

pub type SharedScheduler = Arc<dyn Scheduler>;

/// Runs a callback once after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

impl<S> Scheduler for Arc<S>
where
    S: Scheduler + ?Sized,
{
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        (**self).schedule(delay, task)
    }
}

/// Cancels a scheduled callback. Dropping the handle leaves the callback
/// scheduled.
#[derive(Clone, Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    fn pair() -> (Self, futures::future::AbortRegistration) {
        let (abort, registration) = AbortHandle::new_pair();
        (Self { abort }, registration)
    }

    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort.is_aborted()
    }
}

#[derive(Clone, Debug, Default)]
pub struct TimerGroup {
    handles: Vec<TimerHandle>,
}

impl TimerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: TimerHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn cancel_all(&self) {
        for handle in &self.handles {
            handle.cancel();
        }
    }
}

impl Extend<TimerHandle> for TimerGroup {
    fn extend<I: IntoIterator<Item = TimerHandle>>(&mut self, iter: I) {
        self.handles.extend(iter);
    }
}

/// Wall-clock scheduler on top of any `futures` spawner.
#[derive(Clone)]
pub struct SpawnScheduler<S> {
    spawner: S,
}

impl<S> SpawnScheduler<S>
where
    S: Spawn + Send + Sync,
{
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }
}

impl<S> Scheduler for SpawnScheduler<S>
where
    S: Spawn + Send + Sync,
{
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let (handle, registration) = TimerHandle::pair();
        let timer = Abortable::new(
            async move {
                Delay::new(delay).await;
                task();
            },
            registration,
        );
        if let Err(error) = self.spawner.spawn(async move {
            if timer.await.is_err() {
                tracing::trace!("scheduled task cancelled");
            }
        }) {
            tracing::warn!(%error, "failed to spawn scheduled task");
            handle.cancel();
        }
        handle
    }
}

struct ManualEntry {
    abort: TimerHandle,
    task: Task,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), ManualEntry>,
}

/// Virtual-clock scheduler. Time only moves through [`ManualScheduler::advance`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.lock().now
    }

    pub fn pending(&self) -> usize {
        self.lock()
            .queue
            .values()
            .filter(|entry| !entry.abort.is_cancelled())
            .count()
    }

    /// Moves the clock forward, running every task that falls due on the way
    /// in due-time order. Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now.saturating_add(by);
        let mut ran = 0;
        loop {
            let entry = {
                let mut state = self.lock();
                let due = match state.queue.first_key_value() {
                    Some((&(due, _), _)) if due <= target => due,
                    _ => break,
                };
                state.now = due;
                state.queue.pop_first().map(|(_, entry)| entry)
            };
            let Some(entry) = entry else {
                break;
            };
            if entry.abort.is_cancelled() {
                continue;
            }
            (entry.task)();
            ran += 1;
        }
        self.lock().now = target;
        ran
    }

    /// Advances until no live task is left.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next_due = {
                let state = self.lock();
                state
                    .queue
                    .iter()
                    .find(|(_, entry)| !entry.abort.is_cancelled())
                    .map(|(&(due, _), _)| due.saturating_sub(state.now))
            };
            match next_due {
                Some(wait) => ran += self.advance(wait),
                None => return ran,
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let (handle, _registration) = TimerHandle::pair();
        let mut state = self.lock();
        let due = state.now.saturating_add(delay);
        let seq = state.next_seq;
        state.next_seq += 1;
        state.queue.insert(
            (due, seq),
            ManualEntry {
                abort: handle.clone(),
                task,
            },
        );
        handle
    }
}

/// Runs only the last of a burst of calls, `wait` after it was made.
pub struct Debouncer {
    scheduler: SharedScheduler,
    wait: Duration,
    pending: Mutex<Option<TimerHandle>>,
}

impl Debouncer {
    pub fn new(scheduler: SharedScheduler, wait: Duration) -> Self {
        Self {
            scheduler,
            wait,
            pending: Mutex::new(None),
        }
    }

    pub fn call(&self, task: impl FnOnce() + Send + 'static) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
        *pending = Some(self.scheduler.schedule(self.wait, Box::new(task)));
    }

    pub fn cancel(&self) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
    }
}

/// Lets one call through per `limit` window and drops the rest.
pub struct Throttle {
    scheduler: SharedScheduler,
    limit: Duration,
    throttled: Arc<AtomicBool>,
}

impl Throttle {
    pub fn new(scheduler: SharedScheduler, limit: Duration) -> Self {
        Self {
            scheduler,
            limit,
            throttled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn try_run(&self, action: impl FnOnce()) -> bool {
        if self.throttled.swap(true, Ordering::SeqCst) {
            return false;
        }
        action();
        let throttled = self.throttled.clone();
        let _ = self.scheduler.schedule(
            self.limit,
            Box::new(move || throttled.store(false, Ordering::SeqCst)),
        );
        true
    }

    pub fn is_throttled(&self) -> bool {
        self.throttled.load(Ordering::SeqCst)
    }
}
