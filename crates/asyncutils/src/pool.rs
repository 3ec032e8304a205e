use crate::error::{ErrorKind, Result};
use futures::channel::oneshot;
use futures::future::BoxFuture;
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;

/// How often [`TaskPool::await_idle`] re-checks the pool state.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A queued task, type-erased so tasks with different outputs can share one
/// queue.
trait Pending: Send {
    /// Consume the task and produce the future that runs it to completion and
    /// delivers its output to the waiting [`TaskHandle`].
    fn start(self: Box<Self>) -> BoxFuture<'static, ()>;

    /// Consume the task without running it, delivering `kind` instead.
    fn reject(self: Box<Self>, kind: ErrorKind);
}

struct Queued<F, T> {
    task: F,
    tx: oneshot::Sender<Result<T>>,
}

impl<F, Fut, T> Pending for Queued<F, T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    fn start(self: Box<Self>) -> BoxFuture<'static, ()> {
        let Queued { task, tx } = *self;
        Box::pin(async move {
            let output = task().await;
            // The handle may have been dropped; nobody is waiting for the output.
            _ = tx.send(Ok(output));
        })
    }

    fn reject(self: Box<Self>, kind: ErrorKind) {
        _ = self.tx.send(Err(exn::Exn::from(kind)));
    }
}

#[derive(Default)]
struct State {
    queue: VecDeque<Box<dyn Pending>>,
    running: usize,
}

struct Inner {
    max: usize,
    state: Mutex<State>,
}
impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        // Nothing inside the lock can panic half-way through an update, so a
        // poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Greedily admit queued tasks until either the queue is empty or every
    /// slot is taken.
    fn pump(this: &Arc<Self>) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("No Tokio runtime available; queued tasks stay queued");
            return;
        };
        loop {
            let next = {
                let mut state = this.lock();
                if state.running >= this.max {
                    return;
                }
                let Some(next) = state.queue.pop_front() else {
                    return;
                };
                state.running += 1;
                next
            };
            let slot = Slot { pool: Arc::clone(this) };
            let task = next.start();
            runtime.spawn(async move {
                // Held across the await so the slot is released even if the
                // task panics or is cancelled.
                let _slot = slot;
                task.await;
            });
        }
    }
}

/// A claimed concurrency slot. Dropping it frees the slot and immediately
/// offers it to the next queued task.
struct Slot {
    pool: Arc<Inner>,
}
impl Drop for Slot {
    fn drop(&mut self) {
        {
            let mut state = self.pool.lock();
            state.running = state.running.saturating_sub(1);
        }
        Inner::pump(&self.pool);
    }
}

/// Bounded-concurrency async task scheduler.
///
/// Tasks are admitted in submission (FIFO) order whenever fewer than
/// [`max_concurrency`](Self::max_concurrency) of them are running; a finished
/// task's slot goes straight to the head of the queue. Completion order is
/// whatever the tasks themselves make it.
///
/// Admitted tasks are spawned onto the ambient Tokio runtime. Submitting from
/// outside a runtime queues the task until a later submission (or a finishing
/// task) from inside one pumps the queue.
///
/// Cloning a pool is cheap and every clone shares the same queue and slots.
///
/// # Examples
///
/// ```
/// use notemover_asyncutils::TaskPool;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pool = TaskPool::new(2);
/// let handles: Vec<_> = (0..5).map(|n| pool.submit(move || async move { n * 2 })).collect();
/// let results = futures::future::join_all(handles).await;
/// assert_eq!(results.into_iter().map(Result::unwrap).sum::<i32>(), 20);
/// pool.await_idle().await;
/// # }
/// ```
#[derive(Clone)]
pub struct TaskPool {
    inner: Arc<Inner>,
}
impl TaskPool {
    /// Create a pool that runs at most `max_concurrency` tasks at once.
    ///
    /// A limit of zero is treated as one.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                max: max_concurrency.max(1),
                state: Mutex::new(State::default()),
            }),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.inner.max
    }

    /// Enqueue a task and start it as soon as a slot is free.
    ///
    /// The returned [`TaskHandle`] resolves to whatever the task's future
    /// returns (fallible tasks hand back their own `Result` untouched), or to
    /// a pool error if the task was reset out of the queue or abandoned.
    pub fn submit<F, Fut, T>(&self, task: F) -> TaskHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().queue.push_back(Box::new(Queued { task, tx }));
        Inner::pump(&self.inner);
        TaskHandle { rx }
    }

    /// Empty the queue, rejecting every task that has not started yet with
    /// [`ErrorKind::Reset`]. Running tasks are left alone and still resolve on
    /// their own.
    ///
    /// Returns the number of rejected tasks.
    pub fn drain_and_reject(&self) -> usize {
        let drained: Vec<_> = self.inner.lock().queue.drain(..).collect();
        let count = drained.len();
        for pending in drained {
            pending.reject(ErrorKind::Reset);
        }
        if count > 0 {
            tracing::debug!(count, "Rejected queued tasks on pool reset");
        }
        count
    }

    /// Wait until nothing is running and nothing is queued.
    ///
    /// Polls every [`IDLE_POLL_INTERVAL`] rather than waiting on a wakeup.
    pub async fn await_idle(&self) {
        while !self.is_idle() {
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
    }

    pub fn is_idle(&self) -> bool {
        let state = self.inner.lock();
        state.running == 0 && state.queue.is_empty()
    }

    /// Number of tasks currently holding a slot.
    pub fn running_count(&self) -> usize {
        self.inner.lock().running
    }

    /// Number of tasks waiting for a slot.
    pub fn queue_len(&self) -> usize {
        self.inner.lock().queue.len()
    }
}

pin_project! {
    /// Resolves with the output of a task submitted to a [`TaskPool`].
    ///
    /// Dropping the handle does not cancel the task.
    #[must_use = "dropping a task handle discards the task's output"]
    pub struct TaskHandle<T> {
        #[pin]
        rx: oneshot::Receiver<Result<T>>,
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project().rx.poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // Sender dropped without a value: the task never finished.
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(exn::Exn::from(ErrorKind::Abandoned))),
            Poll::Pending => Poll::Pending,
        }
    }
}
