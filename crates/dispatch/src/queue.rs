use log::{debug, warn};
use priceguard_core::{Priority, ProviderId};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};

use crate::error::{DispatchError, Result};
use crate::limiter::RateLimiter;

/// Submission sequence number; doubles as the FIFO tie-breaker
pub type TaskId = u64;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;
type Operation<T> = Box<dyn FnOnce() -> BoxFuture<T> + Send + 'static>;

/// Per-task scheduling options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskOptions {
    pub priority: Priority,
    /// Maximum time the task may wait before it starts running
    pub timeout: Option<Duration>,
}

impl TaskOptions {
    pub fn new(priority: Priority) -> Self {
        Self {
            priority,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Counters for one queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub submitted: u64,
    pub executed: u64,
    pub cancelled: u64,
    pub timed_out: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    submitted: AtomicU64,
    executed: AtomicU64,
    cancelled: AtomicU64,
    timed_out: AtomicU64,
}

impl StatCounters {
    fn snapshot(&self) -> QueueStats {
        QueueStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
        }
    }
}

/// Type-erased queued operation with its reply channel
trait ErasedJob: Send {
    /// The caller stopped waiting for the result
    fn is_abandoned(&self) -> bool;
    fn fail(self: Box<Self>, error: DispatchError);
    fn run(self: Box<Self>) -> BoxFuture<()>;
}

struct Job<T> {
    op: Operation<T>,
    reply: oneshot::Sender<Result<T>>,
}

impl<T: Send + 'static> ErasedJob for Job<T> {
    fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }

    fn fail(self: Box<Self>, error: DispatchError) {
        let _ = self.reply.send(Err(error));
    }

    fn run(self: Box<Self>) -> BoxFuture<()> {
        let Job { op, reply } = *self;
        Box::pin(async move {
            let output = op().await;
            let _ = reply.send(Ok(output));
        })
    }
}

enum Command {
    Submit {
        id: TaskId,
        priority: Priority,
        deadline: Option<Instant>,
        job: Box<dyn ErasedJob>,
    },
    Cancel(TaskId),
}

/// Handle to the single worker serving one provider
///
/// Cheap to clone; every clone feeds the same worker.
#[derive(Clone)]
pub struct RequestQueue {
    provider: ProviderId,
    commands: mpsc::UnboundedSender<Command>,
    next_id: Arc<AtomicU64>,
    stats: Arc<StatCounters>,
}

impl RequestQueue {
    /// Start the worker for the limiter's provider
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(limiter: RateLimiter) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats = Arc::new(StatCounters::default());
        let provider = limiter.provider();

        let worker = Worker {
            provider,
            limiter,
            commands: rx,
            closed: false,
            queue: PriorityQueue::new(),
            jobs: HashMap::new(),
            deadlines: BTreeSet::new(),
            stats: Arc::clone(&stats),
        };
        tokio::spawn(worker.run());

        Self {
            provider,
            commands: tx,
            next_id: Arc::new(AtomicU64::new(0)),
            stats,
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    /// Enqueue an operation; it runs once it is the highest pending task and
    /// the limiter grants a slot
    pub fn submit<F, Fut, T>(&self, options: TaskOptions, op: F) -> TaskHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, receiver) = oneshot::channel();
        let op: Operation<T> = Box::new(move || Box::pin(op()));
        let deadline = options.timeout.map(|timeout| Instant::now() + timeout);

        let command = Command::Submit {
            id,
            priority: options.priority,
            deadline,
            job: Box::new(Job { op, reply }),
        };
        if self.commands.send(command).is_err() {
            // Worker gone: the dropped reply sender resolves the handle
            warn!("{} queue closed, task {} rejected", self.provider, id);
        } else {
            self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        }

        TaskHandle {
            id,
            reply: receiver,
            commands: self.commands.clone(),
            finished: false,
        }
    }

    pub fn stats(&self) -> QueueStats {
        self.stats.snapshot()
    }
}

/// Awaitable result of a submitted task
///
/// Dropping the handle before completion cancels the task if it has not
/// started yet.
pub struct TaskHandle<T> {
    id: TaskId,
    reply: oneshot::Receiver<Result<T>>,
    commands: mpsc::UnboundedSender<Command>,
    finished: bool,
}

impl<T> TaskHandle<T> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Remove the task if it is still pending; the handle then resolves to
    /// `DispatchError::Cancelled`. A task already running is left alone.
    pub fn cancel(&self) {
        let _ = self.commands.send(Command::Cancel(self.id));
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.reply).poll(cx) {
            Poll::Ready(result) => {
                this.finished = true;
                Poll::Ready(result.unwrap_or(Err(DispatchError::QueueClosed)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for TaskHandle<T> {
    fn drop(&mut self) {
        if !self.finished {
            self.cancel();
        }
    }
}

struct Worker {
    provider: ProviderId,
    limiter: RateLimiter,
    commands: mpsc::UnboundedReceiver<Command>,
    /// Every sender is gone; finish what is pending, then exit
    closed: bool,
    /// Highest priority first, then lowest sequence number
    queue: PriorityQueue<TaskId, (Priority, Reverse<TaskId>)>,
    jobs: HashMap<TaskId, Box<dyn ErasedJob>>,
    deadlines: BTreeSet<(Instant, TaskId)>,
    stats: Arc<StatCounters>,
}

impl Worker {
    async fn run(mut self) {
        debug!("{} queue worker started", self.provider);
        loop {
            if self.jobs.is_empty() {
                if self.closed {
                    break;
                }
                match self.commands.recv().await {
                    Some(command) => self.apply(command),
                    None => self.closed = true,
                }
                continue;
            }

            let next_deadline = self.deadlines.first().map(|(at, _)| *at);
            tokio::select! {
                biased;

                command = self.commands.recv(), if !self.closed => match command {
                    Some(command) => self.apply(command),
                    None => self.closed = true,
                },
                _ = sleep_until_deadline(next_deadline) => self.expire(Instant::now()),
                grant = self.limiter.acquire() => {
                    while let Ok(command) = self.commands.try_recv() {
                        self.apply(command);
                    }
                    self.expire(Instant::now());

                    match self.pop_next() {
                        Some((id, job)) => {
                            debug!("{} running task {}", self.provider, id);
                            self.stats.executed.fetch_add(1, Ordering::Relaxed);
                            self.drive(job.run()).await;
                        }
                        None => grant.release().await,
                    }
                }
            }
        }
        debug!("{} queue worker stopped", self.provider);
    }

    /// Run one operation to completion while still serving commands and
    /// deadlines of the tasks behind it
    async fn drive(&mut self, mut running: BoxFuture<()>) {
        loop {
            let next_deadline = self.deadlines.first().map(|(at, _)| *at);
            tokio::select! {
                biased;

                _ = &mut running => break,
                command = self.commands.recv(), if !self.closed => match command {
                    Some(command) => self.apply(command),
                    None => self.closed = true,
                },
                _ = sleep_until_deadline(next_deadline) => self.expire(Instant::now()),
            }
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Submit {
                id,
                priority,
                deadline,
                job,
            } => {
                debug!("{} queued task {} at {:?}", self.provider, id, priority);
                self.queue.push(id, (priority, Reverse(id)));
                if let Some(at) = deadline {
                    self.deadlines.insert((at, id));
                }
                self.jobs.insert(id, job);
            }
            Command::Cancel(id) => {
                if let Some(job) = self.remove(id) {
                    debug!("{} cancelled task {}", self.provider, id);
                    self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
                    job.fail(DispatchError::Cancelled);
                }
            }
        }
    }

    fn remove(&mut self, id: TaskId) -> Option<Box<dyn ErasedJob>> {
        self.queue.remove(&id);
        self.deadlines.retain(|(_, task)| *task != id);
        self.jobs.remove(&id)
    }

    /// Resolve every pending task whose deadline is at or before `now`
    fn expire(&mut self, now: Instant) {
        while let Some(&(at, id)) = self.deadlines.first() {
            if at > now {
                break;
            }
            self.deadlines.pop_first();
            self.queue.remove(&id);
            if let Some(job) = self.jobs.remove(&id) {
                warn!("{} task {} timed out in queue", self.provider, id);
                self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                job.fail(DispatchError::Timeout);
            }
        }
    }

    /// Highest pending task whose caller is still waiting
    fn pop_next(&mut self) -> Option<(TaskId, Box<dyn ErasedJob>)> {
        while let Some((id, _)) = self.queue.pop() {
            self.deadlines.retain(|(_, task)| *task != id);
            let Some(job) = self.jobs.remove(&id) else {
                continue;
            };
            if job.is_abandoned() {
                self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            return Some((id, job));
        }
        None
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
