use std::collections::VecDeque;
use std::num::NonZero;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use new_zealand::nz;
use null_sink::NullSink;

use crate::{Architecture, Error, Field, Level, Pipeline, Template};

/// How long a flush waits for the worker to drain the queue before declaring the
/// pipeline leaky. A healthy worker drains any bounded queue orders of magnitude
/// faster than this.
const DRAIN_DEADLINE: Duration = Duration::from_secs(60);

const DEFAULT_CAPACITY: NonZero<usize> = nz!(1024);
const DEFAULT_BATCH_MAX: NonZero<usize> = nz!(32);

/// What happens when a message arrives while the internal queue is full.
///
/// The choice materially changes what a benchmark against the pipeline measures,
/// so there is no default: every pipeline is built with an explicit policy.
///
/// Only the drop policies can lose messages, and every loss is counted; see
/// [`Pipeline::dropped()`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum OverflowPolicy {
    /// The caller waits until the worker frees space. Nothing is ever dropped;
    /// at capacity, caller latency includes the wait.
    Block,

    /// The oldest queued message is evicted to admit the new one.
    DropOldest,

    /// The new message is discarded; queued messages are untouched.
    DropNewest,
}

/// A pipeline that captures the message into an owned record, pushes it onto a
/// bounded internal queue and returns; a dedicated worker thread later formats
/// the record and writes it to the sink.
///
/// Per-call cost is dominated by capturing the record and the enqueue handoff,
/// not by formatting or writing. Once [`log()`][Pipeline::log] returns, the
/// record is durably queued (or counted dropped, under a drop policy); it cannot
/// be lost between the caller and the worker.
///
/// Dropping the pipeline drains the queue completely and joins the worker, so
/// queued messages never leak past the pipeline's lifetime.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use log_pipelines::{AsyncQueuedPipeline, Field, Level, OverflowPolicy, Pipeline, Template};
/// use new_zealand::nz;
/// use null_sink::NullSink;
///
/// let sink = NullSink::new();
/// let pipeline = AsyncQueuedPipeline::builder(sink.clone(), OverflowPolicy::Block)
///     .capacity(nz!(1024))
///     .build();
///
/// let template = Arc::new(Template::parse("x={x}")?);
/// pipeline.log(Level::Info, &template, &[Field::new("x", 100)]);
///
/// // The write happens on the worker thread; flush() waits for it.
/// pipeline.flush()?;
/// assert_eq!(sink.writes(), 1);
/// # Ok::<(), log_pipelines::Error>(())
/// ```
#[derive(derive_more::Debug)]
pub struct AsyncQueuedPipeline {
    shared: Arc<Shared>,

    #[debug(ignore)]
    worker: Option<JoinHandle<()>>,

    min_level: Level,
    policy: OverflowPolicy,
    capacity: NonZero<usize>,
}

/// Configures an [`AsyncQueuedPipeline`] before its worker thread starts.
///
/// Obtained from [`AsyncQueuedPipeline::builder()`], which requires the overflow
/// policy up front; the remaining knobs have serviceable defaults.
#[derive(Debug)]
#[must_use]
pub struct AsyncQueuedPipelineBuilder {
    sink: NullSink,
    policy: OverflowPolicy,
    capacity: NonZero<usize>,
    batch_max: NonZero<usize>,
    min_level: Level,
}

impl AsyncQueuedPipelineBuilder {
    /// Sets the bound of the internal queue (default 1024).
    pub fn capacity(mut self, capacity: NonZero<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the maximum number of records the worker takes per wakeup
    /// (default 32).
    ///
    /// Larger batches amortize lock traffic at the cost of burstier sink writes.
    pub fn batch_max(mut self, batch_max: NonZero<usize>) -> Self {
        self.batch_max = batch_max;
        self
    }

    /// Sets the minimum level the pipeline accepts (default: all levels).
    pub fn min_level(mut self, min_level: Level) -> Self {
        self.min_level = min_level;
        self
    }

    /// Starts the worker thread and returns the ready pipeline.
    #[must_use]
    pub fn build(self) -> AsyncQueuedPipeline {
        let shared = Arc::new(Shared {
            queue: Mutex::new(QueueState {
                records: VecDeque::with_capacity(self.capacity.get()),
                worker_idle: true,
                shutdown: false,
            }),
            work_available: Condvar::new(),
            space_available: Condvar::new(),
            drained: Condvar::new(),
            dropped: AtomicU64::new(0),
        });

        let worker = thread::Builder::new()
            .name("async-queued-log-worker".to_string())
            .spawn({
                let shared = Arc::clone(&shared);
                let sink = self.sink;
                let batch_max = self.batch_max;
                move || worker_entrypoint(&shared, &sink, batch_max.get())
            })
            .expect("spawning the queue worker thread failed");

        AsyncQueuedPipeline {
            shared,
            worker: Some(worker),
            min_level: self.min_level,
            policy: self.policy,
            capacity: self.capacity,
        }
    }
}

#[derive(Debug)]
struct Shared {
    queue: Mutex<QueueState>,
    work_available: Condvar,
    space_available: Condvar,
    drained: Condvar,
    dropped: AtomicU64,
}

#[derive(Debug)]
struct QueueState {
    records: VecDeque<QueuedRecord>,

    // True only while the worker holds no records outside the queue. The queue
    // being empty is not enough for "drained": a batch may be in flight.
    worker_idle: bool,

    shutdown: bool,
}

/// A captured copy of one log call, owned by the queue until the worker writes it.
#[derive(Debug)]
struct QueuedRecord {
    level: Level,
    template: Arc<Template>,
    fields: Box<[Field]>,
}

impl AsyncQueuedPipeline {
    /// Starts configuring a pipeline that writes to `sink`.
    ///
    /// The overflow policy is a required argument rather than a builder knob:
    /// inheriting an implicit policy would silently decide whether the benchmark
    /// measures offered-load cost or backpressure cost.
    pub fn builder(sink: NullSink, policy: OverflowPolicy) -> AsyncQueuedPipelineBuilder {
        AsyncQueuedPipelineBuilder {
            sink,
            policy,
            capacity: DEFAULT_CAPACITY,
            batch_max: DEFAULT_BATCH_MAX,
            min_level: Level::Trace,
        }
    }

    /// Returns the bound of the internal queue.
    #[must_use]
    pub fn capacity(&self) -> NonZero<usize> {
        self.capacity
    }

    /// Returns the configured overflow policy.
    #[must_use]
    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.policy
    }

    fn lock_queue(&self) -> MutexGuard<'_, QueueState> {
        self.shared
            .queue
            .lock()
            .expect("no code path panics while holding the queue lock")
    }
}

impl Pipeline for AsyncQueuedPipeline {
    fn architecture(&self) -> Architecture {
        Architecture::AsyncQueued
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn log(&self, level: Level, template: &Arc<Template>, fields: &[Field]) {
        if level < self.min_level {
            return;
        }

        let record = QueuedRecord {
            level,
            template: Arc::clone(template),
            fields: fields.into(),
        };

        let mut state = self.lock_queue();

        match self.policy {
            OverflowPolicy::Block => {
                while state.records.len() >= self.capacity.get() {
                    state = self
                        .shared
                        .space_available
                        .wait(state)
                        .expect("no code path panics while holding the queue lock");
                }
            }
            OverflowPolicy::DropOldest => {
                if state.records.len() >= self.capacity.get() {
                    state.records.pop_front();
                    self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
            OverflowPolicy::DropNewest => {
                if state.records.len() >= self.capacity.get() {
                    self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                    return;
                }
            }
        }

        state.records.push_back(record);
        self.shared.work_available.notify_one();
    }

    fn flush(&self) -> crate::Result<()> {
        let deadline = Instant::now()
            .checked_add(DRAIN_DEADLINE)
            .expect("drain deadline cannot overflow the monotonic clock");

        let mut state = self.lock_queue();

        while !(state.records.is_empty() && state.worker_idle) {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return Err(Error::FlushTimeout {
                    pipeline: Architecture::AsyncQueued,
                    waited: DRAIN_DEADLINE,
                    pending: u64::try_from(state.records.len())
                        .expect("queue length always fits in u64"),
                });
            };

            let (guard, _timed_out) = self
                .shared
                .drained
                .wait_timeout(state, remaining)
                .expect("no code path panics while holding the queue lock");

            state = guard;
        }

        Ok(())
    }

    fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for AsyncQueuedPipeline {
    #[cfg_attr(test, mutants::skip)] // Impractical to test that nothing happens during a panic.
    fn drop(&mut self) {
        if thread::panicking() {
            // If the thread is panicking, we are probably in a dirty state and shutting down
            // may make the problem worse by hiding the original panic, so just do nothing.
            return;
        }

        {
            let mut state = self.lock_queue();
            state.shutdown = true;
        }

        self.shared.work_available.notify_one();

        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .expect("queue worker thread panicked before shutdown");
        }
    }
}

/// Drains the queue in batches until shutdown is requested and the queue is
/// empty. Buffered records are always written out before the worker exits;
/// shutdown stops intake, not delivery.
#[cfg_attr(test, mutants::skip)] // If records stop being drained, deadlocks are very easy.
fn worker_entrypoint(shared: &Arc<Shared>, sink: &NullSink, batch_max: usize) {
    let mut batch = Vec::with_capacity(batch_max);
    let mut buffer = String::with_capacity(256);

    loop {
        let mut state = shared
            .queue
            .lock()
            .expect("no code path panics while holding the queue lock");

        while state.records.is_empty() && !state.shutdown {
            state.worker_idle = true;
            shared.drained.notify_all();

            state = shared
                .work_available
                .wait(state)
                .expect("no code path panics while holding the queue lock");
        }

        if state.records.is_empty() {
            // Shutdown was requested and everything has been delivered.
            state.worker_idle = true;
            shared.drained.notify_all();
            return;
        }

        state.worker_idle = false;

        let take = batch_max.min(state.records.len());
        batch.extend(state.records.drain(..take));

        shared.space_available.notify_all();
        drop(state);

        for record in batch.drain(..) {
            buffer.clear();
            buffer.push_str(record.level.as_str());
            buffer.push(' ');
            record.template.format_into(&mut buffer, &record.fields);
            buffer.push('\n');

            sink.write(buffer.as_bytes());
        }
    }
}
