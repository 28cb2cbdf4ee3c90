use std::fmt;
use std::sync::Arc;

use crate::{Field, Level, Template};

/// The logging architecture a pipeline implements.
///
/// Each variant dispatches the same message through structurally different
/// machinery, which is exactly the difference an overhead benchmark exists to
/// expose.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Architecture {
    /// The message is formatted and written to the sink before the call returns.
    SyncDirect,

    /// The message is captured and queued; a background worker formats and
    /// writes it later.
    AsyncQueued,

    /// The message is formatted through a pre-parsed template into a reusable
    /// buffer, avoiding per-call heap allocation.
    TemplatedZeroAlloc,
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SyncDirect => "sync-direct",
            Self::AsyncQueued => "async-queued",
            Self::TemplatedZeroAlloc => "templated-zero-alloc",
        })
    }
}

/// One configured logging architecture under test.
///
/// Implementations accept a leveled, templated message plus structured arguments
/// and return once the message has been accepted into the pipeline: formatted and
/// written for synchronous architectures, durably queued for queued ones. What
/// "accepted" costs is the quantity being measured.
///
/// All implementations tolerate concurrent [`log()`][Self::log] calls from any
/// number of threads without corrupting or losing messages, beyond losses their
/// configured overflow policy explicitly defines and counts.
pub trait Pipeline: fmt::Debug + Send + Sync {
    /// Returns the architecture this pipeline implements.
    fn architecture(&self) -> Architecture;

    /// Returns the minimum level this pipeline accepts.
    ///
    /// A call below this level returns immediately having done nothing. Benchmark
    /// setup verifies that no measured case is filtered this way, since timing a
    /// no-op would say nothing about the pipeline.
    fn min_level(&self) -> Level;

    /// Dispatches one message through the pipeline.
    ///
    /// The template is shared rather than borrowed so queued architectures can
    /// retain it without copying its parsed form.
    fn log(&self, level: Level, template: &Arc<Template>, fields: &[Field]);

    /// Blocks until every message accepted before this call has reached the sink.
    ///
    /// Trivial for synchronous architectures. For queued architectures this waits
    /// for the queue to drain and the worker to go idle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FlushTimeout`][crate::Error::FlushTimeout] when the
    /// pipeline fails to drain within the drain deadline, which indicates the
    /// pipeline is leaking queued work.
    fn flush(&self) -> crate::Result<()>;

    /// Returns the number of messages this pipeline has dropped under its
    /// overflow policy since construction.
    ///
    /// Always zero for architectures that cannot drop and for the blocking
    /// overflow policy. Exposed so silent loss can never contaminate a timing
    /// comparison unnoticed.
    fn dropped(&self) -> u64 {
        0
    }
}
