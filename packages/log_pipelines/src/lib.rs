//! Structured-logging pipeline architectures behind one capability, with a
//! setup/teardown harness for measuring their per-call overhead.
//!
//! Choosing a logging subsystem for a high-throughput service means knowing what
//! one `log` call costs in-process, separated from the cost of whatever device
//! the output lands on. This package provides the pieces needed to measure that
//! on equal footing:
//!
//! - [`Pipeline`] - one capability over structurally different logging
//!   architectures: [`SyncDirectPipeline`] (format and write before returning),
//!   [`AsyncQueuedPipeline`] (bounded queue plus worker thread) and
//!   [`TemplatedPipeline`] (pre-parsed template into a retained buffer).
//! - [`Harness`] and [`BenchmarkCase`] - a validated, read-only registry of
//!   named operations, each performing exactly one `log` call with a fixed
//!   message, suitable for handing to a statistical benchmark driver.
//! - [`Template`] and [`Field`] - the parameterized message and its structured
//!   key/value arguments, parsed and shaped once at setup time.
//!
//! Every pipeline writes to a [`null_sink::NullSink`], so the terminal write
//! costs a pair of atomic increments for every architecture alike and timing
//! differences reflect dispatch design, not I/O.
//!
//! This package is not meant for use in production, serving only as a
//! development tool for benchmarking and performance analysis.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use log_pipelines::{
//!     AsyncQueuedPipeline, Field, Harness, Level, OverflowPolicy, SyncDirectPipeline,
//! };
//! use new_zealand::nz;
//! use null_sink::NullSink;
//!
//! let sink = NullSink::new();
//!
//! let harness = Harness::builder()
//!     .case(
//!         "sync_direct",
//!         Arc::new(SyncDirectPipeline::new(sink.clone())),
//!         Level::Info,
//!         "x={x} y={y} z={z}",
//!         [
//!             Field::new("x", 100),
//!             Field::new("y", 200),
//!             Field::new("z", 300),
//!         ],
//!     )
//!     .case(
//!         "async_queued",
//!         Arc::new(
//!             AsyncQueuedPipeline::builder(sink.clone(), OverflowPolicy::Block)
//!                 .capacity(nz!(1024))
//!                 .build(),
//!         ),
//!         Level::Info,
//!         "x={x} y={y} z={z}",
//!         [
//!             Field::new("x", 100),
//!             Field::new("y", 200),
//!             Field::new("z", 300),
//!         ],
//!     )
//!     .build()?;
//!
//! // A driver would time these invocations; here we just make them.
//! for case in harness.cases() {
//!     case.run();
//! }
//!
//! // Teardown drains the async queue before returning, so nothing is lost.
//! harness.dispose()?;
//! assert_eq!(sink.writes(), 2);
//! # Ok::<(), log_pipelines::Error>(())
//! ```

mod async_queued;
mod case;
mod error;
mod field;
mod harness;
mod level;
mod pipeline;
mod sync_direct;
mod template;
mod templated;

pub use async_queued::*;
pub use case::*;
pub use error::*;
pub use field::*;
pub use harness::*;
pub use level::*;
pub use pipeline::*;
pub use sync_direct::*;
pub use template::*;
pub use templated::*;
