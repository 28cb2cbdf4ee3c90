//! Discard-only write targets for logging overhead benchmarks.
//!
//! When comparing the in-process cost of different logging pipelines, the terminal
//! write must be close to free and identical for every pipeline, otherwise the
//! comparison measures the output device instead of the pipeline. This package
//! provides [`NullSink`], a write target that discards everything while keeping
//! exact counts of what it discarded, and [`null_device_path()`] for callers that
//! want the operating system's own discard device instead.
//!
//! This package is not meant for use in production, serving only as a development
//! tool for benchmarking and performance analysis.
//!
//! # Example
//!
//! ```
//! use null_sink::NullSink;
//!
//! let sink = NullSink::new();
//!
//! sink.write(b"one formatted log line\n");
//! sink.write(b"another\n");
//!
//! assert_eq!(sink.writes(), 2);
//! assert_eq!(sink.bytes_written(), 31);
//! ```
//!
//! The counters are what make loss visible: after a benchmark run completes, the
//! number of writes observed by the sink must equal the number of messages the
//! run offered, or the pipeline under test lost messages somewhere along the way.

mod device;
mod sink;

pub use device::*;
pub use sink::*;
