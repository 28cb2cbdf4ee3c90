use std::cell::RefCell;
use std::sync::Arc;

use null_sink::NullSink;

use crate::{Architecture, Field, Level, Pipeline, Template};

/// Default initial reservation for the per-thread render buffer.
const DEFAULT_BUFFER_CAPACITY: usize = 256;

thread_local! {
    // One render buffer per thread, shared by every templated pipeline on that
    // thread. Capacity persists across calls, which is the whole point.
    static RENDER_BUFFER: RefCell<String> = const { RefCell::new(String::new()) };
}

/// A pipeline that renders through the pre-parsed template into a pre-allocated,
/// per-thread buffer whose capacity is retained across calls.
///
/// After the first few calls on a thread have grown the buffer to the message
/// size, a call performs no heap allocation: the template is already parsed, the
/// integer arguments format directly into the retained buffer, and the bytes go
/// straight to the sink. Per-call cost is dominated by formatting alone.
///
/// Because the buffer is thread-local, concurrent callers never contend on it;
/// they meet only at the sink's atomic counters.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use log_pipelines::{Field, Level, Pipeline, Template, TemplatedPipeline};
/// use null_sink::NullSink;
///
/// let sink = NullSink::new();
/// let pipeline = TemplatedPipeline::new(sink.clone());
///
/// let template = Arc::new(Template::parse("x={x}")?);
/// pipeline.log(Level::Info, &template, &[Field::new("x", 100)]);
///
/// assert_eq!(sink.writes(), 1);
/// # Ok::<(), log_pipelines::Error>(())
/// ```
#[derive(Debug)]
pub struct TemplatedPipeline {
    sink: NullSink,
    min_level: Level,
    buffer_capacity: usize,
}

impl TemplatedPipeline {
    /// Creates a pipeline writing to `sink`, accepting all levels.
    #[must_use]
    pub fn new(sink: NullSink) -> Self {
        Self {
            sink,
            min_level: Level::Trace,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    /// Sets the minimum level the pipeline accepts.
    #[must_use]
    pub fn with_min_level(mut self, min_level: Level) -> Self {
        self.min_level = min_level;
        self
    }

    /// Sets the initial reservation applied to each thread's render buffer
    /// (default 256 bytes).
    ///
    /// Messages longer than the reservation still render correctly; the buffer
    /// grows once and stays grown.
    #[must_use]
    pub fn with_buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }
}

impl Pipeline for TemplatedPipeline {
    fn architecture(&self) -> Architecture {
        Architecture::TemplatedZeroAlloc
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn log(&self, level: Level, template: &Arc<Template>, fields: &[Field]) {
        if level < self.min_level {
            return;
        }

        RENDER_BUFFER.with_borrow_mut(|buffer| {
            buffer.clear();
            buffer.reserve(self.buffer_capacity.saturating_sub(buffer.capacity()));

            buffer.push_str(level.as_str());
            buffer.push(' ');
            template.format_into(buffer, fields);
            buffer.push('\n');

            self.sink.write(buffer.as_bytes());
        });
    }

    fn flush(&self) -> crate::Result<()> {
        // Every accepted message was written before its log() call returned.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(TemplatedPipeline: Debug, Send, Sync);

    fn template(text: &str) -> Arc<Template> {
        Arc::new(Template::parse(text).unwrap())
    }

    #[test]
    fn writes_before_returning() {
        let sink = NullSink::new();
        let pipeline = TemplatedPipeline::new(sink.clone());

        let template = template("x={x} y={y} z={z}");
        let fields = [
            Field::new("x", 100),
            Field::new("y", 200),
            Field::new("z", 300),
        ];

        pipeline.log(Level::Info, &template, &fields);

        assert_eq!(sink.writes(), 1);
        // "INFO x=100 y=200 z=300\n"
        assert_eq!(sink.bytes_written(), 23);
    }

    #[test]
    fn repeated_calls_render_identically() {
        let sink = NullSink::new();
        let pipeline = TemplatedPipeline::new(sink.clone());

        let template = template("x={x}");
        for _ in 0..100 {
            pipeline.log(Level::Info, &template, &[Field::new("x", 42)]);
        }

        assert_eq!(sink.writes(), 100);
        // Every call wrote the same 10 bytes: "INFO x=42\n".
        assert_eq!(sink.bytes_written(), 1000);
    }

    #[test]
    fn filtered_level_is_a_no_op() {
        let sink = NullSink::new();
        let pipeline = TemplatedPipeline::new(sink.clone()).with_min_level(Level::Warn);

        pipeline.log(Level::Info, &template("quiet"), &[]);

        assert_eq!(sink.writes(), 0);
    }

    #[test]
    fn messages_longer_than_the_reservation_render() {
        let sink = NullSink::new();
        let pipeline = TemplatedPipeline::new(sink.clone()).with_buffer_capacity(4);

        let template = template("a long literal prefix with a value {v} at the end");
        pipeline.log(Level::Info, &template, &[Field::new("v", 123_456_789)]);

        assert_eq!(sink.writes(), 1);
    }

    #[test]
    fn concurrent_callers_lose_nothing() {
        const THREADS: usize = 4;
        const CALLS_PER_THREAD: u64 = 500;

        let sink = NullSink::new();
        let pipeline = TemplatedPipeline::new(sink.clone());
        let template = template("n={n}");

        std::thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    for n in 0..CALLS_PER_THREAD {
                        pipeline.log(
                            Level::Info,
                            &template,
                            &[Field::new("n", i64::try_from(n).unwrap())],
                        );
                    }
                });
            }
        });

        let expected = CALLS_PER_THREAD
            .checked_mul(THREADS as u64)
            .expect("tiny test constants cannot overflow");
        assert_eq!(sink.writes(), expected);
    }
}
