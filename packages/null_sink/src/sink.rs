use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use std::{io, thread};

/// A write target that discards all data with negligible, near-constant overhead,
/// counting every write it discards.
///
/// The handle is cheap to clone; all clones share one set of counters, so a single
/// sink can be the terminal target of any number of pipelines at once. Writes never
/// block on real I/O and never fail, from any number of threads concurrently.
///
/// # Examples
///
/// ```
/// use null_sink::NullSink;
///
/// let sink = NullSink::new();
/// let same_sink = sink.clone();
///
/// sink.write(b"hello");
///
/// // Clones observe the same counters.
/// assert_eq!(same_sink.writes(), 1);
/// assert_eq!(same_sink.bytes_written(), 5);
/// ```
///
/// The sink also acts as a [`std::io::Write`] that always succeeds, so it can stand
/// in wherever a writer is expected:
///
/// ```
/// use std::io::Write;
///
/// use null_sink::NullSink;
///
/// let mut sink = NullSink::new();
/// writeln!(sink, "discarded but counted").unwrap();
///
/// assert_eq!(sink.writes(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct NullSink {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    writes: AtomicU64,
    bytes: AtomicU64,
    write_delay: Option<Duration>,
}

impl NullSink {
    /// Creates a sink backed by an in-memory discard stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that sleeps for `delay` on every write before discarding it.
    ///
    /// This simulates a slow output device. It exists so tests can prove that a
    /// queued pipeline's callers are insulated from sink latency; it has no place
    /// in an actual measurement run. The sink still never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use null_sink::NullSink;
    ///
    /// let sink = NullSink::with_write_delay(Duration::from_millis(10));
    /// sink.write(b"takes at least 10ms");
    ///
    /// assert_eq!(sink.writes(), 1);
    /// ```
    #[must_use]
    pub fn with_write_delay(delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                write_delay: Some(delay),
                ..Inner::default()
            }),
        }
    }

    /// Discards `bytes`, advancing the write and byte counters.
    ///
    /// Never blocks on real I/O and never observably fails.
    pub fn write(&self, bytes: &[u8]) {
        if let Some(delay) = self.inner.write_delay {
            thread::sleep(delay);
        }

        self.inner.writes.fetch_add(1, Ordering::Relaxed);
        self.inner.bytes.fetch_add(
            u64::try_from(bytes.len()).expect("buffer length always fits in u64"),
            Ordering::Relaxed,
        );
    }

    /// Returns the number of writes discarded so far, across all clones of the handle.
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.inner.writes.load(Ordering::Relaxed)
    }

    /// Returns the number of bytes discarded so far, across all clones of the handle.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.inner.bytes.load(Ordering::Relaxed)
    }
}

impl io::Write for NullSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Self::write(&*self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// Mirrors `std::io::Sink`, which is also writable through a shared reference.
impl io::Write for &NullSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        NullSink::write(*self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;
    use std::io::Write;
    use std::sync::Barrier;
    use std::time::Instant;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(NullSink: Clone, Debug, Send, Sync);

    #[test]
    fn counts_writes_and_bytes() {
        let sink = NullSink::new();

        assert_eq!(sink.writes(), 0);
        assert_eq!(sink.bytes_written(), 0);

        sink.write(b"abc");
        sink.write(b"");
        sink.write(b"defgh");

        assert_eq!(sink.writes(), 3);
        assert_eq!(sink.bytes_written(), 8);
    }

    #[test]
    fn clones_share_counters() {
        let sink = NullSink::new();
        let clone = sink.clone();

        sink.write(b"x");
        clone.write(b"y");

        assert_eq!(sink.writes(), 2);
        assert_eq!(clone.writes(), 2);
    }

    #[test]
    fn io_write_never_fails() {
        let mut sink = NullSink::new();

        sink.write_all(b"first").unwrap();
        writeln!(sink, "second").unwrap();
        sink.flush().unwrap();

        assert_eq!(sink.writes(), 2);
    }

    #[test]
    fn io_write_through_shared_reference() {
        let sink = NullSink::new();

        let mut writer = &sink;
        writer.write_all(b"shared").unwrap();

        assert_eq!(sink.writes(), 1);
        assert_eq!(sink.bytes_written(), 6);
    }

    #[test]
    fn concurrent_writers_lose_nothing() {
        const THREADS: usize = 4;
        const WRITES_PER_THREAD: u64 = 1000;

        let sink = NullSink::new();
        let barrier = Barrier::new(THREADS);

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    barrier.wait();

                    for _ in 0..WRITES_PER_THREAD {
                        sink.write(b"line");
                    }
                });
            }
        });

        let expected = WRITES_PER_THREAD
            .checked_mul(THREADS as u64)
            .expect("tiny test constants cannot overflow");
        assert_eq!(sink.writes(), expected);
    }

    #[test]
    fn write_delay_delays() {
        let delay = Duration::from_millis(25);
        let sink = NullSink::with_write_delay(delay);

        let start = Instant::now();
        sink.write(b"slow");

        assert!(start.elapsed() >= delay);
        assert_eq!(sink.writes(), 1);
    }
}
