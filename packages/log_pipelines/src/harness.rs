use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use crate::{BenchmarkCase, Error, Field, Level, Pipeline, Template};

/// The lifecycle context for one comparison run.
///
/// A harness owns the ordered, read-only registry of [`BenchmarkCase`]s and the
/// pipelines they dispatch through. Its lifecycle has three states, encoded in
/// types so no state can be skipped:
///
/// 1. **Uninitialized**: a [`HarnessBuilder`] accumulating case registrations.
/// 2. **Ready**: the `Harness` returned by [`HarnessBuilder::build()`], the only
///    state in which cases may run. The registry is immutable here; cases may
///    run concurrently or repeatedly at the driver's discretion.
/// 3. **Disposed**: after [`dispose()`][Self::dispose] consumes the harness,
///    having drained every pipeline.
///
/// `build()` fails rather than producing a harness whose measurements would
/// mislead: a case whose level its own pipeline filters out would measure a
/// no-op, and a case with a different argument count than the others would
/// measure payload marshalling instead of pipeline architecture.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use log_pipelines::{Field, Harness, Level, SyncDirectPipeline};
/// use null_sink::NullSink;
///
/// let sink = NullSink::new();
///
/// let harness = Harness::builder()
///     .case(
///         "sync_direct",
///         Arc::new(SyncDirectPipeline::new(sink.clone())),
///         Level::Info,
///         "x={x} y={y} z={z}",
///         [
///             Field::new("x", 100),
///             Field::new("y", 200),
///             Field::new("z", 300),
///         ],
///     )
///     .build()?;
///
/// // The driver invokes each case as many times as it pleases.
/// for case in harness.cases() {
///     case.run();
/// }
///
/// harness.dispose()?;
/// assert_eq!(sink.writes(), 1);
/// # Ok::<(), log_pipelines::Error>(())
/// ```
#[derive(Debug)]
pub struct Harness {
    cases: Vec<BenchmarkCase>,
    disposed: bool,
}

/// Accumulates case registrations for a [`Harness`].
///
/// Registration itself is infallible; all validation happens in
/// [`build()`][Self::build] so every configuration problem surfaces at once,
/// before any measurement starts.
#[derive(Debug, Default)]
#[must_use]
pub struct HarnessBuilder {
    cases: Vec<PendingCase>,
}

#[derive(Debug)]
struct PendingCase {
    name: String,
    pipeline: Arc<dyn Pipeline>,
    level: Level,
    template: String,
    fields: Vec<Field>,
}

impl Harness {
    /// Starts assembling a harness.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// Returns the registered cases, in registration order.
    pub fn cases(&self) -> impl Iterator<Item = &BenchmarkCase> {
        self.cases.iter()
    }

    /// Returns the case with the given name, if one was registered.
    #[must_use]
    pub fn case(&self, name: &str) -> Option<&BenchmarkCase> {
        self.cases.iter().find(|case| case.name() == name)
    }

    /// Returns the number of registered cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns whether the harness has no cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Tears the harness down, synchronously draining every pipeline.
    ///
    /// Each distinct pipeline is flushed exactly once, even when several cases
    /// share it. Buffered messages are never discarded: the drain completes (or
    /// is reported as failed) before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FlushTimeout`] when a pipeline fails to drain, which
    /// means its worker is leaking queued work. The comparison run's results
    /// should be discarded in that case.
    pub fn dispose(mut self) -> crate::Result<()> {
        self.disposed = true;

        let mut flushed: Vec<Arc<dyn Pipeline>> = Vec::new();

        for case in &self.cases {
            if flushed
                .iter()
                .any(|pipeline| Arc::ptr_eq(pipeline, case.pipeline()))
            {
                continue;
            }

            case.pipeline().flush()?;
            flushed.push(Arc::clone(case.pipeline()));
        }

        Ok(())
    }
}

impl Drop for Harness {
    #[cfg_attr(test, mutants::skip)] // Impractical to test that nothing happens during a panic.
    fn drop(&mut self) {
        if self.disposed || thread::panicking() {
            return;
        }

        // Last-resort drain for harnesses dropped without dispose(). Errors have
        // nowhere to go from Drop, which is exactly why dispose() exists.
        for case in &self.cases {
            let _drain_outcome = case.pipeline().flush();
        }
    }
}

impl HarnessBuilder {
    /// Registers a named case that dispatches the given fixed message through
    /// `pipeline`.
    ///
    /// Registration order is preserved; it becomes the registry's iteration
    /// order and therefore the reporting order.
    pub fn case(
        mut self,
        name: impl Into<String>,
        pipeline: Arc<dyn Pipeline>,
        level: Level,
        template: impl Into<String>,
        fields: impl Into<Vec<Field>>,
    ) -> Self {
        self.cases.push(PendingCase {
            name: name.into(),
            pipeline,
            level,
            template: template.into(),
            fields: fields.into(),
        });

        self
    }

    /// Validates the registered cases and produces a ready [`Harness`].
    ///
    /// # Errors
    ///
    /// Returns an error when any case name is empty or duplicated, any template
    /// fails to parse, any case's argument count differs from the first case's,
    /// or any case's level is filtered out by its own pipeline. All of these
    /// would silently corrupt the comparison if allowed through.
    pub fn build(self) -> crate::Result<Harness> {
        let mut names = HashSet::new();
        let mut expected_fields: Option<usize> = None;
        let mut cases = Vec::with_capacity(self.cases.len());

        for pending in self.cases {
            if pending.name.is_empty() {
                return Err(Error::EmptyCaseName);
            }

            if !names.insert(pending.name.clone()) {
                return Err(Error::DuplicateCaseName { name: pending.name });
            }

            let expected = *expected_fields.get_or_insert(pending.fields.len());
            if pending.fields.len() != expected {
                return Err(Error::ArgumentShapeMismatch {
                    case: pending.name,
                    expected,
                    actual: pending.fields.len(),
                });
            }

            if pending.level < pending.pipeline.min_level() {
                return Err(Error::LevelFiltered {
                    case: pending.name,
                    case_level: pending.level,
                    min_level: pending.pipeline.min_level(),
                });
            }

            let template = Arc::new(Template::parse(pending.template)?);

            cases.push(BenchmarkCase::new(
                pending.name,
                pending.pipeline,
                pending.level,
                template,
                pending.fields.into_boxed_slice(),
            ));
        }

        Ok(Harness {
            cases,
            disposed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use null_sink::NullSink;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::SyncDirectPipeline;

    assert_impl_all!(Harness: Debug, Send, Sync);

    fn sync_pipeline(sink: &NullSink) -> Arc<dyn Pipeline> {
        Arc::new(SyncDirectPipeline::new(sink.clone()))
    }

    fn three_fields() -> [Field; 3] {
        [
            Field::new("x", 100),
            Field::new("y", 200),
            Field::new("z", 300),
        ]
    }

    #[test]
    fn empty_harness_builds() {
        let harness = Harness::builder().build().unwrap();

        assert!(harness.is_empty());
        harness.dispose().unwrap();
    }

    #[test]
    fn cases_iterate_in_registration_order() {
        let sink = NullSink::new();

        let harness = Harness::builder()
            .case("b", sync_pipeline(&sink), Level::Info, "m={m}", [Field::new("m", 1)])
            .case("a", sync_pipeline(&sink), Level::Info, "m={m}", [Field::new("m", 2)])
            .build()
            .unwrap();

        let names: Vec<_> = harness.cases().map(BenchmarkCase::name).collect();
        assert_eq!(names, ["b", "a"]);

        harness.dispose().unwrap();
    }

    #[test]
    fn lookup_by_name() {
        let sink = NullSink::new();

        let harness = Harness::builder()
            .case("only", sync_pipeline(&sink), Level::Info, "m={m}", [Field::new("m", 1)])
            .build()
            .unwrap();

        assert_eq!(harness.len(), 1);
        assert!(harness.case("only").is_some());
        assert!(harness.case("missing").is_none());

        harness.dispose().unwrap();
    }

    #[test]
    fn running_a_case_reaches_the_sink() {
        let sink = NullSink::new();

        let harness = Harness::builder()
            .case(
                "sync_direct",
                sync_pipeline(&sink),
                Level::Info,
                "x={x} y={y} z={z}",
                three_fields(),
            )
            .build()
            .unwrap();

        harness
            .case("sync_direct")
            .expect("registered above")
            .run();

        harness.dispose().unwrap();
        assert_eq!(sink.writes(), 1);
    }

    #[test]
    fn empty_name_is_rejected() {
        let sink = NullSink::new();

        let result = Harness::builder()
            .case("", sync_pipeline(&sink), Level::Info, "m={m}", [Field::new("m", 1)])
            .build();

        assert!(matches!(result, Err(Error::EmptyCaseName)));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let sink = NullSink::new();

        let result = Harness::builder()
            .case("twice", sync_pipeline(&sink), Level::Info, "m={m}", [Field::new("m", 1)])
            .case("twice", sync_pipeline(&sink), Level::Info, "m={m}", [Field::new("m", 2)])
            .build();

        assert!(matches!(
            result,
            Err(Error::DuplicateCaseName { name }) if name == "twice"
        ));
    }

    #[test]
    fn mismatched_argument_shape_is_rejected() {
        let sink = NullSink::new();

        let result = Harness::builder()
            .case("three", sync_pipeline(&sink), Level::Info, "m={m}", three_fields())
            .case("one", sync_pipeline(&sink), Level::Info, "m={m}", [Field::new("m", 1)])
            .build();

        assert!(matches!(
            result,
            Err(Error::ArgumentShapeMismatch {
                expected: 3,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn filtered_level_is_rejected() {
        let sink = NullSink::new();
        let filtered: Arc<dyn Pipeline> =
            Arc::new(SyncDirectPipeline::new(sink.clone()).with_min_level(Level::Error));

        let result = Harness::builder()
            .case("filtered", filtered, Level::Info, "m={m}", [Field::new("m", 1)])
            .build();

        assert!(matches!(
            result,
            Err(Error::LevelFiltered {
                case_level: Level::Info,
                min_level: Level::Error,
                ..
            })
        ));
    }

    #[test]
    fn invalid_template_is_rejected() {
        let sink = NullSink::new();

        let result = Harness::builder()
            .case("broken", sync_pipeline(&sink), Level::Info, "m={m", [Field::new("m", 1)])
            .build();

        assert!(matches!(result, Err(Error::UnbalancedBrace { .. })));
    }

    #[test]
    fn dispose_flushes_shared_pipeline_once() {
        // Two cases on one pipeline: dispose must not double-flush (harmless for
        // these pipelines, but the contract is once per pipeline).
        let sink = NullSink::new();
        let shared = sync_pipeline(&sink);

        let harness = Harness::builder()
            .case("first", Arc::clone(&shared), Level::Info, "m={m}", [Field::new("m", 1)])
            .case("second", shared, Level::Info, "m={m}", [Field::new("m", 2)])
            .build()
            .unwrap();

        harness.dispose().unwrap();
    }
}
