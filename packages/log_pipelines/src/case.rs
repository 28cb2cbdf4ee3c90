use std::sync::Arc;

use crate::{Field, Level, Pipeline, Template};

/// One measured operation: a name bound to exactly one pipeline and one fixed
/// message.
///
/// [`run()`][Self::run] performs exactly one `log` call with the case's fixed
/// level, template and structured arguments. It takes no parameters, shares no
/// mutable state with other cases, and may be called any number of times from any
/// number of threads, which is precisely the contract a measurement driver needs.
///
/// Cases are created by registering them on a
/// [`HarnessBuilder`][crate::HarnessBuilder]; the builder guarantees every case
/// in a harness carries the same argument shape, so per-case timing differences
/// reflect pipeline architecture rather than payload.
#[derive(Debug)]
pub struct BenchmarkCase {
    name: String,
    pipeline: Arc<dyn Pipeline>,
    level: Level,
    template: Arc<Template>,
    fields: Box<[Field]>,
}

impl BenchmarkCase {
    pub(crate) fn new(
        name: String,
        pipeline: Arc<dyn Pipeline>,
        level: Level,
        template: Arc<Template>,
        fields: Box<[Field]>,
    ) -> Self {
        Self {
            name,
            pipeline,
            level,
            template,
            fields,
        }
    }

    /// Returns the case's name, used to attribute results in reports.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the pipeline this case dispatches through.
    #[must_use]
    pub fn pipeline(&self) -> &Arc<dyn Pipeline> {
        &self.pipeline
    }

    /// Returns the level the case logs at.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the case's fixed message template.
    #[must_use]
    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    /// Returns the case's fixed structured arguments.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Dispatches the case's fixed message through its pipeline, once.
    ///
    /// This is the measured operation.
    #[inline]
    pub fn run(&self) {
        self.pipeline.log(self.level, &self.template, &self.fields);
    }
}
