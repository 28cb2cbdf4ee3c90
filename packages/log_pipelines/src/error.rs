use std::time::Duration;

use thiserror::Error;

use crate::{Architecture, Level};

/// Errors that can occur when assembling or tearing down a benchmark harness.
///
/// Every variant is fatal to the comparison run it occurs in. A partially
/// configured harness would measure the wrong thing for at least one case, and a
/// pipeline that cannot drain at teardown has leaked queued work, so neither is
/// allowed to produce results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A case's level is filtered out by its own pipeline, so the case would
    /// measure a no-op instead of a real dispatch.
    #[error(
        "case '{case}' logs at {case_level} but its pipeline only accepts {min_level} and above"
    )]
    LevelFiltered {
        /// Name of the offending case.
        case: String,

        /// The level the case would log at.
        case_level: Level,

        /// The minimum level its pipeline accepts.
        min_level: Level,
    },

    /// A case carries a different number of structured arguments than the rest of
    /// the registry, so per-case timings would reflect payload differences
    /// instead of pipeline differences.
    #[error("case '{case}' has {actual} structured arguments but the registry expects {expected}")]
    ArgumentShapeMismatch {
        /// Name of the offending case.
        case: String,

        /// Argument count established by the first registered case.
        expected: usize,

        /// Argument count of the offending case.
        actual: usize,
    },

    /// Two cases were registered under the same name.
    #[error("duplicate case name '{name}'")]
    DuplicateCaseName {
        /// The name that was registered twice.
        name: String,
    },

    /// A case was registered with an empty name, which would make its results
    /// unattributable in reports.
    #[error("case names must not be empty")]
    EmptyCaseName,

    /// A message template was empty.
    #[error("message templates must not be empty")]
    EmptyTemplate,

    /// A message template has a `{` without a matching `}`, or a stray `}`.
    #[error("unbalanced brace at byte {position} in template '{template}'")]
    UnbalancedBrace {
        /// The offending template text.
        template: String,

        /// Byte offset of the offending brace.
        position: usize,
    },

    /// A message template contains an `{}` placeholder with no name, so it cannot
    /// be matched to a structured argument.
    #[error("empty placeholder at byte {position} in template '{template}'")]
    EmptyPlaceholder {
        /// The offending template text.
        template: String,

        /// Byte offset of the placeholder's opening brace.
        position: usize,
    },

    /// A pipeline failed to drain its internal queue within the drain deadline.
    ///
    /// This indicates a resource leak in the pipeline's worker, not a timing
    /// artifact: a healthy worker drains any bounded queue orders of magnitude
    /// faster than the deadline.
    #[error(
        "{pipeline} pipeline still had {pending} queued messages after waiting {waited:?} to drain"
    )]
    FlushTimeout {
        /// Architecture of the pipeline that failed to drain.
        pipeline: Architecture,

        /// How long the flush waited before giving up.
        waited: Duration,

        /// Messages still queued when the wait expired.
        pending: u64,
    },
}

/// A specialized `Result` type for harness operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
