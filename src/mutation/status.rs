//! Mutant lifecycle and detection outcomes.

use serde::{Deserialize, Serialize};

/// Terminal classification of a mutant once the external harness has run
/// the test suite against it. Assigned exactly once per mutant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStatus {
    /// No test reaches the mutated location.
    NoCoverage,
    /// Tests ran, none failed.
    Survived,
    /// A test failed or errored.
    Killed,
    /// Test execution exceeded its deadline.
    TimedOut,
    /// The mutant exhausted memory during execution.
    MemoryError,
    /// The test run itself failed for an unrelated reason.
    RunError,
    /// The mutated code could not be loaded or verified.
    NonViable,
}

impl DetectionStatus {
    /// Whether the test suite detected this mutant.
    pub fn is_detected(self) -> bool {
        matches!(
            self,
            Self::Killed | Self::TimedOut | Self::MemoryError | Self::RunError
        )
    }

    /// Whether this outcome participates in the mutation score.
    pub fn counts_for_score(self) -> bool {
        matches!(self, Self::Killed | Self::Survived)
    }
}

/// Lifecycle of one candidate mutation.
///
/// The core only performs the first transition (proposal and filtering);
/// execution outcomes are assigned externally but representable here so the
/// core's output composes with the harness types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    /// Created by a mutator, not yet filtered.
    Proposed,
    /// Removed by a filter before execution. Terminal.
    FilteredOut {
        /// Name of the interceptor that removed it.
        filter: String,
    },
    /// Survived filtering; queued for the execution harness.
    PendingExecution,
    /// Executed; carries the terminal detection status.
    Finished(DetectionStatus),
}

impl MutationState {
    /// Whether this state admits no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FilteredOut { .. } | Self::Finished(_))
    }
}
