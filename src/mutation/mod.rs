//! The mutation catalog: identity, lifecycle and result composition.
//!
//! A mutator (external, pluggable) proposes [`MutationDetails`] per method;
//! the filter pipeline removes some; the execution harness assigns each
//! survivor a terminal [`DetectionStatus`]. This module defines those types
//! plus the aggregation surface handed back to reporting.

mod details;
mod identifier;
mod mutant;
mod status;

pub use details::MutationDetails;
pub use identifier::MutationIdentifier;
pub use mutant::{Mutant, Mutater};
pub use status::{DetectionStatus, MutationState};

use serde::{Deserialize, Serialize};

use crate::core::Result;

/// One executed mutation with its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResult {
    /// The mutation that was executed.
    pub details: MutationDetails,
    /// Terminal outcome assigned by the harness.
    pub status: DetectionStatus,
    /// Test execution time in milliseconds.
    pub duration_ms: u64,
}

impl MutationResult {
    /// Create a new mutation result.
    pub fn new(details: MutationDetails, status: DetectionStatus, duration_ms: u64) -> Self {
        Self {
            details,
            status,
            duration_ms,
        }
    }
}

/// Aggregated counts over one class's executed mutations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Total executed mutations.
    pub total: usize,
    /// Mutants detected by a failing test.
    pub killed: usize,
    /// Mutants no test noticed.
    pub survived: usize,
    /// Mutants whose test run timed out.
    pub timed_out: usize,
    /// Mutants no test reaches.
    pub no_coverage: usize,
    /// Memory, run and viability errors.
    pub errors: usize,
    /// killed / (killed + survived), zero when nothing scored.
    pub score: f64,
}

/// Build a summary from executed results.
pub fn build_summary(results: &[MutationResult]) -> ScoreSummary {
    let mut summary = ScoreSummary {
        total: results.len(),
        ..ScoreSummary::default()
    };

    for result in results {
        match result.status {
            DetectionStatus::Killed => summary.killed += 1,
            DetectionStatus::Survived => summary.survived += 1,
            DetectionStatus::TimedOut => summary.timed_out += 1,
            DetectionStatus::NoCoverage => summary.no_coverage += 1,
            DetectionStatus::MemoryError
            | DetectionStatus::RunError
            | DetectionStatus::NonViable => summary.errors += 1,
        }
    }

    let scored = summary.killed + summary.survived;
    if scored > 0 {
        summary.score = summary.killed as f64 / scored as f64;
    }
    summary
}

/// Per-class analysis output: the composition surface for the external
/// harness and report renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationAnalysis {
    /// Internal name of the analyzed class.
    pub class: String,
    /// Executed mutations with outcomes.
    pub results: Vec<MutationResult>,
    /// Aggregated counts.
    pub summary: ScoreSummary,
}

impl MutationAnalysis {
    /// Assemble the analysis for one class.
    pub fn new(class: impl Into<String>, results: Vec<MutationResult>) -> Self {
        let summary = build_summary(&results);
        Self {
            class: class.into(),
            results,
            summary,
        }
    }

    /// Serialize to a JSON value for the report boundary.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
