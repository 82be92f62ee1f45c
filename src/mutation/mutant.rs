//! Materialized mutants and the mutator handle.

use crate::bytecode::InstructionStream;
use crate::core::Result;

use super::{MutationDetails, MutationIdentifier};

/// A mutation paired with the concrete mutated instruction stream.
///
/// Owned transiently by the filter and execution pipeline; never persisted
/// beyond one test-execution cycle.
#[derive(Debug, Clone)]
pub struct Mutant {
    details: MutationDetails,
    stream: InstructionStream,
}

impl Mutant {
    /// Pair mutation details with the mutated method body.
    pub fn new(details: MutationDetails, stream: InstructionStream) -> Self {
        Self { details, stream }
    }

    /// The mutation this mutant realizes.
    pub fn details(&self) -> &MutationDetails {
        &self.details
    }

    /// The mutated instruction stream.
    pub fn stream(&self) -> &InstructionStream {
        &self.stream
    }
}

/// Handle to the external, pluggable mutator: materializes the mutant for a
/// given identifier on demand.
///
/// The filters use this to inspect the *mutated* shape of a method, e.g. to
/// ask whether removing an increment turns a loop infinite.
pub trait Mutater {
    /// Apply the identified mutation and return the resulting mutant.
    fn mutate(&self, id: &MutationIdentifier) -> Result<Mutant>;
}
