//! Per-method instruction sequences.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{Error, MethodLocation, Result};

use super::{Instruction, LabelId};

/// One exception-handling region of a method body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryCatchRegion {
    /// First label of the protected range.
    pub start: LabelId,
    /// Label past the end of the protected range.
    pub end: LabelId,
    /// Handler entry label.
    pub handler: LabelId,
    /// Caught exception type; `None` for catch-all / finally.
    pub catch_type: Option<String>,
}

/// The ordered, indexable instruction sequence for exactly one method.
///
/// Construction validates the structural invariants everything downstream
/// relies on: indices are contiguous from zero, every label is defined
/// exactly once, and every jump, switch or handler operand resolves to an
/// element of this same stream. A violation is a fatal decoding error, never
/// something to paper over.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionStream {
    location: MethodLocation,
    instructions: Vec<Instruction>,
    handlers: Vec<TryCatchRegion>,
    labels: HashMap<LabelId, usize>,
}

impl InstructionStream {
    /// Build and validate a stream for one method body.
    pub fn new(
        location: MethodLocation,
        instructions: Vec<Instruction>,
        handlers: Vec<TryCatchRegion>,
    ) -> Result<Self> {
        let mut labels = HashMap::new();
        for (index, insn) in instructions.iter().enumerate() {
            if let Some(id) = insn.defined_label() {
                if labels.insert(id, index).is_some() {
                    return Err(Error::malformed(
                        &location,
                        format!("label L{} defined more than once", id.0),
                    ));
                }
            }
        }

        for insn in &instructions {
            for target in insn.referenced_labels() {
                if !labels.contains_key(&target) {
                    return Err(Error::malformed(
                        &location,
                        format!("dangling jump target L{}", target.0),
                    ));
                }
            }
        }
        for region in &handlers {
            for label in [region.start, region.end, region.handler] {
                if !labels.contains_key(&label) {
                    return Err(Error::malformed(
                        &location,
                        format!("dangling exception-handler label L{}", label.0),
                    ));
                }
            }
        }

        Ok(Self {
            location,
            instructions,
            handlers,
            labels,
        })
    }

    /// The method this stream belongs to.
    pub fn location(&self) -> &MethodLocation {
        &self.location
    }

    /// Number of instructions, markers included.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the stream has no instructions at all.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instruction at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// All instructions in order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Iterate over the instructions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// The exception-handling regions of this method.
    pub fn handlers(&self) -> &[TryCatchRegion] {
        &self.handlers
    }

    /// Resolve a label to the index of its defining instruction.
    ///
    /// All labels are checked at construction, so resolution of any label
    /// referenced within this stream cannot fail.
    pub fn resolve(&self, label: LabelId) -> usize {
        *self
            .labels
            .get(&label)
            .expect("label validated at stream construction")
    }
}

impl std::ops::Index<usize> for InstructionStream {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Instruction {
        &self.instructions[index]
    }
}
