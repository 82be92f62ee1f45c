//! Basic-block partitioning of instruction streams.
//!
//! Blocks drive probe placement for line coverage and give the loop filters
//! a cheap notion of straight-line regions. The partition is computed once
//! per method in a single linear pass and never modified afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::InstructionStream;

/// A maximal straight-line run of instructions.
///
/// `first` and `last` are inclusive indices into the owning stream. The line
/// set holds every distinct source line attributed to a real instruction
/// inside the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    first: usize,
    last: usize,
    lines: BTreeSet<u32>,
}

impl Block {
    /// Index of the first instruction in the block.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Index of the last instruction in the block, inclusive.
    pub fn last(&self) -> usize {
        self.last
    }

    /// Whether the block covers the given instruction index.
    pub fn contains(&self, index: usize) -> bool {
        self.first <= index && index <= self.last
    }

    /// Distinct source lines attributed to this block.
    pub fn lines(&self) -> &BTreeSet<u32> {
        &self.lines
    }
}

/// Split a stream into its ordered basic blocks.
///
/// Boundaries are jump and switch targets, exception-handler entries, and
/// the control-transfer instructions themselves. Line and frame markers
/// neither start nor end a block; a line marker only updates the line
/// attributed to the real instructions that follow it.
///
/// Quirk, preserved deliberately: a computed tail block consisting of a
/// single trailing marker (the label or line marker a compiler emits after
/// the final return) is dropped rather than reported. Downstream consumers
/// depend on this historical behavior.
pub fn partition(stream: &InstructionStream) -> Vec<Block> {
    let len = stream.len();
    if len == 0 {
        return Vec::new();
    }

    let mut starts = vec![false; len];
    starts[0] = true;
    for insn in stream.iter() {
        for target in insn.referenced_labels() {
            starts[stream.resolve(target)] = true;
        }
    }
    for region in stream.handlers() {
        starts[stream.resolve(region.handler)] = true;
    }

    let mut blocks = Vec::new();
    let mut first = 0;
    let mut current_line = None;
    let mut lines = BTreeSet::new();

    for index in 0..len {
        if index > first && starts[index] {
            blocks.push(Block {
                first,
                last: index - 1,
                lines: std::mem::take(&mut lines),
            });
            first = index;
        }

        let insn = &stream[index];
        if let Some(line) = insn.line_number() {
            current_line = Some(line);
        } else if insn.is_real() {
            if let Some(line) = current_line {
                lines.insert(line);
            }
        }

        if insn.opcode().ends_block() {
            blocks.push(Block {
                first,
                last: index,
                lines: std::mem::take(&mut lines),
            });
            first = index + 1;
        }
    }

    if first < len {
        let single_trailing_marker = first == len - 1 && !stream[first].is_real();
        if single_trailing_marker {
            tracing::trace!(
                method = %stream.location(),
                index = first,
                "dropping trailing marker-only block"
            );
        } else {
            blocks.push(Block {
                first,
                last: len - 1,
                lines,
            });
        }
    }

    tracing::debug!(
        method = %stream.location(),
        blocks = blocks.len(),
        "partitioned instruction stream"
    );
    blocks
}
