//! The full record of a proposed mutation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::MutationIdentifier;

/// Everything known about a candidate mutation when it is proposed.
///
/// Created by a mutator, immutable afterwards. Filters remove details from a
/// candidate collection; they never edit one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationDetails {
    id: MutationIdentifier,
    filename: String,
    description: String,
    line: u32,
    blocks: Vec<usize>,
}

impl MutationDetails {
    /// Create a new mutation record.
    pub fn new(
        id: MutationIdentifier,
        filename: impl Into<String>,
        description: impl Into<String>,
        line: u32,
        blocks: Vec<usize>,
    ) -> Self {
        Self {
            id,
            filename: filename.into(),
            description: description.into(),
            line,
            blocks,
        }
    }

    /// The mutation's identifier.
    pub fn id(&self) -> &MutationIdentifier {
        &self.id
    }

    /// Originating source file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Human-readable description of the alteration.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Source line the mutation sits on.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Indices of the basic blocks this mutation touches.
    pub fn blocks(&self) -> &[usize] {
        &self.blocks
    }
}

impl fmt::Display for MutationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.description)
    }
}
