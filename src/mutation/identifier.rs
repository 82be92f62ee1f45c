//! Stable identity of a candidate mutation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::MethodLocation;

/// Identifies one candidate alteration: the owning method, the affected
/// instruction index (or small set of indices), and the mutator kind that
/// proposed it.
///
/// Two identifiers are equal iff all fields match. The identifier is the
/// stable key across runs for incremental analysis and external reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MutationIdentifier {
    location: MethodLocation,
    indexes: Vec<usize>,
    mutator: String,
}

impl MutationIdentifier {
    /// Identify a mutation of a single instruction.
    pub fn new(location: MethodLocation, index: usize, mutator: impl Into<String>) -> Self {
        Self {
            location,
            indexes: vec![index],
            mutator: mutator.into(),
        }
    }

    /// Identify a mutation touching several instructions.
    pub fn with_indexes(
        location: MethodLocation,
        mut indexes: Vec<usize>,
        mutator: impl Into<String>,
    ) -> Self {
        indexes.sort_unstable();
        indexes.dedup();
        Self {
            location,
            indexes,
            mutator: mutator.into(),
        }
    }

    /// The owning method.
    pub fn location(&self) -> &MethodLocation {
        &self.location
    }

    /// All affected instruction indices, sorted.
    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    /// The first affected instruction index.
    pub fn first_index(&self) -> usize {
        self.indexes.first().copied().unwrap_or(0)
    }

    /// The mutator kind that proposed this mutation.
    pub fn mutator(&self) -> &str {
        &self.mutator
    }

    /// A short, stable hash id for report keys.
    pub fn short_id(&self) -> String {
        let hash = xxhash_rust::xxh3::xxh3_64(self.to_string().as_bytes());
        format!("{:x}", hash & 0xFFFF_FFFF)
    }
}

impl fmt::Display for MutationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.location)?;
        let mut first = true;
        for index in &self.indexes {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{index}")?;
            first = false;
        }
        write!(f, ":{}", self.mutator)
    }
}
