//! Filter for mutations that break a counter loop's only write.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::bytecode::Opcode;
use crate::core::{Error, MethodLocation, Result};
use crate::mutation::{Mutater, MutationDetails, MutationIdentifier};
use crate::sequence::{Context, SequenceMatcher};

use super::patterns::infinite_counter_loop;
use super::{ClassStreams, MutationInterceptor};

static INFINITE_LOOP: Lazy<SequenceMatcher> = Lazy::new(infinite_counter_loop);

/// Removes candidates whose mutated method now contains a counter loop with
/// no remaining write to its guard variable.
///
/// Known limitation, kept on purpose: when the *original* method already
/// matches the infinite shape, the whole method bucket is skipped. A
/// pre-existing accepted risk cannot be told apart from a newly introduced
/// one, so the filter gives up rather than guess.
#[derive(Debug, Default)]
pub struct InfiniteForLoopFilter {
    class: Option<Arc<ClassStreams>>,
    trace: bool,
}

impl InfiniteForLoopFilter {
    /// Create the filter.
    pub fn new(trace: bool) -> Self {
        Self { class: None, trace }
    }
}

/// Distinct method locations in candidate order.
pub(crate) fn bucket_locations(candidates: &[MutationDetails]) -> Vec<MethodLocation> {
    let mut locations: Vec<MethodLocation> = Vec::new();
    for candidate in candidates {
        if !locations.contains(candidate.id().location()) {
            locations.push(candidate.id().location().clone());
        }
    }
    locations
}

impl MutationInterceptor for InfiniteForLoopFilter {
    fn name(&self) -> &'static str {
        "infinite-for-loop"
    }

    fn description(&self) -> &'static str {
        "Removes mutations that leave a counter loop without a counter write"
    }

    fn begin(&mut self, class: Arc<ClassStreams>) {
        self.class = Some(class);
    }

    fn intercept(
        &mut self,
        candidates: Vec<MutationDetails>,
        mutater: &dyn Mutater,
    ) -> Result<Vec<MutationDetails>> {
        let class = self
            .class
            .clone()
            .expect("intercept called outside begin/end");

        let mut removed: HashSet<MutationIdentifier> = HashSet::new();
        for location in bucket_locations(&candidates) {
            let stream = class.method(&location).ok_or_else(|| Error::UnknownMethod {
                location: location.clone(),
            })?;

            let base = Context::new().with_trace(self.trace);
            if INFINITE_LOOP.matches_with(stream, base.clone()) {
                tracing::debug!(
                    method = %location,
                    "method already matches the infinite shape, skipping bucket"
                );
                continue;
            }

            for candidate in candidates
                .iter()
                .filter(|c| c.id().location() == &location)
            {
                let index = candidate.id().first_index();
                let insn = stream.get(index).ok_or_else(|| Error::IndexOutOfRange {
                    location: location.clone(),
                    index,
                    len: stream.len(),
                })?;
                if insn.opcode() != Opcode::Iinc {
                    continue;
                }

                let mutant = mutater.mutate(candidate.id())?;
                if INFINITE_LOOP.matches_with(mutant.stream(), base.clone()) {
                    tracing::debug!(mutation = %candidate.id(), "mutation makes loop infinite");
                    removed.insert(candidate.id().clone());
                }
            }
        }

        Ok(candidates
            .into_iter()
            .filter(|c| !removed.contains(c.id()))
            .collect())
    }

    fn end(&mut self) {
        self.class = None;
    }
}
