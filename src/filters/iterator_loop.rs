//! Filter for mutations that remove an iterator loop's advance.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::core::{Error, Result};
use crate::mutation::{Mutater, MutationDetails, MutationIdentifier};
use crate::sequence::{Context, SequenceMatcher};

use super::infinite_loop::bucket_locations;
use super::patterns::infinite_iterator_loop;
use super::{ClassStreams, MutationInterceptor};

static ITERATOR_LOOP: Lazy<SequenceMatcher> = Lazy::new(infinite_iterator_loop);

/// Removes candidates whose mutated method contains a has-next guarded loop
/// with no remaining `next`-style call.
///
/// Same give-up rule as the counter variant: a method that already matches
/// the infinite shape is skipped wholesale.
#[derive(Debug, Default)]
pub struct InfiniteIteratorLoopFilter {
    class: Option<Arc<ClassStreams>>,
    trace: bool,
}

impl InfiniteIteratorLoopFilter {
    /// Create the filter.
    pub fn new(trace: bool) -> Self {
        Self { class: None, trace }
    }
}

impl MutationInterceptor for InfiniteIteratorLoopFilter {
    fn name(&self) -> &'static str {
        "infinite-iterator-loop"
    }

    fn description(&self) -> &'static str {
        "Removes mutations that leave a has-next loop without a next call"
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
            if ITERATOR_LOOP.matches_with(stream, base.clone()) {
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
                if !insn.opcode().is_invoke() {
                    continue;
                }

                let mutant = mutater.mutate(candidate.id())?;
                if ITERATOR_LOOP.matches_with(mutant.stream(), base.clone()) {
                    tracing::debug!(mutation = %candidate.id(), "mutation stalls iterator loop");
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
