//! Filter for mutations of a for-loop counter's increment.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::bytecode::Opcode;
use crate::core::{Error, Result};
use crate::mutation::{Mutater, MutationDetails};
use crate::sequence::Context;

use super::patterns::{counter_loop, CounterLoopPattern};
use super::{ClassStreams, MutationInterceptor};

static COUNTER_LOOP: Lazy<CounterLoopPattern> = Lazy::new(counter_loop);

/// Removes candidates sitting on the increment of a matched counter loop.
///
/// Mutating the only increment of a `for` loop rarely produces anything but
/// a test timeout, which costs a full deadline and contributes nothing to
/// the score. Candidates on any other instruction pass through untouched,
/// loop or no loop.
#[derive(Debug, Default)]
pub struct AvoidLoopCounterFilter {
    class: Option<Arc<ClassStreams>>,
    trace: bool,
}

impl AvoidLoopCounterFilter {
    /// Create the filter.
    pub fn new(trace: bool) -> Self {
        Self { class: None, trace }
    }

    fn is_loop_counter_increment(
        &self,
        class: &ClassStreams,
        candidate: &MutationDetails,
    ) -> Result<bool> {
        let id = candidate.id();
        let &[index] = id.indexes() else {
            return Ok(false);
        };

        let stream = class.method(id.location()).ok_or_else(|| Error::UnknownMethod {
            location: id.location().clone(),
        })?;
        if index >= stream.len() {
            return Err(Error::IndexOutOfRange {
                location: id.location().clone(),
                index,
                len: stream.len(),
            });
        }
        if stream[index].opcode() != Opcode::Iinc {
            return Ok(false);
        }

        let ctx = Context::new()
            .with_trace(self.trace)
            .bind(COUNTER_LOOP.mutated.write(), index);
        Ok(COUNTER_LOOP.matcher.matches_with(stream, ctx))
    }
}

impl MutationInterceptor for AvoidLoopCounterFilter {
    fn name(&self) -> &'static str {
        "avoid-loop-counter"
    }

    fn description(&self) -> &'static str {
        "Removes mutations of a for-loop counter's increment"
    }

    fn begin(&mut self, class: Arc<ClassStreams>) {
        self.class = Some(class);
    }

    fn intercept(
        &mut self,
        candidates: Vec<MutationDetails>,
        _mutater: &dyn Mutater,
    ) -> Result<Vec<MutationDetails>> {
        let class = self
            .class
            .clone()
            .expect("intercept called outside begin/end");

        let mut survivors = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if self.is_loop_counter_increment(&class, &candidate)? {
                tracing::debug!(mutation = %candidate.id(), "removed loop-counter mutation");
            } else {
                survivors.push(candidate);
            }
        }
        Ok(survivors)
    }

    fn end(&mut self) {
        self.class = None;
    }
}
