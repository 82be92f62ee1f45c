//! Per-attempt matching state.

use std::collections::HashMap;

use super::slot::{SlotId, SlotRead, SlotType, SlotValue, SlotWrite};

/// The mutable state of one match attempt: slot bindings plus a trace flag.
///
/// Contexts are passed by value through the engine; a step that binds a slot
/// produces an updated copy, so a failed branch simply discards its copy and
/// the caller's bindings are untouched. This keeps concurrent attempts
/// trivially independent.
#[derive(Debug, Clone, Default)]
pub struct Context {
    bindings: HashMap<SlotId, SlotValue>,
    trace: bool,
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable step tracing for attempts started from this context.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Whether step tracing is enabled.
    pub fn trace_enabled(&self) -> bool {
        self.trace
    }

    /// Bind a value into a slot, returning the updated context.
    pub fn bind<T: SlotType>(&self, slot: SlotWrite<T>, value: T) -> Context {
        let mut next = self.clone();
        next.bindings.insert(slot.id(), value.into_value());
        if next.trace {
            tracing::trace!(slot = slot.name(), "bound slot");
        }
        next
    }

    /// Retrieve the value previously bound to a slot, if any.
    pub fn retrieve<T: SlotType>(&self, slot: SlotRead<T>) -> Option<T> {
        self.bindings.get(&slot.id()).and_then(T::from_value)
    }
}
