//! Compiled loop patterns shared by the filters.
//!
//! Two counter-loop shapes cover what compilers emit for a `for` loop: the
//! guard test placed before the body with a back-edge goto at the end, and
//! the javac layout that jumps to a trailing guard first. The loop bound may
//! come from a constant, a local or field read, an array length or a call.

use crate::bytecode::{LabelId, Opcode};
use crate::sequence::{
    a_conditional_jump, a_conditional_jump_to, a_goto_back_to, a_goto_to, a_label,
    a_label_bound_to, a_loop_bound, a_method_call_named, an_increment_of, an_integer_load_of,
    an_integer_store, any_instruction, opcode, target_instruction, writes_to, Match,
    SequenceMatcher, SequenceQuery, Slot,
};

/// Counter-loop matcher anchored on a concrete increment instruction.
pub(crate) struct CounterLoopPattern {
    /// Pre-bind this slot to the index of the instruction under scrutiny.
    pub mutated: Slot<usize>,
    pub matcher: SequenceMatcher,
}

/// Both counter-loop shapes, with the increment required to sit at the
/// pre-bound `mutated` index.
pub(crate) fn counter_loop() -> CounterLoopPattern {
    let counter: Slot<u32> = Slot::new("counter");
    let body: Slot<LabelId> = Slot::new("body");
    let test: Slot<LabelId> = Slot::new("test");
    let mutated: Slot<usize> = Slot::new("mutated");

    let anchored_increment =
        an_increment_of(counter.read()).and(target_instruction(mutated.read()));

    let test_at_bottom = SequenceQuery::first(an_integer_store(counter.write()))
        .zero_or_more(SequenceQuery::first(opcode(Opcode::Label)))
        .then(a_goto_to(test.write()))
        .then(a_label(body.write()))
        .zero_or_more(SequenceQuery::first(any_instruction()))
        .then(anchored_increment.clone())
        .then(a_label_bound_to(test.read()))
        .then(an_integer_load_of(counter.read()))
        .zero_or_more(SequenceQuery::first(a_loop_bound()))
        .then(a_conditional_jump_to(body.read()));

    let test_at_top = SequenceQuery::first(an_integer_store(counter.write()))
        .then(a_label(body.write()))
        .then(an_integer_load_of(counter.read()))
        .zero_or_more(SequenceQuery::first(a_loop_bound()))
        .then(a_conditional_jump())
        .zero_or_more(SequenceQuery::first(any_instruction()))
        .then(anchored_increment)
        .then(a_goto_back_to(body.read()));

    CounterLoopPattern {
        mutated,
        matcher: test_at_bottom.or(test_at_top).compile(),
    }
}

/// A counter loop whose body never writes the guard variable: once entered
/// it cannot terminate through the guard.
pub(crate) fn infinite_counter_loop() -> SequenceMatcher {
    let counter: Slot<u32> = Slot::new("counter");
    let body: Slot<LabelId> = Slot::new("body");
    let test: Slot<LabelId> = Slot::new("test");

    let no_counter_write: Match = any_instruction().and(writes_to(counter.read()).not());

    let test_at_bottom = SequenceQuery::first(an_integer_store(counter.write()))
        .zero_or_more(SequenceQuery::first(opcode(Opcode::Label)))
        .then(a_goto_to(test.write()))
        .then(a_label(body.write()))
        .zero_or_more(SequenceQuery::first(no_counter_write.clone()))
        .then(a_label_bound_to(test.read()))
        .then(an_integer_load_of(counter.read()))
        .zero_or_more(SequenceQuery::first(a_loop_bound()))
        .then(a_conditional_jump_to(body.read()));

    let test_at_top = SequenceQuery::first(an_integer_store(counter.write()))
        .then(a_label(body.write()))
        .then(an_integer_load_of(counter.read()))
        .zero_or_more(SequenceQuery::first(a_loop_bound()))
        .then(a_conditional_jump())
        .zero_or_more(SequenceQuery::first(no_counter_write))
        .then(a_goto_back_to(body.read()));

    test_at_bottom.or(test_at_top).compile()
}

/// A has-next guarded loop whose body never calls a `next`-style method:
/// the iterator can never advance.
pub(crate) fn infinite_iterator_loop() -> SequenceMatcher {
    let loop_start: Slot<LabelId> = Slot::new("loop_start");

    let no_next_call: Match = any_instruction().and(a_method_call_named("next").not());

    SequenceQuery::first(a_label(loop_start.write()))
        .then(opcode(Opcode::ALoad))
        .then(a_method_call_named("hasNext"))
        .then(a_conditional_jump())
        .zero_or_more(SequenceQuery::first(no_next_call))
        .then(a_goto_back_to(loop_start.read()))
        .compile()
}
