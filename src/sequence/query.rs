//! Match predicates and query composition.
//!
//! A [`Match`] decides whether a single instruction fits, optionally binding
//! or comparing slot values. A [`SequenceQuery`] chains matches into a
//! pattern with quantifiers, alternation and negation, and compiles into a
//! [`SequenceMatcher`](super::SequenceMatcher).

use std::sync::Arc;

use crate::bytecode::{InstructionStream, LabelId, Opcode};

use super::context::Context;
use super::slot::{SlotRead, SlotWrite};

type MatchFn = dyn Fn(&Context, &InstructionStream, usize) -> Option<Context> + Send + Sync;

/// A predicate over one instruction at one position, with slot effects.
///
/// Returns the (possibly extended) context on success, `None` on failure.
#[derive(Clone)]
pub struct Match {
    name: &'static str,
    test: Arc<MatchFn>,
}

impl Match {
    /// Build a match from a raw predicate.
    pub fn new(
        name: &'static str,
        test: impl Fn(&Context, &InstructionStream, usize) -> Option<Context> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            test: Arc::new(test),
        }
    }

    /// The debug name of this match.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Both this match and `other` must accept the instruction; slot effects
    /// compose left to right.
    pub fn and(self, other: Match) -> Match {
        Match::new("and", move |ctx, stream, pos| {
            let ctx = (self.test)(ctx, stream, pos)?;
            (other.test)(&ctx, stream, pos)
        })
    }

    /// Either match may accept the instruction; tried in order.
    pub fn or(self, other: Match) -> Match {
        Match::new("or", move |ctx, stream, pos| {
            (self.test)(ctx, stream, pos).or_else(|| (other.test)(ctx, stream, pos))
        })
    }

    /// Succeeds, without slot effects, exactly when this match fails.
    pub fn not(self) -> Match {
        Match::new("not", move |ctx, stream, pos| {
            if (self.test)(ctx, stream, pos).is_some() {
                None
            } else {
                Some(ctx.clone())
            }
        })
    }

    pub(crate) fn test(&self, ctx: &Context, stream: &InstructionStream, pos: usize) -> Option<Context> {
        (self.test)(ctx, stream, pos)
    }
}

impl std::fmt::Debug for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match").field("name", &self.name).finish()
    }
}

/// Accepts any instruction.
pub fn any_instruction() -> Match {
    Match::new("any_instruction", |ctx, _, _| Some(ctx.clone()))
}

/// Accepts instructions with the given opcode.
pub fn opcode(op: Opcode) -> Match {
    Match::new("opcode", move |ctx, stream, pos| {
        (stream[pos].opcode() == op).then(|| ctx.clone())
    })
}

/// An integer store, binding the stored variable index.
pub fn an_integer_store(slot: SlotWrite<u32>) -> Match {
    Match::new("an_integer_store", move |ctx, stream, pos| {
        let insn = &stream[pos];
        if insn.opcode() != Opcode::IStore {
            return None;
        }
        insn.local_var().map(|var| ctx.bind(slot, var))
    })
}

/// An integer store to the variable already bound in the slot.
pub fn an_integer_store_to(slot: SlotRead<u32>) -> Match {
    Match::new("an_integer_store_to", move |ctx, stream, pos| {
        let insn = &stream[pos];
        if insn.opcode() != Opcode::IStore {
            return None;
        }
        (insn.local_var() == Some(ctx.retrieve(slot)?)).then(|| ctx.clone())
    })
}

/// An integer load, binding the loaded variable index.
pub fn an_integer_load(slot: SlotWrite<u32>) -> Match {
    Match::new("an_integer_load", move |ctx, stream, pos| {
        let insn = &stream[pos];
        if insn.opcode() != Opcode::ILoad {
            return None;
        }
        insn.local_var().map(|var| ctx.bind(slot, var))
    })
}

/// An integer load of the variable already bound in the slot.
pub fn an_integer_load_of(slot: SlotRead<u32>) -> Match {
    Match::new("an_integer_load_of", move |ctx, stream, pos| {
        let insn = &stream[pos];
        if insn.opcode() != Opcode::ILoad {
            return None;
        }
        (insn.local_var() == Some(ctx.retrieve(slot)?)).then(|| ctx.clone())
    })
}

/// An increment of any variable, binding the variable index.
pub fn an_increment(slot: SlotWrite<u32>) -> Match {
    Match::new("an_increment", move |ctx, stream, pos| {
        let insn = &stream[pos];
        if insn.opcode() != Opcode::Iinc {
            return None;
        }
        insn.local_var().map(|var| ctx.bind(slot, var))
    })
}

/// An increment of the variable already bound in the slot.
pub fn an_increment_of(slot: SlotRead<u32>) -> Match {
    Match::new("an_increment_of", move |ctx, stream, pos| {
        let insn = &stream[pos];
        if insn.opcode() != Opcode::Iinc {
            return None;
        }
        (insn.local_var() == Some(ctx.retrieve(slot)?)).then(|| ctx.clone())
    })
}

/// Any write to the variable bound in the slot: a store or an increment.
pub fn writes_to(slot: SlotRead<u32>) -> Match {
    Match::new("writes_to", move |ctx, stream, pos| {
        let insn = &stream[pos];
        let writes = matches!(insn.opcode(), Opcode::IStore | Opcode::Iinc);
        (writes && insn.local_var() == Some(ctx.retrieve(slot)?)).then(|| ctx.clone())
    })
}

/// A label definition, binding the label.
pub fn a_label(slot: SlotWrite<LabelId>) -> Match {
    Match::new("a_label", move |ctx, stream, pos| {
        stream[pos].defined_label().map(|id| ctx.bind(slot, id))
    })
}

/// The definition of the label already bound in the slot.
pub fn a_label_bound_to(slot: SlotRead<LabelId>) -> Match {
    Match::new("a_label_bound_to", move |ctx, stream, pos| {
        (stream[pos].defined_label() == Some(ctx.retrieve(slot)?)).then(|| ctx.clone())
    })
}

/// An unconditional goto, binding its target label.
pub fn a_goto_to(slot: SlotWrite<LabelId>) -> Match {
    Match::new("a_goto_to", move |ctx, stream, pos| {
        let insn = &stream[pos];
        if insn.opcode() != Opcode::Goto {
            return None;
        }
        insn.jump_target().map(|target| ctx.bind(slot, target))
    })
}

/// An unconditional goto back to the label already bound in the slot.
pub fn a_goto_back_to(slot: SlotRead<LabelId>) -> Match {
    Match::new("a_goto_back_to", move |ctx, stream, pos| {
        let insn = &stream[pos];
        if insn.opcode() != Opcode::Goto {
            return None;
        }
        (insn.jump_target() == Some(ctx.retrieve(slot)?)).then(|| ctx.clone())
    })
}

/// Any conditional jump, target unconstrained.
pub fn a_conditional_jump() -> Match {
    Match::new("a_conditional_jump", |ctx, stream, pos| {
        stream[pos]
            .opcode()
            .is_conditional_jump()
            .then(|| ctx.clone())
    })
}

/// A conditional jump to the label already bound in the slot.
pub fn a_conditional_jump_to(slot: SlotRead<LabelId>) -> Match {
    Match::new("a_conditional_jump_to", move |ctx, stream, pos| {
        let insn = &stream[pos];
        if !insn.opcode().is_conditional_jump() {
            return None;
        }
        (insn.jump_target() == Some(ctx.retrieve(slot)?)).then(|| ctx.clone())
    })
}

/// Any method call.
pub fn a_method_call() -> Match {
    Match::new("a_method_call", |ctx, stream, pos| {
        stream[pos].opcode().is_invoke().then(|| ctx.clone())
    })
}

/// A method call with the given simple name, any owner.
pub fn a_method_call_named(name: &'static str) -> Match {
    Match::new("a_method_call_named", move |ctx, stream, pos| {
        let insn = &stream[pos];
        if !insn.opcode().is_invoke() {
            return None;
        }
        (insn.member().map(|m| m.name.as_str()) == Some(name)).then(|| ctx.clone())
    })
}

/// The instruction at the index already bound in the slot.
///
/// Used to anchor a pattern on a concrete instruction, e.g. the one a
/// candidate mutation targets; the caller pre-binds the slot through
/// [`SequenceMatcher::matches_with`](super::SequenceMatcher::matches_with).
pub fn target_instruction(slot: SlotRead<usize>) -> Match {
    Match::new("target_instruction", move |ctx, _, pos| {
        (ctx.retrieve(slot)? == pos).then(|| ctx.clone())
    })
}

/// Instructions that push a loop bound onto the stack: a constant, a local
/// or field read, an array length, or a call result.
pub fn a_loop_bound() -> Match {
    Match::new("a_loop_bound", |ctx, stream, pos| {
        let op = stream[pos].opcode();
        let pushes_bound = matches!(
            op,
            Opcode::Const
                | Opcode::ILoad
                | Opcode::ALoad
                | Opcode::GetField
                | Opcode::GetStatic
                | Opcode::ArrayLength
        ) || op.is_invoke();
        pushes_bound.then(|| ctx.clone())
    })
}

/// Debug markers the engine skips by default: line numbers and frames.
pub fn a_debug_marker() -> Match {
    Match::new("a_debug_marker", |ctx, stream, pos| {
        stream[pos].opcode().is_debug_marker().then(|| ctx.clone())
    })
}

/// One step of a compiled pattern.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Match one instruction.
    Then(Match),
    /// Match the sub-pattern any number of times, greedily.
    ZeroOrMore(Vec<Step>),
    /// Alternatives tried in declaration order.
    Or(Vec<Vec<Step>>),
    /// Zero-width: succeeds when the sub-pattern does not match here.
    Negate(Vec<Step>),
}

/// A composable instruction-sequence pattern.
///
/// Queries chain left to right and are compiled once into a
/// [`SequenceMatcher`](super::SequenceMatcher). Quantified sub-queries must
/// consume at least one instruction per repetition.
#[derive(Debug, Clone, Default)]
pub struct SequenceQuery {
    pub(crate) steps: Vec<Step>,
}

impl SequenceQuery {
    /// Start a query with one match.
    pub fn first(m: Match) -> Self {
        Self {
            steps: vec![Step::Then(m)],
        }
    }

    /// The next non-ignored instruction must satisfy `m`.
    pub fn then(mut self, m: Match) -> Self {
        self.steps.push(Step::Then(m));
        self
    }

    /// The sub-query may repeat any number of times, greedily.
    pub fn zero_or_more(mut self, query: SequenceQuery) -> Self {
        self.steps.push(Step::ZeroOrMore(query.steps));
        self
    }

    /// The sub-query must match at least once, then may repeat.
    pub fn one_or_more(mut self, query: SequenceQuery) -> Self {
        self.steps.extend(query.steps.clone());
        self.steps.push(Step::ZeroOrMore(query.steps));
        self
    }

    /// Alternation: this query or `other`, tried in that order. The engine
    /// commits to the first alternative under which the rest of the chain
    /// matches.
    pub fn or(self, other: SequenceQuery) -> Self {
        Self {
            steps: vec![Step::Or(vec![self.steps, other.steps])],
        }
    }

    /// Zero-width negation: succeeds at a position exactly when this query
    /// does not match there, consuming nothing.
    pub fn negate(self) -> Self {
        Self {
            steps: vec![Step::Negate(self.steps)],
        }
    }

    /// Append another query's steps to this one.
    pub fn followed_by(mut self, other: SequenceQuery) -> Self {
        self.steps.extend(other.steps);
        self
    }

    /// Compile with an explicit ignore set.
    pub fn compile_with_ignore(self, ignore: Match) -> super::SequenceMatcher {
        super::SequenceMatcher::new(self.steps, ignore)
    }

    /// Compile, skipping line and frame markers transparently.
    pub fn compile(self) -> super::SequenceMatcher {
        self.compile_with_ignore(a_debug_marker())
    }
}
