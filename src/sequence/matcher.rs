//! The compiled backtracking matcher.

use crate::bytecode::InstructionStream;

use super::context::Context;
use super::query::{Match, Step};

/// A compiled [`SequenceQuery`](super::SequenceQuery).
///
/// `matches` tries the whole chain starting at every position of the stream
/// until one attempt succeeds or all fail; the matcher only answers
/// existence, it never enumerates matches. Backtracking is position-local:
/// a failed `then` step fails the attempt at that start position, and
/// alternation and the quantifiers are the only branch points.
///
/// Matchers are immutable and safe to share across threads; all attempt
/// state lives in the [`Context`].
pub struct SequenceMatcher {
    steps: Vec<Step>,
    ignore: Match,
}

/// Continuation stack for nested sub-patterns.
enum Cont<'a> {
    Done,
    Seq {
        steps: &'a [Step],
        parent: &'a Cont<'a>,
    },
}

impl SequenceMatcher {
    pub(crate) fn new(steps: Vec<Step>, ignore: Match) -> Self {
        Self { steps, ignore }
    }

    /// Whether the pattern matches anywhere in the stream.
    pub fn matches(&self, stream: &InstructionStream) -> bool {
        self.matches_with(stream, Context::new())
    }

    /// Like [`matches`](Self::matches), but every attempt starts from the
    /// given base context. Used to pre-bind slots, e.g. anchoring a pattern
    /// on a concrete instruction index. The base bindings persist across
    /// start positions; everything bound during a failed attempt is
    /// discarded.
    pub fn matches_with(&self, stream: &InstructionStream, base: Context) -> bool {
        if stream.is_empty() {
            return self
                .run(stream, &self.steps, 0, base, &Cont::Done)
                .is_some();
        }
        (0..stream.len()).any(|start| {
            self.run(stream, &self.steps, start, base.clone(), &Cont::Done)
                .is_some()
        })
    }

    /// Match `steps` at `pos`, continuing into `cont` when they are
    /// exhausted. Returns the cursor and context after a successful match.
    fn run(
        &self,
        stream: &InstructionStream,
        steps: &[Step],
        pos: usize,
        ctx: Context,
        cont: &Cont<'_>,
    ) -> Option<(usize, Context)> {
        let Some((step, rest)) = steps.split_first() else {
            return match cont {
                Cont::Done => Some((pos, ctx)),
                Cont::Seq { steps, parent } => self.run(stream, steps, pos, ctx, parent),
            };
        };

        match step {
            Step::Then(m) => {
                let cursor = self.next_unignored(stream, pos)?;
                let trace = ctx.trace_enabled();
                match m.test(&ctx, stream, cursor) {
                    Some(next) => {
                        if trace {
                            tracing::trace!(step = m.name(), pos = cursor, "step matched");
                        }
                        self.run(stream, rest, cursor + 1, next, cont)
                    }
                    None => {
                        if trace {
                            tracing::trace!(step = m.name(), pos = cursor, "step failed");
                        }
                        None
                    }
                }
            }
            Step::ZeroOrMore(body) => {
                // Greedy: try one more repetition, re-entering this step
                // afterwards, before falling through to the rest.
                let again = Cont::Seq {
                    steps,
                    parent: cont,
                };
                if let Some(hit) = self.run(stream, body, pos, ctx.clone(), &again) {
                    return Some(hit);
                }
                self.run(stream, rest, pos, ctx, cont)
            }
            Step::Or(alternatives) => {
                let after = Cont::Seq {
                    steps: rest,
                    parent: cont,
                };
                alternatives
                    .iter()
                    .find_map(|alt| self.run(stream, alt, pos, ctx.clone(), &after))
            }
            Step::Negate(body) => {
                if self
                    .run(stream, body, pos, ctx.clone(), &Cont::Done)
                    .is_some()
                {
                    return None;
                }
                self.run(stream, rest, pos, ctx, cont)
            }
        }
    }

    /// Advance past ignored instructions; `None` once past the end.
    fn next_unignored(&self, stream: &InstructionStream, mut pos: usize) -> Option<usize> {
        let scratch = Context::new();
        while pos < stream.len() {
            if self.ignore.test(&scratch, stream, pos).is_some() {
                pos += 1;
            } else {
                return Some(pos);
            }
        }
        None
    }
}
