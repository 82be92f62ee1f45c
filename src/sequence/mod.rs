//! A backtracking sequence matcher over instruction streams.
//!
//! The alphabet is [`Instruction`](crate::bytecode::Instruction) rather than
//! character, and captures are named [`Slot`]s rather than numbered groups.
//! Loop and iterator shapes are not recognizable from any single
//! instruction: whether an increment can hang a test depends on a
//! comparison, a back-jump and a shared variable spread across the method.
//! Declaring those shapes as sequence queries keeps the filters testable and
//! lets several unrelated filters share one engine.
//!
//! # Example
//!
//! ```
//! use augur::bytecode::{Instruction, InstructionStream, Opcode};
//! use augur::core::MethodLocation;
//! use augur::sequence::{an_integer_load_of, an_integer_store, SequenceQuery, Slot};
//!
//! let var: Slot<u32> = Slot::new("var");
//! let matcher = SequenceQuery::first(an_integer_store(var.write()))
//!     .then(an_integer_load_of(var.read()))
//!     .compile();
//!
//! let stream = InstructionStream::new(
//!     MethodLocation::new("com/example/Foo", "bar", "()V"),
//!     vec![
//!         Instruction::var(Opcode::IStore, 1),
//!         Instruction::line(5),
//!         Instruction::var(Opcode::ILoad, 1),
//!         Instruction::simple(Opcode::Return),
//!     ],
//!     Vec::new(),
//! )
//! .unwrap();
//!
//! assert!(matcher.matches(&stream));
//! ```

mod context;
mod matcher;
mod query;
mod slot;

pub use context::Context;
pub use matcher::SequenceMatcher;
pub use query::{
    a_conditional_jump, a_conditional_jump_to, a_debug_marker, a_goto_back_to, a_goto_to, a_label,
    a_label_bound_to, a_loop_bound, a_method_call, a_method_call_named, an_increment,
    an_increment_of, an_integer_load, an_integer_load_of, an_integer_store, an_integer_store_to,
    any_instruction, opcode, target_instruction, writes_to, Match, SequenceQuery,
};
pub use slot::{Slot, SlotRead, SlotType, SlotValue, SlotWrite};
