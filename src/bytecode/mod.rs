//! Decoded method bodies: instructions, streams and basic blocks.
//!
//! Decoding itself is an external concern; this module defines the model the
//! decoder produces and the block analysis built on top of it.

pub mod blocks;
mod instruction;
mod opcode;
mod stream;

pub use blocks::{partition, Block};
pub use instruction::{Instruction, LabelId, MemberRef, Payload};
pub use opcode::Opcode;
pub use stream::{InstructionStream, TryCatchRegion};
