//! Augur - static-analysis core for bytecode mutation testing.
//!
//! Augur decides which instruction-level mutations are worth executing and
//! how a method body splits into basic blocks for coverage probes. It takes
//! decoded instruction streams as input and hands surviving candidate
//! mutations to an external test-execution harness; decoding, execution and
//! reporting live outside this crate.
//!
//! # Example
//!
//! ```
//! use augur::bytecode::{partition, Instruction, InstructionStream, Opcode};
//! use augur::core::MethodLocation;
//!
//! let stream = InstructionStream::new(
//!     MethodLocation::new("com/example/Foo", "bar", "()V"),
//!     vec![
//!         Instruction::constant(0),
//!         Instruction::var(Opcode::IStore, 1),
//!         Instruction::simple(Opcode::Return),
//!     ],
//!     Vec::new(),
//! )
//! .unwrap();
//!
//! let blocks = partition(&stream);
//! assert_eq!(blocks.len(), 1);
//! ```

pub mod bytecode;
pub mod config;
pub mod core;
pub mod filters;
pub mod mutation;
pub mod sequence;

pub use self::core::{Error, MethodLocation, Result};
pub use config::Config;
pub use filters::{default_registry, ClassStreams, FilterPipeline, MutationInterceptor};
pub use mutation::{DetectionStatus, Mutant, Mutater, MutationDetails, MutationIdentifier};
