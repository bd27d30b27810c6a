//! hoc common types.
//!
//! This crate provides the data structures shared by the VM, the assembler
//! and the command-line driver:
//!
//! - [`Operand`]: tagged value stack entry (number or symbol reference)
//! - [`SymbolTable`]: shadowing, append-only directory of names
//! - [`Instruction`]: the closed instruction set with typed inline operands
//! - [`CodeSegment`]: bounded, append-only, backpatchable code buffer
//! - [`builtins`]: default constants and math functions
//!
//! # Dependencies
//!
//! This crate uses `thiserror` and has no other dependencies.

pub mod builtins;
pub mod code;
pub mod error;
pub mod instruction;
pub mod operand;
pub mod symbol;

// Re-export commonly used types at the crate root.
pub use code::CodeSegment;
pub use error::{CodeError, SymbolError};
pub use instruction::{Address, BranchTargets, Instruction, LoopTargets};
pub use operand::Operand;
pub use symbol::{Binding, BuiltinFn, Symbol, SymbolId, SymbolKind, SymbolTable};
