//! Runtime errors for the hoc VM.
//!
//! Every variant is fatal to the top-level statement being executed. The
//! VM returns the error straight up through every nested `execute` call;
//! the driver reports it, resets the machine and moves on. Symbols assigned
//! before the failure keep their new values.

use hoc_common::{CodeError, SymbolError, SymbolId};
use thiserror::Error;

/// Errors that abort execution of the current statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Push onto a full value stack.
    #[error("stack overflow at instruction {at}")]
    StackOverflow { at: usize },

    /// Pop from an empty value stack.
    #[error("stack underflow at instruction {at}")]
    StackUnderflow { at: usize },

    /// Emission into a full code segment.
    #[error("program too big (capacity {capacity})")]
    ProgramTooBig { capacity: usize },

    /// Division with a right operand of exactly zero.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// Read of a symbol that has never been assigned.
    #[error("undefined variable {name}")]
    UndefinedVariable { name: String },

    /// Assignment to a built-in.
    #[error("assignment to non-variable {name}")]
    AssignmentToNonVariable { name: String },

    /// The symbol table could not grow.
    #[error("out of memory")]
    OutOfMemory,

    /// Numeric read of a built-in function symbol.
    #[error("{name} is not a number")]
    NotANumber { name: String },

    /// The popped operand was not the variant the instruction needs.
    #[error("expected {expected} operand at instruction {at}")]
    OperandMismatch { at: usize, expected: &'static str },

    /// The program counter ran past the emitted code without a STOP.
    #[error("unexpected end of program at instruction {at}")]
    UnexpectedEndOfProgram { at: usize },

    /// A WHILE or IF record whose targets were never patched.
    #[error("unresolved jump target at instruction {at}")]
    UnresolvedTarget { at: usize },

    /// Patch of a slot that is not the matching control record.
    #[error("cannot patch slot {at}")]
    BadPatch { at: usize },

    /// A symbol handle that does not belong to this machine's table.
    #[error("unknown symbol {id}")]
    UnknownSymbol { id: SymbolId },

    /// Writing printed output failed.
    #[error("output error: {message}")]
    Output { message: String },
}

impl From<CodeError> for RuntimeError {
    fn from(err: CodeError) -> Self {
        match err {
            CodeError::ProgramTooBig { capacity } => RuntimeError::ProgramTooBig { capacity },
            CodeError::BadPatch { at } => RuntimeError::BadPatch { at },
        }
    }
}

impl From<SymbolError> for RuntimeError {
    fn from(err: SymbolError) -> Self {
        match err {
            SymbolError::OutOfMemory => RuntimeError::OutOfMemory,
            SymbolError::NotAVariable { name } => RuntimeError::AssignmentToNonVariable { name },
        }
    }
}
