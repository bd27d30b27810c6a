//! Errors raised by the code segment and the symbol table.

use thiserror::Error;

/// Errors from emitting into or patching the code segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// Emission attempted with every slot already in use.
    #[error("program too big (capacity {capacity})")]
    ProgramTooBig { capacity: usize },

    /// The slot at `at` is not an emitted control record of the patched kind.
    #[error("cannot patch slot {at}")]
    BadPatch { at: usize },
}

/// Errors from installing into the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// Storage for a new entry could not be reserved.
    #[error("out of memory")]
    OutOfMemory,

    /// Assignment to an entry that is not a variable (a built-in).
    #[error("assignment to non-variable {name}")]
    NotAVariable { name: String },
}
