//! Tagged operands: what lives on the value stack.

use crate::symbol::SymbolId;
use std::fmt;

/// A value stack entry.
///
/// Instructions know statically which variant they expect; the VM checks
/// the tag on every pop instead of reinterpreting the bits.
#[derive(Debug, Clone, Copy)]
pub enum Operand {
    /// A double-precision number.
    Number(f64),
    /// A reference to a symbol table entry (an assignment target, or a
    /// variable whose value has not been read yet).
    Symbol(SymbolId),
}

impl Operand {
    /// The numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n),
            Operand::Symbol(_) => None,
        }
    }

    /// The symbol handle, if this is a symbol reference.
    pub fn as_symbol(&self) -> Option<SymbolId> {
        match self {
            Operand::Symbol(id) => Some(*id),
            Operand::Number(_) => None,
        }
    }
}

// Numbers compare by bit pattern so that NaN results can still be asserted
// on in tests; the VM itself never compares operands.
impl PartialEq for Operand {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Operand::Number(a), Operand::Number(b)) => a.to_bits() == b.to_bits(),
            (Operand::Symbol(a), Operand::Symbol(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(n) => write!(f, "{n:.6}"),
            Operand::Symbol(id) => write!(f, "{id}"),
        }
    }
}
