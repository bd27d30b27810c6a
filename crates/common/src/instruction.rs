//! The hoc instruction set.
//!
//! Compiled code is a sequence of [`Instruction`] records. Each record
//! carries its own typed inline operands: a symbol handle for
//! `ConstPush`/`VarPush`, a function for `Bltin`, and target addresses for
//! the two control-flow records.
//!
//! Control-flow layout: a `While` or `If` record is immediately followed by
//! its condition sub-program, which runs until a `Stop`. Body, branch and
//! continuation addresses live in the record itself and are usually not
//! known when the record is emitted; the front end emits the record with
//! unresolved targets and patches them later (see
//! [`CodeSegment::patch_while`](crate::CodeSegment::patch_while)).

use crate::symbol::{BuiltinFn, SymbolId};

/// Index of a slot in the code segment.
pub type Address = usize;

/// Targets of a `while` loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopTargets {
    /// Start of the loop body sub-program.
    pub body: Option<Address>,
    /// Where execution resumes once the condition is false.
    pub next: Option<Address>,
}

/// Targets of an `if` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BranchTargets {
    /// Start of the then-part.
    pub then: Option<Address>,
    /// Start of the else-part. `None` when there is no else-part.
    pub otherwise: Option<Address>,
    /// Where execution resumes after whichever part ran.
    pub next: Option<Address>,
}

/// A single instruction record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    /// Terminates the current `execute` invocation.
    Stop,
    /// Pop and discard the top of stack.
    Pop,

    /// Push the number stored in a constant symbol.
    ConstPush(SymbolId),
    /// Push a reference to a symbol.
    VarPush(SymbolId),
    /// Pop a symbol reference, push its value.
    Eval,
    /// Pop a value and a target reference, store, push the value back.
    Assign,

    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Negate,

    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,

    And,
    Or,
    Not,

    /// Pop one number, apply the function, push the result.
    Bltin(BuiltinFn),

    /// Pop and print with a leading tab.
    Print,
    /// Pop and print without the leading tab.
    PrExpr,

    /// Loop; the condition sub-program follows inline.
    While(LoopTargets),
    /// Conditional; the condition sub-program follows inline.
    If(BranchTargets),
}

/// Every instruction that takes no inline operand.
pub const NULLARY: [Instruction; 21] = [
    Instruction::Stop,
    Instruction::Pop,
    Instruction::Eval,
    Instruction::Assign,
    Instruction::Add,
    Instruction::Sub,
    Instruction::Mul,
    Instruction::Div,
    Instruction::Pow,
    Instruction::Negate,
    Instruction::Gt,
    Instruction::Lt,
    Instruction::Ge,
    Instruction::Le,
    Instruction::Eq,
    Instruction::Ne,
    Instruction::And,
    Instruction::Or,
    Instruction::Not,
    Instruction::Print,
    Instruction::PrExpr,
];

impl Instruction {
    /// An unpatched `while` record.
    pub fn while_unresolved() -> Self {
        Instruction::While(LoopTargets::default())
    }

    /// An unpatched `if` record.
    pub fn if_unresolved() -> Self {
        Instruction::If(BranchTargets::default())
    }

    /// Lowercase assembly mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Stop => "stop",
            Instruction::Pop => "pop",
            Instruction::ConstPush(_) => "constpush",
            Instruction::VarPush(_) => "varpush",
            Instruction::Eval => "eval",
            Instruction::Assign => "assign",
            Instruction::Add => "add",
            Instruction::Sub => "sub",
            Instruction::Mul => "mul",
            Instruction::Div => "div",
            Instruction::Pow => "pow",
            Instruction::Negate => "neg",
            Instruction::Gt => "gt",
            Instruction::Lt => "lt",
            Instruction::Ge => "ge",
            Instruction::Le => "le",
            Instruction::Eq => "eq",
            Instruction::Ne => "ne",
            Instruction::And => "and",
            Instruction::Or => "or",
            Instruction::Not => "not",
            Instruction::Bltin(_) => "bltin",
            Instruction::Print => "print",
            Instruction::PrExpr => "prexpr",
            Instruction::While(_) => "while",
            Instruction::If(_) => "if",
        }
    }

    /// True for the execution terminator.
    pub fn is_stop(&self) -> bool {
        matches!(self, Instruction::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullary_mnemonics_are_unique() {
        let mut seen: Vec<&str> = NULLARY.iter().map(|i| i.mnemonic()).collect();
        let before = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), before);
    }

    #[test]
    fn unresolved_control_records_have_no_targets() {
        assert_eq!(
            Instruction::while_unresolved(),
            Instruction::While(LoopTargets {
                body: None,
                next: None
            })
        );
        match Instruction::if_unresolved() {
            Instruction::If(t) => {
                assert_eq!(t.then, None);
                assert_eq!(t.otherwise, None);
                assert_eq!(t.next, None);
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn operand_records_have_mnemonics() {
        assert_eq!(Instruction::VarPush(SymbolId::new(0)).mnemonic(), "varpush");
        assert_eq!(Instruction::Negate.mnemonic(), "neg");
        assert!(Instruction::Stop.is_stop());
        assert!(!Instruction::Pop.is_stop());
    }
}
