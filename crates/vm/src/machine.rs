//! VM state: value stack, code segment, program counter, symbol table.

use crate::error::RuntimeError;
use hoc_common::code::DEFAULT_CODE_CAPACITY;
use hoc_common::{
    builtins, Address, Binding, CodeSegment, Instruction, Operand, Symbol, SymbolId, SymbolTable,
};
use std::io::{self, Stdout, Write};
use tracing::debug;

/// Default value stack depth, matching the historical `NSTACK`.
pub const DEFAULT_STACK_CAPACITY: usize = 256;

/// Fixed capacities of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of operands on the value stack.
    pub stack_capacity: usize,
    /// Maximum number of instructions in the code segment.
    pub code_capacity: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
            code_capacity: DEFAULT_CODE_CAPACITY,
        }
    }
}

/// An interpreter session.
///
/// Holds everything a statement reads or mutates. Printed output goes to
/// `W`, standard output unless the machine was built with another writer.
pub struct Machine<W: Write = Stdout> {
    /// Value stack.
    pub(crate) stack: Vec<Operand>,
    pub(crate) stack_capacity: usize,
    /// Compiled code of the current statement.
    pub(crate) code: CodeSegment,
    /// Names live for the whole session; never reset.
    pub(crate) symbols: SymbolTable,
    /// Next slot to fetch. Shared by nested `execute` calls.
    pub(crate) pc: Address,
    /// Address of the instruction currently executing, for error reports.
    pub(crate) current: Address,
    pub(crate) out: W,
}

impl Machine<Stdout> {
    /// A machine with default limits printing to standard output.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Machine<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Machine<W> {
    /// A machine with default limits printing to `out`.
    pub fn with_output(out: W) -> Self {
        Self::with_limits(out, Limits::default())
    }

    pub fn with_limits(out: W, limits: Limits) -> Self {
        Self {
            stack: Vec::new(),
            stack_capacity: limits.stack_capacity,
            code: CodeSegment::with_capacity(limits.code_capacity),
            symbols: SymbolTable::new(),
            pc: 0,
            current: 0,
            out,
        }
    }

    /// Install the default constants and built-in functions.
    pub fn install_defaults(&mut self) -> Result<(), RuntimeError> {
        builtins::install_defaults(&mut self.symbols)?;
        debug!(symbols = self.symbols.len(), "installed default environment");
        Ok(())
    }

    /// Clear the value stack and the code segment. Symbols are kept.
    ///
    /// Call before compiling each top-level statement, and after a
    /// statement fails; the VM never does this on its own.
    pub fn reset(&mut self) {
        debug!(
            stack = self.stack.len(),
            code = self.code.len(),
            "reset stack and code segment"
        );
        self.stack.clear();
        self.code.reset();
        self.pc = 0;
        self.current = 0;
    }

    // --- Emission protocol ---

    /// Append an instruction, returning the address it was written at.
    pub fn emit(&mut self, instr: Instruction) -> Result<Address, RuntimeError> {
        Ok(self.code.emit(instr)?)
    }

    /// Fill in the body and continuation of the `while` record at `at`.
    pub fn patch_while(
        &mut self,
        at: Address,
        body: Address,
        next: Address,
    ) -> Result<(), RuntimeError> {
        Ok(self.code.patch_while(at, body, next)?)
    }

    /// Fill in the branches and continuation of the `if` record at `at`.
    pub fn patch_if(
        &mut self,
        at: Address,
        then: Address,
        otherwise: Option<Address>,
        next: Address,
    ) -> Result<(), RuntimeError> {
        Ok(self.code.patch_if(at, then, otherwise, next)?)
    }

    pub fn code(&self) -> &CodeSegment {
        &self.code
    }

    // --- Symbols ---

    /// Install a new entry for `name`, shadowing any earlier one.
    pub fn install(&mut self, name: &str, binding: Binding) -> Result<SymbolId, RuntimeError> {
        let id = self.symbols.install(name, binding)?;
        debug!(name, %id, kind = %binding.kind(), "installed symbol");
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.symbols.lookup(name)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbol(&self, id: SymbolId) -> Result<&Symbol, RuntimeError> {
        self.symbols
            .get(id)
            .ok_or(RuntimeError::UnknownSymbol { id })
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> Result<&mut Symbol, RuntimeError> {
        self.symbols
            .get_mut(id)
            .ok_or(RuntimeError::UnknownSymbol { id })
    }

    // --- Value stack ---

    /// Push an operand, checking for overflow before writing.
    pub fn push(&mut self, operand: Operand) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.stack_capacity {
            return Err(RuntimeError::StackOverflow { at: self.current });
        }
        self.stack.push(operand);
        Ok(())
    }

    /// Pop the top operand.
    pub fn pop(&mut self) -> Result<Operand, RuntimeError> {
        self.stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { at: self.current })
    }

    pub(crate) fn pop_number(&mut self) -> Result<f64, RuntimeError> {
        match self.pop()? {
            Operand::Number(n) => Ok(n),
            Operand::Symbol(_) => Err(RuntimeError::OperandMismatch {
                at: self.current,
                expected: "numeric",
            }),
        }
    }

    pub(crate) fn pop_symbol(&mut self) -> Result<SymbolId, RuntimeError> {
        match self.pop()? {
            Operand::Symbol(id) => Ok(id),
            Operand::Number(_) => Err(RuntimeError::OperandMismatch {
                at: self.current,
                expected: "symbol",
            }),
        }
    }

    /// Current stack contents, bottom first.
    pub fn stack(&self) -> &[Operand] {
        &self.stack
    }

    /// The program counter.
    pub fn pc(&self) -> Address {
        self.pc
    }

    // --- Output ---

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
