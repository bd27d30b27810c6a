//! The code segment: a bounded, append-only buffer of instructions.
//!
//! [`CodeSegment::emit`] returns the address the instruction was stored at,
//! so a front end can hold on to a control-flow record's address and fill in
//! its targets once they are known. Patching is the only way to change an
//! already-emitted slot.

use crate::error::CodeError;
use crate::instruction::{Address, BranchTargets, Instruction, LoopTargets};

/// Default number of slots, matching the historical `NPROG`.
pub const DEFAULT_CODE_CAPACITY: usize = 2000;

/// Compiled code for the statement currently being built or run.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeSegment {
    slots: Vec<Instruction>,
    capacity: usize,
}

impl Default for CodeSegment {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CODE_CAPACITY)
    }
}

impl CodeSegment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty segment that holds at most `capacity` instructions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Append an instruction and return the address it was written at.
    pub fn emit(&mut self, instr: Instruction) -> Result<Address, CodeError> {
        if self.slots.len() >= self.capacity {
            return Err(CodeError::ProgramTooBig {
                capacity: self.capacity,
            });
        }
        let at = self.slots.len();
        self.slots.push(instr);
        Ok(at)
    }

    /// Fill in the targets of the `while` record at `at`.
    pub fn patch_while(
        &mut self,
        at: Address,
        body: Address,
        next: Address,
    ) -> Result<(), CodeError> {
        match self.slots.get_mut(at) {
            Some(Instruction::While(targets)) => {
                *targets = LoopTargets {
                    body: Some(body),
                    next: Some(next),
                };
                Ok(())
            }
            _ => Err(CodeError::BadPatch { at }),
        }
    }

    /// Fill in the targets of the `if` record at `at`.
    pub fn patch_if(
        &mut self,
        at: Address,
        then: Address,
        otherwise: Option<Address>,
        next: Address,
    ) -> Result<(), CodeError> {
        match self.slots.get_mut(at) {
            Some(Instruction::If(targets)) => {
                *targets = BranchTargets {
                    then: Some(then),
                    otherwise,
                    next: Some(next),
                };
                Ok(())
            }
            _ => Err(CodeError::BadPatch { at }),
        }
    }

    /// Rewind to empty, discarding everything emitted so far.
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    /// The instruction at `at`, if it has been emitted.
    pub fn get(&self, at: Address) -> Option<&Instruction> {
        self.slots.get(at)
    }

    /// Address the next `emit` will write to.
    pub fn next_address(&self) -> Address {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.slots
    }
}
