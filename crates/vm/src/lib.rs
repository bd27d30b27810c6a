//! hoc virtual machine: executes compiled statements.
//!
//! The VM is a stack machine with:
//! - A bounded value stack of tagged [`Operand`](hoc_common::Operand)s
//! - A bounded, backpatchable code segment
//! - A single program counter shared by nested `execute` calls
//! - A shadowing symbol table that outlives every statement
//!
//! All of it lives in one [`Machine`]. A front end emits instructions into
//! the machine, a driver runs them with [`Machine::execute`] and calls
//! [`Machine::reset`] before the next statement, including after an error.
//!
//! # Usage
//!
//! ```
//! use hoc_common::{Binding, Instruction};
//! use hoc_vm::Machine;
//!
//! let mut vm = Machine::with_output(Vec::new());
//! let two = vm.install("", Binding::Variable(2.0)).unwrap();
//! let three = vm.install("", Binding::Variable(3.0)).unwrap();
//!
//! vm.emit(Instruction::ConstPush(two)).unwrap();
//! vm.emit(Instruction::ConstPush(three)).unwrap();
//! vm.emit(Instruction::Add).unwrap();
//! vm.emit(Instruction::PrExpr).unwrap();
//! vm.emit(Instruction::Stop).unwrap();
//! vm.execute(0).unwrap();
//!
//! assert_eq!(vm.output().as_slice(), b"5.000000\n");
//! ```

pub mod error;
pub mod execute;
pub mod machine;

pub use error::RuntimeError;
pub use machine::{Limits, Machine, DEFAULT_STACK_CAPACITY};
