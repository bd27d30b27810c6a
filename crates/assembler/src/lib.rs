//! hoc assembler: translation between text and code segments.
//!
//! The assembler is a minimal front end for the VM: one instruction per
//! line, no expression syntax. It follows the same emission contract a
//! compiler would: control-flow records are emitted before their targets
//! are known and backpatched once every label in the statement has an
//! address.
//!
//! # Usage
//!
//! ```
//! use hoc_assembler::{assemble, disassemble};
//! use hoc_vm::Machine;
//!
//! let text = "constpush 2\nconstpush 3\nconstpush 4\nmul\nadd\nprexpr\nstop\n";
//! let statements = assemble(text).unwrap();
//!
//! let mut vm = Machine::with_output(Vec::new());
//! let start = statements[0].emit(&mut vm).unwrap();
//! vm.execute(start).unwrap();
//! assert_eq!(vm.output().as_slice(), b"14.000000\n");
//! assert_eq!(disassemble(vm.code(), vm.symbols()), text);
//! ```
//!
//! # Statements
//!
//! A source file is a sequence of top-level statements separated by
//! `.end` lines. Labels are local to their statement. Each statement is
//! meant to be emitted into a freshly reset machine.

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use error::AsmError;

use hoc_common::{Address, Binding, Instruction, SymbolId};
use hoc_vm::Machine;
use lexer::tokenize_line;
use parser::{parse_line, Body, Op, Target};
use std::collections::HashMap;
use std::io::Write;

/// One parsed top-level statement, ready to be emitted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    /// Label definitions and instructions, with their source line numbers.
    items: Vec<(usize, Item)>,
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Label(String),
    Op(Op),
}

/// A control record waiting for its targets.
struct Pending {
    at: Address,
    line: usize,
    op: Op,
}

impl Statement {
    /// True if the statement has no instructions and no labels.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of instructions this statement emits.
    pub fn len(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, item)| matches!(item, Item::Op(_)))
            .count()
    }

    /// Emit the statement at the machine's next free address.
    ///
    /// Names are resolved against the machine's symbol table: `varpush`
    /// installs an undefined symbol on first reference, `constpush`
    /// installs an anonymous constant. Returns the start address.
    pub fn emit<W: Write>(&self, vm: &mut Machine<W>) -> Result<Address, AsmError> {
        let start = vm.code().next_address();
        let mut labels: HashMap<&str, Address> = HashMap::new();
        let mut pending = Vec::new();

        for (line, item) in &self.items {
            let line = *line;
            match item {
                Item::Label(name) => {
                    let here = vm.code().next_address();
                    if labels.insert(name.as_str(), here).is_some() {
                        return Err(AsmError::DuplicateLabel {
                            line,
                            label: name.clone(),
                        });
                    }
                }
                Item::Op(op) => {
                    let instr = resolve(vm, op, line)?;
                    let at = vm
                        .emit(instr)
                        .map_err(|source| AsmError::Emit { line, source })?;
                    if matches!(op, Op::While { .. } | Op::If { .. }) {
                        pending.push(Pending {
                            at,
                            line,
                            op: op.clone(),
                        });
                    }
                }
            }
        }

        for Pending { at, line, op } in pending {
            let target = |t: &Target| -> Result<Address, AsmError> {
                match t {
                    Target::Address(a) => Ok(*a),
                    Target::Label(name) => {
                        labels
                            .get(name.as_str())
                            .copied()
                            .ok_or_else(|| AsmError::UndefinedLabel {
                                line,
                                label: name.clone(),
                            })
                    }
                }
            };
            let patched = match &op {
                Op::While { body, next } => vm.patch_while(at, target(body)?, target(next)?),
                Op::If {
                    then,
                    otherwise,
                    next,
                } => {
                    let otherwise = otherwise.as_ref().map(&target).transpose()?;
                    vm.patch_if(at, target(then)?, otherwise, target(next)?)
                }
                _ => Ok(()),
            };
            patched.map_err(|source| AsmError::Emit { line, source })?;
        }

        Ok(start)
    }
}

/// Turn a parsed op into an instruction record, resolving names.
/// Control records come back unresolved.
fn resolve<W: Write>(vm: &mut Machine<W>, op: &Op, line: usize) -> Result<Instruction, AsmError> {
    let emit_err = |source| AsmError::Emit { line, source };
    Ok(match op {
        Op::Simple(instr) => *instr,
        Op::ConstPush(value) => {
            let id = vm
                .install("", Binding::Variable(*value))
                .map_err(emit_err)?;
            Instruction::ConstPush(id)
        }
        Op::VarPush(name) => Instruction::VarPush(variable(vm, name).map_err(emit_err)?),
        Op::Bltin(name) => {
            let func = vm
                .lookup(name)
                .and_then(|id| vm.symbol(id).ok())
                .and_then(|sym| sym.builtin())
                .ok_or_else(|| AsmError::NotABuiltin {
                    line,
                    name: name.clone(),
                })?;
            Instruction::Bltin(func)
        }
        Op::While { .. } => Instruction::while_unresolved(),
        Op::If { .. } => Instruction::if_unresolved(),
    })
}

fn variable<W: Write>(vm: &mut Machine<W>, name: &str) -> Result<SymbolId, hoc_vm::RuntimeError> {
    match vm.lookup(name) {
        Some(id) => Ok(id),
        None => vm.install(name, Binding::Undefined),
    }
}

/// Parse assembly text into top-level statements.
///
/// Returns the first error encountered. Blank statements (nothing between
/// two `.end` lines) are dropped.
pub fn assemble(text: &str) -> Result<Vec<Statement>, AsmError> {
    let mut statements = Vec::new();
    let mut current = Statement::default();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        let parsed = parse_line(&tokens, line_num)?;

        if let Some(label) = parsed.label {
            current.items.push((line_num, Item::Label(label)));
        }
        match parsed.body {
            Some(Body::Op(op)) => current.items.push((line_num, Item::Op(op))),
            Some(Body::End) => {
                if !current.is_empty() {
                    statements.push(std::mem::take(&mut current));
                }
            }
            None => {}
        }
    }

    if !current.is_empty() {
        statements.push(current);
    }
    Ok(statements)
}

/// Render a code segment as canonical assembly text.
///
/// Jump targets come out as absolute `@N` addresses, so the text
/// reassembles to the same records when emitted at the same base address
/// into a machine whose symbol table resolves the same names.
pub fn disassemble(code: &hoc_common::CodeSegment, symbols: &hoc_common::SymbolTable) -> String {
    disassembler::disassemble(code, symbols)
}
