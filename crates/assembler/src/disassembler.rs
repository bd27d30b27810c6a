//! Disassembler: code segment → canonical assembly text.
//!
//! One instruction per line, lowercase mnemonics, no labels or comments.
//! Jump targets are written as absolute `@N` addresses and a missing else
//! part as `-`.

use hoc_common::{Address, CodeSegment, Instruction, SymbolId, SymbolTable};

fn target(addr: Option<Address>) -> String {
    match addr {
        Some(a) => format!("@{a}"),
        // Unpatched; does not reassemble.
        None => "?".to_string(),
    }
}

fn constant(symbols: &SymbolTable, id: SymbolId) -> String {
    match symbols.get(id).and_then(|sym| sym.value()) {
        Some(v) => v.to_string(),
        None => id.to_string(),
    }
}

fn name(symbols: &SymbolTable, id: SymbolId) -> String {
    match symbols.get(id) {
        Some(sym) => sym.name().to_string(),
        None => id.to_string(),
    }
}

/// Disassemble every emitted instruction in `code`.
pub fn disassemble(code: &CodeSegment, symbols: &SymbolTable) -> String {
    let mut lines = Vec::with_capacity(code.len());

    for instr in code.instructions() {
        let mnemonic = instr.mnemonic();
        let line = match instr {
            Instruction::ConstPush(id) => format!("{mnemonic} {}", constant(symbols, *id)),
            Instruction::VarPush(id) => format!("{mnemonic} {}", name(symbols, *id)),
            Instruction::Bltin(func) => format!("{mnemonic} {}", func.name()),
            Instruction::While(t) => {
                format!("{mnemonic} {} {}", target(t.body), target(t.next))
            }
            Instruction::If(t) => {
                let otherwise = match t.otherwise {
                    Some(a) => format!("@{a}"),
                    None => "-".to_string(),
                };
                format!(
                    "{mnemonic} {} {otherwise} {}",
                    target(t.then),
                    target(t.next)
                )
            }
            _ => mnemonic.to_string(),
        };
        lines.push(line);
    }

    let mut result = lines.join("\n");
    if !result.is_empty() {
        result.push('\n');
    }
    result
}
