//! CLI command implementations.

use hoc_assembler::{AsmError, Statement};
use hoc_common::code::DEFAULT_CODE_CAPACITY;
use hoc_vm::{Limits, Machine, DEFAULT_STACK_CAPACITY};
use std::fs;
use std::io::Stdout;
use tracing::{debug, warn};

/// Emit and execute every statement of a .hoc file.
///
/// A failing statement is reported and the run continues with the next
/// one; the symbol table keeps every assignment that completed.
pub fn run(args: &[String]) -> Result<(), i32> {
    let input = require_input(args, "run")?;
    let statements = read_statements(input)?;
    let mut vm = machine()?;
    let mut failed = 0usize;

    for stmt in &statements {
        vm.reset();
        let outcome = match stmt.emit(&mut vm) {
            Ok(start) => vm.execute(start).map_err(|e| e.to_string()),
            Err(e @ AsmError::Emit { .. }) => Err(e.to_string()),
            Err(e) => {
                eprintln!("error: {e}");
                return Err(1);
            }
        };
        if let Err(message) = outcome {
            eprintln!("hoc: {message}");
            failed += 1;
        }
    }
    vm.reset();

    if failed > 0 {
        warn!(failed, total = statements.len(), "statements failed");
        return Err(3);
    }
    Ok(())
}

/// Emit each statement of a .hoc file and print its canonical code.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    let input = require_input(args, "disassemble")?;
    let statements = read_statements(input)?;
    let mut vm = machine()?;

    for stmt in &statements {
        vm.reset();
        stmt.emit(&mut vm).map_err(|e| {
            eprintln!("error: {e}");
            1
        })?;
        print!("{}", hoc_assembler::disassemble(vm.code(), vm.symbols()));
        println!(".end");
    }
    Ok(())
}

/// List the built-in environment, newest entry first.
pub fn symbols(args: &[String]) -> Result<(), i32> {
    if let Some(extra) = args.first() {
        eprintln!("error: unexpected argument '{extra}'");
        eprintln!("Usage: hoc symbols");
        return Err(1);
    }

    let vm = machine()?;
    for (_, sym) in vm.symbols().iter() {
        match sym.value() {
            Some(value) => println!("{}\t{}\t{value:.6}", sym.name(), sym.kind()),
            None => println!("{}\t{}", sym.name(), sym.kind()),
        }
    }
    Ok(())
}

// --- Helpers ---

fn require_input<'a>(args: &'a [String], command: &str) -> Result<&'a str, i32> {
    match args {
        [input] => Ok(input.as_str()),
        [] => {
            eprintln!("error: {command} requires an input file");
            eprintln!("Usage: hoc {command} <input.hoc>");
            Err(1)
        }
        [_, extra, ..] => {
            eprintln!("error: unexpected argument '{extra}'");
            Err(1)
        }
    }
}

/// Read and assemble a .hoc text file.
fn read_statements(path: &str) -> Result<Vec<Statement>, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    let statements = hoc_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    debug!(path, statements = statements.len(), "assembled");
    Ok(statements)
}

/// A stdout machine sized from the environment, with the defaults installed.
fn machine() -> Result<Machine<Stdout>, i32> {
    let limits = limits_from(|key| std::env::var(key).ok()).map_err(|message| {
        eprintln!("error: {message}");
        1
    })?;
    let mut vm = Machine::with_limits(std::io::stdout(), limits);
    vm.install_defaults().map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    Ok(vm)
}

/// Build [`Limits`] from `HOC_STACK` / `HOC_CODE`, falling back to the defaults.
fn limits_from(get: impl Fn(&str) -> Option<String>) -> Result<Limits, String> {
    let capacity = |key: &str, default: usize| -> Result<usize, String> {
        match get(key) {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(format!("{key} must be a positive integer, got '{raw}'")),
            },
        }
    };

    Ok(Limits {
        stack_capacity: capacity("HOC_STACK", DEFAULT_STACK_CAPACITY)?,
        code_capacity: capacity("HOC_CODE", DEFAULT_CODE_CAPACITY)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn limits_default_when_unset() {
        assert_eq!(limits_from(env(&[])).unwrap(), Limits::default());
    }

    #[test]
    fn limits_read_overrides() {
        let limits = limits_from(env(&[("HOC_STACK", "8"), ("HOC_CODE", " 64 ")])).unwrap();
        assert_eq!(limits.stack_capacity, 8);
        assert_eq!(limits.code_capacity, 64);
    }

    #[test]
    fn limits_reject_garbage_and_zero() {
        let err = limits_from(env(&[("HOC_STACK", "lots")])).unwrap_err();
        assert_eq!(err, "HOC_STACK must be a positive integer, got 'lots'");
        assert!(limits_from(env(&[("HOC_CODE", "0")])).is_err());
    }

    #[test]
    fn require_input_arity() {
        let one = vec!["a.hoc".to_string()];
        assert_eq!(require_input(&one, "run"), Ok("a.hoc"));
        assert_eq!(require_input(&[], "run"), Err(1));
        let two = vec!["a.hoc".to_string(), "b.hoc".to_string()];
        assert_eq!(require_input(&two, "run"), Err(1));
    }
}
