//! Default environment: named constants and built-in math functions.
//!
//! [`install_defaults`] is the startup step that seeds a fresh symbol table.
//! The VM itself never looks at these tables; it only calls whatever
//! function a `bltin` instruction carries.

use crate::error::SymbolError;
use crate::symbol::{Binding, BuiltinFn, SymbolTable};

/// Named constants, installed as ordinary variables.
pub const CONSTANTS: [(&str, f64); 5] = [
    ("PI", 3.141_592_653_5),
    ("E", 2.718_281_828_4),
    ("GAMMA", 0.577_215_664_9), // Euler
    ("DEG", 57.295_779_513),    // degrees per radian
    ("PHI", 1.618_033_988_7),   // golden ratio
];

fn sin(x: f64) -> f64 {
    x.sin()
}

fn cos(x: f64) -> f64 {
    x.cos()
}

fn atan(x: f64) -> f64 {
    x.atan()
}

fn log(x: f64) -> f64 {
    x.ln()
}

fn log10(x: f64) -> f64 {
    x.log10()
}

fn exp(x: f64) -> f64 {
    x.exp()
}

fn sqrt(x: f64) -> f64 {
    x.sqrt()
}

/// Truncate toward zero.
fn int(x: f64) -> f64 {
    x.trunc()
}

fn abs(x: f64) -> f64 {
    x.abs()
}

/// Built-in unary functions.
///
/// Arguments outside a function's domain yield NaN or an infinity; nothing
/// is trapped.
pub const BUILTINS: [BuiltinFn; 9] = [
    BuiltinFn::new("sin", sin),
    BuiltinFn::new("cos", cos),
    BuiltinFn::new("atan", atan),
    BuiltinFn::new("log", log),
    BuiltinFn::new("log10", log10),
    BuiltinFn::new("exp", exp),
    BuiltinFn::new("sqrt", sqrt),
    BuiltinFn::new("int", int),
    BuiltinFn::new("abs", abs),
];

/// Install every constant and built-in into `table`.
pub fn install_defaults(table: &mut SymbolTable) -> Result<(), SymbolError> {
    for (name, value) in CONSTANTS {
        table.install(name, Binding::Variable(value))?;
    }
    for func in BUILTINS {
        table.install(func.name(), Binding::Builtin(func))?;
    }
    Ok(())
}
