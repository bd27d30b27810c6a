//! Error types for the hoc assembler.

use hoc_vm::RuntimeError;
use thiserror::Error;

/// Errors produced while parsing assembly text or emitting it into a machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized mnemonic or directive.
    #[error("line {line}: unknown mnemonic '{token}'")]
    UnknownMnemonic { line: usize, token: String },

    /// A mnemonic did not have enough arguments.
    #[error("line {line}: {mnemonic} expects {expected} argument(s)")]
    MissingArgument {
        line: usize,
        mnemonic: &'static str,
        expected: usize,
    },

    /// A numeric literal or address could not be parsed.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// A label was defined twice in one statement.
    #[error("line {line}: duplicate label '{label}'")]
    DuplicateLabel { line: usize, label: String },

    /// A jump target names a label the statement never defines.
    #[error("line {line}: undefined label '{label}'")]
    UndefinedLabel { line: usize, label: String },

    /// `bltin` names something that is not a built-in function.
    #[error("line {line}: '{name}' is not a built-in function")]
    NotABuiltin { line: usize, name: String },

    /// The machine rejected an emission, patch or symbol installation.
    #[error("line {line}: {source}")]
    Emit { line: usize, source: RuntimeError },
}
