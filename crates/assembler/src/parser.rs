//! Parser for hoc assembly tokens → statement items.
//!
//! Parsing does not touch a machine: symbol names and jump targets stay
//! textual until the statement is emitted.

use crate::error::AsmError;
use crate::lexer::Token;
use hoc_common::instruction::NULLARY;
use hoc_common::{Address, Instruction};

/// A jump target as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Target {
    Label(String),
    Address(Address),
}

/// One instruction, with names and targets not yet resolved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    /// An instruction without inline operands.
    Simple(Instruction),
    ConstPush(f64),
    VarPush(String),
    Bltin(String),
    While {
        body: Target,
        next: Target,
    },
    If {
        then: Target,
        otherwise: Option<Target>,
        next: Target,
    },
}

/// What a line contributes after its optional label.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Body {
    Op(Op),
    /// `.end`: closes the current top-level statement.
    End,
}

/// A parsed line.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Line {
    pub(crate) label: Option<String>,
    pub(crate) body: Option<Body>,
}

fn lookup_nullary(mnemonic: &str) -> Option<Instruction> {
    NULLARY.iter().find(|i| i.mnemonic() == mnemonic).copied()
}

/// Parse the tokens of a single line.
///
/// Returns an empty [`Line`] for blank lines.
pub(crate) fn parse_line(tokens: &[Token], line_num: usize) -> Result<Line, AsmError> {
    let mut rest = tokens;
    let mut line = Line::default();

    if let Some(Token::Label(name)) = rest.first() {
        line.label = Some(name.clone());
        rest = &rest[1..];
    }

    let Some(first) = rest.first() else {
        return Ok(line);
    };
    let mnemonic = match first {
        Token::Ident(s) => s.to_lowercase(),
        other => {
            return Err(AsmError::UnexpectedToken {
                line: line_num,
                token: other.text(),
            })
        }
    };
    let args = &rest[1..];

    let body = match mnemonic.as_str() {
        ".end" => {
            expect_end(args, line_num)?;
            Body::End
        }
        "constpush" => {
            let value = expect_number(args, 0, line_num, "constpush", 1)?;
            expect_end(&args[1..], line_num)?;
            Body::Op(Op::ConstPush(value))
        }
        "varpush" => {
            let name = expect_name(args, 0, line_num, "varpush", 1)?;
            expect_end(&args[1..], line_num)?;
            Body::Op(Op::VarPush(name))
        }
        "bltin" => {
            let name = expect_name(args, 0, line_num, "bltin", 1)?;
            expect_end(&args[1..], line_num)?;
            Body::Op(Op::Bltin(name))
        }
        "while" => {
            let body = expect_target(args, 0, line_num, "while", 2)?;
            let next = expect_target(args, 1, line_num, "while", 2)?;
            expect_end(&args[2..], line_num)?;
            Body::Op(Op::While { body, next })
        }
        "if" => {
            let then = expect_target(args, 0, line_num, "if", 3)?;
            let otherwise = match args.get(1) {
                Some(Token::Dash) => None,
                Some(_) => Some(expect_target(args, 1, line_num, "if", 3)?),
                None => {
                    return Err(AsmError::MissingArgument {
                        line: line_num,
                        mnemonic: "if",
                        expected: 3,
                    })
                }
            };
            let next = expect_target(args, 2, line_num, "if", 3)?;
            expect_end(&args[3..], line_num)?;
            Body::Op(Op::If {
                then,
                otherwise,
                next,
            })
        }
        other => {
            let instr = lookup_nullary(other).ok_or_else(|| AsmError::UnknownMnemonic {
                line: line_num,
                token: first.text(),
            })?;
            expect_end(args, line_num)?;
            Body::Op(Op::Simple(instr))
        }
    };

    line.body = Some(body);
    Ok(line)
}

fn expect_end(args: &[Token], line_num: usize) -> Result<(), AsmError> {
    match args.first() {
        None => Ok(()),
        Some(tok) => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: tok.text(),
        }),
    }
}

fn expect_arg<'t>(
    args: &'t [Token],
    idx: usize,
    line_num: usize,
    mnemonic: &'static str,
    expected: usize,
) -> Result<&'t Token, AsmError> {
    args.get(idx).ok_or(AsmError::MissingArgument {
        line: line_num,
        mnemonic,
        expected,
    })
}

fn expect_number(
    args: &[Token],
    idx: usize,
    line_num: usize,
    mnemonic: &'static str,
    expected: usize,
) -> Result<f64, AsmError> {
    match expect_arg(args, idx, line_num, mnemonic, expected)? {
        Token::Number(n) => Ok(*n),
        other => Err(AsmError::InvalidNumber {
            line: line_num,
            token: other.text(),
        }),
    }
}

fn expect_name(
    args: &[Token],
    idx: usize,
    line_num: usize,
    mnemonic: &'static str,
    expected: usize,
) -> Result<String, AsmError> {
    match expect_arg(args, idx, line_num, mnemonic, expected)? {
        Token::Ident(name) => Ok(name.clone()),
        other => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: other.text(),
        }),
    }
}

fn expect_target(
    args: &[Token],
    idx: usize,
    line_num: usize,
    mnemonic: &'static str,
    expected: usize,
) -> Result<Target, AsmError> {
    match expect_arg(args, idx, line_num, mnemonic, expected)? {
        Token::Ident(label) => Ok(Target::Label(label.clone())),
        Token::Address(at) => Ok(Target::Address(*at)),
        other => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: other.text(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize_line;

    fn parse(text: &str) -> Result<Line, AsmError> {
        parse_line(&tokenize_line(text, 1)?, 1)
    }

    fn op(text: &str) -> Op {
        match parse(text).unwrap().body {
            Some(Body::Op(op)) => op,
            other => panic!("expected op, got {other:?}"),
        }
    }

    #[test]
    fn blank_line() {
        assert_eq!(parse("  ; nothing").unwrap(), Line::default());
    }

    #[test]
    fn nullary_mnemonics_case_insensitive() {
        assert_eq!(op("ADD"), Op::Simple(Instruction::Add));
        assert_eq!(op("prexpr"), Op::Simple(Instruction::PrExpr));
        assert_eq!(op("Neg"), Op::Simple(Instruction::Negate));
    }

    #[test]
    fn operand_mnemonics() {
        assert_eq!(op("constpush 4"), Op::ConstPush(4.0));
        assert_eq!(op("varpush Count"), Op::VarPush("Count".to_string()));
        assert_eq!(op("bltin sqrt"), Op::Bltin("sqrt".to_string()));
    }

    #[test]
    fn control_targets() {
        assert_eq!(
            op("while body done"),
            Op::While {
                body: Target::Label("body".to_string()),
                next: Target::Label("done".to_string()),
            }
        );
        assert_eq!(
            op("if @4 - @9"),
            Op::If {
                then: Target::Address(4),
                otherwise: None,
                next: Target::Address(9),
            }
        );
    }

    #[test]
    fn label_with_and_without_instruction() {
        let line = parse("loop: eval").unwrap();
        assert_eq!(line.label.as_deref(), Some("loop"));
        assert_eq!(line.body, Some(Body::Op(Op::Simple(Instruction::Eval))));

        let line = parse("done:").unwrap();
        assert_eq!(line.label.as_deref(), Some("done"));
        assert_eq!(line.body, None);
    }

    #[test]
    fn end_directive() {
        assert_eq!(parse(".END").unwrap().body, Some(Body::End));
    }

    #[test]
    fn unknown_mnemonic() {
        assert!(matches!(
            parse("jmp 3"),
            Err(AsmError::UnknownMnemonic { line: 1, .. })
        ));
    }

    #[test]
    fn missing_arguments() {
        assert!(matches!(
            parse("while body"),
            Err(AsmError::MissingArgument {
                mnemonic: "while",
                expected: 2,
                ..
            })
        ));
        assert!(matches!(
            parse("if then"),
            Err(AsmError::MissingArgument { mnemonic: "if", .. })
        ));
        assert!(matches!(
            parse("constpush"),
            Err(AsmError::MissingArgument { .. })
        ));
    }

    #[test]
    fn wrong_argument_kinds() {
        assert_eq!(
            parse("constpush x"),
            Err(AsmError::InvalidNumber {
                line: 1,
                token: "x".to_string()
            })
        );
        assert_eq!(
            parse("varpush 3"),
            Err(AsmError::UnexpectedToken {
                line: 1,
                token: "3".to_string()
            })
        );
        assert_eq!(
            parse("add extra"),
            Err(AsmError::UnexpectedToken {
                line: 1,
                token: "extra".to_string()
            })
        );
    }

    #[test]
    fn number_in_mnemonic_position() {
        assert!(matches!(
            parse("42"),
            Err(AsmError::UnexpectedToken { .. })
        ));
    }
}
