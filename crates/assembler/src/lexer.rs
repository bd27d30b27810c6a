//! Tokenizer for hoc assembly text.

use crate::error::AsmError;
use hoc_common::Address;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// A mnemonic, directive, symbol name or label reference. Case is kept;
    /// mnemonics are matched case-insensitively by the parser.
    Ident(String),
    /// A numeric literal.
    Number(f64),
    /// A label definition, `name:`.
    Label(String),
    /// An absolute code address, `@N`.
    Address(Address),
    /// The missing-else marker, `-`.
    Dash,
}

impl Token {
    /// Source-like rendering for error messages.
    pub(crate) fn text(&self) -> String {
        match self {
            Token::Ident(s) => s.clone(),
            Token::Number(n) => n.to_string(),
            Token::Label(s) => format!("{s}:"),
            Token::Address(a) => format!("@{a}"),
            Token::Dash => "-".to_string(),
        }
    }
}

fn looks_numeric(word: &str) -> bool {
    let digits = word.strip_prefix(['-', '+']).unwrap_or(word);
    digits
        .as_bytes()
        .first()
        .is_some_and(|b| b.is_ascii_digit() || *b == b'.')
}

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` and extend to end of line.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let line = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };

    let mut tokens = Vec::new();
    for word in line.split_whitespace() {
        let token = if word == "-" {
            Token::Dash
        } else if let Some(addr) = word.strip_prefix('@') {
            let value = addr.parse().map_err(|_| AsmError::InvalidNumber {
                line: line_num,
                token: word.to_string(),
            })?;
            Token::Address(value)
        } else if looks_numeric(word) {
            // Constants are always finite.
            let value = word
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| AsmError::InvalidNumber {
                    line: line_num,
                    token: word.to_string(),
                })?;
            Token::Number(value)
        } else if let Some(name) = word.strip_suffix(':').filter(|n| !n.is_empty()) {
            Token::Label(name.to_string())
        } else {
            Token::Ident(word.to_string())
        };
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    #[test]
    fn empty_line() {
        assert_eq!(tokenize_line("", 1).unwrap(), vec![]);
    }

    #[test]
    fn comment_only() {
        assert_eq!(tokenize_line("   ; just a comment", 1).unwrap(), vec![]);
    }

    #[test]
    fn mnemonic_with_comment() {
        assert_eq!(
            tokenize_line("  add ; a + b", 1).unwrap(),
            vec![ident("add")]
        );
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(
            tokenize_line("VARPUSH PI", 1).unwrap(),
            vec![ident("VARPUSH"), ident("PI")]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokenize_line("constpush 2.5", 1).unwrap(),
            vec![ident("constpush"), Token::Number(2.5)]
        );
        assert_eq!(
            tokenize_line("constpush -3", 1).unwrap(),
            vec![ident("constpush"), Token::Number(-3.0)]
        );
        assert_eq!(
            tokenize_line("constpush .5", 1).unwrap(),
            vec![ident("constpush"), Token::Number(0.5)]
        );
        assert_eq!(
            tokenize_line("constpush 1e3", 1).unwrap(),
            vec![ident("constpush"), Token::Number(1000.0)]
        );
    }

    #[test]
    fn labels_addresses_and_dash() {
        assert_eq!(
            tokenize_line("top: if then - @12", 4).unwrap(),
            vec![
                Token::Label("top".to_string()),
                ident("if"),
                ident("then"),
                Token::Dash,
                Token::Address(12),
            ]
        );
    }

    #[test]
    fn overflowing_literal_rejected() {
        assert_eq!(
            tokenize_line("constpush 1e400", 2).unwrap_err(),
            AsmError::InvalidNumber {
                line: 2,
                token: "1e400".to_string()
            }
        );
        assert!(tokenize_line("constpush -1e400", 2).is_err());
    }

    #[test]
    fn lone_colon_is_an_ident() {
        assert_eq!(tokenize_line(":", 1).unwrap(), vec![ident(":")]);
    }

    #[test]
    fn invalid_number() {
        assert_eq!(
            tokenize_line("constpush 1.2.3", 3).unwrap_err(),
            AsmError::InvalidNumber {
                line: 3,
                token: "1.2.3".to_string()
            }
        );
    }

    #[test]
    fn invalid_address() {
        assert_eq!(
            tokenize_line("while @x @2", 2).unwrap_err(),
            AsmError::InvalidNumber {
                line: 2,
                token: "@x".to_string()
            }
        );
    }

    #[test]
    fn token_text() {
        assert_eq!(Token::Address(3).text(), "@3");
        assert_eq!(Token::Label("l".to_string()).text(), "l:");
        assert_eq!(Token::Number(2.0).text(), "2");
    }
}
