use crate::token::{Token, TokenType};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error: {message}")]
pub struct ScanError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct ParseError {
    pub line: usize,
    /// `" at end"` or `" at 'lexeme'"`.
    pub location: String,
    pub message: String,
}

impl ParseError {
    pub fn new(token: &Token, message: &str) -> ParseError {
        let location = match token.tokentype {
            TokenType::EOF => " at end".to_string(),
            _ => format!(" at '{}'", token.lexeme),
        };
        ParseError {
            line: token.line,
            location,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}\n[line {line}]", line = .token.line)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: &Token, message: &str) -> RuntimeError {
        RuntimeError {
            token: token.clone(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::Scan(e) => e.line,
            Diagnostic::Parse(e) => e.line,
            Diagnostic::Runtime(e) => e.token.line,
        }
    }
    /// Where the error happened: the parse location hint, or the offending
    /// lexeme for runtime errors. Scan errors have no location.
    pub fn location(&self) -> &str {
        match self {
            Diagnostic::Scan(_) => "",
            Diagnostic::Parse(e) => &e.location,
            Diagnostic::Runtime(e) => &e.token.lexeme,
        }
    }
    pub fn message(&self) -> &str {
        match self {
            Diagnostic::Scan(e) => &e.message,
            Diagnostic::Parse(e) => &e.message,
            Diagnostic::Runtime(e) => &e.message,
        }
    }
    pub fn is_static(&self) -> bool {
        !matches!(self, Diagnostic::Runtime(_))
    }
}

/// Ordered record of everything that went wrong during a run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }
    pub fn report<E: Into<Diagnostic>>(&mut self, error: E) {
        self.entries.push(error.into());
    }
    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::{Diagnostic, Diagnostics, ParseError, RuntimeError, ScanError};
    use crate::token::{Token, TokenType};
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_error_locations() {
        let semi = Token::new(TokenType::Semicolon, ";", 3, 7);
        let eof = Token::new(TokenType::EOF, "", 4, 1);
        assert_eq!(
            ParseError::new(&semi, "Expect expression.").to_string(),
            "[line 3] Error at ';': Expect expression."
        );
        assert_eq!(
            ParseError::new(&eof, "Expect ';' after value.").to_string(),
            "[line 4] Error at end: Expect ';' after value."
        );
    }

    #[test]
    fn runtime_error_display() {
        let minus = Token::new(TokenType::Minus, "-", 2, 3);
        let error = RuntimeError::new(&minus, "Operand must be a number.");
        assert_eq!(error.to_string(), "Operand must be a number.\n[line 2]");
        let diagnostic = Diagnostic::from(error);
        assert_eq!(diagnostic.line(), 2);
        assert_eq!(diagnostic.location(), "-");
        assert!(!diagnostic.is_static());
    }

    #[test]
    fn collector_keeps_order() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_errors());
        diagnostics.report(ScanError {
            line: 1,
            column: 2,
            message: "Unexpected character.".to_string(),
        });
        diagnostics.report(ParseError::new(
            &Token::new(TokenType::EOF, "", 1, 3),
            "Expect expression.",
        ));
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(Diagnostic::is_static));
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message()).collect();
        assert_eq!(messages, vec!["Unexpected character.", "Expect expression."]);
    }
}
