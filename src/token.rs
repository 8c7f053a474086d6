use crate::value::Value;
use std::fmt;
use strum_macros::{Display, EnumDiscriminants, EnumIter};

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Display, EnumDiscriminants)]
#[strum_discriminants(name(TokenKind), derive(EnumIter))]
pub enum TokenType {
    // Single-character tokens.
    LeftParen, RightParen, LeftBrace, RightBrace,
    Comma, Dot, Minus, Plus, Semicolon, Slash, Star,

    // One or two character tokens.
    Bang, BangEqual,
    Equal, EqualEqual,
    Greater, GreaterEqual,
    Less, LessEqual,

    // Literals.
    Identifier, String(String), Number(f64),

    // Keywords.
    And, Class, Else, False, Fun, For, If, Nil, Or,
    Print, Return, Super, This, True, Var, While,

    EOF
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tokentype: TokenType,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(tokentype: TokenType, lexeme: &str, line: usize, column: usize) -> Token {
        Token {
            tokentype,
            lexeme: lexeme.to_string(),
            line,
            column,
        }
    }
    pub fn kind(&self) -> TokenKind {
        TokenKind::from(&self.tokentype)
    }
    /// The runtime value carried by a literal token, if any.
    pub fn literal(&self) -> Option<Value> {
        match &self.tokentype {
            TokenType::String(s) => Some(Value::String(s.clone())),
            TokenType::Number(n) => Some(Value::Number(*n)),
            TokenType::True => Some(Value::Boolean(true)),
            TokenType::False => Some(Value::Boolean(false)),
            TokenType::Nil => Some(Value::Nil),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' {}:{}", self.tokentype, self.lexeme, self.line, self.column)
    }
}

#[cfg(test)]
mod token_tests {
    use crate::token::{Token, TokenKind, TokenType};
    use crate::value::Value;

    #[test]
    fn kind_ignores_payload() {
        let a = Token::new(TokenType::Number(1.0), "1", 1, 1);
        let b = Token::new(TokenType::Number(2.5), "2.5", 1, 3);
        assert_eq!(a.kind(), TokenKind::Number);
        assert_eq!(a.kind(), b.kind());
        assert_ne!(a.kind(), TokenKind::String);
    }

    #[test]
    fn literal_values() {
        let s = Token::new(TokenType::String("hi".to_string()), "\"hi\"", 1, 1);
        assert_eq!(s.literal(), Some(Value::String("hi".to_string())));
        assert_eq!(Token::new(TokenType::Nil, "nil", 1, 1).literal(), Some(Value::Nil));
        assert_eq!(Token::new(TokenType::Identifier, "x", 1, 1).literal(), None);
    }
}
