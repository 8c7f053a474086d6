use crate::error::{Diagnostics, ScanError};
use crate::token::{Token, TokenType};
use phf::phf_map;
use std::iter::Peekable;
use std::str::CharIndices;

// Note: current becomes self.iter.peek()?.0
struct Scanner<'a> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
    start: usize,
    line: usize,
    line_start: usize,
    start_column: usize,
    errors: Vec<ScanError>,
}

pub fn scan_tokens(source: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut scanner = Scanner {
        source,
        iter: source.char_indices().peekable(),
        start: 0,
        line: 1,
        line_start: 0,
        start_column: 1,
        errors: Vec::new(),
    };
    let mut tokens: Vec<Token> = Vec::new();

    while let Some(&(idx, _)) = scanner.iter.peek() {
        scanner.start = idx;
        scanner.start_column = idx - scanner.line_start + 1;
        if let Some(token) = scanner.scan_token() {
            tokens.push(token);
        }
    }
    let column = source.len() - scanner.line_start + 1;
    tokens.push(Token::new(TokenType::EOF, "", scanner.line, column));

    tracing::debug!(
        tokens = tokens.len(),
        errors = scanner.errors.len(),
        "scanned source"
    );
    for error in scanner.errors {
        diagnostics.report(error);
    }
    tokens
}

impl<'a> Scanner<'a> {
    fn scan_token(&mut self) -> Option<Token> {
        let (_, c) = self.iter.next()?;
        match c {
            '(' => Some(self.token(TokenType::LeftParen)),
            ')' => Some(self.token(TokenType::RightParen)),
            '{' => Some(self.token(TokenType::LeftBrace)),
            '}' => Some(self.token(TokenType::RightBrace)),
            ',' => Some(self.token(TokenType::Comma)),
            '.' => Some(self.token(TokenType::Dot)),
            '-' => Some(self.token(TokenType::Minus)),
            '+' => Some(self.token(TokenType::Plus)),
            ';' => Some(self.token(TokenType::Semicolon)),
            '*' => Some(self.token(TokenType::Star)),
            '!' => Some(self.either('=', TokenType::BangEqual, TokenType::Bang)),
            '=' => Some(self.either('=', TokenType::EqualEqual, TokenType::Equal)),
            '<' => Some(self.either('=', TokenType::LessEqual, TokenType::Less)),
            '>' => Some(self.either('=', TokenType::GreaterEqual, TokenType::Greater)),
            '/' => {
                if self.next_if('/') {
                    while let Some((_, c)) = self.iter.peek() {
                        match c {
                            '\n' => {
                                break;
                            }
                            _ => {
                                self.iter.next();
                            }
                        }
                    }
                    None
                } else {
                    Some(self.token(TokenType::Slash))
                }
            }
            ' ' | '\r' | '\t' => None,
            '\n' => {
                self.newline();
                None
            }
            '"' => self.string(),
            '0'..='9' => Some(self.number()),
            'a'..='z' | 'A'..='Z' | '_' => Some(self.identifier()),
            _ => {
                self.error("Unexpected character.");
                None
            }
        }
    }
    fn current(&mut self) -> usize {
        match self.iter.peek() {
            None => self.source.len(),
            Some((idx, _)) => *idx,
        }
    }
    fn token(&mut self, token_type: TokenType) -> Token {
        let current = self.current();
        Token::new(
            token_type,
            &self.source[self.start..current],
            self.line,
            self.start_column,
        )
    }
    fn either(&mut self, expected: char, matched: TokenType, single: TokenType) -> Token {
        if self.next_if(expected) {
            self.token(matched)
        } else {
            self.token(single)
        }
    }
    fn next_if(&mut self, expected: char) -> bool {
        self.iter.next_if(|&(_, c)| c == expected).is_some()
    }
    fn next_digits(&mut self) {
        while self.iter.next_if(|(_, c)| c.is_ascii_digit()).is_some() {}
    }
    fn newline(&mut self) {
        self.line += 1;
        self.line_start = self.current();
    }
    fn error(&mut self, message: &str) {
        self.errors.push(ScanError {
            line: self.line,
            column: self.start_column,
            message: message.to_string(),
        });
    }
    fn string(&mut self) -> Option<Token> {
        let line = self.line;
        let column = self.start_column;
        while let Some(&(_, c)) = self.iter.peek() {
            match c {
                '"' => {
                    break;
                }
                '\n' => {
                    self.iter.next();
                    self.newline();
                }
                _ => {
                    self.iter.next();
                }
            }
        }
        if !self.next_if('"') {
            self.error("Unterminated string.");
            return None;
        }
        let current = self.current();
        let value = self.source[self.start + 1..current - 1].to_string();
        Some(Token::new(
            TokenType::String(value),
            &self.source[self.start..current],
            line,
            column,
        ))
    }
    fn number(&mut self) -> Token {
        self.next_digits();

        if let Some(&(_, '.')) = self.iter.peek() {
            let mut lookahead = self.iter.clone();
            lookahead.next();
            if let Some((_, c)) = lookahead.peek() {
                if c.is_ascii_digit() {
                    self.iter.next();
                    self.next_digits();
                }
            }
        }

        let current = self.current();
        // A digit run with at most one interior '.' always parses.
        let value = self.source[self.start..current].parse().unwrap_or(0.0);
        self.token(TokenType::Number(value))
    }
    fn identifier(&mut self) -> Token {
        while self
            .iter
            .next_if(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
            .is_some()
        {}
        let current = self.current();
        match KEYWORDS.get(&self.source[self.start..current]) {
            None => self.token(TokenType::Identifier),
            Some(x) => self.token(x.clone()),
        }
    }
}

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and" => TokenType::And,
    "class" => TokenType::Class,
    "else" => TokenType::Else,
    "false" => TokenType::False,
    "for" => TokenType::For,
    "fun" => TokenType::Fun,
    "if" => TokenType::If,
    "nil" => TokenType::Nil,
    "or" => TokenType::Or,
    "print" => TokenType::Print,
    "return" => TokenType::Return,
    "super" => TokenType::Super,
    "this" => TokenType::This,
    "true" => TokenType::True,
    "var" => TokenType::Var,
    "while" => TokenType::While,
};
