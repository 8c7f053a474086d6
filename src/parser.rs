use crate::ast::{Expression, FunctionDeclaration, Statement};
use crate::error::{Diagnostics, ParseError};
use crate::token::{Token, TokenKind, TokenType};
use crate::value::Value;
use std::rc::Rc;

const MAX_ARITY: usize = 255;

type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    function_depth: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Parser<'a> {
        Parser {
            tokens,
            current: 0,
            function_depth: 0,
            errors: Vec::new(),
        }
    }
    /// Parses the whole token stream. Malformed statements are reported to
    /// `diagnostics` and left out of the result.
    pub fn parse(mut self, diagnostics: &mut Diagnostics) -> Vec<Statement> {
        let mut statements: Vec<Statement> = Vec::new();
        while !self.is_at_end() {
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }
        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        for error in self.errors {
            diagnostics.report(error);
        }
        statements
    }
    fn declaration(&mut self) -> Option<Statement> {
        let result = match self.peek().tokentype {
            TokenType::Var => {
                self.advance();
                self.var_declaration()
            }
            TokenType::Fun => {
                self.advance();
                self.function()
            }
            _ => self.statement(),
        };
        match result {
            Ok(statement) => Some(statement),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }
    fn var_declaration(&mut self) -> ParseResult<Statement> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = match self.peek().tokentype {
            TokenType::Equal => {
                self.advance();
                Some(self.expression()?)
            }
            _ => None,
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Statement::Var {
            name: name.clone(),
            initializer,
        })
    }
    fn function(&mut self) -> ParseResult<Statement> {
        let name = self.consume(TokenKind::Identifier, "Expect function name.")?;
        self.consume(TokenKind::LeftParen, "Expect '(' after function name.")?;
        let mut params: Vec<Token> = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARITY {
                    self.report("Can't have more than 255 parameters.");
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?.clone());
                if !self.next_if(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.")?;

        self.function_depth += 1;
        let body = self.block_statements();
        self.function_depth -= 1;

        Ok(Statement::Function(Rc::new(FunctionDeclaration {
            name: name.clone(),
            params,
            body: body?,
        })))
    }
    fn statement(&mut self) -> ParseResult<Statement> {
        match self.peek().tokentype {
            TokenType::If => {
                self.advance();
                self.if_statement()
            }
            TokenType::Print => {
                self.advance();
                self.print_statement()
            }
            TokenType::Return => {
                self.advance();
                self.return_statement()
            }
            TokenType::LeftBrace => {
                self.advance();
                Ok(Statement::Block(self.block_statements()?))
            }
            TokenType::While => {
                self.advance();
                self.while_statement()
            }
            TokenType::For => {
                self.advance();
                self.for_statement()
            }
            _ => self.expression_statement(),
        }
    }
    fn for_statement(&mut self) -> ParseResult<Statement> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;
        let initializer: Option<Statement> = match self.peek().tokentype {
            TokenType::Semicolon => {
                self.advance();
                None
            }
            TokenType::Var => {
                self.advance();
                Some(self.var_declaration()?)
            }
            _ => Some(self.expression_statement()?),
        };

        let condition = match self.peek().tokentype {
            TokenType::Semicolon => Expression::Literal(Value::Boolean(true)),
            _ => self.expression()?,
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment: Option<Expression> = match self.peek().tokentype {
            TokenType::RightParen => None,
            _ => Some(self.expression()?),
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(x) = increment {
            body = Statement::Block(vec![body, Statement::Expression(x)])
        }
        body = Statement::While {
            condition,
            body: Box::new(body),
        };
        match initializer {
            None => Ok(body),
            Some(x) => Ok(Statement::Block(vec![x, body])),
        }
    }
    fn while_statement(&mut self) -> ParseResult<Statement> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = self.statement()?;
        Ok(Statement::While {
            condition,
            body: Box::new(body),
        })
    }
    fn if_statement(&mut self) -> ParseResult<Statement> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;
        let then_branch = self.statement()?;
        let else_branch = match self.peek().tokentype {
            TokenType::Else => {
                self.advance();
                Some(Box::new(self.statement()?))
            }
            _ => None,
        };
        Ok(Statement::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }
    fn block_statements(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements: Vec<Statement> = Vec::new();
        while !self.is_at_end() && !self.check(TokenKind::RightBrace) {
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }
    fn print_statement(&mut self) -> ParseResult<Statement> {
        let keyword = self.previous().clone();
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Statement::Print { keyword, value })
    }
    fn return_statement(&mut self) -> ParseResult<Statement> {
        let keyword = self.previous().clone();
        if self.function_depth == 0 {
            self.errors
                .push(ParseError::new(&keyword, "Can't return from top-level code."));
        }
        let value = match self.peek().tokentype {
            TokenType::Semicolon => None,
            _ => Some(self.expression()?),
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Statement::Return { keyword, value })
    }
    fn expression_statement(&mut self) -> ParseResult<Statement> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Statement::Expression(expr))
    }
    fn expression(&mut self) -> ParseResult<Expression> {
        self.assignment()
    }
    fn assignment(&mut self) -> ParseResult<Expression> {
        let expr = self.or()?;
        match self.peek().tokentype {
            TokenType::Equal => {
                let equals = self.advance();
                let value = self.assignment()?;
                match expr {
                    Expression::Variable(name) => Ok(Expression::Assign {
                        name,
                        value: Box::new(value),
                    }),
                    _ => {
                        // Not fatal: keep parsing with the left-hand side.
                        self.errors
                            .push(ParseError::new(equals, "Invalid assignment target."));
                        Ok(expr)
                    }
                }
            }
            _ => Ok(expr),
        }
    }
    fn or(&mut self) -> ParseResult<Expression> {
        let mut expr = self.and()?;
        while self.next_if(TokenKind::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expression::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn and(&mut self) -> ParseResult<Expression> {
        let mut expr = self.equality()?;
        while self.next_if(TokenKind::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expression::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    /// Left-associative binary level: `operand (op operand)*`.
    fn binary(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expression>,
    ) -> ParseResult<Expression> {
        let mut expr = operand(self)?;
        while operators.contains(&self.peek().kind()) {
            let operator = self.advance().clone();
            let right = operand(self)?;
            expr = Expression::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn equality(&mut self) -> ParseResult<Expression> {
        self.binary(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::comparison,
        )
    }
    fn comparison(&mut self) -> ParseResult<Expression> {
        self.binary(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }
    fn term(&mut self) -> ParseResult<Expression> {
        self.binary(&[TokenKind::Minus, TokenKind::Plus], Self::factor)
    }
    fn factor(&mut self) -> ParseResult<Expression> {
        self.binary(&[TokenKind::Slash, TokenKind::Star], Self::unary)
    }
    fn unary(&mut self) -> ParseResult<Expression> {
        match self.peek().tokentype {
            TokenType::Bang | TokenType::Minus => {
                let operator = self.advance().clone();
                let right = self.unary()?;
                Ok(Expression::Unary {
                    operator,
                    right: Box::new(right),
                })
            }
            _ => self.call(),
        }
    }
    fn call(&mut self) -> ParseResult<Expression> {
        let mut expr = self.primary()?;
        while self.next_if(TokenKind::LeftParen) {
            expr = self.finish_call(expr)?;
        }
        Ok(expr)
    }
    fn finish_call(&mut self, callee: Expression) -> ParseResult<Expression> {
        let mut arguments: Vec<Expression> = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    self.report("Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
                if !self.next_if(TokenKind::Comma) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expression::Call {
            callee: Box::new(callee),
            paren: paren.clone(),
            arguments,
        })
    }
    fn primary(&mut self) -> ParseResult<Expression> {
        match self.peek().tokentype {
            TokenType::False
            | TokenType::True
            | TokenType::Nil
            | TokenType::Number(_)
            | TokenType::String(_) => {
                let token = self.advance();
                Ok(Expression::Literal(token.literal().unwrap_or(Value::Nil)))
            }
            TokenType::Identifier => Ok(Expression::Variable(self.advance().clone())),
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
                Ok(Expression::Grouping(Box::new(expr)))
            }
            _ => Err(self.error("Expect expression.")),
        }
    }
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if let TokenType::Semicolon = self.previous().tokentype {
                return;
            }
            match self.peek().tokentype {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => (),
            }
            self.advance();
        }
    }
    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<&'a Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }
    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind() == kind
    }
    fn next_if(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
    fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }
    fn is_at_end(&self) -> bool {
        match self.peek().tokentype {
            TokenType::EOF => true,
            _ => false,
        }
    }
    // The scanner always terminates the stream with EOF, and `advance` never
    // moves past it.
    fn peek(&self) -> &'a Token {
        let index = self.current.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }
    fn previous(&self) -> &'a Token {
        &self.tokens[self.current.saturating_sub(1)]
    }
    fn error(&self, msg: &str) -> ParseError {
        ParseError::new(self.peek(), msg)
    }
    fn report(&mut self, msg: &str) {
        let error = self.error(msg);
        self.errors.push(error);
    }
}
