use crate::ast::{Expression, Statement, Visitor};
use crate::callable::{self, LoxFunction};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenType};
use crate::value::Value;
use std::io::{self, Write};

/// How a statement finished. `Return` unwinds to the nearest call boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter<W: Write> {
    environment: Environment,
    out: W,
}

impl<W: Write> Visitor<Expression, Result<Value, RuntimeError>> for Interpreter<W> {
    fn visit(&mut self, expr: &Expression) -> Result<Value, RuntimeError> {
        match expr {
            Expression::Literal(x) => Ok(x.clone()),
            Expression::Grouping(x) => self.evaluate(x),
            Expression::Unary { operator, right } => {
                let rv = self.evaluate(right)?;
                match operator.tokentype {
                    TokenType::Minus => match rv {
                        Value::Number(r) => Ok(Value::Number(-r)),
                        _ => Err(RuntimeError::new(operator, "Operand must be a number.")),
                    },
                    TokenType::Bang => Ok(Value::Boolean(!rv.is_truthy())),
                    _ => Err(unknown_operator(operator)),
                }
            }
            Expression::Binary {
                left,
                operator,
                right,
            } => {
                let lv = self.evaluate(left)?;
                let rv = self.evaluate(right)?;
                binary(operator, lv, rv)
            }
            Expression::Variable(name) => self.environment.get(name),
            Expression::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expression::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                match operator.tokentype {
                    TokenType::Or => {
                        if left.is_truthy() {
                            Ok(left)
                        } else {
                            self.evaluate(right)
                        }
                    }
                    TokenType::And => {
                        if !left.is_truthy() {
                            Ok(left)
                        } else {
                            self.evaluate(right)
                        }
                    }
                    _ => Err(unknown_operator(operator)),
                }
            }
            Expression::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;
                let mut evaluated_arguments: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    evaluated_arguments.push(self.evaluate(argument)?);
                }
                match callee {
                    Value::Function(function) => {
                        check_arity(paren, function.arity(), evaluated_arguments.len())?;
                        function.call(self, evaluated_arguments)
                    }
                    Value::Native(function) => {
                        check_arity(paren, function.arity, evaluated_arguments.len())?;
                        Ok((function.call)(&evaluated_arguments))
                    }
                    _ => Err(RuntimeError::new(
                        paren,
                        "Can only call functions and classes.",
                    )),
                }
            }
        }
    }
}

impl<W: Write> Visitor<Statement, Result<Flow, RuntimeError>> for Interpreter<W> {
    fn visit(&mut self, stmt: &Statement) -> Result<Flow, RuntimeError> {
        match stmt {
            Statement::Print { keyword, value } => {
                let val = self.evaluate(value)?;
                writeln!(self.out, "{}", val)
                    .and_then(|_| self.out.flush())
                    .map_err(|e| {
                        RuntimeError::new(keyword, &format!("Failed to write output: {}", e))
                    })?;
            }
            Statement::Expression(e) => {
                self.evaluate(e)?;
            }
            Statement::Var { name, initializer } => {
                let val = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, val);
            }
            Statement::Block(stmts) => {
                let environment = self.environment.new_child();
                return self.execute_block(stmts, environment);
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }
            Statement::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Statement::Function(declaration) => {
                // The scope now holds a function that holds the scope. That
                // cycle is never freed, so each call of an enclosing function
                // keeps its scope alive for the rest of the run.
                let function = LoxFunction::new(declaration.clone(), self.environment.clone());
                self.environment
                    .define(&declaration.name.lexeme, Value::Function(function));
            }
            Statement::Return { value, .. } => {
                let val = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };
                return Ok(Flow::Return(val));
            }
        }
        Ok(Flow::Normal)
    }
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Interpreter<io::Stdout> {
        Interpreter::with_output(io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Interpreter<W> {
        let mut globals = Environment::new();
        let clock = callable::clock();
        globals.define(clock.name, Value::Native(clock));
        Interpreter {
            environment: globals,
            out,
        }
    }
    pub fn into_output(self) -> W {
        self.out
    }
    pub fn evaluate(&mut self, expr: &Expression) -> Result<Value, RuntimeError> {
        expr.accept(self)
    }
    pub fn execute(&mut self, stmt: &Statement) -> Result<Flow, RuntimeError> {
        stmt.accept(self)
    }
    /// Runs `statements` in `environment`, putting the previous environment
    /// back however the block exits.
    pub fn execute_block(
        &mut self,
        statements: &[Statement],
        environment: Environment,
    ) -> Result<Flow, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.execute_all(statements);
        self.environment = previous;
        result
    }
    fn execute_all(&mut self, statements: &[Statement]) -> Result<Flow, RuntimeError> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }
    /// Executes a program's top-level statements, stopping at the first
    /// runtime error. Output is flushed after every `print`, so a failing
    /// sink surfaces as an error on that statement.
    pub fn interpret(&mut self, statements: &[Statement]) -> Result<(), RuntimeError> {
        let result = self.execute_all(statements).map(|_| ());
        if let Err(e) = &result {
            tracing::debug!(line = e.token.line, error = %e.message, "runtime error");
        }
        result
    }
}

fn binary(operator: &Token, lv: Value, rv: Value) -> Result<Value, RuntimeError> {
    match operator.tokentype {
        TokenType::EqualEqual => return Ok(Value::Boolean(lv == rv)),
        TokenType::BangEqual => return Ok(Value::Boolean(lv != rv)),
        TokenType::Plus => {
            return match (lv, rv) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::String(l), Value::String(r)) => {
                    let mut joined = l;
                    joined.push_str(r.as_str());
                    Ok(Value::String(joined))
                }
                _ => Err(RuntimeError::new(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            }
        }
        _ => (),
    }
    let (l, r) = match (lv, rv) {
        (Value::Number(l), Value::Number(r)) => (l, r),
        _ => return Err(RuntimeError::new(operator, "Operands must be numbers.")),
    };
    match operator.tokentype {
        TokenType::Minus => Ok(Value::Number(l - r)),
        TokenType::Slash => Ok(Value::Number(l / r)),
        TokenType::Star => Ok(Value::Number(l * r)),
        TokenType::Greater => Ok(Value::Boolean(l > r)),
        TokenType::GreaterEqual => Ok(Value::Boolean(l >= r)),
        TokenType::Less => Ok(Value::Boolean(l < r)),
        TokenType::LessEqual => Ok(Value::Boolean(l <= r)),
        _ => Err(unknown_operator(operator)),
    }
}

fn check_arity(paren: &Token, arity: usize, given: usize) -> Result<(), RuntimeError> {
    if arity == given {
        Ok(())
    } else {
        Err(RuntimeError::new(
            paren,
            &format!("Expected {} arguments but got {}.", arity, given),
        ))
    }
}

fn unknown_operator(operator: &Token) -> RuntimeError {
    RuntimeError::new(
        operator,
        &format!("Unknown operator '{}'.", operator.lexeme),
    )
}

#[cfg(test)]
mod interpreter_tests {
    use crate::ast::Statement;
    use crate::error::{Diagnostics, RuntimeError};
    use crate::interpreter::Interpreter;
    use crate::parser::Parser;
    use crate::scanner;
    use crate::value::Value;
    use pretty_assertions::assert_eq;
    use std::io::{self, Write};

    fn parse(source: &str) -> Vec<Statement> {
        let mut diagnostics = Diagnostics::new();
        let tokens = scanner::scan_tokens(source, &mut diagnostics);
        let statements = Parser::new(&tokens).parse(&mut diagnostics);
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics);
        statements
    }

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        let statements = parse(&format!("{};", source));
        let mut interpreter = Interpreter::with_output(Vec::new());
        match &statements[0] {
            Statement::Expression(e) => interpreter.evaluate(e),
            _ => panic!("not an expression"),
        }
    }

    fn run(source: &str) -> (String, Result<(), RuntimeError>) {
        let statements = parse(source);
        let mut interpreter = Interpreter::with_output(Vec::new());
        let result = interpreter.interpret(&statements);
        let output = String::from_utf8(interpreter.into_output()).unwrap();
        (output, result)
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Ok(Value::Number(7.0)));
        assert_eq!(eval("(1 + 2) * 3"), Ok(Value::Number(9.0)));
        assert_eq!(eval("10 / 4 - 1"), Ok(Value::Number(1.5)));
        assert_eq!(eval("-(3)"), Ok(Value::Number(-3.0)));
        assert_eq!(eval("\"a\" + \"b\""), Ok(Value::String("ab".to_string())));
    }

    #[test]
    fn type_errors() {
        let error = eval("1 + \"a\"").unwrap_err();
        assert_eq!(error.message, "Operands must be two numbers or two strings.");
        assert_eq!(error.token.lexeme, "+");
        assert_eq!(
            eval("-\"a\"").unwrap_err().message,
            "Operand must be a number."
        );
        assert_eq!(eval("1 < nil").unwrap_err().message, "Operands must be numbers.");
        assert_eq!(eval("true * 2").unwrap_err().token.lexeme, "*");
    }

    #[test]
    fn comparison_and_equality() {
        assert_eq!(eval("nil == nil"), Ok(Value::Boolean(true)));
        assert_eq!(eval("1 == \"1\""), Ok(Value::Boolean(false)));
        assert_eq!(eval("2 > 1"), Ok(Value::Boolean(true)));
        assert_eq!(eval("2 <= 1"), Ok(Value::Boolean(false)));
        assert_eq!(eval("\"a\" != \"b\""), Ok(Value::Boolean(true)));
        assert_eq!(eval("nil != false"), Ok(Value::Boolean(true)));
    }

    #[test]
    fn truthiness_and_logic() {
        assert_eq!(eval("!nil"), Ok(Value::Boolean(true)));
        assert_eq!(eval("!0"), Ok(Value::Boolean(false)));
        assert_eq!(eval("nil or \"yes\""), Ok(Value::String("yes".to_string())));
        assert_eq!(eval("0 and 2"), Ok(Value::Number(2.0)));
        assert_eq!(eval("false and undefined"), Ok(Value::Boolean(false)));
        assert_eq!(eval("1 or undefined"), Ok(Value::Number(1.0)));
    }

    #[test]
    fn undefined_variables() {
        let (_, result) = run("print missing;");
        assert_eq!(result.unwrap_err().message, "Undefined variable 'missing'.");
        let (_, result) = run("missing = 1;");
        assert_eq!(result.unwrap_err().message, "Undefined variable 'missing'.");
    }

    #[test]
    fn blocks_restore_environment_after_errors() {
        let statements = parse("var x = \"outer\"; { var x = \"inner\"; x + 1; }");
        let mut interpreter = Interpreter::with_output(Vec::new());
        assert!(interpreter.interpret(&statements).is_err());
        let statements = parse("print x;");
        assert_eq!(interpreter.interpret(&statements), Ok(()));
        assert_eq!(String::from_utf8(interpreter.into_output()).unwrap(), "outer\n");
    }

    #[test]
    fn return_unwinds_loops_and_blocks() {
        let (output, result) = run(
            "fun f() { while (true) { { return \"done\"; } } print \"unreachable\"; }
             print f();",
        );
        assert_eq!(result, Ok(()));
        assert_eq!(output, "done\n");
    }

    #[test]
    fn calls() {
        let (output, result) = run(
            "fun add(a, b) { return a + b; }
             fun noop() {}
             print add(1, 2);
             print noop();
             print add;
             print clock;",
        );
        assert_eq!(result, Ok(()));
        assert_eq!(output, "3\nnil\n<fn add>\n<native fn>\n");
    }

    #[test]
    fn call_errors() {
        let (_, result) = run("fun f(a) {} f(1, 2);");
        assert_eq!(result.unwrap_err().message, "Expected 1 arguments but got 2.");
        let (_, result) = run("\"text\"();");
        let error = result.unwrap_err();
        assert_eq!(error.message, "Can only call functions and classes.");
        assert_eq!(error.token.lexeme, ")");
        let (_, result) = run("clock(1);");
        assert_eq!(result.unwrap_err().message, "Expected 0 arguments but got 1.");
    }

    #[test]
    fn arguments_evaluate_left_to_right() {
        let (output, _) = run(
            "fun show(x) { print x; return x; }
             fun pair(a, b) {}
             pair(show(1), show(2));",
        );
        assert_eq!(output, "1\n2\n");
    }

    #[test]
    fn recursion() {
        let (output, _) = run(
            "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
             print fib(15);",
        );
        assert_eq!(output, "610\n");
    }

    #[test]
    fn closures_resolve_in_defining_scope() {
        let (output, _) = run(
            "var a = \"global\";
             fun show() { print a; }
             fun caller() { var a = \"caller\"; show(); }
             caller();",
        );
        assert_eq!(output, "global\n");
    }

    struct BrokenSink {
        fail_on_write: bool,
    }

    impl Write for BrokenSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_on_write {
                Err(io::Error::new(io::ErrorKind::Other, "sink closed"))
            } else {
                Ok(buf.len())
            }
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "flush failed"))
        }
    }

    #[test]
    fn output_failures_are_runtime_errors() {
        let statements = parse("var a = 1;\nprint a;\na = 2;");
        let mut interpreter = Interpreter::with_output(BrokenSink {
            fail_on_write: true,
        });
        let error = interpreter.interpret(&statements).unwrap_err();
        assert_eq!(error.message, "Failed to write output: sink closed");
        assert_eq!(error.token.lexeme, "print");
        assert_eq!(error.token.line, 2);

        let mut interpreter = Interpreter::with_output(BrokenSink {
            fail_on_write: false,
        });
        let error = interpreter.interpret(&statements).unwrap_err();
        assert_eq!(error.message, "Failed to write output: flush failed");
        assert_eq!(error.token.lexeme, "print");
    }

    #[test]
    fn clock_returns_a_number() {
        let statements = parse("clock();");
        let mut interpreter = Interpreter::with_output(Vec::new());
        match &statements[0] {
            Statement::Expression(e) => match interpreter.evaluate(e) {
                Ok(Value::Number(n)) => assert!(n > 0.0),
                other => panic!("unexpected {:?}", other),
            },
            _ => panic!("not an expression"),
        }
    }
}
