pub mod ast;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod value;

mod callable;
mod environment;
mod shared_list;

pub use callable::{LoxFunction, NativeFunction};
pub use environment::Environment;
pub use error::{Diagnostic, Diagnostics, ParseError, RuntimeError, ScanError};
pub use interpreter::{Flow, Interpreter};
pub use value::Value;

use std::io::{self, Write};

/// How a run ended. The host decides what each case means for its exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Lexical or syntax errors were found; nothing was executed.
    CompletedWithParseErrors,
    CompletedWithRuntimeError,
}

/// Scans and parses `source`, reporting lexical and syntax errors.
pub fn parse_source(source: &str, diagnostics: &mut Diagnostics) -> Vec<ast::Statement> {
    let tokens = scanner::scan_tokens(source, diagnostics);
    parser::Parser::new(&tokens).parse(diagnostics)
}

/// Source text in, side effects out. Global definitions survive between
/// calls to `run`, which is what a prompt wants.
pub struct Lox<W: Write> {
    interpreter: Interpreter<W>,
}

impl Lox<io::Stdout> {
    pub fn new() -> Lox<io::Stdout> {
        Lox {
            interpreter: Interpreter::new(),
        }
    }
}

impl<W: Write> Lox<W> {
    pub fn with_output(out: W) -> Lox<W> {
        Lox {
            interpreter: Interpreter::with_output(out),
        }
    }
    pub fn run(&mut self, source: &str, diagnostics: &mut Diagnostics) -> Outcome {
        let before = diagnostics.len();
        let statements = parse_source(source, diagnostics);
        let outcome = if diagnostics.iter().skip(before).any(Diagnostic::is_static) {
            Outcome::CompletedWithParseErrors
        } else {
            match self.interpreter.interpret(&statements) {
                Ok(()) => Outcome::Completed,
                Err(error) => {
                    diagnostics.report(error);
                    Outcome::CompletedWithRuntimeError
                }
            }
        };
        tracing::debug!(?outcome, "run finished");
        outcome
    }
    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }
}
