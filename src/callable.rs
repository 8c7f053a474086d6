use crate::ast::FunctionDeclaration;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::{Flow, Interpreter};
use crate::value::Value;
use std::fmt;
use std::fmt::Debug;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A user-defined function paired with the scope it was declared in.
#[derive(Clone)]
pub struct LoxFunction {
    declaration: Rc<FunctionDeclaration>,
    closure: Environment,
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

// The closure may (indirectly) hold this function again.
impl Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDeclaration>, closure: Environment) -> LoxFunction {
        LoxFunction {
            declaration,
            closure,
        }
    }
    #[tracing::instrument(level = "trace", skip_all, fields(name = %self.declaration.name.lexeme))]
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let mut environment = self.closure.new_child();
        for (param, value) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, value);
        }
        match interpreter.execute_block(&self.declaration.body, environment)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }
    pub fn equals(&self, other: &LoxFunction) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration) && self.closure.equals(&other.closure)
    }
}

#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub call: fn(&[Value]) -> Value,
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

pub fn clock() -> NativeFunction {
    NativeFunction {
        name: "clock",
        arity: 0,
        call: |_| {
            let seconds = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);
            Value::Number(seconds)
        },
    }
}
