use crate::error::RuntimeError;
use crate::shared_list::SharedList;
use crate::token::Token;
use crate::value::Value;
use std::collections::BTreeMap;

/// A handle on a chain of scopes, innermost first. Cloning the handle shares
/// the scopes; `new_child` extends the chain without touching the parent.
#[derive(Clone, Debug)]
pub struct Environment {
    values: SharedList<BTreeMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Environment {
        let mut values = SharedList::new();
        values.push(BTreeMap::new());
        Environment { values }
    }
    pub fn new_child(&self) -> Environment {
        let mut values = self.values.clone();
        values.push(BTreeMap::new());
        Environment { values }
    }
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(mut scope) = self.values.peek_mut() {
            scope.insert(name.to_string(), value);
        }
    }
    pub fn get(&self, token: &Token) -> Result<Value, RuntimeError> {
        self.values
            .find_map(|scope| scope.get(&token.lexeme).cloned())
            .ok_or_else(|| undefined(token))
    }
    pub fn assign(&self, token: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut value = Some(value);
        self.values
            .find_map_mut(|scope| {
                let slot = scope.get_mut(&token.lexeme)?;
                *slot = value.take()?;
                Some(())
            })
            .ok_or_else(|| undefined(token))
    }
    pub fn equals(&self, other: &Environment) -> bool {
        self.values.equals(&other.values)
    }
}

fn undefined(token: &Token) -> RuntimeError {
    RuntimeError::new(token, &format!("Undefined variable '{}'.", token.lexeme))
}
