// ABOUTME: Environment module for managing lexically scoped variable bindings

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    enclosing: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no enclosing scope.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            enclosing: None,
        })
    }

    /// Creates a new child environment whose enclosing link is `parent`.
    ///
    /// Used both for lexical blocks and for a function call's capture environment,
    /// which is why the parent passed here is the closure's capture env, not
    /// necessarily the caller's current environment.
    pub fn with_enclosing(enclosing: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            enclosing: Some(enclosing),
        })
    }

    /// Defines a binding in this scope. Always targets the innermost scope,
    /// even if an outer scope already defines the same name (shadowing).
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up `name.lexeme` in this scope, then recursively in enclosing scopes.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.get(name);
        }

        Err(RuntimeError::new(
            name.clone(),
            format!("Undefined variable '{}'.", name.lexeme),
        ))
    }

    /// Assigns into an *existing* binding in the nearest scope that defines it.
    /// Never creates a new binding — that is `define`'s job.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(&name.lexeme) {
            self.bindings.borrow_mut().insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.assign(name, value);
        }

        Err(RuntimeError::new(
            name.clone(),
            format!("Undefined variable '{}'.", name.lexeme),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, None, 1)
    }

    #[test]
    fn test_define_and_get() {
        let env = Environment::new();
        env.define("x".to_string(), Value::Number(42.0));
        assert!(matches!(env.get(&ident("x")), Ok(Value::Number(n)) if n == 42.0));
    }

    #[test]
    fn test_undefined_variable_errors() {
        let env = Environment::new();
        assert!(env.get(&ident("missing")).is_err());
    }

    #[test]
    fn test_shadowing_prefers_inner_scope() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(1.0));

        let child = Environment::with_enclosing(parent);
        child.define("x".to_string(), Value::Number(2.0));

        assert!(matches!(child.get(&ident("x")), Ok(Value::Number(n)) if n == 2.0));
    }

    #[test]
    fn test_lookup_walks_enclosing_chain() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(1.0));
        let child = Environment::with_enclosing(parent);

        assert!(matches!(child.get(&ident("x")), Ok(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn test_assign_updates_existing_binding_in_enclosing_scope() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(1.0));
        let child = Environment::with_enclosing(parent.clone());

        child.assign(&ident("x"), Value::Number(9.0)).unwrap();

        assert!(matches!(parent.get(&ident("x")), Ok(Value::Number(n)) if n == 9.0));
    }

    #[test]
    fn test_assign_to_undefined_variable_errors() {
        let env = Environment::new();
        assert!(env.assign(&ident("missing"), Value::Nil).is_err());
    }

    #[test]
    fn test_assign_does_not_create_binding_in_inner_scope() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(1.0));
        let child = Environment::with_enclosing(parent);

        child.assign(&ident("x"), Value::Number(5.0)).unwrap();
        // Defining happens in innermost scope only via `define`, but `assign`
        // must find and mutate the existing binding wherever it lives, not
        // shadow it locally.
        assert!(matches!(child.get(&ident("x")), Ok(Value::Number(n)) if n == 5.0));
    }
}
