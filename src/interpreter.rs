// ABOUTME: Tree-walking interpreter that evaluates the AST directly, statement by statement

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::env::Environment;
use crate::error::{ErrorReporter, RuntimeError};
use crate::token::{Token, TokenKind};
use crate::value::{Callable, LoxFunction, NativeFunction, Value};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Non-local control transfer threaded through `?` instead of a host panic.
///
/// `Return` and `Break` are not errors; they carry a statement-execution result
/// up to the nearest function call or loop that knows how to catch them.
pub enum Unwind {
    Error(RuntimeError),
    Return(Value),
    Break,
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

pub struct Interpreter {
    environment: Rc<Environment>,
    globals: Rc<Environment>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        globals.define(
            "clock".to_string(),
            Value::Callable(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: native_clock,
            })),
        );

        Interpreter {
            environment: globals.clone(),
            globals,
        }
    }

    /// Executes a program, stopping at (and reporting) the first runtime error.
    pub fn interpret(&mut self, statements: &[Stmt], reporter: &ErrorReporter) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}
                Err(Unwind::Error(error)) => {
                    reporter.runtime_error(&error);
                    return;
                }
                // A `return` or `break` that escapes every function and loop in the
                // program is a parser bug, not a runtime fault: the parser rejects
                // both outside their proper context before execution ever begins.
                Err(Unwind::Return(_)) | Err(Unwind::Break) => {
                    unreachable!("parser guarantees return/break only appear in valid context")
                }
            }
        }
    }

    /// Runs `statements` in `environment`, restoring the previous environment on
    /// every exit path (normal completion, error, or an escaping return/break).
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<Environment>,
    ) -> Result<(), Unwind> {
        let previous = std::mem::replace(&mut self.environment, environment);

        for statement in statements.iter() {
            if let Err(err) = self.execute(statement) {
                self.environment = previous;
                return Err(err);
            }
        }

        self.environment = previous;
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{value}");
                Ok(())
            }
            Stmt::Var(name, initializer) => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block(statements) => {
                let block_env = Environment::with_enclosing(self.environment.clone());
                self.execute_block(statements, block_env)
            }
            Stmt::If(condition, then_branch, else_branch) => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While(condition, body) => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body) {
                        Err(Unwind::Break) => break,
                        other => other?,
                    }
                }
                Ok(())
            }
            Stmt::Function(declaration) => {
                let function = LoxFunction {
                    declaration: declaration.clone(),
                    closure: self.environment.clone(),
                };
                self.environment.define(
                    declaration.name.lexeme.clone(),
                    Value::Callable(Rc::new(function)),
                );
                Ok(())
            }
            Stmt::Return(_keyword, value) => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Err(Unwind::Return(value))
            }
            Stmt::Break(_keyword) => Err(Unwind::Break),
        }
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, Unwind> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary(operator, right) => self.evaluate_unary(operator, right),
            Expr::Binary(left, operator, right) => self.evaluate_binary(left, operator, right),
            Expr::Logical(left, operator, right) => self.evaluate_logical(left, operator, right),
            Expr::Conditional(condition, then_branch, else_branch) => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
            Expr::Variable(name) => Ok(self.environment.get(name)?),
            Expr::Assign(name, value) => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Call(callee, paren, arguments) => self.evaluate_call(callee, paren, arguments),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value, Unwind> {
        let right = self.evaluate(right)?;

        match operator.kind {
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            TokenKind::Minus => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(operator.clone(), "Operand must be a number.").into()),
            },
            _ => unreachable!("parser never produces a unary operator other than ! or -"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value, Unwind> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.kind {
            TokenKind::BangEqual => Ok(Value::Bool(left != right)),
            TokenKind::EqualEqual => Ok(Value::Bool(left == right)),
            TokenKind::Greater => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(l > r))
            }
            TokenKind::GreaterEqual => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(l >= r))
            }
            TokenKind::Less => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(l < r))
            }
            TokenKind::LessEqual => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(l <= r))
            }
            TokenKind::Minus => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(l - r))
            }
            TokenKind::Plus => match (&left, &right) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::String(l), Value::String(r)) => Ok(Value::String(format!("{l}{r}"))),
                (Value::String(_), _) | (_, Value::String(_)) => {
                    Ok(Value::String(format!("{left}{right}")))
                }
                _ => Err(RuntimeError::new(
                    operator.clone(),
                    "Operands must be two numbers or two strings.",
                )
                .into()),
            },
            TokenKind::Slash => {
                let (l, r) = number_operands(operator, &left, &right)?;
                if r == 0.0 {
                    return Err(RuntimeError::new(operator.clone(), "division by zero").into());
                }
                Ok(Value::Number(l / r))
            }
            TokenKind::Star => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(l * r))
            }
            TokenKind::Comma => Ok(right),
            _ => unreachable!("parser never produces a non-binary operator here"),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value, Unwind> {
        let left = self.evaluate(left)?;

        if operator.kind == TokenKind::Or {
            if left.is_truthy() {
                return Ok(left);
            }
        } else if !left.is_truthy() {
            return Ok(left);
        }

        self.evaluate(right)
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<Value, Unwind> {
        let callee = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.evaluate(argument)?);
        }

        let Value::Callable(callable) = callee else {
            return Err(RuntimeError::new(paren.clone(), "Can only call functions and classes.").into());
        };

        if args.len() != callable.arity() {
            return Err(RuntimeError::new(
                paren.clone(),
                format!("Expected {} arguments but got {}.", callable.arity(), args.len()),
            )
            .into());
        }

        callable.call(self, args)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

fn literal_value(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Nil => Value::Nil,
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::String(s) => Value::String(s.clone()),
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
        _ => Err(RuntimeError::new(operator.clone(), "Operands must be numbers.")),
    }
}

fn native_clock(_args: &[Value]) -> Result<Value, RuntimeError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after the Unix epoch");
    Ok(Value::Number(now.as_secs_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorReporter;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn run(source: &str) -> (Interpreter, ErrorReporter) {
        let reporter = ErrorReporter::new();
        let tokens = Scanner::new(source, &reporter).scan_tokens();
        let statements = Parser::new(tokens, &reporter).parse();
        let mut interpreter = Interpreter::new();
        interpreter.interpret(&statements, &reporter);
        (interpreter, reporter)
    }

    #[test]
    fn test_arithmetic_and_print() {
        let (_interp, reporter) = run("print 1 + 2 * 3;");
        assert!(!reporter.had_error());
        assert!(!reporter.had_runtime_error());
    }

    #[test]
    fn test_string_concatenation_via_plus() {
        let (_interp, reporter) = run(r#"print "a" + "b";"#);
        assert!(!reporter.had_runtime_error());
    }

    #[test]
    fn test_mixed_plus_stringifies() {
        let (_interp, reporter) = run(r#"print "n=" + 1;"#);
        assert!(!reporter.had_runtime_error());
    }

    #[test]
    fn test_division_by_zero_is_runtime_error() {
        let (_interp, reporter) = run("print 1 / 0;");
        assert!(reporter.had_runtime_error());
    }

    #[test]
    fn test_undefined_variable_is_runtime_error() {
        let (_interp, reporter) = run("print nope;");
        assert!(reporter.had_runtime_error());
    }

    #[test]
    fn test_closures_capture_environment() {
        let source = r#"
            fun makeCounter() {
                var i = 0;
                fun counter() {
                    i = i + 1;
                    return i;
                }
                return counter;
            }
            var counter = makeCounter();
            print counter();
            print counter();
        "#;
        let (_interp, reporter) = run(source);
        assert!(!reporter.had_runtime_error());
    }

    #[test]
    fn test_break_exits_innermost_loop_only() {
        let source = r#"
            var count = 0;
            while (true) {
                count = count + 1;
                if (count == 3) break;
            }
            print count;
        "#;
        let (_interp, reporter) = run(source);
        assert!(!reporter.had_runtime_error());
    }

    #[test]
    fn test_call_arity_mismatch_is_runtime_error() {
        let source = r#"
            fun add(a, b) { return a + b; }
            add(1);
        "#;
        let (_interp, reporter) = run(source);
        assert!(reporter.had_runtime_error());
    }

    #[test]
    fn test_calling_a_non_callable_is_runtime_error() {
        let (_interp, reporter) = run(r#"var x = 1; x();"#);
        assert!(reporter.had_runtime_error());
    }

    #[test]
    fn test_clock_is_callable_with_zero_arity() {
        let (_interp, reporter) = run("print clock();");
        assert!(!reporter.had_runtime_error());
    }

    #[test]
    fn test_comma_evaluates_left_for_effect_and_returns_right() {
        let source = r#"
            var a = 0;
            print (a = 1, a = 2, a);
        "#;
        let (_interp, reporter) = run(source);
        assert!(!reporter.had_runtime_error());
    }
}
