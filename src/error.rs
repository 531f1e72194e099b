// ABOUTME: Error types and the shared error reporter for scan/parse/runtime failures

use crate::token::{Token, TokenKind};
use std::cell::Cell;
use thiserror::Error;

/// A runtime fault raised while evaluating an expression or executing a statement.
///
/// Carries the offending token so the reporter can print the line it occurred on.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        RuntimeError {
            token,
            message: message.into(),
        }
    }
}

/// Collects syntax and runtime errors for one interpreter run.
///
/// Owned by the driver and passed by shared reference into the scanner, parser,
/// and interpreter. Single-threaded, so `Cell` is sufficient for the sticky flags.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        ErrorReporter::default()
    }

    /// Prints `[line N] Error WHERE: MESSAGE` to stderr and sets the syntax-error flag.
    pub fn report(&self, line: usize, location: &str, message: &str) {
        eprintln!("[line {line}] Error{location}: {message}");
        self.had_error.set(true);
    }

    pub fn error_at_line(&self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// Reports an error pinned to a token, using the `at end` / `at 'LEXEME'` location hint.
    pub fn error_at_token(&self, token: &Token, message: &str) {
        if token.kind == TokenKind::Eof {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), message);
        }
    }

    /// Prints `MESSAGE\n[line N]` to stderr and sets the runtime-error flag.
    pub fn runtime_error(&self, error: &RuntimeError) {
        eprintln!("{}\n[line {}]", error.message, error.token.line);
        self.had_runtime_error.set(true);
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    pub fn reset_error(&self) {
        self.had_error.set(false);
    }

    pub fn reset_runtime_error(&self) {
        self.had_runtime_error.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_starts_clean() {
        let reporter = ErrorReporter::new();
        assert!(!reporter.had_error());
        assert!(!reporter.had_runtime_error());
    }

    #[test]
    fn test_error_at_line_sets_flag() {
        let reporter = ErrorReporter::new();
        reporter.error_at_line(3, "Unexpected character '@'");
        assert!(reporter.had_error());
        assert!(!reporter.had_runtime_error());
    }

    #[test]
    fn test_runtime_error_sets_flag() {
        let reporter = ErrorReporter::new();
        let token = Token::new(TokenKind::Slash, "/", None, 7);
        reporter.runtime_error(&RuntimeError::new(token, "division by zero"));
        assert!(reporter.had_runtime_error());
        assert!(!reporter.had_error());
    }

    #[test]
    fn test_reset_between_repl_lines() {
        let reporter = ErrorReporter::new();
        reporter.error_at_line(1, "bad");
        assert!(reporter.had_error());
        reporter.reset_error();
        assert!(!reporter.had_error());
    }

    #[test]
    fn test_error_at_token_eof_location() {
        let reporter = ErrorReporter::new();
        let eof = Token::new(TokenKind::Eof, "", None, 2);
        reporter.error_at_token(&eof, "Expect expression.");
        assert!(reporter.had_error());
    }
}
