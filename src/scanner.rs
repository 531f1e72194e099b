// ABOUTME: Scanner module turning a source string into a sequence of tokens

use crate::error::ErrorReporter;
use crate::token::{keyword_kind, Literal, Token, TokenKind};

pub struct Scanner<'a> {
    source: Vec<char>,
    reporter: &'a ErrorReporter,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &str, reporter: &'a ErrorReporter) -> Self {
        Scanner {
            source: source.chars().collect(),
            reporter,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scans the whole source, returning tokens terminated by exactly one `EOF`.
    ///
    /// Errors are recorded on the reporter rather than aborting the scan, so the
    /// largest possible prefix of valid tokens is always delivered.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::new(TokenKind::Eof, "", None, self.line));
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ':' => self.add_token(TokenKind::Colon),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            '?' => self.add_token(TokenKind::Question),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '!' => {
                let kind = if self.match_next('=') { TokenKind::BangEqual } else { TokenKind::Bang };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.match_next('=') { TokenKind::EqualEqual } else { TokenKind::Equal };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.match_next('=') { TokenKind::LessEqual } else { TokenKind::Less };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.match_next('=') { TokenKind::GreaterEqual } else { TokenKind::Greater };
                self.add_token(kind);
            }
            '/' => {
                if self.match_next('/') {
                    while self.peek() != Some('\n') && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.match_next('*') {
                    self.block_comment();
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            c => self.reporter.error_at_line(self.line, &format!("Unexpected character '{c}'")),
        }
    }

    fn string(&mut self) {
        while self.peek() != Some('"') && !self.is_at_end() {
            if self.peek() == Some('\n') {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.reporter.error_at_line(self.line, "Unterminated string.");
            return;
        }

        // The closing quote.
        self.advance();

        let value: String = self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_token_with_literal(TokenKind::String, Some(Literal::String(value)));
    }

    fn number(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            // Consume the '.'
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let value: f64 = text.parse().expect("scanned number lexeme must parse as f64");
        self.add_token_with_literal(TokenKind::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = keyword_kind(&text).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }

    fn block_comment(&mut self) {
        let opening_line = self.line;
        loop {
            if self.is_at_end() {
                self.reporter
                    .error_at_line(opening_line, "Unterminated block comment.");
                return;
            }
            if self.peek() == Some('*') && self.peek_next() == Some('/') {
                self.current += 2;
                return;
            }
            if self.peek() == Some('\n') {
                self.line += 1;
            }
            self.advance();
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_with_literal(kind, None);
    }

    fn add_token_with_literal(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let text: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(kind, text, literal, self.line));
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}
