// ABOUTME: Recursive-descent parser turning a token stream into statement and expression trees

use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};
use crate::error::ErrorReporter;
use crate::token::{Literal, Token, TokenKind};
use std::rc::Rc;

const MAX_ARGS: usize = 255;

/// Signals that a parse rule failed and has already reported itself; the
/// caller either propagates it with `?` or recovers via `synchronize`.
struct ParseError;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    reporter: &'a ErrorReporter,
    loop_depth: usize,
    function_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, reporter: &'a ErrorReporter) -> Self {
        Parser {
            tokens,
            current: 0,
            reporter,
            loop_depth: 0,
            function_depth: 0,
        }
    }

    /// Parses the whole token stream, skipping statements that fail to parse
    /// (after resynchronizing) so later valid statements are still reported.
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        statements
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_kinds(&[TokenKind::Fun]) {
            self.function_decl("function")
        } else if self.match_kinds(&[TokenKind::Var]) {
            self.var_decl()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn function_decl(&mut self, kind: &str) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, &format!("Expect {kind} name."))?;
        self.consume(TokenKind::LeftParen, &format!("Expect '(' after {kind} name."))?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    self.error(self.peek().clone(), "Can't have more than 255 parameters.");
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.match_kinds(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;

        self.consume(TokenKind::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        self.function_depth += 1;
        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        let body = self.block();
        self.loop_depth = saved_loop_depth;
        self.function_depth -= 1;

        Ok(Stmt::Function(Rc::new(FunctionDecl {
            name,
            params,
            body: Rc::new(body),
        })))
    }

    fn var_decl(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;

        let initializer = if self.match_kinds(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(name, initializer))
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.match_kinds(&[TokenKind::Print]) {
            return self.print_stmt();
        }
        if self.match_kinds(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block(self.block()));
        }
        if self.match_kinds(&[TokenKind::If]) {
            return self.if_stmt();
        }
        if self.match_kinds(&[TokenKind::While]) {
            return self.while_stmt();
        }
        if self.match_kinds(&[TokenKind::For]) {
            return self.for_stmt();
        }
        if self.match_kinds(&[TokenKind::Return]) {
            return self.return_stmt();
        }
        if self.match_kinds(&[TokenKind::Break]) {
            return self.break_stmt();
        }
        self.expression_stmt()
    }

    fn print_stmt(&mut self) -> Result<Stmt, ParseError> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn expression_stmt(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn block(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        if self.consume(TokenKind::RightBrace, "Expect '}' after block.").is_err() {
            // Already reported; the statement list collected so far still stands.
        }
        statements
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_kinds(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(condition, then_branch, else_branch))
    }

    fn while_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after while condition.")?;

        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;

        Ok(Stmt::While(condition, Box::new(body?)))
    }

    /// Desugars `for (init; cond; inc) body` into a `while` loop wrapped in a
    /// block, rather than giving `for` its own AST node.
    fn for_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_kinds(&[TokenKind::Semicolon]) {
            None
        } else if self.match_kinds(&[TokenKind::Var]) {
            Some(self.var_decl()?)
        } else {
            Some(self.expression_stmt()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenKind::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;
        let mut body = body?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition = condition.unwrap_or(Expr::Literal(LiteralValue::Bool(true)));
        body = Stmt::While(condition, Box::new(body));

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous().clone();
        if self.function_depth == 0 {
            return Err(self.error(keyword, "Can't return from top-level code."));
        }

        let value = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(keyword, value))
    }

    fn break_stmt(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous().clone();
        if self.loop_depth == 0 {
            return Err(self.error(keyword, "Can't break outside of a loop."));
        }

        self.consume(TokenKind::Semicolon, "Expect ';' after 'break'.")?;
        Ok(Stmt::Break(keyword))
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.comma()
    }

    fn comma(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.conditional()?;
        while self.match_kinds(&[TokenKind::Comma]) {
            let operator = self.previous().clone();
            let right = self.conditional()?;
            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }
        Ok(expr)
    }

    fn conditional(&mut self) -> Result<Expr, ParseError> {
        let expr = self.assignment()?;

        if self.match_kinds(&[TokenKind::Question]) {
            let then_branch = self.expression()?;
            self.consume(TokenKind::Colon, "Expect ':' after then branch of conditional expression.")?;
            let else_branch = self.conditional()?;
            return Ok(Expr::Conditional(Box::new(expr), Box::new(then_branch), Box::new(else_branch)));
        }

        Ok(expr)
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.logic_or()?;

        if self.match_kinds(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign(name, Box::new(value))),
                _ => {
                    self.reporter.error_at_token(&equals, "Invalid assignment target.");
                    Ok(expr)
                }
            };
        }

        Ok(expr)
    }

    fn logic_or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.logic_and()?;
        while self.match_kinds(&[TokenKind::Or]) {
            let operator = self.previous().clone();
            let right = self.logic_and()?;
            expr = Expr::Logical(Box::new(expr), operator, Box::new(right));
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.match_kinds(&[TokenKind::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(Box::new(expr), operator, Box::new(right));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        while self.match_kinds(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        while self.match_kinds(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        while self.match_kinds(&[TokenKind::Minus, TokenKind::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        while self.match_kinds(&[TokenKind::Slash, TokenKind::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.match_kinds(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(operator, Box::new(right)));
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;

        loop {
            if self.match_kinds(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    self.error(self.peek().clone(), "Can't have more than 255 arguments.");
                }
                arguments.push(self.conditional()?);
                if !self.match_kinds(&[TokenKind::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call(Box::new(callee), paren, arguments))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.match_kinds(&[TokenKind::False]) {
            return Ok(Expr::Literal(LiteralValue::Bool(false)));
        }
        if self.match_kinds(&[TokenKind::True]) {
            return Ok(Expr::Literal(LiteralValue::Bool(true)));
        }
        if self.match_kinds(&[TokenKind::Nil]) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }
        if self.match_kinds(&[TokenKind::Number]) {
            let Some(Literal::Number(n)) = &self.previous().literal else {
                unreachable!("scanner always attaches a Number literal to a NUMBER token");
            };
            return Ok(Expr::Literal(LiteralValue::Number(*n)));
        }
        if self.match_kinds(&[TokenKind::String]) {
            let Some(Literal::String(s)) = &self.previous().literal else {
                unreachable!("scanner always attaches a String literal to a STRING token");
            };
            return Ok(Expr::Literal(LiteralValue::String(s.clone())));
        }
        if self.match_kinds(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable(self.previous().clone()));
        }
        if self.match_kinds(&[TokenKind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        // Error productions: a binary or ternary operator found where a primary
        // expression was expected. Report once, consume the operator's usual
        // right-hand side to resynchronize within the expression, then hand
        // back a placeholder so the caller's grammar position stays valid.
        if self.match_kinds(&[
            TokenKind::Comma,
            TokenKind::Question,
            TokenKind::BangEqual,
            TokenKind::EqualEqual,
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
            TokenKind::Plus,
            TokenKind::Slash,
            TokenKind::Star,
        ]) {
            let operator = self.previous().clone();
            self.reporter.error_at_token(&operator, "Missing left-hand operand.");

            match operator.kind {
                TokenKind::Comma => {
                    self.conditional()?;
                }
                TokenKind::Question => {
                    self.expression()?;
                    self.consume(TokenKind::Colon, "Expect ':' after then branch of conditional expression.")?;
                    self.conditional()?;
                }
                TokenKind::BangEqual | TokenKind::EqualEqual => {
                    self.comparison()?;
                }
                TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual => {
                    self.term()?;
                }
                TokenKind::Plus => {
                    self.factor()?;
                }
                TokenKind::Slash | TokenKind::Star => {
                    self.unary()?;
                }
                _ => unreachable!("match_kinds above only admits the arms handled here"),
            }

            return Ok(Expr::Literal(LiteralValue::Nil));
        }

        Err(self.error(self.peek().clone(), "Expect expression."))
    }

    fn match_kinds(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|kind| self.check(*kind)) {
            self.advance();
            return true;
        }
        false
    }

    fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(self.error(self.peek().clone(), message))
    }

    fn error(&self, token: Token, message: &str) -> ParseError {
        self.reporter.error_at_token(&token, message);
        ParseError
    }

    /// Discards tokens until a likely statement boundary, so one malformed
    /// statement doesn't cascade into spurious errors for the rest of the file.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {}
            }

            self.advance();
        }
    }
}
