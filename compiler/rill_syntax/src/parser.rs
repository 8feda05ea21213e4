//! Recursive-descent parser for the Rill language

use crate::ast::*;
use crate::token::{Token, TokenType};
use rill_common::{CompileError, CompileResult, Span, Stage};

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse_file(&mut self) -> CompileResult<File> {
        self.expect(&TokenType::KeywordPackage)?;
        let package = self.expect_identifier("package name")?;
        let mut funcs = Vec::new();
        self.skip_semicolons();
        while !self.check(&TokenType::EndOfFile) {
            funcs.push(self.parse_func_decl()?);
            self.skip_semicolons();
        }
        Ok(File { package, funcs })
    }

    fn parse_func_decl(&mut self) -> CompileResult<FuncDecl> {
        let start = self.current_span();
        self.expect(&TokenType::KeywordFunc)?;
        let name = self.expect_identifier("function name")?;

        self.expect(&TokenType::LeftParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenType::RightParen) {
            loop {
                let pname = self.expect_identifier("parameter name")?;
                let pty = self.expect_identifier("parameter type")?;
                params.push(Param { name: pname, ty: pty });
                if !self.eat(&TokenType::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenType::RightParen)?;

        let result = if self.check_identifier() {
            Some(self.expect_identifier("result type")?)
        } else {
            None
        };

        let body = self.parse_block()?;
        let span = start.to(body.span);
        Ok(FuncDecl { name, params, result, body, span })
    }

    fn parse_block(&mut self) -> CompileResult<Block> {
        let start = self.current_span();
        self.expect(&TokenType::LeftBrace)?;
        let mut stmts = Vec::new();
        self.skip_semicolons();
        while !self.check(&TokenType::RightBrace) {
            if self.check(&TokenType::EndOfFile) {
                return Err(self.error_here("unexpected end of file inside a block"));
            }
            stmts.push(self.parse_stmt()?);
            self.skip_semicolons();
        }
        let end = self.current_span();
        self.expect(&TokenType::RightBrace)?;
        Ok(Block { stmts, span: start.to(end) })
    }

    fn parse_stmt(&mut self) -> CompileResult<Stmt> {
        let start = self.current_span();
        match self.current_type().clone() {
            TokenType::KeywordVar => {
                self.advance();
                let name = self.expect_identifier("variable name")?;
                let ty = self.expect_identifier("variable type")?;
                let init = if self.eat(&TokenType::Assign) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                let span = start.to(self.previous_span());
                Ok(Stmt { kind: StmtKind::Var { name, ty, init }, span })
            }
            TokenType::KeywordIf => self.parse_if(),
            TokenType::KeywordReturn => {
                self.advance();
                let value = if self.check(&TokenType::RightBrace) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let span = start.to(self.previous_span());
                Ok(Stmt { kind: StmtKind::Return { value }, span })
            }
            TokenType::Identifier(_) => {
                // assignment, short declaration, or an expression statement
                if matches!(self.peek_type(), TokenType::Assign) {
                    let name = self.expect_identifier("assignment target")?;
                    self.advance(); // =
                    let value = self.parse_expr()?;
                    let span = start.to(value.span);
                    Ok(Stmt { kind: StmtKind::Assign { name, value }, span })
                } else if matches!(self.peek_type(), TokenType::Define) {
                    let name = self.expect_identifier("declaration target")?;
                    self.advance(); // :=
                    let value = self.parse_expr()?;
                    let span = start.to(value.span);
                    Ok(Stmt { kind: StmtKind::Define { name, value }, span })
                } else {
                    let expr = self.parse_expr()?;
                    let span = expr.span;
                    Ok(Stmt { kind: StmtKind::Expr(expr), span })
                }
            }
            other => Err(self.error_here(&format!("unexpected token {} in block", other))),
        }
    }

    fn parse_if(&mut self) -> CompileResult<Stmt> {
        let start = self.current_span();
        self.expect(&TokenType::KeywordIf)?;
        let cond = self.parse_expr()?;
        let then_block = self.parse_block()?;
        let else_block = if self.eat(&TokenType::KeywordElse) {
            if self.check(&TokenType::KeywordIf) {
                // else-if chains wrap the nested if in a synthetic block
                let nested = self.parse_if()?;
                let span = nested.span;
                Some(Block { stmts: vec![nested], span })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        let span = start.to(self.previous_span());
        Ok(Stmt { kind: StmtKind::If { cond, then_block, else_block }, span })
    }

    fn parse_expr(&mut self) -> CompileResult<Expr> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> CompileResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current_type() {
                TokenType::Less => BinOp::Lt,
                TokenType::Greater => BinOp::Gt,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_additive()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr { kind: ExprKind::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span };
        }
    }

    fn parse_additive(&mut self) -> CompileResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current_type() {
                TokenType::Plus => BinOp::Add,
                TokenType::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr { kind: ExprKind::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span };
        }
    }

    fn parse_multiplicative(&mut self) -> CompileResult<Expr> {
        let mut lhs = self.parse_primary()?;
        loop {
            let op = match self.current_type() {
                TokenType::Multiply => BinOp::Mul,
                TokenType::Divide => BinOp::Div,
                TokenType::Modulo => BinOp::Rem,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_primary()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr { kind: ExprKind::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span };
        }
    }

    fn parse_primary(&mut self) -> CompileResult<Expr> {
        let span = self.current_span();
        match self.current_type().clone() {
            TokenType::IntegerLiteral { text, radix } => {
                self.advance();
                Ok(Expr { kind: ExprKind::Int { text, radix }, span })
            }
            TokenType::StringLiteral(text) => {
                self.advance();
                Ok(Expr { kind: ExprKind::Str(text), span })
            }
            TokenType::KeywordTrue => {
                self.advance();
                Ok(Expr { kind: ExprKind::Bool(true), span })
            }
            TokenType::KeywordFalse => {
                self.advance();
                Ok(Expr { kind: ExprKind::Bool(false), span })
            }
            TokenType::Identifier(name) => {
                self.advance();
                if self.check(&TokenType::LeftParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenType::RightParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.eat(&TokenType::Comma) {
                                break;
                            }
                        }
                    }
                    let end = self.current_span();
                    self.expect(&TokenType::RightParen)?;
                    let callee = Ident::new(name, span);
                    Ok(Expr { kind: ExprKind::Call { callee, args }, span: span.to(end) })
                } else {
                    Ok(Expr { kind: ExprKind::Ident(name), span })
                }
            }
            TokenType::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                let end = self.current_span();
                self.expect(&TokenType::RightParen)?;
                Ok(Expr { kind: ExprKind::Paren(Box::new(inner)), span: span.to(end) })
            }
            other => Err(self.error_here(&format!("expected an expression, found {}", other))),
        }
    }

    // token cursor helpers

    fn current_type(&self) -> &TokenType {
        &self.tokens[self.current].kind
    }

    fn peek_type(&self) -> &TokenType {
        let index = (self.current + 1).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn current_span(&self) -> Span {
        self.tokens[self.current].span
    }

    fn previous_span(&self) -> Span {
        let index = self.current.saturating_sub(1);
        self.tokens[index].span
    }

    fn advance(&mut self) {
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
    }

    fn check(&self, token_type: &TokenType) -> bool {
        self.current_type() == token_type
    }

    fn check_identifier(&self) -> bool {
        matches!(self.current_type(), TokenType::Identifier(_))
    }

    fn eat(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token_type: &TokenType) -> CompileResult<()> {
        if self.eat(token_type) {
            Ok(())
        } else {
            Err(self.error_here(&format!("expected {}, found {}", token_type, self.current_type())))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> CompileResult<Ident> {
        let span = self.current_span();
        match self.current_type().clone() {
            TokenType::Identifier(name) => {
                self.advance();
                Ok(Ident::new(name, span))
            }
            other => Err(self.error_here(&format!("expected {}, found {}", what, other))),
        }
    }

    fn skip_semicolons(&mut self) {
        while self.eat(&TokenType::Semicolon) {}
    }

    fn error_here(&self, message: &str) -> CompileError {
        Stage::Parse.error_at(self.current_span().start, message)
    }
}
