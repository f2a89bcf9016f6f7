//! Parser for Rill
//!
//! This is a recursive descent parser that converts tokens into an AST.
//! Precedence and associativity are handled by the layered grammar
//! functions. The parser stops at the first syntax error: there is no
//! recovery or resynchronization, the error is surfaced to the caller
//! and the rest of the input is abandoned.

use crate::ast::*;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};
use thiserror::Error;

/// Parser errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        span: Span,
    },

    #[error("invalid numeric literal `{text}`")]
    InvalidNumber { text: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::InvalidNumber { span, .. } => *span,
        }
    }
}

/// Parse result
pub type ParseResult<T> = Result<T, ParseError>;

/// The parser for Rill
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    previous: Token,
    /// Lookahead buffer for multi-token lookahead
    lookahead: Vec<Token>,
}

impl<'src> Parser<'src> {
    /// Create a new parser
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let previous = current.clone();

        Self {
            lexer,
            current,
            previous,
            lookahead: Vec::new(),
        }
    }

    /// Get the source code
    pub fn source(&self) -> &'src str {
        self.lexer.source()
    }

    /// Advance to next token
    fn advance(&mut self) -> Token {
        self.previous = self.current.clone();
        self.current = if !self.lookahead.is_empty() {
            self.lookahead.remove(0)
        } else {
            self.lexer.next_token()
        };
        self.previous.clone()
    }

    /// Peek at the nth token ahead (0 = current, 1 = next, etc.)
    fn peek_nth(&mut self, n: usize) -> &Token {
        if n == 0 {
            return &self.current;
        }
        while self.lookahead.len() < n {
            let token = self.lexer.next_token();
            self.lookahead.push(token);
        }
        &self.lookahead[n - 1]
    }

    /// Check if current token matches
    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Check if at end of file
    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume token if it matches, otherwise error
    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(format!("{}", kind)))
        }
    }

    /// Consume token if it matches
    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Build an "unexpected token" error at the current token
    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: self.current.kind,
            span: self.current.span,
        }
    }

    /// Get text of a token
    fn text(&self, token: &Token) -> &'src str {
        token.text(self.source())
    }

    // ============ Top-level parsing ============

    /// Parse a complete program
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let start = self.current.span.start;
        let mut items = Vec::new();

        while !self.is_at_end() {
            items.push(self.parse_item()?);
        }

        let end = self.previous.span.end;
        Ok(Program {
            items,
            span: Span::new(start, end),
        })
    }

    /// Parse a top-level item: a function definition, or a statement
    /// destined for the implicit `main`
    fn parse_item(&mut self) -> ParseResult<Item> {
        // `type ident (` starts a function definition; anything else,
        // including `type ident` without parens, is a statement.
        if self.current.kind.is_type()
            && self.peek_nth(1).kind == TokenKind::Ident
            && self.peek_nth(2).kind == TokenKind::LParen
        {
            return self.parse_fn().map(Item::Function);
        }
        self.parse_stmt().map(Item::Stmt)
    }

    // ============ Function parsing ============

    fn parse_fn(&mut self) -> ParseResult<FnDef> {
        let start = self.current.span.start;
        let return_type = self.parse_type()?;
        let name = self.parse_ident()?;

        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;

        let proto_end = self.previous.span.end;
        let proto = Prototype {
            return_type,
            name,
            params,
            span: Span::new(start, proto_end),
        };

        let body = self.parse_block()?;

        Ok(FnDef {
            proto,
            body,
            span: Span::new(start, self.previous.span.end),
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(params)
    }

    fn parse_param(&mut self) -> ParseResult<Param> {
        let start = self.current.span.start;
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;
        Ok(Param {
            ty,
            name,
            span: Span::new(start, self.previous.span.end),
        })
    }

    fn parse_type(&mut self) -> ParseResult<TypeName> {
        let ty = match self.current.kind {
            TokenKind::Int => TypeName::Int,
            TokenKind::Double => TypeName::Double,
            TokenKind::Void => TypeName::Void,
            _ => return Err(self.unexpected("type name")),
        };
        self.advance();
        Ok(ty)
    }

    fn parse_ident(&mut self) -> ParseResult<Ident> {
        let token = self.expect(TokenKind::Ident)?;
        let name = self.text(&token).to_string();
        Ok(Ident::new(name, token.span))
    }

    // ============ Statement parsing ============

    fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.current.span.start;
        self.expect(TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }

        self.expect(TokenKind::RBrace)?;
        Ok(Block {
            stmts,
            span: Span::new(start, self.previous.span.end),
        })
    }

    fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current.span.start;

        let kind = match self.current.kind {
            TokenKind::Int | TokenKind::Double | TokenKind::Void => {
                let kind = self.parse_declaration()?;
                self.expect(TokenKind::Semicolon)?;
                kind
            }
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Return => {
                self.advance();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenKind::Semicolon)?;
                StmtKind::Return(value)
            }
            TokenKind::Break => {
                self.advance();
                self.expect(TokenKind::Semicolon)?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(TokenKind::Semicolon)?;
                StmtKind::Continue
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                StmtKind::Expr(expr)
            }
        };

        Ok(Stmt {
            kind,
            span: Span::new(start, self.previous.span.end),
        })
    }

    /// Parse a variable declaration: `int x`, `double y = 1.5`
    fn parse_declaration(&mut self) -> ParseResult<StmtKind> {
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;

        let init = if self.consume(TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(StmtKind::Declare { ty, name, init })
    }

    /// Parse a conditional: `if (cond) block (else (if | block))?`
    fn parse_if(&mut self) -> ParseResult<StmtKind> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;

        let then_branch = self.parse_block()?;

        let else_branch = if self.consume(TokenKind::Else) {
            let start = self.current.span.start;
            let kind = if self.check(TokenKind::If) {
                self.parse_if()?
            } else {
                StmtKind::Block(self.parse_block()?)
            };
            Some(Box::new(Stmt {
                kind,
                span: Span::new(start, self.previous.span.end),
            }))
        } else {
            None
        };

        Ok(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// Parse a while loop: `while (cond) block`
    fn parse_while(&mut self) -> ParseResult<StmtKind> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(StmtKind::While { condition, body })
    }

    /// Parse a counting loop: `for i = start, end (, step)? block`
    fn parse_for(&mut self) -> ParseResult<StmtKind> {
        self.expect(TokenKind::For)?;
        let var = self.parse_ident()?;
        self.expect(TokenKind::Eq)?;
        let start = self.parse_expr()?;
        self.expect(TokenKind::Comma)?;
        let end = self.parse_expr()?;

        let step = if self.consume(TokenKind::Comma) {
            self.parse_expr()?
        } else {
            // Default step of 1, so the node reaches code generation
            // fully populated.
            Expr {
                kind: ExprKind::Number(Number::Int(1)),
                span: self.previous.span,
            }
        };

        let body = self.parse_block()?;

        Ok(StmtKind::For {
            var,
            start,
            end,
            step,
            body,
        })
    }

    // ============ Expression parsing ============

    /// Parse an expression (lowest precedence: assignment)
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    /// assignment := ident "=" assignment | equality
    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        if self.check(TokenKind::Ident) && self.peek_nth(1).kind == TokenKind::Eq {
            let start = self.current.span.start;
            let name = self.parse_ident()?;
            self.expect(TokenKind::Eq)?;
            let value = self.parse_assignment()?;
            let span = Span::new(start, value.span.end);
            return Ok(Expr {
                kind: ExprKind::Assign {
                    name,
                    value: Box::new(value),
                },
                span,
            });
        }
        self.parse_equality()
    }

    /// equality := comparison (("==" | "!=") comparison)*
    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_comparison()?;

        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    /// comparison := additive (("<" | "<=" | ">" | ">=") additive)*
    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    /// additive := multiplicative (("+" | "-") multiplicative)*
    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    /// multiplicative := unary (("*" | "/" | "%") unary)*
    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    /// unary := ("-" | "!") unary | primary
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.current.kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let start = self.current.span.start;
        self.advance();
        let operand = self.parse_unary()?;
        let span = Span::new(start, operand.span.end);
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        })
    }

    /// primary := number | ident | call | "(" expr ")"
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.current.kind {
            TokenKind::IntLiteral => {
                let token = self.advance();
                let text = self.text(&token);
                let value = text.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
                    text: text.to_string(),
                    span: token.span,
                })?;
                Ok(Expr {
                    kind: ExprKind::Number(Number::Int(value)),
                    span: token.span,
                })
            }
            TokenKind::FloatLiteral => {
                let token = self.advance();
                let text = self.text(&token);
                let value = text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                    text: text.to_string(),
                    span: token.span,
                })?;
                Ok(Expr {
                    kind: ExprKind::Number(Number::Float(value)),
                    span: token.span,
                })
            }
            TokenKind::Ident => {
                let name = self.parse_ident()?;
                if self.check(TokenKind::LParen) {
                    return self.parse_call(name);
                }
                let span = name.span;
                Ok(Expr {
                    kind: ExprKind::Variable(name),
                    span,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parse a call's argument list: `callee(a, b, c)`
    fn parse_call(&mut self, callee: Ident) -> ParseResult<Expr> {
        let start = callee.span.start;
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(Expr {
            kind: ExprKind::Call { callee, args },
            span: Span::new(start, self.previous.span.end),
        })
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        Expr {
            kind: ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        }
    }
}

/// Helper function to parse a complete program
pub fn parse(source: &str) -> ParseResult<Program> {
    Parser::new(source).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Program {
        parse(source).expect("program should parse")
    }

    #[test]
    fn test_parse_function() {
        let program = parse_ok("int add(int a, int b) { return a + b; }");
        assert_eq!(program.items.len(), 1);
        match &program.items[0] {
            Item::Function(f) => {
                assert_eq!(f.proto.name.name, "add");
                assert_eq!(f.proto.return_type, TypeName::Int);
                assert_eq!(f.proto.params.len(), 2);
                assert_eq!(f.proto.params[0].name.name, "a");
                assert_eq!(f.body.stmts.len(), 1);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_declaration_with_init() {
        let program = parse_ok("double x = 1.5;");
        match &program.items[0] {
            Item::Stmt(Stmt {
                kind: StmtKind::Declare { ty, name, init },
                ..
            }) => {
                assert_eq!(*ty, TypeName::Double);
                assert_eq!(name.name, "x");
                assert!(init.is_some());
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let program = parse_ok("int r = 1 + 2 * 3;");
        let init = match &program.items[0] {
            Item::Stmt(Stmt {
                kind: StmtKind::Declare { init: Some(e), .. },
                ..
            }) => e,
            other => panic!("expected declaration, got {:?}", other),
        };
        match &init.kind {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(
                    right.kind,
                    ExprKind::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_comparison_binds_looser_than_additive() {
        let program = parse_ok("int r = 1 + 2 < 4;");
        let init = match &program.items[0] {
            Item::Stmt(Stmt {
                kind: StmtKind::Declare { init: Some(e), .. },
                ..
            }) => e,
            other => panic!("expected declaration, got {:?}", other),
        };
        assert!(matches!(
            init.kind,
            ExprKind::Binary {
                op: BinaryOp::Lt,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_if_else() {
        let program = parse_ok("int f(int x) { if (x > 0) { return 1; } else { return 0; } }");
        let body = match &program.items[0] {
            Item::Function(f) => &f.body,
            other => panic!("expected function, got {:?}", other),
        };
        match &body.stmts[0].kind {
            StmtKind::If { else_branch, .. } => assert!(else_branch.is_some()),
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_for_default_step() {
        let program = parse_ok("int f() { for i = 0, 5 { } return 0; }");
        let body = match &program.items[0] {
            Item::Function(f) => &f.body,
            other => panic!("expected function, got {:?}", other),
        };
        match &body.stmts[0].kind {
            StmtKind::For { var, step, .. } => {
                assert_eq!(var.name, "i");
                assert!(matches!(step.kind, ExprKind::Number(Number::Int(1))));
            }
            other => panic!("expected for, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_while_break_continue() {
        let program = parse_ok("int f() { while (1) { break; continue; } return 0; }");
        let body = match &program.items[0] {
            Item::Function(f) => &f.body,
            other => panic!("expected function, got {:?}", other),
        };
        match &body.stmts[0].kind {
            StmtKind::While { body, .. } => {
                assert!(matches!(body.stmts[0].kind, StmtKind::Break));
                assert!(matches!(body.stmts[1].kind, StmtKind::Continue));
            }
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_call_args_in_order() {
        let program = parse_ok("int r = f(1, 2, 3);");
        let init = match &program.items[0] {
            Item::Stmt(Stmt {
                kind: StmtKind::Declare { init: Some(e), .. },
                ..
            }) => e,
            other => panic!("expected declaration, got {:?}", other),
        };
        match &init.kind {
            ExprKind::Call { callee, args } => {
                assert_eq!(callee.name, "f");
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_first_error_aborts() {
        // The parser reports the first error, never a partial tree.
        let err = parse("int x = ;").unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, found, .. } => {
                assert_eq!(expected, "expression");
                assert_eq!(found, TokenKind::Semicolon);
            }
            other => panic!("expected unexpected-token error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_character_rejected_by_parser() {
        let err = parse("int x = 1 @ 2;").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                found: TokenKind::Unknown,
                ..
            }
        ));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let program = parse_ok("int f(int a, int b) { a = b = 1; return a; }");
        let body = match &program.items[0] {
            Item::Function(f) => &f.body,
            other => panic!("expected function, got {:?}", other),
        };
        match &body.stmts[0].kind {
            StmtKind::Expr(Expr {
                kind: ExprKind::Assign { name, value },
                ..
            }) => {
                assert_eq!(name.name, "a");
                assert!(matches!(value.kind, ExprKind::Assign { .. }));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }
}
