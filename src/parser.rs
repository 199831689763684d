pub mod ast;

use std::rc::Rc;

use crate::diagnostics::Diagnostics;
use crate::parser::ast::{BinaryOp, Expr, ExprKind, Program, Stmt, StmtKind, UnaryOp};
use crate::scanner::token::{Token, TokenType};

/// Marker for panic-mode unwinding. The diagnostic describing the failure is
/// already in the sink by the time this is thrown.
struct ParseInterrupt;

type ParseResult<T> = Result<T, ParseInterrupt>;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, diagnostics: &'a mut Diagnostics) -> Self {
        Parser {
            tokens,
            current: 0,
            diagnostics,
        }
    }

    /// Parse the whole token stream. Syntax errors are collected in the sink
    /// and recovery resumes at the next statement boundary, so one pass can
    /// surface several independent problems.
    pub fn parse(mut self) -> Program {
        let mut body = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                body.push(stmt);
            }
        }

        Program { body }
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.check(TokenType::Var) || self.check(TokenType::Const) {
            self.var_declaration()
        } else if self.check(TokenType::Function) {
            self.function_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseInterrupt) => {
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let is_const = self.check(TokenType::Const);
        let keyword = self.advance().clone(); // consume 'var' or 'const'

        let name = self
            .consume(TokenType::Identifier, "a variable name")?
            .lexeme
            .clone();

        let initializer = if self.match_token(TokenType::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::Var {
                name,
                initializer,
                is_const,
            },
            line: keyword.line,
            column: keyword.column,
        })
    }

    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance().clone(); // consume 'function'

        let name = self
            .consume(TokenType::Identifier, "a function name")?
            .lexeme
            .clone();

        self.consume(TokenType::LeftParen, "'('")?;

        let mut params = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                params.push(
                    self.consume(TokenType::Identifier, "a parameter name")?
                        .lexeme
                        .clone(),
                );
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenType::RightParen, "')'")?;

        let body = self.block_statement()?;

        Ok(Stmt {
            kind: StmtKind::Function {
                name,
                params,
                body: Rc::new(body),
            },
            line: keyword.line,
            column: keyword.column,
        })
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.check(TokenType::If) {
            return self.if_statement();
        }
        if self.check(TokenType::While) {
            return self.while_statement();
        }
        if self.check(TokenType::Return) {
            return self.return_statement();
        }
        if self.check(TokenType::Print) {
            return self.print_statement();
        }
        if self.check(TokenType::LeftBrace) {
            return self.block_statement();
        }
        self.expression_statement()
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance().clone(); // consume 'if'

        self.consume(TokenType::LeftParen, "'('")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "')'")?;

        let consequent = Box::new(self.block_statement()?);

        let alternate = if self.match_token(TokenType::Else) {
            if self.check(TokenType::If) {
                Some(Box::new(self.if_statement()?))
            } else {
                Some(Box::new(self.block_statement()?))
            }
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                condition,
                consequent,
                alternate,
            },
            line: keyword.line,
            column: keyword.column,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance().clone(); // consume 'while'

        self.consume(TokenType::LeftParen, "'('")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "')'")?;

        let body = Box::new(self.block_statement()?);

        Ok(Stmt {
            kind: StmtKind::While { condition, body },
            line: keyword.line,
            column: keyword.column,
        })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance().clone(); // consume 'return'

        // A bare 'return' right before '}' or the end of input carries no value
        let value = if !self.check(TokenType::RightBrace) && !self.is_at_end() {
            Some(self.expression()?)
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::Return(value),
            line: keyword.line,
            column: keyword.column,
        })
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance().clone(); // consume 'print'
        let value = self.expression()?;

        Ok(Stmt {
            kind: StmtKind::Print(value),
            line: keyword.line,
            column: keyword.column,
        })
    }

    fn block_statement(&mut self) -> ParseResult<Stmt> {
        let brace = self.consume(TokenType::LeftBrace, "'{'")?.clone();

        let mut body = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                body.push(stmt);
            }
        }

        self.consume(TokenType::RightBrace, "'}'")?;

        Ok(Stmt {
            kind: StmtKind::Block(body),
            line: brace.line,
            column: brace.column,
        })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        let (line, column) = (expr.line, expr.column);

        Ok(Stmt {
            kind: StmtKind::Expression(expr),
            line,
            column,
        })
    }

    // ------------------------------------------------------------
    // Expressions (precedence climbing)
    // ------------------------------------------------------------

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.match_token(TokenType::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?; // right-associative

            let (line, column) = (expr.line, expr.column);
            match expr.kind {
                ExprKind::Identifier(name) => {
                    return Ok(Expr {
                        kind: ExprKind::Assign {
                            target: name,
                            value: Box::new(value),
                        },
                        line,
                        column,
                    });
                }
                _ => {
                    // Recoverable: report and hand back the left side untouched
                    self.diagnostics
                        .report("Invalid assignment target", equals.line, equals.column);
                    return Ok(expr);
                }
            }
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.check(TokenType::Or) {
            let operator = self.advance().clone();
            let right = self.and()?;
            expr = Expr {
                kind: ExprKind::Binary {
                    operator: BinaryOp::Or,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                line: operator.line,
                column: operator.column,
            };
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.check(TokenType::And) {
            let operator = self.advance().clone();
            let right = self.equality()?;
            expr = Expr {
                kind: ExprKind::Binary {
                    operator: BinaryOp::And,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                line: operator.line,
                column: operator.column,
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while self.match_any(&[TokenType::EqualEqual, TokenType::BangEqual]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::EqualEqual => BinaryOp::Equal,
                _ => BinaryOp::NotEqual,
            };
            let right = self.comparison()?;
            expr = Expr {
                kind: ExprKind::Binary {
                    operator,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                line: operator_token.line,
                column: operator_token.column,
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while self.match_any(&[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Greater => BinaryOp::Greater,
                TokenType::GreaterEqual => BinaryOp::GreaterEqual,
                TokenType::Less => BinaryOp::Less,
                _ => BinaryOp::LessEqual,
            };
            let right = self.term()?;
            expr = Expr {
                kind: ExprKind::Binary {
                    operator,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                line: operator_token.line,
                column: operator_token.column,
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while self.match_any(&[TokenType::Plus, TokenType::Minus]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Plus => BinaryOp::Add,
                _ => BinaryOp::Sub,
            };
            let right = self.factor()?;
            expr = Expr {
                kind: ExprKind::Binary {
                    operator,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                line: operator_token.line,
                column: operator_token.column,
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while self.match_any(&[TokenType::Star, TokenType::Slash, TokenType::Percent]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Star => BinaryOp::Mul,
                TokenType::Slash => BinaryOp::Div,
                _ => BinaryOp::Rem,
            };
            let right = self.unary()?;
            expr = Expr {
                kind: ExprKind::Binary {
                    operator,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                line: operator_token.line,
                column: operator_token.column,
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_any(&[TokenType::Bang, TokenType::Minus]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Bang => UnaryOp::Not,
                _ => UnaryOp::Minus,
            };
            let operand = self.unary()?; // chained unary: !!x, --x
            return Ok(Expr {
                kind: ExprKind::Unary {
                    operator,
                    operand: Box::new(operand),
                },
                line: operator_token.line,
                column: operator_token.column,
            });
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        // Postfix calls and index accesses chain: f()[0](x)
        loop {
            if self.match_token(TokenType::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if self.match_token(TokenType::LeftBracket) {
                let index = self.expression()?;
                self.consume(TokenType::RightBracket, "']' after index")?;
                let (line, column) = (expr.line, expr.column);
                expr = Expr {
                    kind: ExprKind::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    },
                    line,
                    column,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenType::RightParen) {
            loop {
                arguments.push(self.expression()?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenType::RightParen, "')' after arguments")?;

        let (line, column) = (callee.line, callee.column);
        Ok(Expr {
            kind: ExprKind::Call {
                callee: Box::new(callee),
                arguments,
            },
            line,
            column,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let (line, column) = (token.line, token.column);

        match &token.token_type {
            TokenType::False => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(false),
                    line,
                    column,
                })
            }
            TokenType::True => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(true),
                    line,
                    column,
                })
            }
            TokenType::Null => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Null,
                    line,
                    column,
                })
            }
            TokenType::Number(n) => {
                let value = *n;
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Number(value),
                    line,
                    column,
                })
            }
            TokenType::String(s) => {
                let value = s.clone();
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Str(value),
                    line,
                    column,
                })
            }
            TokenType::Identifier => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Identifier(token.lexeme.clone()),
                    line,
                    column,
                })
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenType::RightParen, "')'")?;
                Ok(expr)
            }
            TokenType::LeftBracket => {
                self.advance();
                self.array_literal(line, column)
            }
            _ => {
                self.diagnostics
                    .report_unexpected_token(&token, "an expression");
                Err(ParseInterrupt)
            }
        }
    }

    fn array_literal(&mut self, line: usize, column: usize) -> ParseResult<Expr> {
        let mut elements = Vec::new();

        if !self.check(TokenType::RightBracket) {
            loop {
                elements.push(self.expression()?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenType::RightBracket, "']' to close array")?;

        Ok(Expr {
            kind: ExprKind::Array(elements),
            line,
            column,
        })
    }

    // ------------------------------------------------------------
    // Panic-mode recovery
    // ------------------------------------------------------------

    /// Discard tokens until something that can begin a new statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            match self.peek().token_type {
                TokenType::Function
                | TokenType::Var
                | TokenType::Const
                | TokenType::If
                | TokenType::While
                | TokenType::For
                | TokenType::Return
                | TokenType::Print => return,
                _ => {}
            }

            self.advance();
        }
    }

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().token_type == token_type
    }

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            return true;
        }
        false
    }

    fn match_any(&mut self, types: &[TokenType]) -> bool {
        for t in types {
            if self.check(t.clone()) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, token_type: TokenType, expected: &str) -> ParseResult<&Token> {
        if self.check(token_type) {
            return Ok(self.advance());
        }

        let token = self.peek().clone();
        self.diagnostics.report_unexpected_token(&token, expected);
        Err(ParseInterrupt)
    }
}
