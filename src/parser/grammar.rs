use super::types::{BinaryOp, Expr, Source, Span, Stmt, StmtKind, Token, TokenKind, UnaryOp};
use crate::error::SyntaxError;

/// Deepest nesting of blocks, parentheses, unary operators and operator
/// chains accepted in one source unit.
pub const MAX_NESTING: usize = 256;

/// Recursive-descent parser over a token vector.
pub struct Parser<'a> {
    source: &'a Source,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a Source, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse_program(mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut body = Vec::new();
        while !self.check(&TokenKind::Eof) {
            body.push(self.statement()?);
        }
        Ok(body)
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::at(self.source, self.peek().span.start, message)
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn descend(&mut self) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error("expression nested too deeply"));
        }
        Ok(())
    }

    /// A trailing `;` is optional before `}` and at end of input.
    fn terminator(&mut self) -> Result<Span, SyntaxError> {
        let span = self.peek().span;
        if self.eat(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.check(&TokenKind::Eof)
        {
            Ok(span)
        } else {
            Err(self.error("expected `;`"))
        }
    }

    fn statement(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.peek().span;
        match self.peek().kind.clone() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt {
                    kind: StmtKind::Empty,
                    span: start,
                })
            }
            TokenKind::Debugger => {
                self.advance();
                let end = self.terminator()?;
                Ok(Stmt {
                    kind: StmtKind::Debugger,
                    span: start.to(end),
                })
            }
            TokenKind::LBrace => {
                self.advance();
                self.descend()?;
                let mut body = Vec::new();
                while !self.check(&TokenKind::RBrace) {
                    if self.check(&TokenKind::Eof) {
                        return Err(self.error("expected `}`"));
                    }
                    body.push(self.statement()?);
                }
                self.depth -= 1;
                let end = self.advance().span;
                Ok(Stmt {
                    kind: StmtKind::Block(body),
                    span: start.to(end),
                })
            }
            TokenKind::Let | TokenKind::Var => {
                let is_let = self.advance().kind == TokenKind::Let;
                let name = match self.advance().kind {
                    TokenKind::Ident(name) => name,
                    _ => {
                        return Err(SyntaxError::at(
                            self.source,
                            start.end,
                            "expected binding name",
                        ))
                    }
                };
                let init = if self.eat(&TokenKind::Assign) {
                    Some(self.expression()?)
                } else {
                    None
                };
                let end = self.terminator()?;
                let kind = if is_let {
                    StmtKind::Let { name, init }
                } else {
                    StmtKind::Var { name, init }
                };
                Ok(Stmt {
                    kind,
                    span: start.to(end),
                })
            }
            _ => {
                let expr = self.expression()?;
                let end = self.terminator()?;
                Ok(Stmt {
                    kind: StmtKind::Expr(expr),
                    span: start.to(end),
                })
            }
        }
    }

    pub fn expression(&mut self) -> Result<Expr, SyntaxError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, SyntaxError> {
        let lhs = self.equality()?;
        if self.check(&TokenKind::Assign) {
            let at = self.peek().span.start;
            self.advance();
            self.descend()?;
            let value = self.assignment()?;
            self.depth -= 1;
            return match lhs {
                Expr::Ident(name) => Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                }),
                _ => Err(SyntaxError::at(self.source, at, "invalid assignment target")),
            };
        }
        Ok(lhs)
    }

    fn binary_level(
        &mut self,
        next: fn(&mut Self) -> Result<Expr, SyntaxError>,
        ops: &[(TokenKind, BinaryOp)],
    ) -> Result<Expr, SyntaxError> {
        let mut lhs = next(self)?;
        // Each fold nests the tree one level deeper on the left.
        let mut folds = 0;
        'outer: loop {
            for (kind, op) in ops {
                if self.eat(kind) {
                    self.descend()?;
                    folds += 1;
                    let rhs = next(self)?;
                    lhs = Expr::Binary {
                        op: *op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    };
                    continue 'outer;
                }
            }
            self.depth -= folds;
            return Ok(lhs);
        }
    }

    fn equality(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(
            Self::comparison,
            &[(TokenKind::EqEq, BinaryOp::Eq), (TokenKind::NotEq, BinaryOp::NotEq)],
        )
    }

    fn comparison(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(
            Self::additive,
            &[
                (TokenKind::Le, BinaryOp::Le),
                (TokenKind::Ge, BinaryOp::Ge),
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::Gt, BinaryOp::Gt),
            ],
        )
    }

    fn additive(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(
            Self::multiplicative,
            &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
        )
    }

    fn multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(
            Self::unary,
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Rem),
            ],
        )
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        self.descend()?;
        let op = if self.eat(&TokenKind::Minus) {
            Some(UnaryOp::Neg)
        } else if self.eat(&TokenKind::Bang) {
            Some(UnaryOp::Not)
        } else {
            None
        };
        let expr = match op {
            Some(op) => Expr::Unary {
                op,
                operand: Box::new(self.unary()?),
            },
            None => self.primary()?,
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        let tok = self.peek().clone();
        let expr = match tok.kind {
            TokenKind::Number(n) => Expr::Number(n),
            TokenKind::Str(s) => Expr::Str(s),
            TokenKind::True => Expr::Bool(true),
            TokenKind::False => Expr::Bool(false),
            TokenKind::Null => Expr::Null,
            TokenKind::Undefined => Expr::Undefined,
            TokenKind::This => Expr::This,
            TokenKind::Ident(name) => Expr::Ident(name),
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                return Ok(inner);
            }
            TokenKind::Eof => return Err(self.error("unexpected end of input")),
            _ => return Err(self.error("unexpected token")),
        };
        self.advance();
        Ok(expr)
    }
}
