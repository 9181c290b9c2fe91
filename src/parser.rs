//! Parser: token stream to AST.
//!
//! Statements dispatch directly on the current token; expressions use
//! precedence climbing with one token of lookahead (`cur` + `peek`).

use crate::ast::{Expr, FunLiteral, InfixOp, ListItem, PrefixOp, RecordItem, Stmt};
use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token, TokenKind};

/// Binding strength, lowest to highest. The climbing loop continues while
/// the next operator binds tighter than the caller's minimum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    Less,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::And | TokenKind::Or => Precedence::Equals,
        TokenKind::Lt | TokenKind::Le => Precedence::Less,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Star | TokenKind::Slash | TokenKind::Mod => Precedence::Product,
        TokenKind::LParen | TokenKind::Dot | TokenKind::LBracket => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

fn infix_op(kind: TokenKind) -> Option<InfixOp> {
    let op = match kind {
        TokenKind::Plus => InfixOp::Add,
        TokenKind::Minus => InfixOp::Sub,
        TokenKind::Star => InfixOp::Mul,
        TokenKind::Slash => InfixOp::Div,
        TokenKind::Mod => InfixOp::Mod,
        TokenKind::Eq => InfixOp::Eq,
        TokenKind::Lt => InfixOp::Lt,
        TokenKind::Le => InfixOp::Le,
        TokenKind::And => InfixOp::And,
        TokenKind::Or => InfixOp::Or,
        _ => return None,
    };
    Some(op)
}

/// Parse a whole program.
pub fn parse(src: &str) -> Result<Vec<Stmt>> {
    Parser::new(src)?.parse_program()
}

pub struct Parser {
    lexer: Lexer,
    cur: Token,
    peek: Token,
}

impl Parser {
    pub fn new(src: &str) -> Result<Self> {
        let mut lexer = Lexer::new(src);
        let cur = lexer.next()?;
        let peek = lexer.next()?;
        Ok(Self { lexer, cur, peek })
    }

    /// Slide the lookahead window forward by one token.
    fn read_token(&mut self) -> Result<()> {
        let next = self.lexer.next()?;
        self.cur = std::mem::replace(&mut self.peek, next);
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.cur.kind != kind {
            return Err(Error::Parse(format!(
                "expected {kind}, but got {}",
                self.cur.kind
            )));
        }
        self.read_token()
    }

    fn expect_next(&mut self, kind: TokenKind) -> Result<()> {
        if self.peek.kind != kind {
            return Err(Error::Parse(format!(
                "expected {kind}, but got {}",
                self.peek.kind
            )));
        }
        self.read_token()
    }

    pub fn parse_program(&mut self) -> Result<Vec<Stmt>> {
        let mut program = Vec::new();
        while self.cur.kind != TokenKind::Eof {
            program.push(self.parse_stmt()?);
        }
        Ok(program)
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.cur.kind {
            TokenKind::Eof => Err(Error::Parse("unexpected eof".into())),
            TokenKind::Var => {
                self.read_token()?;
                self.parse_var_decl()
            }
            // `NAME = expr` assignment sugar.
            TokenKind::Ident if self.peek.kind == TokenKind::Assign => self.parse_assign(),
            TokenKind::While => self.parse_while(),
            TokenKind::If => self.parse_if(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => {
                self.expect(TokenKind::Break)?;
                Ok(Stmt::Break)
            }
            TokenKind::Continue => {
                self.expect(TokenKind::Continue)?;
                Ok(Stmt::Continue)
            }
            _ => Ok(Stmt::Expr(self.parse_expr(Precedence::Lowest)?)),
        }
    }

    /// Statement sequence terminated by `end`, or by `else` when parsing an
    /// `if`'s then-branch. The terminator is left for the caller.
    fn parse_body(&mut self) -> Result<Vec<Stmt>> {
        let mut body = Vec::new();
        loop {
            match self.cur.kind {
                TokenKind::Eof => {
                    return Err(Error::Parse("unexpected eof while reading body".into()))
                }
                TokenKind::End | TokenKind::Else => break,
                _ => body.push(self.parse_stmt()?),
            }
        }
        Ok(body)
    }

    fn parse_var_decl(&mut self) -> Result<Stmt> {
        if self.cur.kind != TokenKind::Ident {
            return Err(Error::Parse(format!(
                "expected identifier, but got {}",
                self.cur.kind
            )));
        }
        let name = self.cur.text.clone();
        self.expect_next(TokenKind::Assign)?;
        self.read_token()?;
        let value = self.parse_expr(Precedence::Lowest)?;
        Ok(Stmt::VarDecl { name, value })
    }

    fn parse_assign(&mut self) -> Result<Stmt> {
        let name = self.cur.text.clone();
        self.expect_next(TokenKind::Assign)?;
        self.read_token()?;
        let value = self.parse_expr(Precedence::Lowest)?;
        Ok(Stmt::Assign { name, value })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.read_token()?;
        let cond = self.parse_expr(Precedence::Lowest)?;
        let body = self.parse_body()?;
        self.expect(TokenKind::End)?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.read_token()?;
        let cond = self.parse_expr(Precedence::Lowest)?;
        let then_body = self.parse_body()?;
        let else_body = if self.cur.kind == TokenKind::Else {
            self.read_token()?;
            Some(self.parse_body()?)
        } else {
            None
        };
        self.expect(TokenKind::End)?;
        Ok(Stmt::If {
            cond,
            then_body,
            else_body,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        // `return` carries no value when followed immediately by `end`/eof.
        if self.peek.kind == TokenKind::End || self.peek.kind == TokenKind::Eof {
            self.read_token()?;
            return Ok(Stmt::Return(None));
        }
        self.read_token()?;
        let value = self.parse_expr(Precedence::Lowest)?;
        Ok(Stmt::Return(Some(value)))
    }

    /// Precedence climbing. Every parser (prefix and infix) leaves `cur` on
    /// the first token after what it consumed. The loop stops at `end`/eof
    /// unconditionally.
    fn parse_expr(&mut self, precedence: Precedence) -> Result<Expr> {
        let mut expr = self.parse_prefix()?;

        while !matches!(self.cur.kind, TokenKind::Eof | TokenKind::End)
            && precedence < precedence_of(self.cur.kind)
        {
            expr = match self.cur.kind {
                TokenKind::LParen => self.parse_call(expr)?,
                TokenKind::Dot => self.parse_field(expr)?,
                TokenKind::LBracket => self.parse_index_or_slice(expr)?,
                kind => match infix_op(kind) {
                    Some(op) => self.parse_infix(op, expr)?,
                    None => break,
                },
            };
        }
        Ok(expr)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        match self.cur.kind {
            TokenKind::Number => self.parse_number_literal(),
            TokenKind::True | TokenKind::False => {
                let value = self.cur.kind == TokenKind::True;
                self.read_token()?;
                Ok(Expr::Bool(value))
            }
            TokenKind::Str => {
                let value = self.cur.text.clone();
                self.read_token()?;
                Ok(Expr::Str(value))
            }
            TokenKind::Interp => {
                // One opaque text segment; see the lexer notes.
                let text = self.cur.text.clone();
                self.read_token()?;
                Ok(Expr::InterpStr {
                    texts: vec![text],
                    values: Vec::new(),
                })
            }
            TokenKind::Minus => {
                self.read_token()?;
                let expr = self.parse_expr(Precedence::Prefix)?;
                Ok(Expr::Prefix {
                    op: PrefixOp::Neg,
                    expr: Box::new(expr),
                })
            }
            TokenKind::Ident => {
                let name = self.cur.text.clone();
                self.read_token()?;
                Ok(Expr::Var(name))
            }
            TokenKind::Fun => self.parse_fun_literal(),
            TokenKind::LBracket => self.parse_list_literal(),
            TokenKind::LBrace => self.parse_record_literal(),
            TokenKind::LParen => {
                self.read_token()?;
                let expr = self.parse_expr(Precedence::Lowest)?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            kind => Err(Error::Parse(format!("no prefix parser found for {kind}"))),
        }
    }

    fn parse_number_literal(&mut self) -> Result<Expr> {
        let value: f64 = self
            .cur
            .text
            .parse()
            .map_err(|_| Error::Parse(format!("invalid number literal '{}'", self.cur.text)))?;
        self.read_token()?;
        Ok(Expr::Number(value))
    }

    fn parse_fun_literal(&mut self) -> Result<Expr> {
        let name = if self.peek.kind == TokenKind::Ident {
            self.read_token()?;
            Some(self.cur.text.clone())
        } else {
            None
        };

        self.expect_next(TokenKind::LParen)?;
        let params = self.parse_fun_params()?;
        let body = self.parse_body()?;
        self.expect(TokenKind::End)?;

        Ok(Expr::Fun(FunLiteral { name, params, body }))
    }

    fn parse_fun_params(&mut self) -> Result<Vec<String>> {
        let mut params = Vec::new();
        loop {
            if self.peek.kind == TokenKind::Eof {
                return Err(Error::Parse(
                    "unexpected eof while reading function parameters".into(),
                ));
            }
            if self.peek.kind == TokenKind::RParen {
                break;
            }
            self.expect_next(TokenKind::Ident)?;
            params.push(self.cur.text.clone());
            if self.peek.kind == TokenKind::RParen {
                break;
            }
            self.expect_next(TokenKind::Comma)?;
        }
        // Step onto the ')' and past it.
        self.read_token()?;
        self.read_token()?;
        Ok(params)
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr> {
        self.read_token()?;
        let mut args = Vec::new();
        loop {
            if self.cur.kind == TokenKind::Eof {
                return Err(Error::Parse(
                    "unexpected eof while reading call arguments".into(),
                ));
            }
            if self.cur.kind == TokenKind::RParen {
                break;
            }
            args.push(self.parse_expr(Precedence::Lowest)?);
            if self.cur.kind == TokenKind::RParen {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }
        self.read_token()?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_field(&mut self, base: Expr) -> Result<Expr> {
        self.read_token()?;
        if self.cur.kind != TokenKind::Ident {
            return Err(Error::Parse(format!(
                "expected identifier after '.', but got {}",
                self.cur.kind
            )));
        }
        let name = self.cur.text.clone();
        self.read_token()?;
        Ok(Expr::Field {
            base: Box::new(base),
            name,
        })
    }

    /// `base[expr]`, `base[a:b]`, `base[:b]`, `base[a:]` or `base[:]`.
    fn parse_index_or_slice(&mut self, base: Expr) -> Result<Expr> {
        self.read_token()?;

        if self.cur.kind == TokenKind::Colon {
            self.read_token()?;
            let end = self.parse_slice_end()?;
            return Ok(Expr::Slice {
                base: Box::new(base),
                start: None,
                end,
            });
        }

        let first = self.parse_expr(Precedence::Lowest)?;
        if self.cur.kind == TokenKind::Colon {
            self.read_token()?;
            let end = self.parse_slice_end()?;
            return Ok(Expr::Slice {
                base: Box::new(base),
                start: Some(Box::new(first)),
                end,
            });
        }

        self.expect(TokenKind::RBracket)?;
        Ok(Expr::Index {
            base: Box::new(base),
            index: Box::new(first),
        })
    }

    fn parse_slice_end(&mut self) -> Result<Option<Box<Expr>>> {
        if self.cur.kind == TokenKind::RBracket {
            self.read_token()?;
            return Ok(None);
        }
        let end = self.parse_expr(Precedence::Lowest)?;
        self.expect(TokenKind::RBracket)?;
        Ok(Some(Box::new(end)))
    }

    fn parse_infix(&mut self, op: InfixOp, left: Expr) -> Result<Expr> {
        let precedence = precedence_of(self.cur.kind);
        self.read_token()?;
        let right = self.parse_expr(precedence)?;
        Ok(Expr::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_list_literal(&mut self) -> Result<Expr> {
        self.read_token()?;
        let mut items = Vec::new();
        loop {
            if self.cur.kind == TokenKind::Eof {
                return Err(Error::Parse(
                    "unexpected eof while reading list literal".into(),
                ));
            }
            if self.cur.kind == TokenKind::RBracket {
                break;
            }
            if self.cur.kind == TokenKind::Ellipsis {
                self.read_token()?;
                items.push(ListItem::Spread(self.parse_expr(Precedence::Lowest)?));
            } else {
                items.push(ListItem::Expr(self.parse_expr(Precedence::Lowest)?));
            }
            if self.cur.kind == TokenKind::RBracket {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }
        self.read_token()?;
        Ok(Expr::List(items))
    }

    fn parse_record_literal(&mut self) -> Result<Expr> {
        self.read_token()?;
        let mut items = Vec::new();
        loop {
            if self.cur.kind == TokenKind::Eof {
                return Err(Error::Parse(
                    "unexpected eof while reading record literal".into(),
                ));
            }
            if self.cur.kind == TokenKind::RBrace {
                break;
            }
            if self.cur.kind == TokenKind::Ellipsis {
                self.read_token()?;
                items.push(RecordItem::Spread(self.parse_expr(Precedence::Lowest)?));
            } else {
                if self.cur.kind != TokenKind::Ident {
                    return Err(Error::Parse(format!(
                        "expected identifier, but got {}",
                        self.cur.kind
                    )));
                }
                let key = self.cur.text.clone();
                self.expect_next(TokenKind::Assign)?;
                self.read_token()?;
                let value = self.parse_expr(Precedence::Lowest)?;
                items.push(RecordItem::Field(key, value));
            }
            if self.cur.kind == TokenKind::RBrace {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }
        self.read_token()?;
        Ok(Expr::Record(items))
    }
}
