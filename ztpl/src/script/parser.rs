//! Recursive descent parser for the script language
//!
//! Code fragments of a template are parsed as one statement list, with an
//! `Emit` token standing in for every piece of static text and every value
//! marker between them. That is how `[[ if (x) { ]]text[[ } ]]` becomes an
//! `if` statement whose body writes `text`.

use serde_json::Value;

use crate::{
    error::{Error, Result},
    script::{
        ast::{AssignOp, BinaryOp, Expr, Stmt, UnaryOp},
        lexer::{Tok, Token},
    },
};

static RESERVED: [&str; 11] = [
    "if", "else", "for", "let", "const", "var", "in", "true", "false", "null", "undefined",
];

pub(crate) struct Parser<'s> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'s str,
}

impl<'s> Parser<'s> {
    pub fn new(tokens: Vec<Token>, source: &'s str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
        }
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_at(&self, offset: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + offset).map(|t| &t.tok)
    }

    fn advance(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|t| t.tok.clone());
        self.pos += 1;
        tok
    }

    fn error(&self, message: impl Into<String>) -> Error {
        let at = self
            .tokens
            .get(self.pos)
            .map_or(self.source.len(), |t| t.at)
            .min(self.source.len());
        let preceding = self.source.get(..at).unwrap_or(self.source);
        Error::syntax(message, preceding)
    }

    fn is_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(Tok::Punct(p)) if *p == punct)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(name)) if name == keyword)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.is_punct(punct) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, punct: &str) -> Result<()> {
        if self.eat(punct) {
            return Ok(());
        }
        Err(self.error(format!("expected {}", punct)))
    }

    fn name(&mut self) -> Result<String> {
        match self.peek() {
            Some(Tok::Ident(name)) if !RESERVED.contains(&name.as_str()) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    /// Parses the whole token stream as statements
    pub fn program(mut self) -> Result<Vec<Stmt>> {
        let mut body = Vec::new();
        while self.peek().is_some() {
            body.push(self.statement()?);
        }
        Ok(body)
    }

    /// Parses the whole token stream as a single expression
    pub fn expression_only(mut self) -> Result<Expr> {
        let expr = self.expression()?;
        if self.peek().is_some() {
            return Err(self.error("unexpected token after expression"));
        }
        Ok(expr)
    }

    fn statement(&mut self) -> Result<Stmt> {
        let stmt = match self.peek() {
            Some(Tok::Emit(index)) => {
                let index = *index;
                self.pos += 1;
                Stmt::Emit(index)
            }
            Some(Tok::Punct("{")) => self.block()?,
            Some(Tok::Punct(";")) => {
                self.pos += 1;
                Stmt::Empty
            }
            Some(Tok::Punct("}")) => return Err(self.error("unexpected }")),
            Some(Tok::Ident(keyword)) => match keyword.as_str() {
                "if" => self.if_statement()?,
                "for" => self.for_statement()?,
                "let" | "const" | "var" => self.declaration()?,
                "else" => return Err(self.error("else without if")),
                _ => match self.peek_at(1) {
                    Some(Tok::Punct("=")) => self.assignment(AssignOp::Set)?,
                    Some(Tok::Punct("+=")) => self.assignment(AssignOp::Add)?,
                    Some(Tok::Punct("-=")) => self.assignment(AssignOp::Sub)?,
                    _ => self.expression_statement()?,
                },
            },
            _ => self.expression_statement()?,
        };
        Ok(stmt)
    }

    fn block(&mut self) -> Result<Stmt> {
        self.expect("{")?;
        let mut body = Vec::new();
        while !self.eat("}") {
            if self.peek().is_none() {
                return Err(self.error("unclosed block"));
            }
            body.push(self.statement()?);
        }
        Ok(Stmt::Block(body))
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.pos += 1;
        self.expect("(")?;
        let condition = self.expression()?;
        self.expect(")")?;
        let then = self.statement()?;
        let otherwise = if self.is_keyword("else") {
            self.pos += 1;
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If(condition, Box::new(then), otherwise))
    }

    fn for_statement(&mut self) -> Result<Stmt> {
        self.pos += 1;
        self.expect("(")?;
        if self.is_keyword("let") || self.is_keyword("const") || self.is_keyword("var") {
            self.pos += 1;
        }
        let var = self.name()?;
        let of = if self.is_keyword("of") {
            true
        } else if self.is_keyword("in") {
            false
        } else {
            return Err(self.error("expected of or in"));
        };
        self.pos += 1;
        let iterable = self.expression()?;
        self.expect(")")?;
        let body = Box::new(self.statement()?);
        Ok(if of {
            Stmt::ForOf(var, iterable, body)
        } else {
            Stmt::ForIn(var, iterable, body)
        })
    }

    fn declaration(&mut self) -> Result<Stmt> {
        self.pos += 1;
        let name = self.name()?;
        let init = if self.eat("=") {
            Some(self.expression()?)
        } else {
            None
        };
        self.eat(";");
        Ok(Stmt::Let(name, init))
    }

    fn assignment(&mut self, op: AssignOp) -> Result<Stmt> {
        let name = self.name()?;
        self.pos += 1;
        let value = self.expression()?;
        self.eat(";");
        Ok(Stmt::Assign(name, op, value))
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.expression()?;
        self.eat(";");
        Ok(Stmt::Expr(expr))
    }

    fn expression(&mut self) -> Result<Expr> {
        let condition = self.binary(0)?;
        if !self.eat("?") {
            return Ok(condition);
        }
        let then = self.expression()?;
        self.expect(":")?;
        let otherwise = self.expression()?;
        Ok(Expr::Conditional(
            Box::new(condition),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    /// Binary operator at the current token with its precedence
    fn operator(&self) -> Option<(BinaryOp, u8)> {
        let op = match self.peek()? {
            Tok::Punct(p) => *p,
            _ => return None,
        };
        Some(match op {
            "||" => (BinaryOp::Or, 1),
            "&&" => (BinaryOp::And, 2),
            "===" | "==" => (BinaryOp::Eq, 3),
            "!==" | "!=" => (BinaryOp::Ne, 3),
            "<" => (BinaryOp::Lt, 4),
            "<=" => (BinaryOp::Le, 4),
            ">" => (BinaryOp::Gt, 4),
            ">=" => (BinaryOp::Ge, 4),
            "+" => (BinaryOp::Add, 5),
            "-" => (BinaryOp::Sub, 5),
            "*" => (BinaryOp::Mul, 6),
            "/" => (BinaryOp::Div, 6),
            "%" => (BinaryOp::Rem, 6),
            _ => return None,
        })
    }

    /// Precedence climbing over left associative operators
    fn binary(&mut self, min: u8) -> Result<Expr> {
        let mut left = self.unary()?;
        while let Some((op, precedence)) = self.operator() {
            if precedence <= min {
                break;
            }
            self.pos += 1;
            let right = self.binary(precedence)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = if self.eat("!") {
            UnaryOp::Not
        } else if self.eat("-") {
            UnaryOp::Neg
        } else if self.eat("+") {
            UnaryOp::Plus
        } else {
            return self.postfix();
        };
        Ok(Expr::Unary(op, Box::new(self.unary()?)))
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(".") {
                let name = match self.advance() {
                    Some(Tok::Ident(name)) => name,
                    _ => return Err(self.error("expected property name")),
                };
                expr = Expr::Member(Box::new(expr), name);
            } else if self.eat("[") {
                let index = self.expression()?;
                self.expect("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.eat("(") {
                let args = self.list(")")?;
                expr = Expr::Call(Box::new(expr), args);
            } else {
                return Ok(expr);
            }
        }
    }

    /// Comma separated expressions up to `close`, trailing comma allowed
    fn list(&mut self, close: &str) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(self.expression()?);
            if !self.eat(",") {
                self.expect(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn object(&mut self) -> Result<Expr> {
        let mut entries = Vec::new();
        while !self.eat("}") {
            let key = match self.advance() {
                Some(Tok::Ident(key)) | Some(Tok::Str(key)) => key,
                Some(Tok::Number(n)) => super::value::format_number(n),
                _ => {
                    self.pos -= 1;
                    return Err(self.error("expected property name"));
                }
            };
            let value = if self.eat(":") {
                self.expression()?
            } else {
                Expr::Ident(key.clone())
            };
            entries.push((key, value));
            if !self.eat(",") {
                self.expect("}")?;
                break;
            }
        }
        Ok(Expr::Object(entries))
    }

    fn primary(&mut self) -> Result<Expr> {
        let tok = match self.advance() {
            Some(tok) => tok,
            None => {
                self.pos -= 1;
                return Err(self.error("unexpected end of expression"));
            }
        };
        match tok {
            Tok::Number(n) => Ok(Expr::Literal(super::value::number(n))),
            Tok::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Tok::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "null" | "undefined" => Ok(Expr::Literal(Value::Null)),
                keyword if RESERVED.contains(&keyword) => {
                    self.pos -= 1;
                    Err(self.error(format!("unexpected {}", keyword)))
                }
                _ => Ok(Expr::Ident(name)),
            },
            Tok::Punct("(") => {
                let expr = self.expression()?;
                self.expect(")")?;
                Ok(expr)
            }
            Tok::Punct("[") => Ok(Expr::Array(self.list("]")?)),
            Tok::Punct("{") => self.object(),
            _ => {
                self.pos -= 1;
                Err(self.error("unexpected token"))
            }
        }
    }
}
