//! Syntax tree of the script language

use serde_json::Value;
use ztpl_parser::Trim;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Value),
    Ident(String),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssignOp {
    Set,
    Add,
    Sub,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stmt {
    /// Write the output at this index
    Emit(usize),
    Expr(Expr),
    Let(String, Option<Expr>),
    Assign(String, AssignOp, Expr),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    ForOf(String, Expr, Box<Stmt>),
    ForIn(String, Expr, Box<Stmt>),
    Block(Vec<Stmt>),
    Empty,
}

/// What an `Emit` statement writes
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Output {
    Text(String),
    Value { expr: Expr, escape: bool, trim: Trim },
}
