//! Tree walking interpreter

use std::{borrow::Cow, cmp::Ordering, collections::HashMap};

use serde_json::{Map, Value};
use ztpl_parser::Trim;

use crate::{
    env::Env,
    error::{Error, Result},
    helpers,
    script::{
        Script,
        ast::{AssignOp, BinaryOp, Expr, Output, Stmt, UnaryOp},
        value::{add, compare, display, equals, number, to_number, truthy},
    },
};

static NULL: Value = Value::Null;

static BUILTINS: [&str; 4] = ["include", "escape_html", "trim_eol", "trim_whitespace"];

/// Member access that keeps borrowed values borrowed
fn child<'v>(parent: Cow<'v, Value>, key: &Value) -> Result<Cow<'v, Value>> {
    let index = |len: usize| {
        let n = to_number(key);
        (n.fract() == 0.0 && n >= 0.0 && n < len as f64).then_some(n as usize)
    };
    match parent.as_ref() {
        Value::Null => {
            return Err(Error::runtime(format!(
                "cannot read property '{}' of null",
                display(key)
            )));
        }
        Value::String(s) => {
            return Ok(Cow::Owned(match key.as_str() {
                Some("length") => Value::from(s.chars().count()),
                _ => index(usize::MAX)
                    .and_then(|i| s.chars().nth(i))
                    .map_or(Value::Null, |c| Value::String(c.to_string())),
            }));
        }
        Value::Array(items) if key.as_str() == Some("length") => {
            return Ok(Cow::Owned(Value::from(items.len())));
        }
        _ => (),
    }
    Ok(match parent {
        Cow::Borrowed(value) => Cow::Borrowed(match value {
            Value::Object(map) => map.get(&*display(key)).unwrap_or(&NULL),
            Value::Array(items) => index(items.len()).map_or(&NULL, |i| &items[i]),
            _ => &NULL,
        }),
        Cow::Owned(value) => Cow::Owned(match value {
            Value::Object(mut map) => map.remove(&*display(key)).unwrap_or(Value::Null),
            Value::Array(mut items) => match index(items.len()) {
                Some(i) => items.swap_remove(i),
                None => Value::Null,
            },
            _ => Value::Null,
        }),
    })
}

pub(crate) struct Interpreter<'a> {
    script: &'a Script,
    env: &'a Env<'a>,
    data: &'a Value,
    scopes: Vec<HashMap<String, Value>>,
    out: String,
}

impl<'a> Interpreter<'a> {
    pub fn new(script: &'a Script, env: &'a Env<'a>, data: &'a Value) -> Self {
        Self {
            script,
            env,
            data,
            scopes: vec![HashMap::new()],
            out: String::new(),
        }
    }

    pub fn run(mut self) -> Result<String> {
        let script = self.script;
        for stmt in &script.body {
            self.execute(stmt)?;
        }
        Ok(self.out)
    }

    fn local(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn is_bound(&self, name: &str) -> bool {
        name == self.script.obj_name || self.local(name).is_some()
    }

    fn scoped(&mut self, vars: HashMap<String, Value>, stmt: &Stmt) -> Result<()> {
        self.scopes.push(vars);
        let result = self.execute(stmt);
        self.scopes.pop();
        result
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Emit(index) => self.emit(*index)?,
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
            Stmt::Let(name, init) => {
                let value = match init {
                    Some(expr) => self.eval(expr)?.into_owned(),
                    None => Value::Null,
                };
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(name.clone(), value);
                }
            }
            Stmt::Assign(name, op, expr) => {
                let value = self.eval(expr)?.into_owned();
                let slot = self
                    .scopes
                    .iter_mut()
                    .rev()
                    .find_map(|scope| scope.get_mut(name))
                    .ok_or_else(|| Error::runtime(format!("{} is not declared", name)))?;
                *slot = match op {
                    AssignOp::Set => value,
                    AssignOp::Add => add(slot, &value),
                    AssignOp::Sub => number(to_number(slot) - to_number(&value)),
                };
            }
            Stmt::If(condition, then, otherwise) => {
                let condition = truthy(&*self.eval(condition)?);
                if condition {
                    self.scoped(HashMap::new(), then)?;
                } else if let Some(otherwise) = otherwise {
                    self.scoped(HashMap::new(), otherwise)?;
                }
            }
            Stmt::ForOf(var, iterable, body) => {
                let items = match self.eval(iterable)?.into_owned() {
                    Value::Array(items) => items,
                    Value::String(s) => s.chars().map(|c| Value::String(c.to_string())).collect(),
                    other => {
                        return Err(Error::runtime(format!(
                            "{} is not iterable",
                            kind_of(&other)
                        )));
                    }
                };
                for item in items {
                    self.scoped(HashMap::from([(var.clone(), item)]), body)?;
                }
            }
            Stmt::ForIn(var, iterable, body) => {
                let keys: Vec<Value> = match self.eval(iterable)?.as_ref() {
                    Value::Object(map) => map.keys().map(|k| Value::String(k.clone())).collect(),
                    Value::Array(items) => (0..items.len()).map(Value::from).collect(),
                    Value::String(s) => (0..s.chars().count()).map(Value::from).collect(),
                    _ => Vec::new(),
                };
                for key in keys {
                    self.scoped(HashMap::from([(var.clone(), key)]), body)?;
                }
            }
            Stmt::Block(body) => {
                self.scopes.push(HashMap::new());
                let result = body.iter().try_for_each(|stmt| self.execute(stmt));
                self.scopes.pop();
                result?;
            }
            Stmt::Empty => (),
        }
        Ok(())
    }

    fn emit(&mut self, index: usize) -> Result<()> {
        let script = self.script;
        match &script.outputs[index] {
            Output::Text(text) => self.out.push_str(text),
            Output::Value { expr, escape, trim } => {
                let value = display(&*self.eval(expr)?).into_owned();
                let value = if *escape {
                    helpers::escape_html(&value).into_owned()
                } else {
                    value
                };
                self.out.push_str(match trim {
                    Trim::None => value.as_str(),
                    Trim::Eol => helpers::trim_eol(&value),
                    Trim::Whitespace => helpers::trim_whitespace(&value),
                });
            }
        }
        Ok(())
    }

    fn eval(&self, expr: &Expr) -> Result<Cow<'_, Value>> {
        Ok(match expr {
            Expr::Literal(value) => Cow::Owned(value.clone()),
            Expr::Ident(name) => match self.local(name) {
                Some(value) => Cow::Borrowed(value),
                None if *name == self.script.obj_name => Cow::Borrowed(self.data),
                None if BUILTINS.contains(&name.as_str()) => {
                    return Err(Error::runtime(format!("{} can only be called", name)));
                }
                None => return Err(Error::runtime(format!("{} is not defined", name))),
            },
            Expr::Array(items) => Cow::Owned(Value::Array(
                items
                    .iter()
                    .map(|item| self.eval(item).map(Cow::into_owned))
                    .collect::<Result<_>>()?,
            )),
            Expr::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), self.eval(value)?.into_owned());
                }
                Cow::Owned(Value::Object(map))
            }
            Expr::Member(object, name) => child(self.eval(object)?, &Value::String(name.clone()))?,
            Expr::Index(object, index) => {
                let key = self.eval(index)?.into_owned();
                child(self.eval(object)?, &key)?
            }
            Expr::Call(callee, args) => Cow::Owned(self.call(callee, args)?),
            Expr::Unary(op, operand) => {
                let value = self.eval(operand)?;
                Cow::Owned(match op {
                    UnaryOp::Not => Value::Bool(!truthy(&value)),
                    UnaryOp::Neg => number(-to_number(&value)),
                    UnaryOp::Plus => number(to_number(&value)),
                })
            }
            Expr::Binary(op, left, right) => Cow::Owned(self.binary(*op, left, right)?),
            Expr::Conditional(condition, then, otherwise) => {
                if truthy(&*self.eval(condition)?) {
                    self.eval(then)?
                } else {
                    self.eval(otherwise)?
                }
            }
        })
    }

    fn binary(&self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value> {
        let lhs = self.eval(left)?;
        match op {
            BinaryOp::And if !truthy(&lhs) => return Ok(lhs.into_owned()),
            BinaryOp::Or if truthy(&lhs) => return Ok(lhs.into_owned()),
            _ => (),
        }
        let rhs = self.eval(right)?;
        let arithmetic = |f: fn(f64, f64) -> f64| number(f(to_number(&lhs), to_number(&rhs)));
        let ordered = |accept: fn(Ordering) -> bool| {
            Value::Bool(compare(&lhs, &rhs).is_some_and(accept))
        };
        Ok(match op {
            BinaryOp::Add => add(&lhs, &rhs),
            BinaryOp::Sub => arithmetic(|a, b| a - b),
            BinaryOp::Mul => arithmetic(|a, b| a * b),
            BinaryOp::Div => arithmetic(|a, b| a / b),
            BinaryOp::Rem => arithmetic(|a, b| a % b),
            BinaryOp::Eq => Value::Bool(equals(&lhs, &rhs)),
            BinaryOp::Ne => Value::Bool(!equals(&lhs, &rhs)),
            BinaryOp::Lt => ordered(Ordering::is_lt),
            BinaryOp::Le => ordered(Ordering::is_le),
            BinaryOp::Gt => ordered(Ordering::is_gt),
            BinaryOp::Ge => ordered(Ordering::is_ge),
            BinaryOp::And | BinaryOp::Or => Value::clone(&rhs),
        })
    }

    fn args(&self, args: &[Expr]) -> Result<Vec<Value>> {
        args.iter()
            .map(|arg| self.eval(arg).map(Cow::into_owned))
            .collect()
    }

    fn call(&self, callee: &Expr, args: &[Expr]) -> Result<Value> {
        match callee {
            Expr::Ident(name) if !self.is_bound(name) => self.builtin(name, self.args(args)?),
            Expr::Member(object, method) => {
                let target = self.eval(object)?;
                method_call(&target, method, self.args(args)?)
            }
            _ => Err(Error::runtime("expression is not a function")),
        }
    }

    fn builtin(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let first = args.first().map_or(Cow::Borrowed(""), display);
        Ok(Value::String(match name {
            "include" => self.env.include(&first, args.get(1).unwrap_or(&NULL))?,
            "escape_html" => self.env.escape_html(&first).into_owned(),
            "trim_eol" => self.env.trim_eol(&first).to_string(),
            "trim_whitespace" => self.env.trim_whitespace(&first).to_string(),
            _ => return Err(Error::runtime(format!("{} is not defined", name))),
        }))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The handful of string, array and number methods templates commonly need
fn method_call(target: &Value, method: &str, args: Vec<Value>) -> Result<Value> {
    let arg = |i: usize| args.get(i).unwrap_or(&NULL);
    Ok(match (target, method) {
        (Value::String(s), "toUpperCase") => Value::String(s.to_uppercase()),
        (Value::String(s), "toLowerCase") => Value::String(s.to_lowercase()),
        (Value::String(s), "trim") => Value::String(s.trim().to_string()),
        (Value::String(s), "includes") => Value::Bool(s.contains(&*display(arg(0)))),
        (Value::String(s), "startsWith") => Value::Bool(s.starts_with(&*display(arg(0)))),
        (Value::String(s), "endsWith") => Value::Bool(s.ends_with(&*display(arg(0)))),
        (Value::Array(items), "join") => {
            let separator = match arg(0) {
                Value::Null => Cow::Borrowed(","),
                separator => display(separator),
            };
            Value::String(
                items
                    .iter()
                    .map(|item| display(item))
                    .collect::<Vec<_>>()
                    .join(&*separator),
            )
        }
        (Value::Array(items), "includes") => {
            Value::Bool(items.iter().any(|item| equals(item, arg(0))))
        }
        (Value::Number(n), "toFixed") => {
            let digits = to_number(arg(0)).clamp(0.0, 100.0) as usize;
            Value::String(format!("{:.*}", digits, n.as_f64().unwrap_or(f64::NAN)))
        }
        (Value::Null, _) => {
            return Err(Error::runtime(format!(
                "cannot read property '{}' of null",
                method
            )));
        }
        (_, "toString") => Value::String(display(target).into_owned()),
        (other, _) => {
            return Err(Error::runtime(format!(
                "{}.{} is not a function",
                kind_of(other),
                method
            )));
        }
    })
}
