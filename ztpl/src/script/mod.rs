//! The default engine: a small scripting language for code markers
//!
//! Templates compiled at runtime cannot run Rust, so their code markers and
//! expressions are written in a JavaScript flavoured language evaluated over
//! [`serde_json::Value`] data.
//!
//! # Statements
//!
//! Statements may span several markers, the text between markers becomes
//! part of whichever block surrounds it:
//!
//! ```text
//! [[ if (z.user) { ]]Hello [[= z.user.name ]][[ } else { ]]Please log in[[ } ]]
//! [[ for (const item of z.items) { ]]<li>[[= item ]]</li>[[ } ]]
//! [[ for (key in z.attrs) { ]][[- key ]]="[[= z.attrs[key] ]]" [[ } ]]
//! [[ let total = 0; for (n of z.values) { total += n } ]]Total: [[- total ]]
//! ```
//!
//! # Expressions
//!
//! Literals (`"text"`, `'text'`, `` `text` ``, numbers, `true`, `false`,
//! `null`, `[a, b]`, `{ key: value }`), member access (`a.b`, `a[b]`,
//! `.length`), the operators `! - + * / % < <= > >= == != === !== && || ?:`
//! and calls to `include(name, data)`, `escape_html(s)`, `trim_eol(s)` and
//! `trim_whitespace(s)`. Strings and arrays know a few methods such as
//! `toUpperCase()`, `join(", ")` and `includes(x)`.
//!
//! `null` renders as an empty string and reading a missing property yields
//! `null`, while reading any property of `null` is an error.

mod ast;
mod eval;
mod lexer;
mod parser;
mod value;

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;
use ztpl_parser::{Node, Program};

use crate::{
    env::{Engine, Env, Executable},
    error::Result,
};

use self::{
    ast::{Output, Stmt},
    eval::Interpreter,
    lexer::{Tok, Token, tokenize},
    parser::Parser,
};

/// Engine interpreting code markers as script
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptEngine;

impl Engine for ScriptEngine {
    fn prepare(&self, program: &Program<'_>, obj_name: &str) -> Result<Arc<dyn Executable>> {
        Ok(Arc::new(Script::compile(program, obj_name)?))
    }
}

/// A parsed template, ready to run
#[derive(Debug)]
pub(crate) struct Script {
    obj_name: String,
    body: Vec<Stmt>,
    outputs: Vec<Output>,
}

impl Script {
    fn compile(program: &Program<'_>, obj_name: &str) -> Result<Self> {
        let mut source = String::new();
        let mut tokens = Vec::new();
        let mut outputs = Vec::new();
        for node in &program.nodes {
            match node {
                Node::Code(code) => tokens.extend(tokenize(code, source.len())?),
                Node::Literal(text) => outputs.push(Output::Text(text.to_string())),
                Node::Value { expr, escape, trim } => outputs.push(Output::Value {
                    expr: Parser::new(tokenize(expr, 0)?, expr).expression_only()?,
                    escape: *escape,
                    trim: *trim,
                }),
            }
            if !matches!(node, Node::Code(_)) {
                tokens.push(Token {
                    tok: Tok::Emit(outputs.len() - 1),
                    at: source.len(),
                });
            }
            source.push_str(match node {
                Node::Code(text) | Node::Literal(text) => text,
                Node::Value { expr, .. } => expr,
            });
        }
        let body = Parser::new(tokens, &source).program()?;
        trace!(
            statements = body.len(),
            outputs = outputs.len(),
            "prepared script"
        );
        Ok(Self {
            obj_name: obj_name.to_string(),
            body,
            outputs,
        })
    }
}

impl Executable for Script {
    fn execute(&self, data: &Value, env: &Env<'_>) -> Result<String> {
        Interpreter::new(self, env, data).run()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{Config, Error, compile};

    fn render(src: &str, data: Value) -> String {
        compile(src, &Config::default())
            .unwrap()
            .render(&data)
            .unwrap()
    }

    #[test]
    fn conditionals_across_markers() {
        let src = "A[[ if (z.n === 5) { ]]B[[ } ]]C";
        assert_eq!(render(src, json!({"n": 6})), "AC");
        assert_eq!(render(src, json!({"n": 5})), "ABC");
    }

    #[test]
    fn else_if_chain() {
        let src = "[[ if (z.n < 0) { ]]neg[[ } else if (z.n === 0) { ]]zero[[ } else { ]]pos[[ } ]]";
        assert_eq!(render(src, json!({"n": -3})), "neg");
        assert_eq!(render(src, json!({"n": 0})), "zero");
        assert_eq!(render(src, json!({"n": 2.5})), "pos");
    }

    #[test]
    fn loops() {
        let src = "<ul>[[ for (const item of z.items) { ]]<li>[[= item.name ]]</li>[[ } ]]</ul>";
        assert_eq!(
            render(src, json!({"items": [{"name": "a&b"}, {"name": "c"}]})),
            "<ul><li>a&amp;b</li><li>c</li></ul>"
        );
        let src = "[[ for (k in z) { ]][[- k ]]=[[- z[k] ]];[[ } ]]";
        assert_eq!(render(src, json!({"a": 1, "b": "x"})), "a=1;b=x;");
    }

    #[test]
    fn locals_and_assignment() {
        let src = "[[ let total = 0; for (n of z.values) { total += n } ]]Total: [[- total ]]";
        assert_eq!(render(src, json!({"values": [1, 2, 3.5]})), "Total: 6.5");
        let src = "[[ let s = 'x' ]][[ s = s + z.tail ]][[- s.toUpperCase() ]]";
        assert_eq!(render(src, json!({"tail": "yz"})), "XYZ");
    }

    #[test]
    fn block_scoping() {
        let src = "[[ let x = 1; { let x = 2 } ]][[- x ]]";
        assert_eq!(render(src, json!(null)), "1");
    }

    #[test]
    fn expressions() {
        assert_eq!(render("[[- 1 + 2 * 3 ]]", json!(null)), "7");
        assert_eq!(render("[[- 'n=' + (1 + 2) ]]", json!(null)), "n=3");
        assert_eq!(render("[[- z.a ? 'yes' : 'no' ]]", json!({"a": 0})), "no");
        assert_eq!(render("[[- z.a || 'fallback' ]]", json!({"a": ""})), "fallback");
        assert_eq!(render("[[- z.list.length ]]", json!({"list": [1, 2]})), "2");
        assert_eq!(render("[[- z.list.join(' | ') ]]", json!({"list": [1, 2]})), "1 | 2");
        assert_eq!(render("[[- z.price.toFixed(2) ]]", json!({"price": 12.2345})), "12.23");
        assert_eq!(render("[[- z.missing ]]|", json!({})), "|");
        assert_eq!(render("[[- !z.missing ]]", json!({})), "true");
    }

    #[test]
    fn non_finite_numbers_are_null() {
        assert_eq!(render("[[- 1 / 0 ]]|[[- 5 % 0 ]]|[[- 'a' * 2 ]]", json!(null)), "||");
        assert_eq!(render("[[- 1 / 0 === null ]]", json!(null)), "true");
        assert_eq!(render("[[- -1 / 0 || 'none' ]]", json!(null)), "none");
    }

    #[test]
    fn helpers_callable() {
        assert_eq!(
            render("[[- escape_html(z.s) + trim_whitespace('  x ') ]]", json!({"s": "<"})),
            "&lt;x"
        );
    }

    #[test]
    fn custom_object_name() {
        let renderer = compile("[[- data.str ]]", &Config::default().with_obj_name("data")).unwrap();
        assert_eq!(renderer.render(&json!({"str": "hello world"})).unwrap(), "hello world");
    }

    #[test]
    fn syntax_errors_at_compile() {
        let err = compile("[[ if (z.a { ]]x[[ } ]]", &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }), "{:?}", err);
        let err = compile("[[ if (z.a) { ]]never closed", &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }), "{:?}", err);
        let err = compile("[[- z.a b ]]", &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }), "{:?}", err);
    }

    #[test]
    fn runtime_errors_at_render() {
        let renderer = compile("[[- z.a.b ]]", &Config::default()).unwrap();
        assert!(matches!(renderer.render(&json!({})), Err(Error::Runtime(_))));
        let renderer = compile("[[- nope ]]", &Config::default()).unwrap();
        assert!(matches!(renderer.render(&json!({})), Err(Error::Runtime(_))));
        let renderer = compile("[[ for (x of z) { } ]]", &Config::default()).unwrap();
        assert!(matches!(renderer.render(&json!(5)), Err(Error::Runtime(_))));
    }
}
