// MIT License
//
// Copyright (c) 2024 Jerome Johnson
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.


//! Program generation
//!
//! A [`Program`] is the ordered list of operations a template performs on its
//! output: append static text, append the value of an expression, or run a
//! code fragment. It is built from the scanner segments and can either be
//! interpreted at runtime or turned into Rust source with [`Program::to_rust`].
//!
//! # Examples
//!
//! ```rust
//! use ztpl_parser::{Delimiters, Node, Program};
//!
//! let delimiters = Delimiters::default();
//! let program = Program::build("Hi [[= z.name ]]!", &delimiters).unwrap();
//! assert_eq!(program.nodes.len(), 3);
//! assert!(matches!(program.nodes[1], Node::Value { escape: true, .. }));
//!
//! assert!(Program::build("no markers here", &delimiters).is_none());
//! ```

use crate::{
    literal::string_literal,
    scanner::{Delimiters, Marker, MarkerKind, Scanner, Segment, Trim},
};

/// Name of the output accumulator in generated code
pub static ACCUMULATOR: &str = "__z";

/// A single operation of a compiled template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    /// Append static text
    Literal(&'a str),
    /// Append the string value of an expression
    Value {
        expr: &'a str,
        escape: bool,
        trim: Trim,
    },
    /// Code fragment, possibly an unbalanced part of a control structure
    Code(&'a str),
}

impl<'a> From<Marker<'a>> for Node<'a> {
    fn from(marker: Marker<'a>) -> Self {
        match marker.kind {
            MarkerKind::Code => Node::Code(marker.content),
            MarkerKind::Raw | MarkerKind::Escaped => Node::Value {
                expr: marker.content,
                escape: marker.kind == MarkerKind::Escaped,
                trim: marker.trim,
            },
        }
    }
}

/// The operations of a template in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program<'a> {
    pub nodes: Vec<Node<'a>>,
}

/// Rust expression for the string value of a marker
fn rust_value(expr: &str, escape: bool, trim: Trim) -> String {
    let mut value = format!("::std::string::ToString::to_string(&({}))", expr);
    if escape {
        value = format!("::ztpl::helpers::escape_html(&{})", value);
    }
    match trim {
        Trim::None => value,
        Trim::Eol => format!("::ztpl::helpers::trim_eol(&{})", value),
        Trim::Whitespace => format!("::ztpl::helpers::trim_whitespace(&{})", value),
    }
}

impl<'a> Program<'a> {
    /// Builds the program for `src`, or `None` when it contains no marker
    pub fn build(src: &'a str, delimiters: &Delimiters) -> Option<Self> {
        let mut nodes = Vec::new();
        let mut markers = 0;
        for segment in Scanner::new(src, delimiters) {
            match segment {
                Segment::Text(text) => nodes.push(Node::Literal(text)),
                Segment::Marker(marker) => {
                    markers += 1;
                    nodes.push(marker.into());
                }
            }
        }
        if markers == 0 {
            return None;
        }
        Some(Self { nodes })
    }

    /// Number of code fragments and values in the program
    pub fn markers(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| !matches!(node, Node::Literal(_)))
            .count()
    }

    /// Generates a Rust block body evaluating to the rendered `String`
    ///
    /// Values are written with `::ztpl::helpers`, code fragments are copied
    /// verbatim, so the body only compiles when the fragments are Rust.
    pub fn to_rust(&self) -> String {
        let mut rust = String::new();
        let mut nodes = self.nodes.iter();
        match nodes.next() {
            Some(Node::Value { expr, escape, trim }) => {
                rust.push_str(&format!(
                    "let mut {} = ::std::string::String::from(&*{});\n",
                    ACCUMULATOR,
                    rust_value(expr, *escape, *trim)
                ));
            }
            Some(Node::Literal(text)) => {
                rust.push_str(&format!(
                    "let mut {} = ::std::string::String::from({});\n",
                    ACCUMULATOR,
                    string_literal(text)
                ));
            }
            Some(Node::Code(code)) => {
                rust.push_str(&format!("let mut {} = ::std::string::String::new();\n", ACCUMULATOR));
                rust.push_str(code);
                rust.push('\n');
            }
            None => {
                rust.push_str(&format!("let {} = ::std::string::String::new();\n", ACCUMULATOR));
            }
        }
        for node in nodes {
            match node {
                Node::Literal(text) => rust.push_str(&format!(
                    "{}.push_str({});\n",
                    ACCUMULATOR,
                    string_literal(text)
                )),
                Node::Value { expr, escape, trim } => rust.push_str(&format!(
                    "{}.push_str(&{});\n",
                    ACCUMULATOR,
                    rust_value(expr, *escape, *trim)
                )),
                Node::Code(code) => {
                    rust.push_str(code);
                    rust.push('\n');
                }
            }
        }
        rust.push_str(ACCUMULATOR);
        rust
    }
}
