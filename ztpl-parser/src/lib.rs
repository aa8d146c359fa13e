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


//! Template scanner and code generator
//!
//! This crate provides the compile side of `ztpl`: it finds the markers in a
//! template, classifies them and turns the template into a [`Program`]. It is
//! shared by the runtime engine in `ztpl` and the build time macros in
//! `ztpl-macros`.
//!
//! # Template Syntax
//!
//! - `[[ code ]]` - code, emitted verbatim, no output
//! - `[[- expr ]]` - raw expression output
//! - `[[= expr ]]` - HTML escaped expression output
//! - `[[- expr >]]` - output with leading and trailing CR/LF removed
//! - `[[- expr >>]]` - output with leading and trailing whitespace removed
//!
//! The delimiters are configurable through [`Delimiters`].
//!
//! # Example
//!
//! ```rust
//! use ztpl_parser::{Delimiters, Program};
//!
//! let delimiters = Delimiters::new("<%", "%>");
//! let program = Program::build("Hello <%- name %>!", &delimiters).unwrap();
//! let rust_code = program.to_rust();
//! assert!(rust_code.starts_with("let mut __z = "));
//! ```
//!
//! # Module Structure
//!
//! - `scanner.rs`: Marker scanning and classification
//! - `literal.rs`: String literal encoding for generated code
//! - `program.rs`: Program nodes and Rust code generation

pub mod literal;
pub mod program;
pub mod scanner;

pub use literal::string_literal;
pub use program::{ACCUMULATOR, Node, Program};
pub use scanner::{Delimiters, Marker, MarkerKind, Scanner, Segment, Trim};
