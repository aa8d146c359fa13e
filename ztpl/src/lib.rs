//! Embedded-marker text templates
//!
//! A template is plain text with markers. The default delimiters are `[[` and
//! `]]`:
//!
//! - `[[ code ]]` runs code and outputs nothing, code may span several markers
//! - `[[- expr ]]` outputs the value of `expr`
//! - `[[= expr ]]` outputs the HTML escaped value of `expr`
//! - `[[- expr >]]` strips CR/LF from both ends of the value
//! - `[[- expr >>]]` strips all whitespace from both ends of the value
//!
//! Templates are compiled either at runtime with [`compile`], where code is
//! the small language of the [`script`] module, or at build time with the
//! [`str!`], [`file!`] and [`directory!`] macros, where code is Rust.
//!
//! ```rust
//! use serde_json::json;
//! use ztpl::Config;
//!
//! let renderer = ztpl::compile("<p>[[= z.title ]]</p>", &Config::default()).unwrap();
//! assert_eq!(renderer.render(&json!({"title": "Fish & Chips"})).unwrap(), "<p>Fish &amp; Chips</p>");
//! ```

extern crate self as ztpl;

pub mod cache;
pub mod compiler;
pub mod config;
pub mod env;
pub mod error;
pub mod helpers;
pub mod include;
pub mod script;

pub use cache::{LruTemplateCache, MemoryCache, TemplateCache};
pub use compiler::Compiler;
pub use config::Config;
pub use env::{Engine, Env, Executable, Renderer};
pub use error::{Error, Result};
pub use include::Include;
pub use script::ScriptEngine;
pub use ztpl_parser as parser;

pub use ztpl_macros::ztpl_directory as directory;
pub use ztpl_macros::ztpl_file as file;
pub use ztpl_macros::ztpl_str as str;

/// Compiles `src` with `config`
pub fn compile(src: &str, config: &Config) -> Result<Renderer> {
    Compiler::new(config.clone()).compile(src)
}

/// Compiles template bytes with `config`, failing when they are not UTF-8
pub fn compile_bytes(src: &[u8], config: &Config) -> Result<Renderer> {
    Compiler::new(config.clone()).compile_bytes(src)
}
