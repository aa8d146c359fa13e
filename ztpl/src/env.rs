//! Render execution environment
//!
//! A compiled template only sees its data, the three output helpers and
//! `include`. Compiler state is never reachable from a running template, which
//! is why executables receive an [`Env`] rather than the compiler itself.

use std::{borrow::Cow, fmt, sync::Arc};

use serde::Serialize;
use serde_json::Value;
use ztpl_parser::Program;

use crate::{
    error::{Error, Result},
    helpers,
    include::Include,
};

/// Turns a generated program into something that can run
///
/// The built-in [`ScriptEngine`](crate::script::ScriptEngine) interprets
/// code markers as script. Embedders with their own expression language
/// implement this trait and set it with
/// [`Config::with_engine`](crate::Config::with_engine).
pub trait Engine: Send + Sync {
    /// Prepares `program` with the data bound to `obj_name`
    fn prepare(&self, program: &Program<'_>, obj_name: &str) -> Result<Arc<dyn Executable>>;
}

/// A prepared program
pub trait Executable: Send + Sync {
    /// Renders the program for `data`, a fresh output is built on every call
    fn execute(&self, data: &Value, env: &Env<'_>) -> Result<String>;
}

/// What a running template can reach
pub struct Env<'a> {
    include: &'a Include,
}

impl<'a> Env<'a> {
    pub(crate) fn new(include: &'a Include) -> Self {
        Self { include }
    }

    /// Renders the partial template `name` with `data`
    pub fn include(&self, name: &str, data: &Value) -> Result<String> {
        self.include.include(name, data)
    }

    pub fn escape_html<'s>(&self, src: &'s str) -> Cow<'s, str> {
        helpers::escape_html(src)
    }

    pub fn trim_eol<'s>(&self, src: &'s str) -> &'s str {
        helpers::trim_eol(src)
    }

    pub fn trim_whitespace<'s>(&self, src: &'s str) -> &'s str {
        helpers::trim_whitespace(src)
    }
}

enum Compiled {
    /// Template without markers, rendered as is
    Static(String),
    Program {
        executable: Arc<dyn Executable>,
        include: Include,
    },
}

/// A compiled template
///
/// Cloning is cheap and a renderer can be shared between threads, every call
/// to [`render`](Renderer::render) builds its own output.
#[derive(Clone)]
pub struct Renderer(Arc<Compiled>);

impl Renderer {
    pub(crate) fn fixed(src: String) -> Self {
        Self(Arc::new(Compiled::Static(src)))
    }

    pub(crate) fn program(executable: Arc<dyn Executable>, include: Include) -> Self {
        Self(Arc::new(Compiled::Program {
            executable,
            include,
        }))
    }

    /// Renders the template with `data` bound to the configured object name
    pub fn render(&self, data: &Value) -> Result<String> {
        match self.0.as_ref() {
            Compiled::Static(src) => Ok(src.clone()),
            Compiled::Program {
                executable,
                include,
            } => executable.execute(data, &Env::new(include)),
        }
    }

    /// Serializes `data` to JSON and renders with it
    pub fn render_serialize<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let data = serde_json::to_value(data)
            .map_err(|err| Error::runtime(format!("unable to serialize data: {}", err)))?;
        self.render(&data)
    }

    /// Whether the template had no markers and always renders its source
    pub fn is_static(&self) -> bool {
        matches!(self.0.as_ref(), Compiled::Static(_))
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("static", &self.is_static())
            .finish()
    }
}
