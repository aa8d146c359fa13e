//! Compiler configuration

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use ztpl_parser::Delimiters;

use crate::{cache::TemplateCache, env::Engine, script::ScriptEngine};

/// Default name of the data parameter inside templates
pub static DEFAULT_OBJ_NAME: &str = "z";
/// Default file extension of partial templates
pub static DEFAULT_EXTENSION: &str = "ztpl";

/// Directory of the running executable, or the current directory
fn default_base_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_engine() -> Arc<dyn Engine> {
    Arc::new(ScriptEngine)
}

/// Options for compiling templates
///
/// Every field is optional. Empty strings fall back to the defaults, so a
/// configuration deserialized from user input cannot produce empty delimiters.
///
/// ```rust
/// use ztpl::Config;
///
/// let config: Config = serde_json::from_str(r#"{ "start": "<%", "end": "%>", "objName": "data" }"#).unwrap();
/// assert_eq!(config.obj_name(), "data");
/// ```
#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Start delimiter, `[[` by default
    pub start: String,
    /// End delimiter, `]]` by default
    pub end: String,
    /// Name the data is bound to, `z` by default
    pub obj_name: String,
    /// Directory partials are resolved against
    pub base_path: PathBuf,
    /// Extension of partial files, `ztpl` by default
    pub extension: String,
    /// Cache for compiled partials, partials are recompiled on every include without one
    ///
    /// Renderers only hold a weak reference, keep the cache alive as long as it should be used.
    #[serde(skip)]
    pub cache: Option<Arc<dyn TemplateCache>>,
    /// Engine preparing compiled programs, the script engine by default
    #[serde(skip, default = "default_engine")]
    pub engine: Arc<dyn Engine>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start: String::new(),
            end: String::new(),
            obj_name: DEFAULT_OBJ_NAME.to_string(),
            base_path: default_base_path(),
            extension: DEFAULT_EXTENSION.to_string(),
            cache: None,
            engine: default_engine(),
        }
    }
}

impl Config {
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = end.into();
        self
    }

    pub fn with_obj_name(mut self, obj_name: impl Into<String>) -> Self {
        self.obj_name = obj_name.into();
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn TemplateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn Engine>) -> Self {
        self.engine = engine;
        self
    }

    /// The delimiter pair, with defaults for empty strings
    pub fn delimiters(&self) -> Delimiters {
        Delimiters::new(&self.start, &self.end)
    }

    pub fn obj_name(&self) -> &str {
        if self.obj_name.is_empty() {
            DEFAULT_OBJ_NAME
        } else {
            &self.obj_name
        }
    }

    pub fn extension(&self) -> &str {
        if self.extension.is_empty() {
            DEFAULT_EXTENSION
        } else {
            &self.extension
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("obj_name", &self.obj_name)
            .field("base_path", &self.base_path)
            .field("extension", &self.extension)
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.delimiters(), Delimiters::new("[[", "]]"));
        assert_eq!(config.obj_name(), "z");
        assert_eq!(config.extension(), "ztpl");
        assert!(config.cache.is_none());
        assert!(config.base_path.is_absolute() || config.base_path == Path::new("."));
    }

    #[test]
    fn empty_values_fall_back() {
        let config = Config::default()
            .with_start("")
            .with_end("$$")
            .with_obj_name("")
            .with_extension("");
        assert_eq!(config.delimiters(), Delimiters::new("[[", "$$"));
        assert_eq!(config.obj_name(), "z");
        assert_eq!(config.extension(), "ztpl");
    }

    #[test]
    fn deserialize() {
        let config: Config = serde_json::from_str(
            r#"{ "start": "!@", "basePath": "/srv/templates", "extension": "tpl" }"#,
        )
        .unwrap();
        assert_eq!(config.delimiters(), Delimiters::new("!@", "]]"));
        assert_eq!(config.base_path, PathBuf::from("/srv/templates"));
        assert_eq!(config.extension(), "tpl");
        assert_eq!(config.obj_name(), "z");
    }
}
