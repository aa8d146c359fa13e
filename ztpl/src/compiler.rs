use std::{fs, path::Path};

use tracing::debug;
use ztpl_parser::Program;

use crate::{
    config::Config,
    env::Renderer,
    error::{Error, Result},
    include::Include,
};

/// Compiles templates with one configuration
#[derive(Clone, Debug, Default)]
pub struct Compiler {
    config: Config,
}

impl Compiler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compiles `src` into a renderer
    ///
    /// A template without any marker is returned as a static renderer that
    /// yields the source unchanged, a leading byte-order mark included.
    pub fn compile(&self, src: &str) -> Result<Renderer> {
        let delimiters = self.config.delimiters();
        let Some(program) = Program::build(src, &delimiters) else {
            debug!(len = src.len(), "template has no markers");
            return Ok(Renderer::fixed(src.to_string()));
        };
        debug!(
            nodes = program.nodes.len(),
            markers = program.markers(),
            "compiling template"
        );
        let executable = self
            .config
            .engine
            .prepare(&program, self.config.obj_name())?;
        Ok(Renderer::program(executable, self.include()))
    }

    /// Compiles template bytes, which must be UTF-8
    pub fn compile_bytes(&self, src: &[u8]) -> Result<Renderer> {
        self.compile(std::str::from_utf8(src)?)
    }

    /// Reads and compiles the template at `path`
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<Renderer> {
        let path = path.as_ref();
        let src = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.compile_bytes(&src)
    }

    /// The partial resolver templates compiled here use
    pub fn include(&self) -> Include {
        Include::new(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn invalid_utf8() {
        let err = Compiler::default().compile_bytes(&[b'a', 0xff, b'b']).unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate(_)));
        assert_eq!(err.to_string(), "template must be valid UTF-8 text");
    }

    #[test]
    fn compile_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.ztpl");
        fs::write(&path, "<p>[[= z.title ]]</p>").unwrap();
        let renderer = Compiler::default().compile_file(&path).unwrap();
        assert_eq!(
            renderer.render(&json!({"title": "Tom & Jerry"})).unwrap(),
            "<p>Tom &amp; Jerry</p>"
        );
    }

    #[test]
    fn compile_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Compiler::default()
            .compile_file(dir.path().join("missing.ztpl"))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn include_shares_config() {
        let compiler = Compiler::new(Config::default().with_base_path("/srv").with_extension("html"));
        assert_eq!(compiler.include().resolve("a/b"), Path::new("/srv/a/b.html"));
    }
}
