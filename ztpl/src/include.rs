//! Partial templates
//!
//! `include(name, data)` renders the file `<base path>/<name>.<extension>`
//! with the same configuration as the including template. Partials are read
//! and compiled on every call unless a [`TemplateCache`](crate::TemplateCache)
//! is configured.
//!
//! Cached renderers hold their own `Include`, so the resolver only keeps a
//! weak reference to the cache. Once the caller drops the cache, partials are
//! compiled on every call again.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Weak},
};

use serde_json::Value;
use tracing::debug;

use crate::{
    cache::TemplateCache,
    compiler::Compiler,
    config::Config,
    env::Renderer,
    error::{Error, Result},
};

#[derive(Clone, Debug)]
pub struct Include {
    /// Configuration of included templates, without the cache
    config: Config,
    cache: Option<Weak<dyn TemplateCache>>,
}

impl Include {
    pub fn new(mut config: Config) -> Self {
        let cache = config.cache.take().map(|cache| Arc::downgrade(&cache));
        Self { config, cache }
    }

    fn cache(&self) -> Option<Arc<dyn TemplateCache>> {
        self.cache.as_ref()?.upgrade()
    }

    /// The file a partial name refers to
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.config
            .base_path
            .join(format!("{}.{}", name, self.config.extension()))
    }

    fn load(&self, path: &Path, cache: Option<Arc<dyn TemplateCache>>) -> Result<Renderer> {
        debug!(path = %path.display(), "loading partial");
        let src = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = self.config.clone();
        config.cache = cache;
        Compiler::new(config).compile_bytes(&src)
    }

    /// Renders the partial `name` with `data`
    pub fn include(&self, name: &str, data: &Value) -> Result<String> {
        let Some(cache) = self.cache() else {
            return self.load(&self.resolve(name), None)?.render(data);
        };
        if let Some(renderer) = cache.lookup(name) {
            debug!(name, "partial cache hit");
            return renderer.render(data);
        }
        debug!(name, "partial cache miss");
        let path = self.resolve(name);
        let renderer = self.load(&path, Some(cache.clone()))?;
        cache.store(name, &path, renderer.clone());
        renderer.render(data)
    }
}
