//! Caches for compiled partial templates
//!
//! The include resolver only ever calls [`TemplateCache::lookup`] and
//! [`TemplateCache::store`]; what is kept and for how long is up to the
//! implementation. Two are provided: [`MemoryCache`] keeps everything,
//! [`LruTemplateCache`] keeps a bounded number of partials.
//!
//! A lookup miss followed by a store is not atomic, two threads including the
//! same partial for the first time may both compile it.

use std::{
    collections::HashMap,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use lru::LruCache;
use parking_lot::{Mutex, RwLock};

use crate::env::Renderer;

pub trait TemplateCache: Send + Sync {
    /// Returns the compiled partial for `name`, if cached
    fn lookup(&self, name: &str) -> Option<Renderer>;

    /// Keeps `renderer`, compiled from the file at `path`, under `name`
    fn store(&self, name: &str, path: &Path, renderer: Renderer);
}

/// Unbounded in-memory cache
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (PathBuf, Renderer)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The file a cached partial was compiled from
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.entries.read().get(name).map(|(path, _)| path.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl TemplateCache for MemoryCache {
    fn lookup(&self, name: &str) -> Option<Renderer> {
        self.entries.read().get(name).map(|(_, renderer)| renderer.clone())
    }

    fn store(&self, name: &str, path: &Path, renderer: Renderer) {
        self.entries
            .write()
            .insert(name.to_string(), (path.to_path_buf(), renderer));
    }
}

/// In-memory cache evicting the least recently used partial
pub struct LruTemplateCache {
    entries: Mutex<LruCache<String, Renderer>>,
}

impl LruTemplateCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl TemplateCache for LruTemplateCache {
    fn lookup(&self, name: &str) -> Option<Renderer> {
        self.entries.lock().get(name).cloned()
    }

    fn store(&self, name: &str, _path: &Path, renderer: Renderer) {
        self.entries.lock().put(name.to_string(), renderer);
    }
}
