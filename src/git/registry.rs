//! git::registry
//!
//! Path to binding map owned by the host application.
//!
//! # Invariants
//!
//! - At most one binding per canonical path for the registry's lifetime
//! - Bindings are never shared across paths
//! - Mutation is insert-if-absent; only [`EngineRegistry::clear`] removes

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::interface::{Engine, EngineSettings, GitCli};

/// Creates a binding for a canonical path.
pub type EngineFactory = Arc<dyn Fn(&Path) -> Arc<dyn Engine> + Send + Sync>;

/// Cached engine bindings, keyed by canonical repository path.
pub struct EngineRegistry {
    bindings: Mutex<HashMap<PathBuf, Arc<dyn Engine>>>,
    factory: EngineFactory,
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("bindings", &self.len())
            .finish()
    }
}

impl EngineRegistry {
    /// A registry creating [`GitCli`] bindings with `settings`.
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_factory(move |path: &Path| {
            Arc::new(GitCli::new(path, settings.clone())) as Arc<dyn Engine>
        })
    }

    /// A registry with a custom binding factory.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&Path) -> Arc<dyn Engine> + Send + Sync + 'static,
    {
        Self {
            bindings: Mutex::new(HashMap::new()),
            factory: Arc::new(factory),
        }
    }

    /// The binding for `path`, created on first use.
    pub fn get_or_create(&self, path: &Path) -> Arc<dyn Engine> {
        let key = canonical(path);
        let mut bindings = self.lock();
        if let Some(engine) = bindings.get(&key) {
            return Arc::clone(engine);
        }

        debug!(path = %key.display(), "creating engine binding");
        let engine = (self.factory)(&key);
        bindings.insert(key, Arc::clone(&engine));
        engine
    }

    /// Whether a binding exists for `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.lock().contains_key(&canonical(path))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every binding.
    pub fn clear(&self) {
        let mut bindings = self.lock();
        debug!(count = bindings.len(), "clearing engine bindings");
        bindings.clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<dyn Engine>>> {
        self.bindings.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn counting() -> (EngineRegistry, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let registry = EngineRegistry::with_factory(move |path: &Path| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(GitCli::new(path, EngineSettings::default())) as Arc<dyn Engine>
        });
        (registry, created)
    }

    #[test]
    fn one_binding_per_path() {
        let dir = TempDir::new().unwrap();
        let (registry, created) = counting();

        let a = registry.get_or_create(dir.path());
        let b = registry.get_or_create(&dir.path().join("."));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(dir.path()));
    }

    #[test]
    fn distinct_paths_get_distinct_bindings() {
        let one = TempDir::new().unwrap();
        let two = TempDir::new().unwrap();
        let (registry, created) = counting();

        let a = registry.get_or_create(one.path());
        let b = registry.get_or_create(two.path());
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clear_drops_everything() {
        let dir = TempDir::new().unwrap();
        let (registry, created) = counting();
        registry.get_or_create(dir.path());
        registry.clear();
        assert!(registry.is_empty());

        registry.get_or_create(dir.path());
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn binding_is_bound_to_canonical_path() {
        let dir = TempDir::new().unwrap();
        let registry = EngineRegistry::new(EngineSettings::default());
        let engine = registry.get_or_create(dir.path());
        assert_eq!(engine.workdir(), dir.path().canonicalize().unwrap());
    }
}
