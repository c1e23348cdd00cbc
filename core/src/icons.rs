//! Append-only cache of executable icon references.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::IconRef;

/// Icon references keyed by executable path.
///
/// Lives as long as the controller, across activations. Entries are only
/// ever added, so a reference handed out stays valid.
pub struct IconCache {
    icons: RwLock<HashMap<PathBuf, Arc<IconRef>>>,
    default_icon: Arc<IconRef>,
}

impl IconCache {
    pub fn new() -> Self {
        Self {
            icons: RwLock::new(HashMap::new()),
            default_icon: Arc::new(IconRef::Default),
        }
    }

    /// Icon for an executable, loading it on first use.
    ///
    /// No path, or a path that does not exist, yields the shared default
    /// icon; such lookups are not cached so a later install is picked up.
    pub fn get_or_load(&self, path: Option<&Path>) -> Arc<IconRef> {
        let Some(path) = path else {
            return Arc::clone(&self.default_icon);
        };

        if let Some(icon) = self.icons.read().get(path) {
            return Arc::clone(icon);
        }

        if !path.exists() {
            debug!(path = %path.display(), "Executable not found, using default icon");
            return Arc::clone(&self.default_icon);
        }

        let mut icons = self.icons.write();
        let icon = icons.entry(path.to_path_buf()).or_insert_with(|| {
            Arc::new(IconRef::Executable {
                path: path.to_path_buf(),
                index: 0,
            })
        });
        Arc::clone(icon)
    }

    /// Number of cached icons.
    pub fn len(&self) -> usize {
        self.icons.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.read().is_empty()
    }
}

impl Default for IconCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_is_default_and_not_cached() {
        let cache = IconCache::new();
        assert_eq!(*cache.get_or_load(None), IconRef::Default);
        assert_eq!(
            *cache.get_or_load(Some(Path::new("/definitely/not/here.exe"))),
            IconRef::Default
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_existing_path_is_cached_once() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cache = IconCache::new();

        let first = cache.get_or_load(Some(file.path()));
        let second = cache.get_or_load(Some(file.path()));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            first.resource(),
            Some(format!("@{},0", file.path().display()))
        );
    }

    #[test]
    fn test_concurrent_lookups() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cache = Arc::new(IconCache::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let path = file.path().to_path_buf();
                std::thread::spawn(move || cache.get_or_load(Some(&path)))
            })
            .collect();
        let icons: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(icons.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(cache.len(), 1);
    }
}
