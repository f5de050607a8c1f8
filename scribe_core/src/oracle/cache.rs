use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::{Error, Result};

/// Content-addressed store of generated comment text.
///
/// Loaded once, consulted under a lock, and written back as a flat JSON object.
/// An unreadable store degrades to an empty cache.
#[derive(Debug, Default)]
pub struct CommentCache {
    path: Option<PathBuf>,
    entries: Mutex<HashMap<String, String>>,
}

impl CommentCache {
    /// Cache that lives only for the current process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store at `path`, starting empty when it is absent or corrupt.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<HashMap<String, String>>(&contents) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "comment cache is corrupt; starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "comment cache unreadable; starting empty"
                );
                HashMap::new()
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "loaded comment cache");

        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Cached text for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Store `text` under `key`, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, text: impl Into<String>) {
        self.lock().insert(key.into(), text.into());
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write the cache to its backing file; in-memory caches are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the temporary file cannot be written or
    /// renamed into place.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let snapshot: BTreeMap<String, String> = self
            .lock()
            .iter()
            .map(|(key, text)| (key.clone(), text.clone()))
            .collect();
        let body = serde_json::to_vec_pretty(&snapshot)
            .map_err(|err| Error::io(path, std::io::Error::other(err)))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|source| Error::io(&dir, source))?;
        let mut file =
            tempfile::NamedTempFile::new_in(&dir).map_err(|source| Error::io(&dir, source))?;
        file.write_all(&body)
            .map_err(|source| Error::io(file.path(), source))?;
        file.persist(path)
            .map_err(|err| Error::io(path, err.error))?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn persisted_entries_reload() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("nested").join("cache.json");

        let cache = CommentCache::load(&path);
        assert!(cache.is_empty());
        cache.insert("k1", "first");
        cache.insert("k2", "second");
        cache.persist().expect("persist");

        let reloaded = CommentCache::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("k1").as_deref(), Some("first"));
    }

    #[test]
    fn corrupt_store_loads_empty() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("cache.json");
        std::fs::write(&path, "{not json").expect("write");

        let cache = CommentCache::load(&path);
        assert!(cache.is_empty());
        cache.insert("k", "v");
        cache.persist().expect("persist");
        assert_eq!(CommentCache::load(&path).get("k").as_deref(), Some("v"));
    }

    #[test]
    fn in_memory_persist_is_noop() {
        let cache = CommentCache::in_memory();
        cache.insert("k", "v");
        cache.persist().expect("persist");
        assert!(cache.path().is_none());
    }
}
