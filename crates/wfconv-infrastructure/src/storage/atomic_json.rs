//! File-backed key-value store.
//!
//! All keys live in one JSON object on disk. Reads parse the whole file;
//! writes replace it through a temporary file and an atomic rename while an
//! exclusive advisory lock is held.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use wfconv_core::error::{Result, WfconvError};
use wfconv_core::storage::KeyValueStore;

type Entries = BTreeMap<String, String>;

/// A [`KeyValueStore`] persisted as a JSON object in a single file.
///
/// A missing or empty file is an empty store. A file that does not parse is
/// treated as empty on read and overwritten by the next write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store handle. Nothing is touched on disk until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all entries.
    ///
    /// - `Ok(map)`: parsed, or empty for a missing/blank file
    /// - `Err`: unreadable or not a JSON object of strings
    fn load(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Like `load`, but a corrupt file yields an empty map.
    fn load_lenient(&self) -> Result<Entries> {
        match self.load() {
            Ok(entries) => Ok(entries),
            Err(err) if err.is_serialization() => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Store file is malformed, treating as empty: {}",
                    err
                );
                Ok(Entries::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Writes all entries atomically.
    fn save(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Locked read-modify-write of the whole map.
    fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Entries),
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut entries = self.load_lenient()?;
        f(&mut entries);
        self.save(&entries)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| WfconvError::io("Store path has no file name"))?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_lenient()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.modify(|entries| {
            entries.remove(key);
        })
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<()> {
        self.modify(|entries| {
            if let Some(value) = f(entries.remove(key)) {
                entries.insert(key.to_string(), value);
            }
        })
    }
}

/// Exclusive lock on a sibling `.lock` file, released on drop.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        fs2::FileExt::lock_exclusive(&file)
            .map_err(|e| WfconvError::storage(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}
