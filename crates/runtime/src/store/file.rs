//! JSON-file store.
//!
//! All keys live in one JSON object. Every write re-reads the file, applies
//! the change and replaces the file through a temp file and rename, so a
//! crash mid-write leaves the previous contents intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;

use super::{KeyValueStore, Result, StoreError};

type Entries = BTreeMap<String, String>;

pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "store.json";

    /// Open (or lazily create) `store.json` inside `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(Self::FILE_NAME),
            write_lock: Mutex::new(()),
        })
    }

    /// Open the store in the platform data directory.
    pub fn in_default_dir() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "symptom-sprinter").ok_or(StoreError::NoDataDir)?;
        Self::new(dirs.data_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// A malformed file is replaced rather than blocking every later write.
    fn read_entries_for_update(&self) -> Result<Entries> {
        match self.read_entries() {
            Err(StoreError::Json(e)) => {
                tracing::warn!(
                    "Discarding malformed store at {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Entries::new())
            }
            other => other,
        }
    }

    fn update(&self, apply: impl FnOnce(&mut Entries)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;

        let mut entries = self.read_entries_for_update()?;
        apply(&mut entries);

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_vec_pretty(&entries)?)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::trace!("Wrote {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
