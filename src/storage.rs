//! File-backed [`KeyValueStorage`]: one JSON object mapping keys to string values.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use canvas::comment::{CommentError, KeyValueStorage};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, CommentError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(CommentError::Storage(format!("{}: {e}", self.path.display()))),
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, CommentError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CommentError> {
        let mut map = self.read_map()?;
        map.insert(key.to_owned(), value.to_owned());
        let raw = serde_json::to_string_pretty(&map)?;
        std::fs::write(&self.path, raw).map_err(|e| CommentError::Storage(format!("{}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), key, "storage written");
        Ok(())
    }
}
