use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::StoreError;

/// A whole-document JSON file held in memory.
///
/// Read once on load and rewritten in full on every flush through a temporary
/// file in the same directory followed by a rename, so readers never observe a
/// partially written document.
#[derive(Debug)]
pub struct JsonDocument<T> {
    path: Option<PathBuf>,
    data: T,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    /// Load from `path`. A missing file yields an empty document; an unreadable or
    /// corrupt one is an error and is left untouched on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let data = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => T::default(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => T::default(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        Ok(Self {
            path: Some(path),
            data,
        })
    }

    /// Document that is never written to disk
    pub fn new_in_memory() -> Self {
        Self {
            path: None,
            data: T::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// Apply `mutation` to a copy and keep it only once it is on disk. A failed
    /// write leaves the in-memory document as it was.
    pub fn update<R>(&mut self, mutation: impl FnOnce(&mut T) -> R) -> Result<R, StoreError> {
        let mut next = self.data.clone();
        let result = mutation(&mut next);
        self.persist(&next)?;
        self.data = next;
        Ok(result)
    }

    fn persist(&self, data: &T) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let io_error = |source| StoreError::Io {
            path: path.display().to_string(),
            source,
        };

        let contents = serde_json::to_vec_pretty(data)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(io_error)?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(io_error)?;
        temp.write_all(&contents).map_err(io_error)?;
        temp.as_file().sync_all().map_err(io_error)?;
        temp.persist(path).map_err(|e| io_error(e.error))?;

        Ok(())
    }
}
