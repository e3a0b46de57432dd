use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use agentmem_core::Record;

use crate::{StorageError, write_atomic};

/// One JSON file per record, named by the record id.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, record: &Record) -> Result<(), StorageError> {
        let path = self.path_for(&record.id).ok_or_else(|| {
            StorageError::InvalidInput(format!("record id is not a valid storage key: {:?}", record.id))
        })?;
        let bytes = serde_json::to_vec_pretty(record)?;
        write_atomic(&path, &bytes)?;
        tracing::debug!(id = %record.id, path = %path.display(), "record written");
        Ok(())
    }

    pub fn read(&self, id: &str) -> Result<Option<Record>, StorageError> {
        let Some(path) = self.path_for(id) else {
            return Ok(None);
        };
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).is_some_and(|path| path.is_file())
    }

    fn path_for(&self, id: &str) -> Option<PathBuf> {
        is_storage_key(id).then(|| self.dir.join(format!("{id}.json")))
    }
}

/// Ids are used verbatim as file stems, so only a conservative character set
/// may reach the filesystem.
pub fn is_storage_key(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
