use std::fs;
use std::io::Write;
use std::path::Path;

use agentmem_core::Record;
use tempfile::NamedTempFile;
use thiserror::Error;

pub mod index;
pub mod layout;
pub mod records;

pub use index::{KeywordIndex, KeywordMap};
pub use layout::{DEFAULT_DATA_DIR, StorageLayout};
pub use records::{RecordStore, is_storage_key};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("atomic replace failed: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Record files plus the keyword index derived from them.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    layout: StorageLayout,
    records: RecordStore,
    index: KeywordIndex,
}

impl MemoryStore {
    pub fn open(layout: StorageLayout) -> Self {
        let records = RecordStore::new(layout.items_dir());
        let index = KeywordIndex::new(layout.keyword_index_path());
        Self {
            layout,
            records,
            index,
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn index(&self) -> &KeywordIndex {
        &self.index
    }

    /// Persists the record, then files it in the keyword index. The record is
    /// durable before any index entry can point at it.
    pub fn insert(&self, record: &Record) -> Result<(), StorageError> {
        if record.content.is_empty() {
            return Err(StorageError::InvalidInput(
                "content cannot be empty".to_string(),
            ));
        }
        self.records.write(record)?;
        self.index.update(record)
    }

    pub fn get(&self, id: &str) -> Result<Option<Record>, StorageError> {
        self.records.read(id)
    }

    /// Loads the records behind the first `limit` matching ids. Ids whose
    /// record file is gone are skipped, so fewer than `limit` may come back.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<Record>, StorageError> {
        let mut found = Vec::new();
        for id in self.index.search(query, limit)? {
            match self.records.read(&id)? {
                Some(record) => found.push(record),
                None => tracing::debug!(%id, "indexed record missing, skipped"),
            }
        }
        Ok(found)
    }
}

/// Replaces `path` with `bytes` via a temp file in the same directory and a
/// rename; the previous content stays readable until the rename lands.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
