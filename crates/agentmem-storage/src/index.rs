use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::PathBuf;

use agentmem_core::Record;

use crate::{StorageError, write_atomic};

/// Normalized keyword -> ids of the records indexed under it.
pub type KeywordMap = BTreeMap<String, Vec<String>>;

/// Single-file keyword index.
///
/// Every update rewrites the whole file through a temp file in the same
/// directory followed by a rename, so readers see either the previous or the
/// new index, never a truncated one. Ids are only ever appended; a keyword a
/// record no longer carries keeps pointing at it.
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    path: PathBuf,
}

impl KeywordIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<KeywordMap, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(KeywordMap::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Links `record.id` under each of the record's derived keywords.
    pub fn update(&self, record: &Record) -> Result<(), StorageError> {
        let mut index = self.load()?;
        let mut linked = 0_usize;
        for keyword in record.index_keywords() {
            let ids = index.entry(keyword).or_default();
            if !ids.iter().any(|existing| existing == &record.id) {
                ids.push(record.id.clone());
                linked += 1;
            }
        }

        let bytes = serde_json::to_vec_pretty(&index)?;
        write_atomic(&self.path, &bytes)?;
        tracing::debug!(id = %record.id, linked, keywords = index.len(), "keyword index updated");
        Ok(())
    }

    /// Ids filed under any keyword containing the lower-cased `query`, in
    /// first-seen order, at most `limit` of them. A blank query matches nothing.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, StorageError> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let index = self.load()?;

        let mut seen = HashSet::new();
        let mut matches = Vec::new();
        for (keyword, ids) in &index {
            if !keyword.contains(&needle) {
                continue;
            }
            for id in ids {
                if seen.insert(id.as_str()) {
                    matches.push(id.clone());
                    if matches.len() == limit {
                        return Ok(matches);
                    }
                }
            }
        }
        Ok(matches)
    }
}
