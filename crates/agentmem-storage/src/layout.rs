use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";

const NAMESPACE: [&str; 2] = ["memory", "shared"];
const ITEMS_DIR: &str = "items";
const INDEX_DIR: &str = "index";
const KEYWORD_INDEX_FILE: &str = "keyword.json";

/// On-disk layout rooted at a base data directory:
///
/// ```text
/// <base>/memory/shared/items/<id>.json
/// <base>/memory/shared/index/keyword.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    base: PathBuf,
}

impl StorageLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn shared_root(&self) -> PathBuf {
        NAMESPACE
            .iter()
            .fold(self.base.clone(), |path, part| path.join(part))
    }

    pub fn items_dir(&self) -> PathBuf {
        self.shared_root().join(ITEMS_DIR)
    }

    pub fn index_dir(&self) -> PathBuf {
        self.shared_root().join(INDEX_DIR)
    }

    pub fn keyword_index_path(&self) -> PathBuf {
        self.index_dir().join(KEYWORD_INDEX_FILE)
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}
