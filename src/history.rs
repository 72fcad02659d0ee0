use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::problems::Category;
use crate::session::SessionResult;

/// Per-category retention cap: only the ten most recent results survive.
pub const MAX_LOG_ENTRIES: usize = 10;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create history directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read history file {path:?}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write history file {path:?}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("history file {path:?} is corrupted")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {category} history")]
    Encode {
        category: Category,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable, bounded, per-category log of past results.
pub trait HistoryStore {
    fn save_result(&self, result: &SessionResult) -> Result<(), StorageError>;

    /// Stored results, newest first. A `limit` of zero returns the full
    /// stored log; a missing log is an empty list, not an error.
    fn get_results(
        &self,
        category: Category,
        limit: usize,
    ) -> Result<Vec<SessionResult>, StorageError>;
}

/// File-backed store: one pretty-printed JSON array per category, named by
/// the category's canonical lowercase key.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|source| StorageError::CreateDir {
            path: base_dir.clone(),
            source,
        })?;
        Ok(Self { base_dir })
    }

    #[allow(dead_code)]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn log_path(&self, category: Category) -> PathBuf {
        self.base_dir.join(format!("{}.json", category.as_str()))
    }

    fn load_log(&self, category: Category) -> Result<Vec<SessionResult>, StorageError> {
        let path = self.log_path(category);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StorageError::ReadFile { path, source }),
        };
        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupted { path, source })
    }

    // Write to a sibling temp file and rename into place, so a concurrent
    // reader never observes a partially written log.
    fn write_log(&self, category: Category, results: &[SessionResult]) -> Result<(), StorageError> {
        let path = self.log_path(category);
        let data = serde_json::to_string_pretty(results)
            .map_err(|source| StorageError::Encode { category, source })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|source| StorageError::WriteFile {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::WriteFile { path, source })?;
        Ok(())
    }
}

impl HistoryStore for FileStore {
    fn save_result(&self, result: &SessionResult) -> Result<(), StorageError> {
        let mut results = self.load_log(result.category)?;
        results.push(result.clone());

        // Stable sort: same-timestamp entries keep their merge order.
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        results.truncate(MAX_LOG_ENTRIES);

        self.write_log(result.category, &results)
    }

    fn get_results(
        &self,
        category: Category,
        limit: usize,
    ) -> Result<Vec<SessionResult>, StorageError> {
        let mut results = self.load_log(category)?;
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        if limit > 0 {
            results.truncate(limit);
        }
        Ok(results)
    }
}
