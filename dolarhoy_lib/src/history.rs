//! History Store: a single pretty-printed JSON array of records.
//!
//! Every append rewrites the whole file. Fine for one record every few
//! minutes; the cost grows with the history.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::record::ScrapeRecord;

#[derive(thiserror::Error, Debug)]
pub enum HistoryError {
    #[error("io error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("history task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The three states the read views distinguish.
#[derive(Debug, Clone, PartialEq)]
pub enum Latest {
    /// Last entry, verbatim.
    Record(Value),
    /// File exists but holds no entries.
    Empty,
    /// No history file yet.
    Missing,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record` and returns the new number of entries.
    ///
    /// Unreadable or non-array prior content is logged and replaced, never
    /// propagated. Write failures are errors and leave the old file in place.
    pub fn append(&self, record: &ScrapeRecord) -> Result<usize, HistoryError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_err(dir, e))?;
        }

        let mut entries = self.read_for_append();
        entries.push(serde_json::to_value(record)?);

        let mut body = serde_json::to_string_pretty(&entries)?;
        body.push('\n');
        self.write_atomic(body.as_bytes())?;

        tracing::info!(
            timestamp = %record.timestamp,
            records = entries.len(),
            path = %self.path.display(),
            "Data saved"
        );
        Ok(entries.len())
    }

    /// Typed view of the history. Entries that no longer match the record
    /// shape are skipped.
    pub fn load(&self) -> Result<Vec<ScrapeRecord>, HistoryError> {
        let Some(value) = self.read_value()? else {
            return Ok(Vec::new());
        };
        let Value::Array(entries) = value else {
            return Ok(Vec::new());
        };

        let records = entries
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(index = idx, error = %e, "Skipping malformed history entry");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    pub fn latest(&self) -> Result<Latest, HistoryError> {
        let latest = match self.read_value()? {
            None => Latest::Missing,
            Some(Value::Array(mut entries)) => entries.pop().map_or(Latest::Empty, Latest::Record),
            Some(_) => Latest::Empty,
        };
        Ok(latest)
    }

    /// The stored array as-is, or `[]` when there is no file.
    pub fn history_json(&self) -> Result<Value, HistoryError> {
        Ok(self
            .read_value()?
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    /// Runs a store operation on the blocking pool.
    ///
    /// Async callers go through this so file I/O never stalls the runtime.
    pub async fn offload<T, F>(&self, op: F) -> Result<T, HistoryError>
    where
        F: FnOnce(&HistoryStore) -> Result<T, HistoryError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(&store)).await?
    }

    fn read_value(&self) -> Result<Option<Value>, HistoryError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(&self.path, e)),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn read_for_append(&self) -> Vec<Value> {
        match self.read_value() {
            Ok(None) => Vec::new(),
            Ok(Some(Value::Array(entries))) => entries,
            Ok(Some(_)) => {
                tracing::warn!(path = %self.path.display(), "History is not an array, starting fresh");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not read history, starting fresh");
                Vec::new()
            }
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<(), HistoryError> {
        let tmp = self.tmp_path();
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));

        written.map_err(|e| {
            let _ = fs::remove_file(&tmp);
            self.io_err(&self.path, e)
        })
    }

    fn io_err(&self, path: &Path, source: io::Error) -> HistoryError {
        HistoryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
