//! JSON-lines statement store
//!
//! Statements are appended to `statements.jsonl`, one `LrsRecord` per line,
//! and the whole log is replayed into an in-memory index on open. Each batch
//! is written with a single `write_all` followed by `sync_all`; if either
//! fails the file is truncated back to its previous length. If that
//! truncation fails too, the length to restore is written to
//! `statements.rollback`, the store refuses further writes, and the next
//! `open` cuts the log back before replaying it.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use super::index::StatementIndex;
use super::{PageRequest, StatementPage, StatementStore, StoreError, StoreResult};
use crate::types::{FilterCriteria, LrsRecord, Statement};

/// Configuration for the JsonlStore
#[derive(Debug, Clone)]
pub struct JsonlStoreConfig {
    /// Path to the data directory
    pub data_dir: PathBuf,
}

impl Default for JsonlStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl JsonlStoreConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get path to statements.jsonl
    pub fn statements_path(&self) -> PathBuf {
        self.data_dir.join("statements.jsonl")
    }

    /// Get path to the pending rollback marker
    pub fn rollback_path(&self) -> PathBuf {
        self.data_dir.join("statements.rollback")
    }
}

/// Append-only file store
#[derive(Clone)]
pub struct JsonlStore {
    inner: Arc<Inner>,
}

struct Inner {
    config: JsonlStoreConfig,
    index: RwLock<StatementIndex>,
    /// Serializes writers; readers only take the index lock
    writer: Mutex<LogWriter>,
}

struct LogWriter {
    file: File,
    /// Set when a failed batch could not be rolled back
    poisoned: bool,
}

/// Outcome of replaying the log
#[derive(Debug, Default)]
struct ReplayStats {
    loaded: usize,
    skipped: usize,
    torn_bytes: usize,
}

impl JsonlStore {
    /// Open (or create) the log under `config.data_dir` and replay it
    pub fn open(config: JsonlStoreConfig) -> StoreResult<Self> {
        let path = config.statements_path();
        fs::create_dir_all(config.data_dir()).map_err(|e| unavailable(&path, e))?;

        recover_rollback(&config)?;

        let mut index = StatementIndex::new();
        let stats = if path.exists() {
            replay(&path, &mut index)?
        } else {
            ReplayStats::default()
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| unavailable(&path, e))?;

        tracing::info!(
            path = %path.display(),
            loaded = stats.loaded,
            skipped = stats.skipped,
            "opened statement log"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                index: RwLock::new(index),
                writer: Mutex::new(LogWriter {
                    file,
                    poisoned: false,
                }),
            }),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &JsonlStoreConfig {
        &self.inner.config
    }
}

impl Inner {
    /// Blocking append of one batch; runs on the blocking pool
    fn append(&self, batch: Vec<Statement>) -> StoreResult<()> {
        let mut guard = self.writer.lock();
        let writer = &mut *guard;
        if writer.poisoned {
            return Err(StoreError::Unavailable(
                "statement log holds an unrolled partial write; reopen the store".to_string(),
            ));
        }

        // Writers are serialized by the file lock, so the check stays valid
        // until the insert below.
        self.index.read().check_insertable(&batch)?;

        let mut buffer = String::new();
        for statement in &batch {
            buffer.push_str(&LrsRecord::Statement(statement.clone()).to_json_line()?);
            buffer.push('\n');
        }

        let file = &mut writer.file;
        let before = file.metadata()?.len();
        let written = file
            .write_all(buffer.as_bytes())
            .and_then(|_| file.sync_all());
        if let Err(e) = written {
            if let Err(rollback) = file.set_len(before) {
                tracing::error!(
                    error = %rollback,
                    path = %self.config.statements_path().display(),
                    "failed to roll back partial write"
                );
                writer.poisoned = true;
                if let Err(marker) = write_rollback_marker(&self.config.rollback_path(), before) {
                    tracing::error!(error = %marker, "failed to record pending rollback");
                }
            }
            return Err(StoreError::WriteFailed(e));
        }

        tracing::debug!(count = batch.len(), "appended statements");
        self.index.write().insert_checked(batch);
        Ok(())
    }
}

fn write_rollback_marker(path: &Path, len: u64) -> std::io::Result<()> {
    let mut marker = File::create(path)?;
    marker.write_all(len.to_string().as_bytes())?;
    marker.sync_all()
}

/// Apply a rollback left behind by a failed write, then remove the marker
fn recover_rollback(config: &JsonlStoreConfig) -> StoreResult<()> {
    let marker = config.rollback_path();
    if !marker.exists() {
        return Ok(());
    }
    let contents = fs::read_to_string(&marker).map_err(|e| unavailable(&marker, e))?;
    let len: u64 = contents.trim().parse().map_err(|e| {
        StoreError::Unavailable(format!("corrupt rollback marker {}: {}", marker.display(), e))
    })?;

    let path = config.statements_path();
    if path.exists() {
        let file = OpenOptions::new().write(true).open(&path)?;
        let current = file.metadata()?.len();
        if current > len {
            tracing::warn!(bytes = current - len, "rolling back incomplete batch");
            file.set_len(len)?;
            file.sync_all()?;
        }
    }
    fs::remove_file(&marker)?;
    Ok(())
}

fn unavailable(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("cannot open {}: {}", path.display(), e))
}

/// Load every line of the log into `index`.
///
/// Undecodable lines are skipped with a warning; if they still name a
/// statement id, that id is remembered as malformed. A final line without a
/// trailing newline is a torn write and is cut off.
fn replay(path: &Path, index: &mut StatementIndex) -> StoreResult<ReplayStats> {
    let bytes = fs::read(path).map_err(|e| unavailable(path, e))?;
    let mut stats = ReplayStats::default();

    let complete_len = bytes
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|pos| pos + 1)
        .unwrap_or(0);
    stats.torn_bytes = bytes.len() - complete_len;

    for (line_num, raw) in bytes[..complete_len].split(|b| *b == b'\n').enumerate() {
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::warn!(line = line_num + 1, error = %e, "skipping non UTF-8 line");
                stats.skipped += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        match LrsRecord::from_json_line(line) {
            Ok(LrsRecord::Statement(statement)) => match index.insert(vec![statement]) {
                Ok(()) => stats.loaded += 1,
                Err(e) => {
                    tracing::warn!(line = line_num + 1, error = %e, "skipping statement record");
                    stats.skipped += 1;
                }
            },
            Ok(other) => {
                tracing::debug!(line = line_num + 1, kind = other.object_key(), "ignoring record");
            }
            Err(e) => {
                tracing::warn!(line = line_num + 1, error = %e, "failed to parse statement record");
                stats.skipped += 1;
                if let Some(id) = salvage_statement_id(line) {
                    index.mark_malformed(id, e.to_string());
                }
            }
        }
    }

    if stats.torn_bytes > 0 {
        tracing::warn!(bytes = stats.torn_bytes, "truncating torn write at end of log");
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(complete_len as u64)?;
        file.sync_all()?;
    }

    Ok(stats)
}

/// Pull the statement id out of a record that failed to decode
fn salvage_statement_id(line: &str) -> Option<String> {
    let value: Value = serde_json::from_str(line).ok()?;
    if value.get("kind")?.as_str()? != Statement::OBJECT_KEY {
        return None;
    }
    value
        .get("record")?
        .get("id")?
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
}

#[async_trait]
impl StatementStore for JsonlStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Statement> {
        self.inner.index.read().get(id)
    }

    async fn find_by_filter(
        &self,
        criteria: &FilterCriteria,
        page: PageRequest,
    ) -> StoreResult<StatementPage> {
        Ok(self.inner.index.read().find(criteria, page))
    }

    async fn save_all(&self, statements: Vec<Statement>) -> StoreResult<()> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.append(statements))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store worker failed: {}", e)))?
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.inner.index.read().len())
    }
}
