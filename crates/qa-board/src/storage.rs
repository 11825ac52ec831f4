//! Append-only record journal shared by every store in the crate.
//!
//! A journal keeps the full collection in memory and, when opened on a path, mirrors each
//! append as one JSON line in that file. Records become visible only after their line has
//! been written, so readers never observe a record that failed to persist.

use std::future::Future;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Share of unreadable lines tolerated when loading a journal file.
const CORRUPTION_THRESHOLD: f64 = 0.10;

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("record could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{path} is corrupt: {corrupt} of {total} lines unreadable")]
    Corrupt {
        path: String,
        corrupt: usize,
        total: usize,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage task failed: {0}")]
    TaskFailed(String),
}

pub struct Journal<T> {
    state: Arc<Mutex<JournalState<T>>>,
}

impl<T> Clone for Journal<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

struct JournalState<T> {
    records: Vec<T>,
    sink: Option<Sink>,
}

struct Sink {
    file: Box<dyn JournalFile>,
    /// Byte length of the file as last observed by this sink.
    len: u64,
    needs_separator: bool,
    /// Set once the file length can no longer be trusted; every later append is refused.
    poisoned: bool,
}

/// Write side of a journal file.
#[async_trait]
trait JournalFile: Send + Sync {
    async fn write_flushed(&mut self, bytes: &[u8]) -> std::io::Result<()>;
    async fn truncate(&mut self, len: u64) -> std::io::Result<()>;
    async fn current_len(&mut self) -> std::io::Result<u64>;
}

#[async_trait]
impl JournalFile for File {
    async fn write_flushed(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.write_all(bytes).await?;
        self.flush().await
    }

    async fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len).await
    }

    async fn current_len(&mut self) -> std::io::Result<u64> {
        Ok(self.metadata().await?.len())
    }
}

impl<T> Journal<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn in_memory() -> Self {
        Self::from_state(JournalState {
            records: Vec::new(),
            sink: None,
        })
    }

    /// Load `path` (creating it and its parent directories when missing) and append to it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };

        let loaded = decode::<T>(&path, &raw)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if loaded.intact_len < raw.len() as u64 {
            file.set_len(loaded.intact_len).await?;
        }

        debug!(path = %path.display(), records = loaded.records.len(), "journal loaded");

        Ok(Self::from_state(JournalState {
            records: loaded.records,
            sink: Some(Sink {
                file: Box::new(file),
                len: loaded.intact_len,
                needs_separator: loaded.needs_separator,
                poisoned: false,
            }),
        }))
    }

    fn from_state(state: JournalState<T>) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Persist `record` and make it visible to readers.
    pub async fn append(&self, record: T) -> Result<T, StorageError> {
        let state = Arc::clone(&self.state);
        detach(async move { state.lock().await.push(record).await }).await
    }

    /// Append `record` unless an existing record satisfies `conflicts`; `Ok(None)` on conflict.
    pub async fn append_unless<F>(&self, record: T, conflicts: F) -> Result<Option<T>, StorageError>
    where
        F: Fn(&T) -> bool + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        detach(async move {
            let mut state = state.lock().await;
            if state.records.iter().any(|existing| conflicts(existing)) {
                return Ok(None);
            }
            state.push(record).await.map(Some)
        })
        .await
    }

    /// Every record in insertion order.
    pub async fn snapshot(&self) -> Vec<T> {
        self.state.lock().await.records.clone()
    }

    /// Records matching `predicate`, in insertion order.
    pub async fn select<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let state = self.state.lock().await;
        state
            .records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    pub async fn find<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let state = self.state.lock().await;
        state.records.iter().find(|record| predicate(record)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

}

impl<T> JournalState<T>
where
    T: Serialize + Clone,
{
    async fn push(&mut self, record: T) -> Result<T, StorageError> {
        if let Some(sink) = self.sink.as_mut() {
            let mut line = serde_json::to_vec(&record)?;
            line.push(b'\n');
            sink.write_line(&line).await?;
        }
        self.records.push(record.clone());
        Ok(record)
    }
}

impl Sink {
    async fn write_line(&mut self, line: &[u8]) -> Result<(), StorageError> {
        if self.poisoned {
            return Err(StorageError::Unavailable(
                "journal file length unknown after a failed write".to_string(),
            ));
        }

        if self.needs_separator {
            if let Err(err) = self.file.write_flushed(b"\n").await {
                self.recover().await;
                return Err(err.into());
            }
            self.len += 1;
            self.needs_separator = false;
        }

        match self.file.write_flushed(line).await {
            Ok(()) => {
                self.len += line.len() as u64;
                Ok(())
            }
            Err(err) => {
                self.recover().await;
                Err(err.into())
            }
        }
    }

    /// Drop whatever fragment reached the file. When that fails, resync the length and fence
    /// the fragment off; when even the length is unreadable, stop appending.
    async fn recover(&mut self) {
        if self.file.truncate(self.len).await.is_ok() {
            return;
        }
        match self.file.current_len().await {
            Ok(len) => {
                if len != self.len {
                    self.len = len;
                    self.needs_separator = true;
                }
            }
            Err(err) => {
                warn!(error = %err, "journal file length unreadable; refusing further appends");
                self.poisoned = true;
            }
        }
    }
}

/// Appends run on their own task so a dropped caller cannot interrupt a write in flight.
async fn detach<F, R>(work: F) -> Result<R, StorageError>
where
    F: Future<Output = Result<R, StorageError>> + Send + 'static,
    R: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|err| StorageError::TaskFailed(err.to_string()))?
}

struct Loaded<T> {
    records: Vec<T>,
    intact_len: u64,
    needs_separator: bool,
}

fn decode<T: DeserializeOwned>(path: &Path, raw: &str) -> Result<Loaded<T>, StorageError> {
    let split = raw.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    let (complete, tail) = raw.split_at(split);

    let mut records = Vec::new();
    let mut total = 0usize;
    let mut corrupt = 0usize;

    for line in complete.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total += 1;
        match serde_json::from_str::<T>(line) {
            Ok(record) => records.push(record),
            Err(err) => {
                corrupt += 1;
                warn!(path = %path.display(), error = %err, "skipping unreadable journal line");
            }
        }
    }

    if total > 0 && corrupt as f64 / total as f64 > CORRUPTION_THRESHOLD {
        return Err(StorageError::Corrupt {
            path: path.display().to_string(),
            corrupt,
            total,
        });
    }

    let mut loaded = Loaded {
        records,
        intact_len: split as u64,
        needs_separator: false,
    };

    let fragment = tail.trim();
    if fragment.is_empty() {
        return Ok(loaded);
    }

    match serde_json::from_str::<T>(fragment) {
        Ok(record) => {
            loaded.records.push(record);
            loaded.intact_len = raw.len() as u64;
            loaded.needs_separator = true;
        }
        Err(_) => {
            warn!(
                path = %path.display(),
                bytes = tail.len(),
                "discarding torn trailing journal line"
            );
        }
    }

    Ok(loaded)
}
