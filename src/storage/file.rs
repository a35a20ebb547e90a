//! JSON-file-based storage backend.
//!
//! Stores transactions and budgets in separate JSON files under a
//! configurable directory (default: `$XDG_DATA_HOME/finance-tracker/`).

use core::hash::Hash;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(feature = "async")]
use core::future::{self, Future};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{budget_key, remove_by_key, transaction_key, upsert_by_key};
use crate::error::{Result, TrackerError};
use crate::models::{Budget, BudgetId, Transaction, TransactionId};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "finance-tracker";

/// File name for refresh metadata.
const META_FILE: &str = "meta.json";
/// File name for transactions.
const TRANSACTIONS_FILE: &str = "transactions.json";
/// File name for budgets.
const BUDGETS_FILE: &str = "budgets.json";
/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// Metadata stored alongside entity files.
#[derive(Debug, Serialize, Deserialize, Default)]
struct Meta {
    /// Time of the last refresh, or absent if the cache was never filled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_refreshed: Option<DateTime<Utc>>,
}

/// File-backed storage that persists cached rows as JSON files.
///
/// # Concurrency
///
/// Thread safety within a single process is provided by an in-process
/// [`Mutex`]. Cross-process safety is achieved via an advisory file lock
/// on `storage.lock` (using [`std::fs::File::lock`] /
/// [`std::fs::File::lock_shared`]).
///
/// Read operations acquire a shared lock (allowing concurrent readers),
/// while write operations acquire an exclusive lock.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock          (cross-process lock sentinel)
///   meta.json
///   transactions.json
///   budgets.json
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing all JSON files.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a new file storage rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist, and opens
    /// (or creates) the `storage.lock` sentinel file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        tracing::debug!(dir = %dir.display(), "opened file storage");
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/finance-tracker/` (typically
    /// `~/.local/share/finance-tracker/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                TrackerError::Storage("could not determine platform data directory".into())
            })
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Returns the full path for a given file name.
    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Acquires an in-process mutex guard and a shared (read) file lock,
    /// executes `op`, then releases the file lock.
    fn with_shared_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = op();
        // The operation's own error wins over an unlock failure.
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Acquires an in-process mutex guard and an exclusive (write) file
    /// lock, executes `op`, then releases the file lock.
    fn with_exclusive_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Reads and deserializes a JSON file, or returns `T::default()` if the
    /// file does not exist.
    fn read_json<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        match fs::read_to_string(self.path(name)) {
            Ok(contents) => serde_json::from_str(&contents).map_err(TrackerError::from),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(err) => Err(storage_io_error(err)),
        }
    }

    /// Atomically writes a serialized JSON file (write-to-tmp then rename).
    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.path(name);
        let tmp_path = self.path(&format!("{name}.tmp"));
        let json = serde_json::to_string_pretty(value).map_err(TrackerError::from)?;
        fs::write(&tmp_path, json).map_err(storage_io_error)?;
        fs::rename(&tmp_path, &path).map_err(storage_io_error)?;
        Ok(())
    }

    /// Reads an entity file under a shared lock.
    fn read_entities<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        self.with_shared_lock(|| self.read_json(name))
    }

    /// Merges new items into an entity file by key (insert-or-replace).
    fn upsert_file<T, K>(&self, name: &str, new_items: Vec<T>, key_fn: fn(&T) -> K) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        K: Hash + Eq,
    {
        if new_items.is_empty() {
            return Ok(());
        }
        self.with_exclusive_lock(|| {
            let mut rows: Vec<T> = self.read_json(name)?;
            upsert_by_key(&mut rows, new_items, key_fn);
            tracing::trace!(file = name, count = rows.len(), "writing entity file");
            self.write_json(name, &rows)
        })
    }

    /// Removes items from an entity file by key.
    fn remove_file<T, K>(&self, name: &str, ids: &[K], key_fn: fn(&T) -> K) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        K: Hash + Eq,
    {
        if ids.is_empty() {
            return Ok(());
        }
        self.with_exclusive_lock(|| {
            let mut rows: Vec<T> = self.read_json(name)?;
            remove_by_key(&mut rows, ids, key_fn);
            self.write_json(name, &rows)
        })
    }

    /// Reads `last_refreshed` from meta (with lock).
    fn read_last_refreshed(&self) -> Result<Option<DateTime<Utc>>> {
        self.with_shared_lock(|| {
            let meta: Meta = self.read_json(META_FILE)?;
            Ok(meta.last_refreshed)
        })
    }

    /// Writes `last_refreshed` to meta (with lock).
    fn write_last_refreshed(&self, timestamp: DateTime<Utc>) -> Result<()> {
        self.with_exclusive_lock(|| {
            let mut meta: Meta = self.read_json(META_FILE)?;
            meta.last_refreshed = Some(timestamp);
            self.write_json(META_FILE, &meta)
        })
    }

    /// Deletes all entity files and metadata.
    ///
    /// The `storage.lock` sentinel is kept.
    fn clear_all(&self) -> Result<()> {
        self.with_exclusive_lock(|| {
            for name in [META_FILE, TRANSACTIONS_FILE, BUDGETS_FILE] {
                match fs::remove_file(self.path(name)) {
                    Ok(()) => {}
                    Err(err) if err.kind() == ErrorKind::NotFound => {}
                    Err(err) => return Err(storage_io_error(err)),
                }
            }
            tracing::debug!("cleared file storage");
            Ok(())
        })
    }
}

// ── Free-standing helpers ───────────────────────────────────────────────

/// Wraps an I/O error into a [`TrackerError::Storage`].
fn storage_io_error(err: std::io::Error) -> TrackerError {
    TrackerError::Storage(Box::new(err))
}

/// Wraps a mutex poison error into a [`TrackerError::Storage`].
fn lock_poison_error<T>(err: &PoisonError<T>) -> TrackerError {
    TrackerError::Storage(err.to_string().into())
}

// ── BlockingStorage implementation ──────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStorage for FileStorage {
    #[inline]
    fn last_refreshed(&self) -> Result<Option<DateTime<Utc>>> {
        self.read_last_refreshed()
    }

    #[inline]
    fn set_last_refreshed(&self, timestamp: DateTime<Utc>) -> Result<()> {
        self.write_last_refreshed(timestamp)
    }

    #[inline]
    fn transactions(&self) -> Result<Vec<Transaction>> {
        self.read_entities(TRANSACTIONS_FILE)
    }

    #[inline]
    fn budgets(&self) -> Result<Vec<Budget>> {
        self.read_entities(BUDGETS_FILE)
    }

    #[inline]
    fn upsert_transactions(&self, items: Vec<Transaction>) -> Result<()> {
        self.upsert_file(TRANSACTIONS_FILE, items, transaction_key)
    }

    #[inline]
    fn upsert_budgets(&self, items: Vec<Budget>) -> Result<()> {
        self.upsert_file(BUDGETS_FILE, items, budget_key)
    }

    #[inline]
    fn remove_transactions(&self, ids: &[TransactionId]) -> Result<()> {
        self.remove_file(TRANSACTIONS_FILE, ids, transaction_key)
    }

    #[inline]
    fn remove_budgets(&self, ids: &[BudgetId]) -> Result<()> {
        self.remove_file(BUDGETS_FILE, ids, budget_key)
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.clear_all()
    }
}

// ── Storage (async) implementation ──────────────────────────────────────

#[cfg(feature = "async")]
impl super::Storage for FileStorage {
    #[inline]
    fn last_refreshed(&self) -> impl Future<Output = Result<Option<DateTime<Utc>>>> + Send {
        future::ready(self.read_last_refreshed())
    }

    #[inline]
    fn set_last_refreshed(
        &self,
        timestamp: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.write_last_refreshed(timestamp))
    }

    #[inline]
    fn transactions(&self) -> impl Future<Output = Result<Vec<Transaction>>> + Send {
        future::ready(self.read_entities(TRANSACTIONS_FILE))
    }

    #[inline]
    fn budgets(&self) -> impl Future<Output = Result<Vec<Budget>>> + Send {
        future::ready(self.read_entities(BUDGETS_FILE))
    }

    #[inline]
    fn upsert_transactions(
        &self,
        items: Vec<Transaction>,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.upsert_file(TRANSACTIONS_FILE, items, transaction_key))
    }

    #[inline]
    fn upsert_budgets(&self, items: Vec<Budget>) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.upsert_file(BUDGETS_FILE, items, budget_key))
    }

    #[inline]
    fn remove_transactions(
        &self,
        ids: &[TransactionId],
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.remove_file(TRANSACTIONS_FILE, ids, transaction_key))
    }

    #[inline]
    fn remove_budgets(&self, ids: &[BudgetId]) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.remove_file(BUDGETS_FILE, ids, budget_key))
    }

    #[inline]
    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.clear_all())
    }
}
