//! In-memory storage backend.
//!
//! Provides [`InMemoryStorage`], a thread-safe in-memory implementation of
//! the storage traits. Useful for tests and for short-lived sessions that
//! do not need a cache on disk.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

#[cfg(feature = "async")]
use core::future::{self, Future};

use super::{budget_key, remove_by_key, transaction_key, upsert_by_key};
use crate::error::{Result, TrackerError};
use crate::models::{Budget, BudgetId, Transaction, TransactionId};

/// Thread-safe in-memory storage.
///
/// This type implements both [`super::Storage`] (async) and
/// [`super::BlockingStorage`] (blocking) traits.
///
/// # Upsert semantics
///
/// Like `FileStorage`, upserts merge by ID: existing rows with matching IDs
/// are replaced in place, new rows are appended.
///
/// # Example
///
/// ```rust
/// use finance_tracker::storage::InMemoryStorage;
///
/// let storage = InMemoryStorage::new();
/// // Use with the FinanceTracker or FinanceTrackerBlocking builders:
/// // FinanceTrackerBlocking::builder().storage(storage).base_url("...").api_key("...").build()
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// All state behind a single mutex for thread-safe interior mutability.
    inner: Mutex<Inner>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Time of the last refresh.
    last_refreshed: Option<DateTime<Utc>>,
    /// Cached transactions.
    transactions: Vec<Transaction>,
    /// Cached budgets.
    budgets: Vec<Budget>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Inner) -> R,
    {
        let mut inner = self.inner.lock().map_err(|err| lock_error(&err))?;
        Ok(f(&mut inner))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &PoisonError<T>) -> TrackerError {
    TrackerError::Storage(err.to_string().into())
}

/// Resets every field.
fn clear_inner(inner: &mut Inner) {
    *inner = Inner::default();
}

// ── BlockingStorage implementation ──────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStorage for InMemoryStorage {
    #[inline]
    fn last_refreshed(&self) -> Result<Option<DateTime<Utc>>> {
        self.with_lock(|inner| inner.last_refreshed)
    }

    #[inline]
    fn set_last_refreshed(&self, timestamp: DateTime<Utc>) -> Result<()> {
        self.with_lock(|inner| inner.last_refreshed = Some(timestamp))
    }

    #[inline]
    fn transactions(&self) -> Result<Vec<Transaction>> {
        self.with_lock(|inner| inner.transactions.clone())
    }

    #[inline]
    fn budgets(&self) -> Result<Vec<Budget>> {
        self.with_lock(|inner| inner.budgets.clone())
    }

    #[inline]
    fn upsert_transactions(&self, items: Vec<Transaction>) -> Result<()> {
        self.with_lock(|inner| upsert_by_key(&mut inner.transactions, items, transaction_key))
    }

    #[inline]
    fn upsert_budgets(&self, items: Vec<Budget>) -> Result<()> {
        self.with_lock(|inner| upsert_by_key(&mut inner.budgets, items, budget_key))
    }

    #[inline]
    fn remove_transactions(&self, ids: &[TransactionId]) -> Result<()> {
        self.with_lock(|inner| remove_by_key(&mut inner.transactions, ids, transaction_key))
    }

    #[inline]
    fn remove_budgets(&self, ids: &[BudgetId]) -> Result<()> {
        self.with_lock(|inner| remove_by_key(&mut inner.budgets, ids, budget_key))
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.with_lock(clear_inner)
    }
}

// ── Storage (async) implementation ──────────────────────────────────────

#[cfg(feature = "async")]
impl super::Storage for InMemoryStorage {
    #[inline]
    fn last_refreshed(&self) -> impl Future<Output = Result<Option<DateTime<Utc>>>> + Send {
        future::ready(self.with_lock(|inner| inner.last_refreshed))
    }

    #[inline]
    fn set_last_refreshed(
        &self,
        timestamp: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| inner.last_refreshed = Some(timestamp)))
    }

    #[inline]
    fn transactions(&self) -> impl Future<Output = Result<Vec<Transaction>>> + Send {
        future::ready(self.with_lock(|inner| inner.transactions.clone()))
    }

    #[inline]
    fn budgets(&self) -> impl Future<Output = Result<Vec<Budget>>> + Send {
        future::ready(self.with_lock(|inner| inner.budgets.clone()))
    }

    #[inline]
    fn upsert_transactions(
        &self,
        items: Vec<Transaction>,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| upsert_by_key(&mut inner.transactions, items, transaction_key)),
        )
    }

    #[inline]
    fn upsert_budgets(&self, items: Vec<Budget>) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| upsert_by_key(&mut inner.budgets, items, budget_key)))
    }

    #[inline]
    fn remove_transactions(
        &self,
        ids: &[TransactionId],
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| remove_by_key(&mut inner.transactions, ids, transaction_key)),
        )
    }

    #[inline]
    fn remove_budgets(&self, ids: &[BudgetId]) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| remove_by_key(&mut inner.budgets, ids, budget_key)))
    }

    #[inline]
    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(clear_inner))
    }
}
