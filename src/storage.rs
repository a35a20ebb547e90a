//! Local cache of the signed-in user's rows.
//!
//! This module defines the [`Storage`] (async) and [`BlockingStorage`]
//! (blocking) traits via a shared macro, mirroring the client generation
//! pattern in the `client` module.

#[cfg(feature = "storage-file")]
mod file;
mod memory;

use core::hash::Hash;
use std::collections::{HashMap, HashSet};

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;

use crate::models::{Budget, BudgetId, Transaction, TransactionId};

/// Generates a storage trait (async or blocking) with all entity methods.
///
/// Uses `@methods` to define the method list once, and `@method` to render
/// each method in async (`impl Future + Send`) or blocking (`fn`) style.
macro_rules! define_storage {
    // ── Entry points ────────────────────────────────────────────────
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: async_mode,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods async_mode);
        }
    };
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: blocking,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods blocking);
        }
    };

    // ── Single method list (shared between both variants) ───────────
    (@methods $mode:ident) => {
        // Refresh state
        define_storage!(@method $mode, last_refreshed,
            "Returns when the cache was last refreshed from the backend.\n\nReturns `Ok(None)` if it never was.\n\n# Errors\n\nReturns an error if the storage backend fails to read the timestamp.",
            -> Result<Option<DateTime<Utc>>>);
        define_storage!(@method $mode, set_last_refreshed,
            "Records the time of a successful refresh.\n\n# Errors\n\nReturns an error if the storage backend fails to write the timestamp.",
            timestamp: DateTime<Utc>, -> Result<()>);

        // Read
        define_storage!(@method $mode, transactions,
            "Returns all cached transactions in stored order.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Vec<Transaction>>);
        define_storage!(@method $mode, budgets,
            "Returns all cached budgets in stored order.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Vec<Budget>>);

        // Upsert
        define_storage!(@method $mode, upsert_transactions,
            "Inserts or replaces transactions (matched by ID).\n\nReplaced rows keep their position; new rows are appended.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            items: Vec<Transaction>, -> Result<()>);
        define_storage!(@method $mode, upsert_budgets,
            "Inserts or replaces budgets (matched by ID).\n\nReplaced rows keep their position; new rows are appended.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            items: Vec<Budget>, -> Result<()>);

        // Remove
        define_storage!(@method $mode, remove_transactions,
            "Removes transactions by their IDs.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            ids: &[TransactionId], -> Result<()>);
        define_storage!(@method $mode, remove_budgets,
            "Removes budgets by their IDs.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            ids: &[BudgetId], -> Result<()>);

        // Clear
        define_storage!(@method $mode, clear,
            "Removes all cached data (used before a full refresh).\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            -> Result<()>);
    };

    // ── Blocking method renderer ────────────────────────────────────
    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    // ── Async method renderer (returns impl Future + Send) ──────────
    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl core::future::Future<Output = $ret> + Send;
    };
}

#[cfg(feature = "async")]
mod async_storage {
    //! Async storage trait definition.

    use crate::error::Result;
    use crate::models::{Budget, BudgetId, Transaction, TransactionId};
    use chrono::{DateTime, Utc};

    define_storage! {
        trait_name: Storage,
        trait_doc: "Async cache backend for the signed-in user's rows.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: async_mode,
    }
}

#[cfg(feature = "blocking")]
mod blocking_storage {
    //! Blocking storage trait definition.

    use crate::error::Result;
    use crate::models::{Budget, BudgetId, Transaction, TransactionId};
    use chrono::{DateTime, Utc};

    define_storage! {
        trait_name: BlockingStorage,
        trait_doc: "Blocking cache backend for the signed-in user's rows.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: blocking,
    }
}

#[cfg(feature = "async")]
pub use async_storage::Storage;
#[cfg(feature = "blocking")]
pub use blocking_storage::BlockingStorage;

/// Merges `new_items` into `existing` by key.
///
/// Items whose key is already present replace the old item in place; the
/// rest are appended in input order.
fn upsert_by_key<T, K>(existing: &mut Vec<T>, new_items: Vec<T>, key_fn: fn(&T) -> K)
where
    K: Hash + Eq,
{
    let mut positions: HashMap<K, usize> = existing
        .iter()
        .enumerate()
        .map(|(position, item)| (key_fn(item), position))
        .collect();
    for item in new_items {
        let key = key_fn(&item);
        if let Some(slot) = positions.get(&key).and_then(|&position| existing.get_mut(position)) {
            *slot = item;
        } else {
            let _old = positions.insert(key, existing.len());
            existing.push(item);
        }
    }
}

/// Removes items whose key is in `ids`.
fn remove_by_key<T, K>(existing: &mut Vec<T>, ids: &[K], key_fn: fn(&T) -> K)
where
    K: Hash + Eq,
{
    let id_set: HashSet<&K> = ids.iter().collect();
    existing.retain(|item| !id_set.contains(&key_fn(item)));
}

/// Key of a cached transaction.
fn transaction_key(transaction: &Transaction) -> TransactionId {
    transaction.id.clone()
}

/// Key of a cached budget.
fn budget_key(budget: &Budget) -> BudgetId {
    budget.id.clone()
}


#[cfg(test)]
mod tests {
    use super::*;

    /// Pairs of `(key, value)` used as stand-in rows.
    fn key(item: &(u8, &'static str)) -> u8 {
        item.0
    }

    #[test]
    fn upsert_replaces_in_place_and_appends() {
        let mut rows = vec![(1, "a"), (2, "b"), (3, "c")];
        upsert_by_key(&mut rows, vec![(2, "B"), (4, "d"), (1, "A")], key);
        assert_eq!(rows, vec![(1, "A"), (2, "B"), (3, "c"), (4, "d")]);
    }

    #[test]
    fn upsert_duplicate_new_keys_keep_last() {
        let mut rows = Vec::new();
        upsert_by_key(&mut rows, vec![(7, "first"), (7, "second")], key);
        assert_eq!(rows, vec![(7, "second")]);
    }

    #[test]
    fn remove_drops_matching_keys() {
        let mut rows = vec![(1, "a"), (2, "b"), (3, "c")];
        remove_by_key(&mut rows, &[2, 9], key);
        assert_eq!(rows, vec![(1, "a"), (3, "c")]);
    }
}
