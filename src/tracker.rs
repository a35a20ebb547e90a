//! High-level finance tracker with an integrated local cache.
//!
//! Combines the HTTP client with a [`Storage`](crate::storage::Storage) /
//! [`BlockingStorage`](crate::storage::BlockingStorage) backend: writes go
//! to the backend first and are then mirrored into the cache, reads and
//! analytics are served from the cache.

mod practice;

use core::cmp::Ordering;

pub use practice::practice_transactions;

use crate::models::{NaiveDate, Transaction, TransactionType};

/// Composable filter for querying cached transactions.
///
/// Use builder-style methods to chain criteria. A transaction must satisfy
/// every criterion that is set.
///
/// # Examples
///
/// ```
/// use finance_tracker::models::{NaiveDate, TransactionType};
/// use finance_tracker::tracker::TransactionFilter;
///
/// let filter = TransactionFilter::new()
///     .date_range(
///         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
///     )
///     .kind(TransactionType::Expense)
///     .category("Food");
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Start date (inclusive).
    pub date_from: Option<NaiveDate>,
    /// End date (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Transaction type.
    pub kind: Option<TransactionType>,
    /// Category (case-insensitive exact match).
    pub category: Option<String>,
    /// Description substring (case-insensitive).
    pub description: Option<String>,
    /// Minimum amount (inclusive).
    pub min_amount: Option<f64>,
    /// Maximum amount (inclusive).
    pub max_amount: Option<f64>,
}

impl TransactionFilter {
    /// Creates an empty filter that matches all transactions.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to transactions within the given date range (inclusive).
    #[inline]
    #[must_use]
    pub const fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Restricts to transactions on or after `from`.
    #[inline]
    #[must_use]
    pub const fn since(mut self, from: NaiveDate) -> Self {
        self.date_from = Some(from);
        self
    }

    /// Restricts to transactions on or before `to`.
    #[inline]
    #[must_use]
    pub const fn until(mut self, to: NaiveDate) -> Self {
        self.date_to = Some(to);
        self
    }

    /// Restricts to one transaction type.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to one category (case-insensitive).
    #[inline]
    #[must_use]
    pub fn category<T: Into<String>>(mut self, category: T) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restricts to transactions whose description contains the given
    /// substring (case-insensitive).
    #[inline]
    #[must_use]
    pub fn description<T: Into<String>>(mut self, text: T) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Restricts to amounts within `[min, max]`.
    #[inline]
    #[must_use]
    pub const fn amount_range(mut self, min: f64, max: f64) -> Self {
        self.min_amount = Some(min);
        self.max_amount = Some(max);
        self
    }

    /// Returns `true` if the transaction satisfies all set criteria.
    #[inline]
    pub(crate) fn matches(&self, tx: &Transaction) -> bool {
        self.matches_date(tx)
            && self.kind.is_none_or(|kind| tx.kind == kind)
            && self.matches_category(tx)
            && self.matches_description(tx)
            && self.matches_amount(tx)
    }

    /// Checks date range criteria.
    fn matches_date(&self, tx: &Transaction) -> bool {
        self.date_from.is_none_or(|from| tx.date >= from)
            && self.date_to.is_none_or(|to| tx.date <= to)
    }

    /// Checks category criteria.
    fn matches_category(&self, tx: &Transaction) -> bool {
        self.category
            .as_ref()
            .is_none_or(|category| tx.category.eq_ignore_ascii_case(category))
    }

    /// Checks description criteria.
    fn matches_description(&self, tx: &Transaction) -> bool {
        self.description.as_ref().is_none_or(|text| {
            tx.description
                .to_lowercase()
                .contains(&text.to_lowercase())
        })
    }

    /// Checks amount criteria.
    fn matches_amount(&self, tx: &Transaction) -> bool {
        self.min_amount.is_none_or(|min| tx.amount >= min)
            && self.max_amount.is_none_or(|max| tx.amount <= max)
    }
}

/// Row counts loaded by a refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Number of transactions now cached.
    pub transactions: usize,
    /// Number of budgets now cached.
    pub budgets: usize,
}

/// Orders transactions newest first.
///
/// Same-day rows are ordered by creation time, newest first.
fn newest_first(a: &Transaction, b: &Transaction) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Generates a high-level tracker (async or blocking).
macro_rules! define_tracker {
    (
        tracker_name: $tracker:ident,
        builder_name: $builder:ident,
        http_client: $http_client:ty,
        storage_trait: $storage_trait:ident,
        tracker_doc: $tracker_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder<S: $storage_trait> {
            /// Backend base URL.
            base_url: Option<String>,
            /// Project API key.
            api_key: Option<String>,
            /// Already established session.
            session: Option<Session>,
            /// Storage backend.
            storage: Option<S>,
        }

        impl<S: $storage_trait> $builder<S> {
            /// Sets the backend base URL.
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Sets the project API key.
            #[inline]
            #[must_use]
            pub fn api_key<T: Into<String>>(mut self, key: T) -> Self {
                self.api_key = Some(key.into());
                self
            }

            /// Starts with an existing session instead of signing in.
            #[inline]
            #[must_use]
            pub fn session(mut self, session: Session) -> Self {
                self.session = Some(session);
                self
            }

            /// Sets the storage backend.
            #[inline]
            #[must_use]
            pub fn storage(mut self, storage: S) -> Self {
                self.storage = Some(storage);
                self
            }

            /// Builds the tracker.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Storage`] if no storage was provided,
            /// [`TrackerError::Configuration`] if the base URL or API key is
            /// missing, or an error if the HTTP client fails to build.
            #[inline]
            pub fn build(self) -> Result<$tracker<S>> {
                let storage = self.storage.ok_or_else(|| {
                    TrackerError::Storage("storage backend is required".into())
                })?;

                let mut http_builder = <$http_client>::builder();
                if let Some(url) = self.base_url {
                    http_builder = http_builder.base_url(url);
                }
                if let Some(key) = self.api_key {
                    http_builder = http_builder.api_key(key);
                }
                if let Some(session) = self.session {
                    http_builder = http_builder.session(session);
                }
                let client = http_builder.build()?;

                Ok($tracker { client, storage })
            }
        }

        #[doc = $tracker_doc]
        #[derive(Debug)]
        pub struct $tracker<S: $storage_trait> {
            /// Backend HTTP client.
            client: $http_client,
            /// Local cache.
            storage: S,
        }

        impl<S: $storage_trait> $tracker<S> {
            /// Creates a new builder for configuring the tracker.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder<S> {
                $builder {
                    base_url: None,
                    api_key: None,
                    session: None,
                    storage: None,
                }
            }

            /// Signs in with email and password.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Api`] for rejected credentials, or a
            /// transport error.
            #[inline]
            pub $($async_kw)? fn sign_in(
                &mut self,
                email: &str,
                password: &SecretString,
            ) -> Result<AuthUser> {
                self.client.sign_in_with_password(email, password) $( .$await_ext )?
            }

            /// Replaces the cache with the signed-in user's rows from the
            /// backend and records the refresh time.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::NotAuthenticated`] without a session,
            /// [`TrackerError::MissingTables`] if the backend tables do not
            /// exist, or a request or storage error. The cache is left
            /// untouched when either fetch fails.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn refresh(&self) -> Result<RefreshSummary> {
                let transactions = self.client.fetch_transactions() $( .$await_ext )? ?;
                let budgets = self.client.fetch_budgets() $( .$await_ext )? ?;
                let summary = RefreshSummary {
                    transactions: transactions.len(),
                    budgets: budgets.len(),
                };

                self.storage.clear() $( .$await_ext )? ?;
                self.storage.upsert_transactions(transactions) $( .$await_ext )? ?;
                self.storage.upsert_budgets(budgets) $( .$await_ext )? ?;
                self.storage.set_last_refreshed(Utc::now()) $( .$await_ext )? ?;
                tracing::debug!(
                    transactions = summary.transactions,
                    budgets = summary.budgets,
                    "cache refreshed"
                );
                Ok(summary)
            }

            /// Records a transaction on the backend and caches the stored row.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Validation`] for an invalid payload, or
            /// a request or storage error.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn add_transaction(
                &self,
                transaction: &NewTransaction,
            ) -> Result<Transaction> {
                let created = self.client.insert_transaction(transaction) $( .$await_ext )? ?;
                self.storage
                    .upsert_transactions(vec![created.clone()])
                    $( .$await_ext )? ?;
                tracing::debug!(id = %created.id, "transaction added");
                Ok(created)
            }

            /// Records the sample transactions from [`practice_transactions`]
            /// in one request and caches the stored rows.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::NotAuthenticated`] without a session,
            /// or a request or storage error.
            #[tracing::instrument(skip_all, fields(reference = %reference))]
            pub $($async_kw)? fn seed_practice_data(
                &self,
                reference: NaiveDate,
            ) -> Result<Vec<Transaction>> {
                let rows = practice_transactions(reference);
                let created = self.client.insert_transactions(&rows) $( .$await_ext )? ?;
                self.storage.upsert_transactions(created.clone()) $( .$await_ext )? ?;
                tracing::debug!(count = created.len(), "practice data added");
                Ok(created)
            }

            /// Deletes a transaction on the backend and drops it from the
            /// cache.
            ///
            /// # Errors
            ///
            /// Returns a request or storage error.
            #[tracing::instrument(skip_all, fields(id = %id))]
            pub $($async_kw)? fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
                self.client.delete_transaction(id) $( .$await_ext )? ?;
                self.storage
                    .remove_transactions(core::slice::from_ref(id))
                    $( .$await_ext )?
            }

            /// Creates a budget limit on the backend and caches it.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Validation`] for an invalid payload, or
            /// a request or storage error.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn add_budget(&self, budget: &NewBudget) -> Result<Budget> {
                let created = self.client.insert_budget(budget) $( .$await_ext )? ?;
                self.storage.upsert_budgets(vec![created.clone()]) $( .$await_ext )? ?;
                tracing::debug!(id = %created.id, "budget added");
                Ok(created)
            }

            /// Changes a budget limit on the backend and caches the result.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Validation`] for an empty or invalid
            /// update, or a request or storage error.
            #[tracing::instrument(skip_all, fields(id = %id))]
            pub $($async_kw)? fn update_budget(
                &self,
                id: &BudgetId,
                update: &BudgetUpdate,
            ) -> Result<Budget> {
                let updated = self.client.update_budget(id, update) $( .$await_ext )? ?;
                self.storage.upsert_budgets(vec![updated.clone()]) $( .$await_ext )? ?;
                Ok(updated)
            }

            /// Returns cached transactions, newest first.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[inline]
            pub $($async_kw)? fn transactions(&self) -> Result<Vec<Transaction>> {
                let mut rows = self.storage.transactions() $( .$await_ext )? ?;
                rows.sort_by(newest_first);
                Ok(rows)
            }

            /// Returns cached budgets.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[inline]
            pub $($async_kw)? fn budgets(&self) -> Result<Vec<Budget>> {
                self.storage.budgets() $( .$await_ext )?
            }

            /// Returns when the cache was last refreshed.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[inline]
            pub $($async_kw)? fn last_refreshed(&self) -> Result<Option<DateTime<Utc>>> {
                self.storage.last_refreshed() $( .$await_ext )?
            }

            /// Returns cached transactions matching the filter, newest first.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn filter_transactions(
                &self,
                filter: &TransactionFilter,
            ) -> Result<Vec<Transaction>> {
                let all = self.transactions() $( .$await_ext )? ?;
                Ok(all.into_iter().filter(|tx| filter.matches(tx)).collect())
            }

            /// Per-month totals for the `month_count` months ending with the
            /// reference month, oldest first.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn monthly_aggregates(
                &self,
                month_count: u32,
                reference: NaiveDate,
            ) -> Result<Vec<MonthlyAggregate>> {
                let rows = self.transactions() $( .$await_ext )? ?;
                Ok(analytics::monthly_aggregates(&rows, month_count, reference))
            }

            /// Expense breakdown by category for the reference month.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn category_spending(
                &self,
                reference: NaiveDate,
            ) -> Result<Vec<CategorySpending>> {
                let rows = self.transactions() $( .$await_ext )? ?;
                Ok(analytics::category_spending(&rows, reference))
            }

            /// Next-month projection from the trailing six months.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn forecast(&self, reference: NaiveDate) -> Result<ForecastResult> {
                let rows = self.transactions() $( .$await_ext )? ?;
                Ok(analytics::forecast(&rows, reference))
            }

            /// Headline numbers for the reference month.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn month_summary(&self, reference: NaiveDate) -> Result<MonthSummary> {
                let rows = self.transactions() $( .$await_ext )? ?;
                Ok(analytics::month_summary(&rows, reference))
            }

            /// Notifications for the reference month.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn notifications(
                &self,
                reference: NaiveDate,
            ) -> Result<Vec<Notification>> {
                let rows = self.transactions() $( .$await_ext )? ?;
                Ok(analytics::notifications(&rows, reference))
            }

            /// Spending against every cached budget for the reference month.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn budget_progress(
                &self,
                reference: NaiveDate,
            ) -> Result<Vec<BudgetProgress>> {
                let budgets = self.budgets() $( .$await_ext )? ?;
                let rows = self.transactions() $( .$await_ext )? ?;
                Ok(analytics::budget_progress(&budgets, &rows, reference))
            }

            /// Returns a reference to the storage backend.
            #[inline]
            #[must_use]
            pub const fn storage(&self) -> &S {
                &self.storage
            }
        }
    };
}

// ── Async variant ───────────────────────────────────────────────────────

#[cfg(feature = "async")]
mod async_tracker {
    //! Async tracker.

    use chrono::{DateTime, Utc};
    use secrecy::SecretString;

    use super::{RefreshSummary, TransactionFilter, newest_first, practice_transactions};
    use crate::analytics::{
        self, BudgetProgress, CategorySpending, ForecastResult, MonthSummary, MonthlyAggregate,
        Notification,
    };
    use crate::client::FinanceClient;
    use crate::error::{Result, TrackerError};
    use crate::models::{
        AuthUser, Budget, BudgetId, BudgetUpdate, NaiveDate, NewBudget, NewTransaction, Session,
        Transaction, TransactionId,
    };
    use crate::storage::Storage;

    define_tracker! {
        tracker_name: FinanceTracker,
        builder_name: FinanceTrackerBuilder,
        http_client: FinanceClient,
        storage_trait: Storage,
        tracker_doc: "Async finance tracker with an integrated cache.\n\nUse [`FinanceTracker::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`FinanceTracker`].",
        async_kw: async,
        await_kw: await,
    }
}

// ── Blocking variant ────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
mod blocking_tracker {
    //! Blocking tracker.

    use chrono::{DateTime, Utc};
    use secrecy::SecretString;

    use super::{RefreshSummary, TransactionFilter, newest_first, practice_transactions};
    use crate::analytics::{
        self, BudgetProgress, CategorySpending, ForecastResult, MonthSummary, MonthlyAggregate,
        Notification,
    };
    use crate::client::FinanceBlockingClient;
    use crate::error::{Result, TrackerError};
    use crate::models::{
        AuthUser, Budget, BudgetId, BudgetUpdate, NaiveDate, NewBudget, NewTransaction, Session,
        Transaction, TransactionId,
    };
    use crate::storage::BlockingStorage;

    define_tracker! {
        tracker_name: FinanceTrackerBlocking,
        builder_name: FinanceTrackerBlockingBuilder,
        http_client: FinanceBlockingClient,
        storage_trait: BlockingStorage,
        tracker_doc: "Blocking finance tracker with an integrated cache.\n\nUse [`FinanceTrackerBlocking::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`FinanceTrackerBlocking`].",
    }
}

#[cfg(feature = "async")]
pub use async_tracker::{FinanceTracker, FinanceTrackerBuilder};
#[cfg(feature = "blocking")]
pub use blocking_tracker::{FinanceTrackerBlocking, FinanceTrackerBlockingBuilder};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{tx, ymd};
    use crate::error::TrackerError;
    use crate::models::{AuthUser, Session, UserId};
    use crate::storage::InMemoryStorage;

    /// Four rows spread over May and June 2024.
    fn sample() -> Vec<Transaction> {
        let mut salary = tx(TransactionType::Income, "Salary", 5000.0, ymd(2024, 6, 1));
        salary.description = "June payroll".to_owned();
        let mut lunch = tx(TransactionType::Expense, "Food", 12.5, ymd(2024, 6, 3));
        lunch.description = "Lunch with team".to_owned();
        let rent = tx(TransactionType::Expense, "Rent", 1500.0, ymd(2024, 5, 28));
        let etf = tx(TransactionType::Investment, "ETF", 300.0, ymd(2024, 6, 10));
        vec![salary, lunch, rent, etf]
    }

    /// Categories of the sample rows the filter keeps.
    fn matching(filter: &TransactionFilter) -> Vec<String> {
        sample()
            .iter()
            .filter(|row| filter.matches(row))
            .map(|row| row.category.clone())
            .collect()
    }

    #[test]
    fn filter_default_matches_all() {
        assert_eq!(matching(&TransactionFilter::new()).len(), 4);
    }

    #[test]
    fn filter_date_range_is_inclusive() {
        let filter = TransactionFilter::new().date_range(ymd(2024, 6, 1), ymd(2024, 6, 3));
        assert_eq!(matching(&filter), vec!["Salary", "Food"]);
    }

    #[test]
    fn filter_open_ended_dates() {
        assert_eq!(
            matching(&TransactionFilter::new().until(ymd(2024, 5, 31))),
            vec!["Rent"]
        );
        assert_eq!(
            matching(&TransactionFilter::new().since(ymd(2024, 6, 5))),
            vec!["ETF"]
        );
    }

    #[test]
    fn filter_kind() {
        let filter = TransactionFilter::new().kind(TransactionType::Expense);
        assert_eq!(matching(&filter), vec!["Food", "Rent"]);
    }

    #[test]
    fn filter_category_ignores_case() {
        let filter = TransactionFilter::new().category("food");
        assert_eq!(matching(&filter), vec!["Food"]);
    }

    #[test]
    fn filter_description_substring() {
        let filter = TransactionFilter::new().description("TEAM");
        assert_eq!(matching(&filter), vec!["Food"]);
    }

    #[test]
    fn filter_amount_range_is_inclusive() {
        let filter = TransactionFilter::new().amount_range(300.0, 1500.0);
        assert_eq!(matching(&filter), vec!["Rent", "ETF"]);
    }

    #[test]
    fn filter_combines_criteria() {
        let filter = TransactionFilter::new()
            .kind(TransactionType::Expense)
            .amount_range(0.0, 100.0)
            .since(ymd(2024, 6, 1));
        assert_eq!(matching(&filter), vec!["Food"]);
    }

    #[test]
    fn newest_first_orders_by_date_then_creation() {
        let mut early = tx(TransactionType::Expense, "A", 1.0, ymd(2024, 6, 1));
        let mut late = tx(TransactionType::Expense, "B", 1.0, ymd(2024, 6, 1));
        let older = tx(TransactionType::Expense, "C", 1.0, ymd(2024, 5, 1));
        early.created_at = chrono::DateTime::from_timestamp(100, 0).unwrap();
        late.created_at = chrono::DateTime::from_timestamp(200, 0).unwrap();
        let mut rows = vec![older, early, late];
        rows.sort_by(newest_first);
        let order: Vec<&str> = rows.iter().map(|row| row.category.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    /// Session for `user-1`.
    fn session() -> Session {
        Session::new(
            "token",
            AuthUser {
                id: UserId::new("user-1".to_owned()),
                email: None,
            },
        )
    }

    #[cfg(feature = "blocking")]
    mod blocking {
        use super::*;
        use crate::storage::BlockingStorage;

        #[test]
        fn builder_requires_storage() {
            let result = FinanceTrackerBlocking::<InMemoryStorage>::builder()
                .base_url("http://localhost")
                .api_key("key")
                .build();
            assert!(matches!(result, Err(TrackerError::Storage(_))));
        }

        #[test]
        fn builder_requires_api_key() {
            let result = FinanceTrackerBlocking::builder()
                .base_url("http://localhost")
                .storage(InMemoryStorage::new())
                .build();
            assert!(matches!(result, Err(TrackerError::Configuration(_))));
        }

        #[test]
        fn reads_come_from_cache() {
            let tracker = FinanceTrackerBlocking::builder()
                .base_url("http://localhost")
                .api_key("key")
                .session(session())
                .storage(InMemoryStorage::new())
                .build()
                .unwrap();
            tracker.storage().upsert_transactions(sample()).unwrap();

            let rows = tracker.transactions().unwrap();
            let dates: Vec<NaiveDate> = rows.iter().map(|row| row.date).collect();
            assert_eq!(
                dates,
                vec![
                    ymd(2024, 6, 10),
                    ymd(2024, 6, 3),
                    ymd(2024, 6, 1),
                    ymd(2024, 5, 28)
                ]
            );

            let june = tracker.month_summary(ymd(2024, 6, 20)).unwrap();
            assert_eq!(june.transaction_count, 3);
            assert!(tracker.last_refreshed().unwrap().is_none());
        }
    }

    #[cfg(feature = "async")]
    mod async_tests {
        use super::*;
        use crate::storage::Storage;

        #[tokio::test]
        async fn filter_reads_from_cache() {
            let tracker = FinanceTracker::builder()
                .base_url("http://localhost")
                .api_key("key")
                .storage(InMemoryStorage::new())
                .build()
                .unwrap();
            tracker.storage().upsert_transactions(sample()).await.unwrap();

            let expenses = tracker
                .filter_transactions(&TransactionFilter::new().kind(TransactionType::Expense))
                .await
                .unwrap();
            let categories: Vec<&str> = expenses.iter().map(|row| row.category.as_str()).collect();
            assert_eq!(categories, vec!["Food", "Rent"]);

            let spending = tracker.category_spending(ymd(2024, 6, 20)).await.unwrap();
            assert_eq!(spending.len(), 1);
        }
    }
}
