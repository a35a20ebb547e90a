//! Statistics derived from a user's transactions.
//!
//! Everything here is a pure function over a transaction slice. Calendar
//! windows are always computed from an explicit `reference` date instead of
//! the system clock, so the same inputs always give the same output.
//!
//! ```
//! use finance_tracker::analytics::{category_spending, forecast, monthly_aggregates};
//! use finance_tracker::models::NaiveDate;
//!
//! let reference = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let months = monthly_aggregates(&[], 6, reference);
//! assert_eq!(months.len(), 6);
//! assert!(category_spending(&[], reference).is_empty());
//! assert_eq!(forecast(&[], reference).confidence, 0);
//! ```

mod aggregation;
mod forecast;
mod insights;
mod period;

pub use aggregation::{
    CategorySpending, MonthlyAggregate, TransactionTotals, category_spending, monthly_aggregates,
    transactions_in_month,
};
pub use forecast::{FORECAST_WINDOW_MONTHS, ForecastResult, forecast, forecast_from_aggregates};
pub use insights::{
    BudgetProgress, BudgetStatus, MonthSummary, Notification, NotificationLevel,
    budget_progress, month_summary, notifications,
};
pub use period::MonthPeriod;

/// Returns `part` as a percentage of `whole`, or `0` when `whole` is not
/// positive.
pub(crate) fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0_f64 {
        part / whole * 100.0_f64
    } else {
        0.0_f64
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Builders shared by the analytics unit tests.

    use chrono::DateTime;

    use crate::models::{NaiveDate, Transaction, TransactionId, TransactionType, UserId};

    /// Shorthand for a calendar date.
    pub(crate) fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Creates a transaction with the fields analytics look at.
    pub(crate) fn tx(
        kind: TransactionType,
        category: &str,
        amount: f64,
        date: NaiveDate,
    ) -> Transaction {
        Transaction {
            id: TransactionId::new(format!("{kind}-{category}-{date}-{amount}")),
            user_id: UserId::new("user-1".to_owned()),
            kind,
            category: category.to_owned(),
            amount,
            description: String::new(),
            date,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }
}
