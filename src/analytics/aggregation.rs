//! Monthly and per-category aggregation.

use core::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use super::{MonthPeriod, percentage_of};
use crate::models::{NaiveDate, Transaction, TransactionType};

/// Per-type sums over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TransactionTotals {
    /// Sum of income amounts.
    pub income: f64,
    /// Sum of expense amounts.
    pub expenses: f64,
    /// Sum of investment amounts.
    pub investments: f64,
}

impl TransactionTotals {
    /// Adds one transaction to the matching bucket.
    #[inline]
    pub fn add(&mut self, tx: &Transaction) {
        match tx.kind {
            TransactionType::Income => self.income += tx.amount,
            TransactionType::Expense => self.expenses += tx.amount,
            TransactionType::Investment => self.investments += tx.amount,
        }
    }

    /// Income left after expenses and investments.
    #[inline]
    #[must_use]
    pub fn net(&self) -> f64 {
        self.income - self.expenses - self.investments
    }
}

impl<'tx> FromIterator<&'tx Transaction> for TransactionTotals {
    #[inline]
    fn from_iter<I: IntoIterator<Item = &'tx Transaction>>(iter: I) -> Self {
        let mut totals = Self::default();
        for tx in iter {
            totals.add(tx);
        }
        totals
    }
}

/// Income, expense and investment sums for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    /// The month summarized.
    pub month: MonthPeriod,
    /// Sum of income amounts.
    pub income: f64,
    /// Sum of expense amounts.
    pub expenses: f64,
    /// Sum of investment amounts.
    pub investments: f64,
    /// `income - expenses - investments`.
    pub net: f64,
}

impl MonthlyAggregate {
    /// Builds the aggregate for `month` from precomputed totals.
    #[inline]
    #[must_use]
    pub fn new(month: MonthPeriod, totals: TransactionTotals) -> Self {
        Self {
            month,
            income: totals.income,
            expenses: totals.expenses,
            investments: totals.investments,
            net: totals.net(),
        }
    }
}

/// Expense total for one category in the reference month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    /// Category label.
    pub category: String,
    /// Sum of expense amounts in the category.
    pub amount: f64,
    /// Share of the month's total expenses, in percent.
    pub percentage: f64,
}

/// Returns the transactions dated within `month`, in input order.
#[inline]
pub fn transactions_in_month(
    transactions: &[Transaction],
    month: MonthPeriod,
) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(move |tx| month.contains(tx.date))
}

/// Sums transactions into `month_count` consecutive calendar months ending
/// with the month of `reference`.
///
/// The result is ordered oldest first and has `month_count` entries;
/// months without transactions are all zeros. A window that would reach
/// before the earliest representable month is cut off there.
#[inline]
#[must_use]
pub fn monthly_aggregates(
    transactions: &[Transaction],
    month_count: u32,
    reference: NaiveDate,
) -> Vec<MonthlyAggregate> {
    MonthPeriod::trailing(reference, month_count)
        .into_iter()
        .map(|month| MonthlyAggregate::new(month, transactions_in_month(transactions, month).collect()))
        .collect()
}

/// Groups the reference month's expenses by category.
///
/// Rows are sorted by amount, largest first. The sort is stable, so
/// categories with equal amounts keep the order in which they first appear
/// in `transactions`. When the month's expenses sum to zero every
/// percentage is zero.
#[inline]
#[must_use]
pub fn category_spending(transactions: &[Transaction], reference: NaiveDate) -> Vec<CategorySpending> {
    let month = MonthPeriod::containing(reference);
    let mut order: Vec<(&str, f64)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for tx in transactions_in_month(transactions, month)
        .filter(|tx| tx.kind == TransactionType::Expense)
    {
        let category = tx.category.as_str();
        if let Some(&slot) = slots.get(category) {
            if let Some(entry) = order.get_mut(slot) {
                entry.1 += tx.amount;
            }
        } else {
            let _previous = slots.insert(category, order.len());
            order.push((category, tx.amount));
        }
    }

    let total: f64 = order.iter().map(|&(_, amount)| amount).sum();
    let mut rows: Vec<CategorySpending> = order
        .into_iter()
        .map(|(category, amount)| CategorySpending {
            category: category.to_owned(),
            amount,
            percentage: percentage_of(amount, total),
        })
        .collect();
    rows.sort_by(|left, right| {
        right
            .amount
            .partial_cmp(&left.amount)
            .unwrap_or(Ordering::Equal)
    });
    rows
}
