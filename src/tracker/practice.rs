//! Sample transactions for trying the tracker on an empty account.

use chrono::Months;

use crate::models::{NaiveDate, NewTransaction, TransactionType};

/// Rows dated in the reference month: type, category, amount, description.
const CURRENT_MONTH: [(TransactionType, &str, f64, &str); 11] = [
    (TransactionType::Income, "Salary", 5000.0, "Monthly salary"),
    (TransactionType::Income, "Freelance", 800.0, "Web development project"),
    (TransactionType::Income, "Investment Returns", 150.0, "Portfolio dividend"),
    (TransactionType::Expense, "Housing", 1200.0, "Rent"),
    (TransactionType::Expense, "Food & Dining", 400.0, "Groceries and restaurants"),
    (TransactionType::Expense, "Transportation", 200.0, "Fuel and transit pass"),
    (TransactionType::Expense, "Bills & Utilities", 150.0, "Electricity, water, internet"),
    (TransactionType::Expense, "Entertainment", 100.0, "Streaming and cinema"),
    (TransactionType::Investment, "Stocks", 500.0, "Index fund purchase"),
    (TransactionType::Investment, "Cryptocurrency", 200.0, "Bitcoin purchase"),
    (TransactionType::Investment, "Retirement Fund", 300.0, "Pension contribution"),
];

/// Rows dated one month before the reference date.
const PREVIOUS_MONTH: [(TransactionType, &str, f64, &str); 3] = [
    (TransactionType::Income, "Salary", 5000.0, "Previous month salary"),
    (TransactionType::Expense, "Housing", 1200.0, "Previous month rent"),
    (TransactionType::Expense, "Food & Dining", 350.0, "Previous month groceries"),
];

/// Builds the sample transactions for a new account.
///
/// Most rows fall on `reference`; a few fall one calendar month earlier so
/// trends have something to compare against. When the previous month is
/// not representable those rows also use `reference`.
#[inline]
#[must_use]
pub fn practice_transactions(reference: NaiveDate) -> Vec<NewTransaction> {
    let previous = reference
        .checked_sub_months(Months::new(1))
        .unwrap_or(reference);
    let current_rows = CURRENT_MONTH.iter().map(|row| (row, reference));
    let previous_rows = PREVIOUS_MONTH.iter().map(|row| (row, previous));
    current_rows
        .chain(previous_rows)
        .map(|(&(kind, category, amount, description), date)| NewTransaction {
            kind,
            category: category.to_owned(),
            amount,
            description: description.to_owned(),
            date,
        })
        .collect()
}
