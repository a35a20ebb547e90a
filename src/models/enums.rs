//! Enumeration types for constrained backend values.

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Direction of a money movement.
///
/// Amounts are always stored as non-negative numbers; the sign of a
/// transaction is implied by its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received (salary, freelance work, dividends).
    Income,
    /// Money spent.
    Expense,
    /// Money moved into investments.
    Investment,
}

impl TransactionType {
    /// Every transaction type, in display order.
    pub const ALL: [Self; 3] = [Self::Income, Self::Expense, Self::Investment];

    /// Returns the wire name (`income`, `expense`, `investment`).
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Investment => "investment",
        }
    }

    /// Returns a capitalized human-readable label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Investment => "Investment",
        }
    }

    /// Category labels offered when recording a transaction of this type.
    ///
    /// The list is a suggestion only: categories are free text and users
    /// may enter anything.
    #[inline]
    #[must_use]
    pub const fn suggested_categories(self) -> &'static [&'static str] {
        match self {
            Self::Income => &[
                "Salary",
                "Freelance",
                "Business",
                "Investment Returns",
                "Other",
            ],
            Self::Expense => &[
                "Food & Dining",
                "Transportation",
                "Shopping",
                "Entertainment",
                "Bills & Utilities",
                "Healthcare",
                "Education",
                "Travel",
                "Other",
            ],
            Self::Investment => &[
                "Stocks",
                "Bonds",
                "Cryptocurrency",
                "Real Estate",
                "Retirement Fund",
                "Other",
            ],
        }
    }
}

impl core::fmt::Display for TransactionType {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for TransactionType {
    type Err = TrackerError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "investment" => Ok(Self::Investment),
            other => Err(TrackerError::Validation(format!(
                "unknown transaction type: {other}"
            ))),
        }
    }
}
