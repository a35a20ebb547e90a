//! Transaction model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{TransactionId, TransactionType, UserId};
use crate::error::{Result, TrackerError};

/// A recorded money movement, as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier (UUID).
    pub id: TransactionId,
    /// Owner user identifier.
    pub user_id: UserId,
    /// Income, expense or investment.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Free-text category label.
    pub category: String,
    /// Non-negative amount in the user's single currency.
    pub amount: f64,
    /// User-supplied description.
    #[serde(default)]
    pub description: String,
    /// Calendar date of the movement (yyyy-MM-dd).
    pub date: NaiveDate,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for recording a new transaction.
///
/// The backend assigns `id`, `user_id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Income, expense or investment.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Free-text category label.
    pub category: String,
    /// Non-negative amount.
    pub amount: f64,
    /// User-supplied description.
    pub description: String,
    /// Calendar date of the movement.
    pub date: NaiveDate,
}

impl NewTransaction {
    /// Checks the payload before it is sent to the backend.
    ///
    /// Aggregation assumes every stored amount is a finite, non-negative
    /// number; this is where that is enforced.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] if the category is blank or the
    /// amount is negative or not finite.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(TrackerError::Validation(
                "category must not be empty".to_owned(),
            ));
        }
        if !self.amount.is_finite() {
            return Err(TrackerError::Validation(
                "amount must be a finite number".to_owned(),
            ));
        }
        if self.amount < 0.0_f64 {
            return Err(TrackerError::Validation(
                "amount must not be negative".to_owned(),
            ));
        }
        Ok(())
    }
}
