//! Monthly budget limit model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BudgetId, UserId};
use crate::error::{Result, TrackerError};

/// A monthly spending limit for one expense category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Unique identifier (UUID).
    pub id: BudgetId,
    /// Owner user identifier.
    pub user_id: UserId,
    /// Expense category the limit applies to.
    pub category: String,
    /// Maximum planned spending per calendar month.
    pub monthly_limit: f64,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a budget limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    /// Expense category the limit applies to.
    pub category: String,
    /// Maximum planned spending per calendar month.
    pub monthly_limit: f64,
}

impl NewBudget {
    /// Checks the payload before it is sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] if the category is blank or the
    /// limit is not a finite positive number.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(TrackerError::Validation(
                "category must not be empty".to_owned(),
            ));
        }
        validate_limit(self.monthly_limit)
    }
}

/// Partial update of a budget limit. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetUpdate {
    /// New category, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New monthly limit, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_limit: Option<f64>,
}

impl BudgetUpdate {
    /// Creates an update that changes nothing.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new category.
    #[inline]
    #[must_use]
    pub fn category<T: Into<String>>(mut self, category: T) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets a new monthly limit.
    #[inline]
    #[must_use]
    pub const fn monthly_limit(mut self, limit: f64) -> Self {
        self.monthly_limit = Some(limit);
        self
    }

    /// Returns `true` if no field is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none() && self.monthly_limit.is_none()
    }

    /// Checks the fields that are set.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] if the update is empty, the new
    /// category is blank, or the new limit is not a finite positive number.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(TrackerError::Validation("update sets no fields".to_owned()));
        }
        if self
            .category
            .as_deref()
            .is_some_and(|category| category.trim().is_empty())
        {
            return Err(TrackerError::Validation(
                "category must not be empty".to_owned(),
            ));
        }
        self.monthly_limit.map_or(Ok(()), validate_limit)
    }

    /// Applies the set fields to a budget in place.
    #[inline]
    pub fn apply_to(&self, budget: &mut Budget) {
        if let Some(category) = self.category.as_ref() {
            budget.category.clone_from(category);
        }
        if let Some(limit) = self.monthly_limit {
            budget.monthly_limit = limit;
        }
    }
}

/// Rejects limits that are not finite and strictly positive.
fn validate_limit(limit: f64) -> Result<()> {
    if limit.is_finite() && limit > 0.0_f64 {
        Ok(())
    } else {
        Err(TrackerError::Validation(
            "monthly limit must be a positive number".to_owned(),
        ))
    }
}
