//! Data models for finance tracker entities.
//!
//! This module contains strongly-typed representations of the rows stored
//! by the hosted backend, newtype ID wrappers, the transaction type
//! enumeration, and the authenticated session.

mod budget;
mod enums;
mod ids;
mod session;
mod transaction;

pub use budget::{Budget, BudgetUpdate, NewBudget};
pub use chrono::NaiveDate;
pub use enums::TransactionType;
pub use ids::{BudgetId, TransactionId, UserId};
pub use session::{AuthUser, Session};
pub use transaction::{NewTransaction, Transaction};
