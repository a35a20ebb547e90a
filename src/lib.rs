//! Personal finance tracker.
//!
//! Records income, expense and investment transactions in a hosted
//! PostgREST-style backend, keeps a local cache of them, and derives
//! monthly statistics, per-category spending, budget progress and a
//! next-month forecast.
//!
//! The crate is layered:
//!
//! - [`analytics`]: pure functions over transaction slices. Every calendar
//!   window is computed from an explicit reference date.
//! - `client`: async and blocking HTTP clients for the backend.
//! - [`storage`]: the local cache (in-memory or JSON files).
//! - `tracker`: the client and a cache combined, with analytics served
//!   from the cache.
//!
//! ```
//! use finance_tracker::analytics::forecast_from_aggregates;
//!
//! let empty = forecast_from_aggregates(&[]);
//! assert_eq!(empty.predicted_net, 0);
//! ```

pub mod analytics;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
pub mod error;
pub mod models;
pub mod storage;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod tracker;
