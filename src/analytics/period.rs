//! Calendar month arithmetic.

use chrono::{Datelike as _, Days, Months, NaiveDate};
use serde::{Serialize, Serializer};

/// A calendar month, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthPeriod {
    /// First day of the month.
    first_day: NaiveDate,
}

impl MonthPeriod {
    /// Returns the month containing `date`.
    #[inline]
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    /// Returns the given month, or `None` if `month` is not in `1..=12`
    /// or the year is out of range.
    #[inline]
    #[must_use]
    pub fn from_ymd(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// Returns the month `count` months before this one.
    ///
    /// Saturates at the earliest representable month.
    #[inline]
    #[must_use]
    pub fn months_back(self, count: u32) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_sub_months(Months::new(count))
                .unwrap_or(NaiveDate::MIN),
        }
    }

    /// Returns `count` consecutive months ending with the month of
    /// `reference`, oldest first.
    ///
    /// The window never reaches before the earliest representable month, so
    /// it holds fewer than `count` months when `reference` is that close to
    /// [`NaiveDate::MIN`].
    #[inline]
    #[must_use]
    pub fn trailing(reference: NaiveDate, count: u32) -> Vec<Self> {
        let current = Self::containing(reference);
        let available = current.months_since_earliest();
        (0..count.min(available))
            .rev()
            .map(|offset| current.months_back(offset))
            .collect()
    }

    /// Number of months from the earliest representable month up to and
    /// including this one.
    fn months_since_earliest(self) -> u32 {
        let earliest = Self::containing(NaiveDate::MIN);
        let years = i64::from(self.year()) - i64::from(earliest.year());
        let months = i64::from(self.month()) - i64::from(earliest.month());
        u32::try_from(years * 12 + months + 1).unwrap_or(u32::MAX)
    }

    /// First day of the month (inclusive lower bound).
    #[inline]
    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.first_day
    }

    /// Last day of the month (inclusive upper bound).
    #[inline]
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next_month| next_month.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Returns `true` if `date` lies within `[first_day, last_day]`.
    #[inline]
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        self.first_day <= date && date <= self.last_day()
    }

    /// Calendar year.
    #[inline]
    #[must_use]
    pub fn year(self) -> i32 {
        self.first_day.year()
    }

    /// Calendar month number (1-12).
    #[inline]
    #[must_use]
    pub fn month(self) -> u32 {
        self.first_day.month()
    }
}

/// Formats as a short label such as `Jan 2024`.
impl core::fmt::Display for MonthPeriod {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.first_day.format("%b %Y"))
    }
}

/// Serializes as `YYYY-MM`.
impl Serialize for MonthPeriod {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.first_day.format("%Y-%m"))
    }
}
