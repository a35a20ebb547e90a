//! Next-month income and expense projection.

use serde::Serialize;

use super::{MonthlyAggregate, monthly_aggregates};
use crate::models::{NaiveDate, Transaction};

/// Number of trailing months the forecast looks at.
pub const FORECAST_WINDOW_MONTHS: u32 = 6;

/// Number of most recent months in the short-term average.
const RECENT_MONTHS: usize = 3;

/// Minimum aggregate count below which the forecast is all zeros.
///
/// With a fixed six-month window this never triggers.
const MIN_FORECAST_MONTHS: usize = 3;

/// Weight of the short-term average in the prediction.
const RECENT_WEIGHT: f64 = 0.7_f64;

/// Weight of the full-window average in the prediction.
const LONG_RUN_WEIGHT: f64 = 0.3_f64;

/// Projected totals for the month after the reference month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ForecastResult {
    /// Predicted income, rounded to a whole unit.
    pub predicted_income: i64,
    /// Predicted expenses, rounded to a whole unit.
    pub predicted_expenses: i64,
    /// Predicted income minus predicted expenses, rounded after subtracting.
    pub predicted_net: i64,
    /// How steady the history is, from 0 to 100.
    pub confidence: u8,
}

/// Forecasts next month's income and expenses from the six months ending
/// with the month of `reference`.
///
/// Each prediction is `0.7 * recent + 0.3 * overall`, where `recent` is the
/// mean of the last three months and `overall` the mean of all six.
/// Confidence falls as the month-to-month spread grows relative to the
/// mean; a series with a non-positive mean contributes zero.
///
/// Investments are not forecast.
#[inline]
#[must_use]
pub fn forecast(transactions: &[Transaction], reference: NaiveDate) -> ForecastResult {
    forecast_from_aggregates(&monthly_aggregates(
        transactions,
        FORECAST_WINDOW_MONTHS,
        reference,
    ))
}

/// Forecasts from precomputed monthly aggregates, ordered oldest first.
///
/// Returns an all-zero result when fewer than three aggregates are given.
#[inline]
#[must_use]
pub fn forecast_from_aggregates(months: &[MonthlyAggregate]) -> ForecastResult {
    if months.len() < MIN_FORECAST_MONTHS {
        return ForecastResult::default();
    }

    let incomes: Vec<f64> = months.iter().map(|month| month.income).collect();
    let expenses: Vec<f64> = months.iter().map(|month| month.expenses).collect();

    let predicted_income = weighted_prediction(&incomes);
    let predicted_expenses = weighted_prediction(&expenses);
    let confidence =
        (series_confidence(&incomes) + series_confidence(&expenses)) / 2.0_f64 * 100.0_f64;

    tracing::trace!(predicted_income, predicted_expenses, confidence, "forecast computed");

    ForecastResult {
        predicted_income: round_half_up(predicted_income),
        predicted_expenses: round_half_up(predicted_expenses),
        predicted_net: round_half_up(predicted_income - predicted_expenses),
        confidence: to_percent(confidence),
    }
}

/// Blends the recent mean with the full-series mean.
fn weighted_prediction(values: &[f64]) -> f64 {
    let recent = values
        .get(values.len().saturating_sub(RECENT_MONTHS)..)
        .unwrap_or_default();
    mean(recent) * RECENT_WEIGHT + mean(values) * LONG_RUN_WEIGHT
}

/// Arithmetic mean; zero for an empty slice.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0_f64;
    }
    #[allow(
        clippy::cast_precision_loss,
        reason = "series length is a handful of months"
    )]
    let len = values.len() as f64;
    values.iter().sum::<f64>() / len
}

/// `max(0, 1 - sd / mean)` using the population standard deviation, or zero
/// when the mean is not positive.
fn series_confidence(values: &[f64]) -> f64 {
    let avg = mean(values);
    if avg <= 0.0_f64 {
        return 0.0_f64;
    }
    let variance = mean(
        &values
            .iter()
            .map(|value| (value - avg).powi(2))
            .collect::<Vec<_>>(),
    );
    (1.0_f64 - variance.sqrt() / avg).max(0.0_f64)
}

/// Rounds to the nearest integer, with halves going toward positive
/// infinity (`-2.5` becomes `-2`).
#[allow(
    clippy::cast_possible_truncation,
    reason = "float-to-int `as` saturates and money totals fit in i64"
)]
fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    if value - floor >= 0.5_f64 {
        (floor + 1.0_f64) as i64
    } else {
        floor as i64
    }
}

/// Rounds a `0..=100` score to a whole percentage.
fn to_percent(score: f64) -> u8 {
    u8::try_from(round_half_up(score.clamp(0.0_f64, 100.0_f64))).unwrap_or(u8::MAX)
}
