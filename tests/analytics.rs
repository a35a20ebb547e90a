//! Behavioral tests for the analytics functions through the public API.

use chrono::DateTime;
use finance_tracker::analytics::{
    BudgetStatus, MonthPeriod, budget_progress, category_spending, forecast, monthly_aggregates,
    month_summary, notifications,
};
use finance_tracker::models::{
    Budget, BudgetId, NaiveDate, NewBudget, NewTransaction, Transaction, TransactionId,
    TransactionType, UserId,
};

/// Shorthand for a calendar date.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Builds a stored transaction; `seq` keeps ids unique.
fn tx(seq: u32, kind: TransactionType, category: &str, amount: f64, date: NaiveDate) -> Transaction {
    Transaction {
        id: TransactionId::new(format!("t-{seq}")),
        user_id: UserId::new("user-1".to_owned()),
        kind,
        category: category.to_owned(),
        amount,
        description: String::new(),
        date,
        created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    }
}

/// Builds a budget row.
fn budget(id: &str, category: &str, limit: f64) -> Budget {
    Budget {
        id: BudgetId::new(id.to_owned()),
        user_id: UserId::new("user-1".to_owned()),
        category: category.to_owned(),
        monthly_limit: limit,
        created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    }
}

/// Two years of mixed rows with uneven amounts.
fn ledger() -> Vec<Transaction> {
    let mut rows = Vec::new();
    let mut seq = 0_u32;
    for year in [2023, 2024] {
        for month in 1..=12_u32 {
            let base = f64::from(month) * 10.0;
            for (kind, category, amount, day) in [
                (TransactionType::Income, "Salary", 3000.0 + base, 1),
                (TransactionType::Expense, "Rent", 1200.0, 2),
                (TransactionType::Expense, "Food", 150.0 + base, 10),
                (TransactionType::Expense, "Travel", base * 3.0, 20),
                (TransactionType::Investment, "ETF", 200.0, 28),
            ] {
                seq += 1;
                rows.push(tx(seq, kind, category, amount, ymd(year, month, day)));
            }
        }
    }
    rows
}

#[test]
fn window_spans_year_boundary() {
    let months = monthly_aggregates(&ledger(), 4, ymd(2024, 2, 10));
    let periods: Vec<MonthPeriod> = months.iter().map(|month| month.month).collect();
    assert_eq!(
        periods,
        vec![
            MonthPeriod::from_ymd(2023, 11).unwrap(),
            MonthPeriod::from_ymd(2023, 12).unwrap(),
            MonthPeriod::from_ymd(2024, 1).unwrap(),
            MonthPeriod::from_ymd(2024, 2).unwrap(),
        ]
    );
}

#[test]
fn aggregate_sums_match_month_rows() {
    let rows = ledger();
    for month in monthly_aggregates(&rows, 12, ymd(2024, 12, 31)) {
        let in_month: Vec<&Transaction> =
            rows.iter().filter(|row| month.month.contains(row.date)).collect();
        let sum = |kind: TransactionType| -> f64 {
            in_month
                .iter()
                .filter(|row| row.kind == kind)
                .map(|row| row.amount)
                .sum()
        };
        assert!((month.income - sum(TransactionType::Income)).abs() < 1e-9);
        assert!((month.expenses - sum(TransactionType::Expense)).abs() < 1e-9);
        assert!((month.investments - sum(TransactionType::Investment)).abs() < 1e-9);
        assert!((month.net - (month.income - month.expenses - month.investments)).abs() < 1e-9);
    }
}

#[test]
fn category_shares_sum_to_hundred_and_descend() {
    let spending = category_spending(&ledger(), ymd(2024, 7, 15));
    let categories: Vec<&str> = spending.iter().map(|row| row.category.as_str()).collect();
    assert_eq!(categories, vec!["Rent", "Food", "Travel"]);
    let total: f64 = spending.iter().map(|row| row.percentage).sum();
    assert!((total - 100.0).abs() < 1e-9);
    let amounts: Vec<f64> = spending.iter().map(|row| row.amount).collect();
    assert!(amounts.windows(2).all(|pair| pair.first() >= pair.get(1)));
}

#[test]
fn reference_outside_data_gives_empty_results() {
    let reference = ymd(2030, 1, 1);
    assert!(category_spending(&ledger(), reference).is_empty());
    let months = monthly_aggregates(&ledger(), 3, reference);
    assert!(
        months
            .iter()
            .all(|month| month.income.abs() < f64::EPSILON && month.expenses.abs() < f64::EPSILON)
    );
    assert_eq!(forecast(&ledger(), reference).confidence, 0);
}

#[test]
fn steady_history_forecasts_exactly() {
    let mut rows = Vec::new();
    for month in 1..=6_u32 {
        rows.push(tx(month * 2, TransactionType::Income, "Salary", 5000.0, ymd(2024, month, 1)));
        rows.push(tx(month * 2 + 1, TransactionType::Expense, "Rent", 2000.0, ymd(2024, month, 3)));
    }
    let result = forecast(&rows, ymd(2024, 6, 30));
    assert_eq!(result.predicted_income, 5000);
    assert_eq!(result.predicted_expenses, 2000);
    assert_eq!(result.predicted_net, 3000);
    assert_eq!(result.confidence, 100);
}

#[test]
fn volatile_history_lowers_confidence() {
    let mut rows = Vec::new();
    for month in 1..=6_u32 {
        let income = if month % 2 == 0 { 8000.0 } else { 1000.0 };
        rows.push(tx(month, TransactionType::Income, "Freelance", income, ymd(2024, month, 5)));
    }
    let result = forecast(&rows, ymd(2024, 6, 30));
    assert!(result.confidence < 100);
}

#[test]
fn results_are_deterministic() {
    let rows = ledger();
    let reference = ymd(2024, 5, 5);
    assert_eq!(forecast(&rows, reference), forecast(&rows, reference));
    assert_eq!(
        category_spending(&rows, reference),
        category_spending(&rows, reference)
    );
    assert_eq!(month_summary(&rows, reference), month_summary(&rows, reference));
}

#[test]
fn budget_status_thresholds() {
    assert_eq!(BudgetStatus::classify(74.0, 100.0), BudgetStatus::OnTrack);
    assert_eq!(BudgetStatus::classify(75.0, 100.0), BudgetStatus::NearLimit);
    assert_eq!(BudgetStatus::classify(90.0, 100.0), BudgetStatus::Critical);
    assert_eq!(BudgetStatus::classify(100.0, 100.0), BudgetStatus::Critical);
    assert_eq!(BudgetStatus::classify(100.5, 100.0), BudgetStatus::Exceeded);
}

#[test]
fn budget_progress_counts_only_matching_expenses() {
    let rows = ledger();
    let progress = budget_progress(
        &[budget("b-food", "Food", 400.0), budget("b-gym", "Gym", 50.0)],
        &rows,
        ymd(2024, 3, 31),
    );
    assert_eq!(progress.len(), 2);
    assert!((progress[0].spent - 180.0).abs() < 1e-9);
    assert_eq!(progress[0].status, BudgetStatus::OnTrack);
    assert!(progress[1].spent.abs() < f64::EPSILON);
}

#[test]
fn empty_ledger_gets_welcome_notification() {
    let notes = notifications(&[], ymd(2024, 1, 1));
    assert_eq!(notes[0].title, "Welcome to Finance Tracker!");
}

#[test]
fn validation_rejects_bad_amounts() {
    let mut payload = NewTransaction {
        kind: TransactionType::Expense,
        category: "Food".to_owned(),
        amount: -0.01,
        description: String::new(),
        date: ymd(2024, 1, 1),
    };
    assert!(payload.validate().is_err());
    payload.amount = f64::NAN;
    assert!(payload.validate().is_err());
    payload.amount = 0.0;
    assert!(payload.validate().is_ok());

    let limit = NewBudget {
        category: "Food".to_owned(),
        monthly_limit: f64::INFINITY,
    };
    assert!(limit.validate().is_err());
}
