//! Month summary, notifications and budget progress.

use serde::Serialize;

use super::{
    CategorySpending, MonthPeriod, TransactionTotals, category_spending, percentage_of,
    transactions_in_month,
};
use crate::models::{Budget, BudgetId, NaiveDate, Transaction, TransactionType};

/// Savings rate, in percent, below which a warning is raised.
const LOW_SAVINGS_RATE: f64 = 10.0_f64;

/// Savings rate, in percent, at or above which the user is congratulated.
const GOOD_SAVINGS_RATE: f64 = 20.0_f64;

/// Number of leading month transactions checked for a spending burst.
const RECENT_TRANSACTIONS: usize = 3;

/// Share of monthly income above which recent transactions are flagged.
const RECENT_SPENDING_SHARE: f64 = 0.3_f64;

/// Budget usage, in percent, from which a budget is nearing its limit.
const NEAR_LIMIT_PERCENT: f64 = 75.0_f64;

/// Budget usage, in percent, from which a budget is critical.
const CRITICAL_PERCENT: f64 = 90.0_f64;

/// Headline figures for the reference month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    /// The month summarized.
    pub month: MonthPeriod,
    /// Number of transactions dated in the month.
    pub transaction_count: usize,
    /// Per-type sums.
    pub totals: TransactionTotals,
    /// `income - expenses - investments`.
    pub net: f64,
    /// Net as a percentage of income; zero without income.
    pub savings_rate: f64,
    /// Investments as a percentage of income; zero without income.
    pub investment_rate: f64,
    /// Largest expense category of the month, if any.
    pub top_expense_category: Option<CategorySpending>,
}

/// Summarizes the month containing `reference`.
#[inline]
#[must_use]
pub fn month_summary(transactions: &[Transaction], reference: NaiveDate) -> MonthSummary {
    let month = MonthPeriod::containing(reference);
    let mut transaction_count = 0_usize;
    let mut totals = TransactionTotals::default();
    for tx in transactions_in_month(transactions, month) {
        transaction_count += 1;
        totals.add(tx);
    }
    let net = totals.net();
    MonthSummary {
        month,
        transaction_count,
        totals,
        net,
        savings_rate: percentage_of(net, totals.income),
        investment_rate: percentage_of(totals.investments, totals.income),
        top_expense_category: category_spending(transactions, reference).into_iter().next(),
    }
}

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Neutral hint.
    Info,
    /// Something needs attention.
    Warning,
    /// Positive feedback.
    Success,
}

impl NotificationLevel {
    /// Lowercase name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
        }
    }
}

/// A short message about the state of the user's finances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl Notification {
    /// Creates a notification.
    fn new<T: Into<String>, M: Into<String>>(level: NotificationLevel, title: T, message: M) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Builds the notifications for the month containing `reference`.
///
/// `transactions` is expected newest first, the order the tracker's cache
/// returns them in. The spending-burst check looks at the first three
/// transactions of the month in input order. The result is never empty.
#[inline]
#[must_use]
pub fn notifications(transactions: &[Transaction], reference: NaiveDate) -> Vec<Notification> {
    let summary = month_summary(transactions, reference);
    let totals = summary.totals;
    let mut out = Vec::new();

    if transactions.is_empty() {
        out.push(Notification::new(
            NotificationLevel::Info,
            "Welcome to Finance Tracker!",
            "Start by adding your first transaction to see your financial insights.",
        ));
    } else if summary.net < 0.0_f64 {
        out.push(Notification::new(
            NotificationLevel::Warning,
            "Budget Alert",
            "Your expenses exceed your income this month. Consider reviewing your spending habits.",
        ));
    } else if summary.savings_rate < LOW_SAVINGS_RATE {
        out.push(Notification::new(
            NotificationLevel::Warning,
            "Low Savings Rate",
            format!(
                "Your savings rate is {:.1}%. Consider increasing your savings to build wealth.",
                summary.savings_rate
            ),
        ));
    } else if summary.savings_rate >= GOOD_SAVINGS_RATE {
        out.push(Notification::new(
            NotificationLevel::Success,
            "Great Job!",
            format!(
                "Excellent savings rate of {:.1}%. Keep up the good work!",
                summary.savings_rate
            ),
        ));
    }

    if totals.investments == 0.0_f64 && totals.income > 0.0_f64 {
        out.push(Notification::new(
            NotificationLevel::Info,
            "Investment Opportunity",
            "Consider setting aside some money for investments to grow your wealth over time.",
        ));
    }

    let recent_total: f64 = transactions_in_month(transactions, summary.month)
        .take(RECENT_TRANSACTIONS)
        .map(|tx| tx.amount)
        .sum();
    if summary.transaction_count > 0 && recent_total > totals.income * RECENT_SPENDING_SHARE {
        out.push(Notification::new(
            NotificationLevel::Warning,
            "High Recent Spending",
            "Your recent transactions are significant. Review if all expenses are necessary.",
        ));
    }

    if out.is_empty() {
        out.push(Notification::new(
            NotificationLevel::Success,
            "All Good!",
            "Your finances are looking healthy. Keep up the good work!",
        ));
    }
    out
}

/// How close a budget is to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Under 75% used.
    OnTrack,
    /// At least 75% used.
    NearLimit,
    /// At least 90% used.
    Critical,
    /// Spending is above the limit.
    Exceeded,
}

impl BudgetStatus {
    /// Classifies spending against a limit.
    #[inline]
    #[must_use]
    pub fn classify(spent: f64, limit: f64) -> Self {
        let percent = percentage_of(spent, limit);
        if spent > limit {
            Self::Exceeded
        } else if percent >= CRITICAL_PERCENT {
            Self::Critical
        } else if percent >= NEAR_LIMIT_PERCENT {
            Self::NearLimit
        } else {
            Self::OnTrack
        }
    }

    /// Human-readable label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OnTrack => "On track",
            Self::NearLimit => "Near limit",
            Self::Critical => "Critical",
            Self::Exceeded => "Over budget",
        }
    }
}

/// Spending against one budget in the reference month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    /// Budget the row belongs to.
    pub budget_id: BudgetId,
    /// Expense category.
    pub category: String,
    /// Monthly limit.
    pub limit: f64,
    /// Expenses recorded in the category this month.
    pub spent: f64,
    /// `limit - spent`; negative when over budget.
    pub remaining: f64,
    /// `spent` as a percentage of `limit`.
    pub percent_used: f64,
    /// Classification of `percent_used`.
    pub status: BudgetStatus,
}

/// Computes month-to-date spending for every budget, in budget order.
#[inline]
#[must_use]
pub fn budget_progress(
    budgets: &[Budget],
    transactions: &[Transaction],
    reference: NaiveDate,
) -> Vec<BudgetProgress> {
    let month = MonthPeriod::containing(reference);
    budgets
        .iter()
        .map(|budget| {
            let spent: f64 = transactions_in_month(transactions, month)
                .filter(|tx| tx.kind == TransactionType::Expense && tx.category == budget.category)
                .map(|tx| tx.amount)
                .sum();
            BudgetProgress {
                budget_id: budget.id.clone(),
                category: budget.category.clone(),
                limit: budget.monthly_limit,
                spent,
                remaining: budget.monthly_limit - spent,
                percent_used: percentage_of(spent, budget.monthly_limit),
                status: BudgetStatus::classify(spent, budget.monthly_limit),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::analytics::test_support::{tx, ymd};
    use crate::models::UserId;

    /// Titles of the notifications, in order.
    fn titles(notifications: &[Notification]) -> Vec<&str> {
        notifications.iter().map(|n| n.title.as_str()).collect()
    }

    /// Creates a budget row.
    fn budget(id: &str, category: &str, limit: f64) -> Budget {
        Budget {
            id: BudgetId::new(id.to_owned()),
            user_id: UserId::new("user-1".to_owned()),
            category: category.to_owned(),
            monthly_limit: limit,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn summary_rates_and_top_category() {
        let reference = ymd(2024, 6, 15);
        let txs = vec![
            tx(TransactionType::Income, "Salary", 4000.0, ymd(2024, 6, 1)),
            tx(TransactionType::Expense, "Housing", 1500.0, ymd(2024, 6, 2)),
            tx(TransactionType::Expense, "Food", 500.0, ymd(2024, 6, 3)),
            tx(TransactionType::Investment, "Stocks", 400.0, ymd(2024, 6, 4)),
            tx(TransactionType::Income, "Salary", 9999.0, ymd(2024, 5, 1)),
        ];
        let summary = month_summary(&txs, reference);
        assert_eq!(summary.transaction_count, 4);
        assert!((summary.net - 1600.0).abs() < f64::EPSILON);
        assert!((summary.savings_rate - 40.0).abs() < 1e-9);
        assert!((summary.investment_rate - 10.0).abs() < 1e-9);
        assert_eq!(summary.top_expense_category.unwrap().category, "Housing");
    }

    #[test]
    fn summary_without_income_has_zero_rates() {
        let reference = ymd(2024, 6, 15);
        let txs = vec![tx(TransactionType::Expense, "Food", 50.0, ymd(2024, 6, 2))];
        let summary = month_summary(&txs, reference);
        assert_eq!(summary.savings_rate, 0.0);
        assert_eq!(summary.investment_rate, 0.0);
    }

    #[test]
    fn welcome_when_there_are_no_transactions() {
        let result = notifications(&[], ymd(2024, 6, 1));
        assert_eq!(titles(&result), vec!["Welcome to Finance Tracker!"]);
        assert_eq!(result[0].level, NotificationLevel::Info);
    }

    #[test]
    fn negative_net_raises_budget_alert() {
        let reference = ymd(2024, 6, 15);
        let txs = vec![
            tx(TransactionType::Expense, "Housing", 100.0, ymd(2024, 6, 12)),
            tx(TransactionType::Expense, "Food", 50.0, ymd(2024, 6, 11)),
            tx(TransactionType::Income, "Salary", 1000.0, ymd(2024, 6, 10)),
            tx(TransactionType::Expense, "Travel", 2000.0, ymd(2024, 6, 9)),
        ];
        let result = notifications(&txs, reference);
        // recent: 100 + 50 + 1000 = 1150 > 300
        assert_eq!(
            titles(&result),
            vec!["Budget Alert", "Investment Opportunity", "High Recent Spending"]
        );
    }

    #[test]
    fn low_savings_rate_warning() {
        let reference = ymd(2024, 6, 15);
        let txs = vec![
            tx(TransactionType::Expense, "Housing", 950.0, ymd(2024, 6, 3)),
            tx(TransactionType::Investment, "Bonds", 10.0, ymd(2024, 6, 2)),
            tx(TransactionType::Income, "Salary", 1000.0, ymd(2024, 6, 1)),
        ];
        let result = notifications(&txs, reference);
        assert_eq!(result[0].title, "Low Savings Rate");
        assert!(result[0].message.contains("4.0%"));
    }

    #[test]
    fn middle_savings_rate_with_quiet_month_is_all_good() {
        let reference = ymd(2024, 6, 15);
        let txs = vec![
            tx(TransactionType::Expense, "Food", 10.0, ymd(2024, 6, 5)),
            tx(TransactionType::Investment, "Bonds", 10.0, ymd(2024, 6, 4)),
            tx(TransactionType::Expense, "Housing", 820.0, ymd(2024, 6, 3)),
            tx(TransactionType::Income, "Salary", 1000.0, ymd(2024, 6, 1)),
        ];
        // savings 16%, recent 840 > 300 though
        let result = notifications(&txs, reference);
        assert_eq!(titles(&result), vec!["High Recent Spending"]);

        let quiet = vec![
            tx(TransactionType::Expense, "Food", 10.0, ymd(2024, 6, 5)),
            tx(TransactionType::Investment, "Bonds", 10.0, ymd(2024, 6, 4)),
            tx(TransactionType::Expense, "Food", 10.0, ymd(2024, 6, 3)),
            tx(TransactionType::Expense, "Housing", 810.0, ymd(2024, 6, 2)),
            tx(TransactionType::Income, "Salary", 1000.0, ymd(2024, 6, 1)),
        ];
        let result = notifications(&quiet, reference);
        assert_eq!(titles(&result), vec!["All Good!"]);
        assert_eq!(result[0].level, NotificationLevel::Success);
    }

    #[test]
    fn great_savings_rate_is_praised() {
        let reference = ymd(2024, 6, 15);
        let txs = vec![
            tx(TransactionType::Expense, "Food", 100.0, ymd(2024, 6, 3)),
            tx(TransactionType::Investment, "Stocks", 100.0, ymd(2024, 6, 2)),
            tx(TransactionType::Income, "Salary", 5000.0, ymd(2024, 6, 1)),
        ];
        let result = notifications(&txs, reference);
        assert_eq!(titles(&result), vec!["Great Job!", "High Recent Spending"]);
        assert!(result[0].message.contains("96.0%"));
    }

    #[test]
    fn old_transactions_only_still_skip_welcome() {
        let reference = ymd(2024, 6, 15);
        let txs = vec![tx(TransactionType::Income, "Salary", 100.0, ymd(2023, 1, 1))];
        // empty month: savings rate 0 < 10
        let result = notifications(&txs, reference);
        assert_eq!(titles(&result), vec!["Low Savings Rate"]);
    }

    #[test]
    fn budget_status_thresholds() {
        assert_eq!(BudgetStatus::classify(0.0, 100.0), BudgetStatus::OnTrack);
        assert_eq!(BudgetStatus::classify(74.9, 100.0), BudgetStatus::OnTrack);
        assert_eq!(BudgetStatus::classify(75.0, 100.0), BudgetStatus::NearLimit);
        assert_eq!(BudgetStatus::classify(90.0, 100.0), BudgetStatus::Critical);
        assert_eq!(BudgetStatus::classify(100.0, 100.0), BudgetStatus::Critical);
        assert_eq!(BudgetStatus::classify(100.01, 100.0), BudgetStatus::Exceeded);
    }

    #[test]
    fn budget_progress_counts_month_expenses_in_category() {
        let reference = ymd(2024, 6, 15);
        let budgets = vec![budget("b-1", "Food", 400.0), budget("b-2", "Travel", 100.0)];
        let txs = vec![
            tx(TransactionType::Expense, "Food", 150.0, ymd(2024, 6, 1)),
            tx(TransactionType::Expense, "Food", 160.0, ymd(2024, 6, 20)),
            tx(TransactionType::Expense, "Food", 1000.0, ymd(2024, 5, 31)),
            tx(TransactionType::Income, "Food", 1000.0, ymd(2024, 6, 2)),
            tx(TransactionType::Expense, "Travel", 120.0, ymd(2024, 6, 3)),
        ];
        let progress = budget_progress(&budgets, &txs, reference);
        assert_eq!(progress.len(), 2);
        assert!((progress[0].spent - 310.0).abs() < f64::EPSILON);
        assert!((progress[0].remaining - 90.0).abs() < f64::EPSILON);
        assert_eq!(progress[0].status, BudgetStatus::NearLimit);
        assert_eq!(progress[1].status, BudgetStatus::Exceeded);
        assert!(progress[1].remaining < 0.0);
    }
}
