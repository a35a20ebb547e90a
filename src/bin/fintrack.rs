//! Command-line front end for the finance tracker.
#![allow(
    clippy::exit,
    reason = "CLI binary uses process::exit for fatal errors"
)]

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, Table};
use finance_tracker::analytics::{
    BudgetProgress, BudgetStatus, CategorySpending, FORECAST_WINDOW_MONTHS, ForecastResult,
    MonthSummary, MonthlyAggregate, Notification, NotificationLevel,
};
use finance_tracker::models::{
    BudgetId, BudgetUpdate, NaiveDate, NewBudget, NewTransaction, Transaction, TransactionId,
    TransactionType,
};
use finance_tracker::storage::{BlockingStorage, FileStorage};
use finance_tracker::tracker::{FinanceTrackerBlocking, RefreshSummary, TransactionFilter};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use secrecy::SecretString;

/// Environment variable holding the backend base URL.
const URL_ENV: &str = "FINTRACK_URL";
/// Environment variable holding the project API key.
const API_KEY_ENV: &str = "FINTRACK_API_KEY";
/// Environment variable holding the sign-in email.
const EMAIL_ENV: &str = "FINTRACK_EMAIL";
/// Environment variable holding the sign-in password.
const PASSWORD_ENV: &str = "FINTRACK_PASSWORD";

/// Column headers of the CSV export.
const EXPORT_HEADERS: [&str; 5] = ["Date", "Type", "Category", "Amount", "Description"];

/// Longest window the `trends` subcommand accepts.
const MAX_TREND_MONTHS: i64 = 1200;

/// Personal finance tracker: record transactions, track budgets and
/// forecast next month.
#[derive(Debug, Parser)]
#[command(name = "fintrack", version, about)]
struct Cli {
    /// Override the cache directory (default: XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Treat this date as today (YYYY-MM-DD).
    #[arg(long, global = true, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and reload transactions and budgets from the backend.
    Refresh,
    /// List cached transactions, optionally filtered.
    Transactions(TransactionArgs),
    /// Record a new transaction.
    Add(AddArgs),
    /// Delete a transaction by ID.
    Delete {
        /// Transaction ID.
        id: String,
    },
    /// Show this month's headline numbers.
    Summary,
    /// Show this month's expenses by category.
    Categories,
    /// Show per-month totals for recent months.
    Trends {
        /// Number of months to show, ending with the current one.
        #[arg(
            long,
            default_value_t = FORECAST_WINDOW_MONTHS,
            value_parser = clap::value_parser!(u32).range(1..=MAX_TREND_MONTHS)
        )]
        months: u32,
    },
    /// Project next month's income and expenses.
    Forecast,
    /// Show spending against every budget this month.
    Budgets,
    /// Create a monthly budget for a category.
    BudgetAdd {
        /// Expense category.
        category: String,
        /// Monthly limit.
        limit: f64,
    },
    /// Change an existing budget.
    BudgetSet {
        /// Budget ID.
        id: String,
        /// New category.
        #[arg(long)]
        category: Option<String>,
        /// New monthly limit.
        #[arg(long)]
        limit: Option<f64>,
    },
    /// Show notifications about this month.
    Notifications,
    /// Write every cached transaction to a CSV file.
    Export {
        /// Output file (default: finance-data-<date>.csv).
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Add a set of sample transactions to the account.
    Seed,
    /// List suggested categories for a transaction type.
    SuggestCategories {
        /// Transaction type (income, expense or investment).
        #[arg(value_parser = parse_kind)]
        kind: TransactionType,
    },
}

/// Arguments for the `transactions` subcommand.
#[derive(Debug, Args)]
struct TransactionArgs {
    /// Start date (inclusive, YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// End date (inclusive, YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
    /// Transaction type (income, expense or investment).
    #[arg(long = "type", value_parser = parse_kind)]
    kind: Option<TransactionType>,
    /// Category (case-insensitive).
    #[arg(long)]
    category: Option<String>,
    /// Description substring (case-insensitive).
    #[arg(long)]
    search: Option<String>,
    /// Minimum amount.
    #[arg(long)]
    min_amount: Option<f64>,
    /// Maximum amount.
    #[arg(long)]
    max_amount: Option<f64>,
}

/// Arguments for the `add` subcommand.
#[derive(Debug, Args)]
struct AddArgs {
    /// Transaction type (income, expense or investment).
    #[arg(value_parser = parse_kind)]
    kind: TransactionType,
    /// Amount.
    amount: f64,
    /// Category.
    category: String,
    /// Free-text description.
    #[arg(long, default_value = "")]
    description: String,
    /// Transaction date (YYYY-MM-DD, default: today).
    #[arg(long, value_parser = parse_date)]
    on: Option<NaiveDate>,
}

/// Backend connection settings read from the environment.
#[derive(Debug)]
struct Config {
    /// Backend base URL.
    url: String,
    /// Project API key.
    api_key: String,
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Parses a transaction type for clap.
fn parse_kind(s: &str) -> Result<TransactionType, String> {
    s.parse().map_err(|err| format!("{err}"))
}

/// Reads a non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|val| !val.is_empty())
}

/// Prints a missing-variable error with a `.env` hint.
fn report_missing_env(name: &str) -> io::Result<()> {
    let mut err = io::stderr().lock();
    writeln!(
        err,
        "{} {} environment variable is not set",
        "error:".red().bold(),
        name.bold()
    )?;
    writeln!(
        err,
        "  {} add {}=<value> to a .env file",
        "hint:".cyan(),
        name
    )
}

/// Reads the backend settings from the environment.
fn read_config() -> io::Result<Option<Config>> {
    let Some(url) = env_var(URL_ENV) else {
        report_missing_env(URL_ENV)?;
        return Ok(None);
    };
    let Some(api_key) = env_var(API_KEY_ENV) else {
        report_missing_env(API_KEY_ENV)?;
        return Ok(None);
    };
    Ok(Some(Config { url, api_key }))
}

/// Prints an error line to stderr.
fn report_error(context: &str, err: &dyn core::fmt::Display) -> io::Result<()> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let today = cli.date.unwrap_or_else(|| chrono::Local::now().date_naive());

    if let Command::SuggestCategories { kind } = cli.command {
        print_suggestions(kind)?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(config) = read_config()? else {
        return Ok(ExitCode::FAILURE);
    };

    let storage = match create_storage(cli.data_dir) {
        Ok(storage) => storage,
        Err(err) => {
            report_error("failed to initialize storage", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut tracker = match FinanceTrackerBlocking::builder()
        .base_url(config.url)
        .api_key(config.api_key)
        .storage(storage)
        .build()
    {
        Ok(tracker) => tracker,
        Err(err) => {
            report_error("failed to build client", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    dispatch(&mut tracker, cli.command, today)
}

/// Creates the storage backend, using `data_dir` if provided or the
/// default XDG data directory otherwise.
fn create_storage(data_dir: Option<PathBuf>) -> finance_tracker::error::Result<FileStorage> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    FileStorage::new(dir)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: BlockingStorage>(
    tracker: &mut FinanceTrackerBlocking<S>,
    command: Command,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    match command {
        Command::Refresh => {
            if !sign_in(tracker)? {
                return Ok(ExitCode::FAILURE);
            }
            cmd_refresh(tracker)
        }
        Command::Transactions(args) => cmd_transactions(tracker, &args),
        Command::Add(args) => {
            if !sign_in(tracker)? {
                return Ok(ExitCode::FAILURE);
            }
            cmd_add(tracker, args, today)
        }
        Command::Delete { id } => {
            if !sign_in(tracker)? {
                return Ok(ExitCode::FAILURE);
            }
            cmd_delete(tracker, TransactionId::new(id))
        }
        Command::Summary => cmd_summary(tracker, today),
        Command::Categories => cmd_categories(tracker, today),
        Command::Trends { months } => cmd_trends(tracker, months, today),
        Command::Forecast => cmd_forecast(tracker, today),
        Command::Budgets => cmd_budgets(tracker, today),
        Command::BudgetAdd { category, limit } => {
            if !sign_in(tracker)? {
                return Ok(ExitCode::FAILURE);
            }
            cmd_budget_add(tracker, NewBudget {
                category,
                monthly_limit: limit,
            })
        }
        Command::BudgetSet {
            id,
            category,
            limit,
        } => {
            let mut update = BudgetUpdate::new();
            if let Some(name) = category {
                update = update.category(name);
            }
            if let Some(value) = limit {
                update = update.monthly_limit(value);
            }
            if update.is_empty() {
                report_error("budget-set", &"pass --category and/or --limit")?;
                return Ok(ExitCode::FAILURE);
            }
            if !sign_in(tracker)? {
                return Ok(ExitCode::FAILURE);
            }
            cmd_budget_set(tracker, &BudgetId::new(id), &update)
        }
        Command::Notifications => cmd_notifications(tracker, today),
        Command::Export { output } => cmd_export(tracker, output, today),
        Command::Seed => {
            if !sign_in(tracker)? {
                return Ok(ExitCode::FAILURE);
            }
            cmd_seed(tracker, today)
        }
        Command::SuggestCategories { kind } => {
            print_suggestions(kind)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Signs in with the credentials from the environment.
///
/// Returns `Ok(false)` after printing the reason when signing in failed.
fn sign_in<S: BlockingStorage>(tracker: &mut FinanceTrackerBlocking<S>) -> io::Result<bool> {
    let Some(email) = env_var(EMAIL_ENV) else {
        report_missing_env(EMAIL_ENV)?;
        return Ok(false);
    };
    let Some(password) = env_var(PASSWORD_ENV).map(SecretString::from) else {
        report_missing_env(PASSWORD_ENV)?;
        return Ok(false);
    };

    let spinner = make_spinner("Signing in...");
    let result = tracker.sign_in(&email, &password);
    spinner.finish_and_clear();
    match result {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "signed in");
            Ok(true)
        }
        Err(err) => {
            report_error("sign-in failed", &err)?;
            Ok(false)
        }
    }
}

/// Executes the `refresh` subcommand.
fn cmd_refresh<S: BlockingStorage>(tracker: &FinanceTrackerBlocking<S>) -> io::Result<ExitCode> {
    let spinner = make_spinner("Loading transactions and budgets...");
    let result = tracker.refresh();
    spinner.finish_and_clear();
    match result {
        Ok(summary) => {
            print_refresh_summary(summary)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("refresh failed", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Builds a [`TransactionFilter`] from CLI arguments.
fn build_transaction_filter(args: &TransactionArgs) -> TransactionFilter {
    let mut filter = TransactionFilter::new();
    if let Some(from) = args.from {
        filter = filter.since(from);
    }
    if let Some(to) = args.to {
        filter = filter.until(to);
    }
    if let Some(kind) = args.kind {
        filter = filter.kind(kind);
    }
    if let Some(category) = args.category.as_deref() {
        filter = filter.category(category);
    }
    if let Some(text) = args.search.as_deref() {
        filter = filter.description(text);
    }
    filter.min_amount = args.min_amount;
    filter.max_amount = args.max_amount;
    filter
}

/// Executes the `transactions` subcommand.
fn cmd_transactions<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    args: &TransactionArgs,
) -> io::Result<ExitCode> {
    match tracker.filter_transactions(&build_transaction_filter(args)) {
        Ok(rows) => {
            print_transactions_table(&rows)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to read transactions", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `add` subcommand.
fn cmd_add<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    args: AddArgs,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    let payload = NewTransaction {
        kind: args.kind,
        category: args.category,
        amount: args.amount,
        description: args.description,
        date: args.on.unwrap_or(today),
    };
    let spinner = make_spinner("Saving transaction...");
    let result = tracker.add_transaction(&payload);
    spinner.finish_and_clear();
    match result {
        Ok(created) => {
            writeln!(
                io::stdout().lock(),
                "{} {} {:.2} in {} on {} {}",
                "Added".green().bold(),
                created.kind.label(),
                created.amount,
                created.category.bold(),
                created.date,
                format_args!("(id {})", created.id).dimmed()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to add transaction", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `delete` subcommand.
fn cmd_delete<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    id: TransactionId,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Deleting transaction...");
    let result = tracker.delete_transaction(&id);
    spinner.finish_and_clear();
    match result {
        Ok(()) => {
            writeln!(io::stdout().lock(), "{} {id}", "Deleted".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to delete transaction", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `summary` subcommand.
fn cmd_summary<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    match tracker.month_summary(today) {
        Ok(summary) => {
            print_summary(&summary)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to read transactions", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `categories` subcommand.
fn cmd_categories<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    match tracker.category_spending(today) {
        Ok(rows) => {
            print_categories_table(&rows)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to read transactions", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `trends` subcommand.
fn cmd_trends<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    months: u32,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    match tracker.monthly_aggregates(months, today) {
        Ok(rows) => {
            print_trends_table(&rows)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to read transactions", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `forecast` subcommand.
fn cmd_forecast<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    match tracker.forecast(today) {
        Ok(result) => {
            print_forecast(&result)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to read transactions", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `budgets` subcommand.
fn cmd_budgets<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    match tracker.budget_progress(today) {
        Ok(rows) => {
            print_budgets_table(&rows)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to read budgets", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `budget-add` subcommand.
fn cmd_budget_add<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    budget: NewBudget,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Saving budget...");
    let result = tracker.add_budget(&budget);
    spinner.finish_and_clear();
    match result {
        Ok(created) => {
            writeln!(
                io::stdout().lock(),
                "{} {} at {:.2} per month {}",
                "Budget added:".green().bold(),
                created.category.bold(),
                created.monthly_limit,
                format_args!("(id {})", created.id).dimmed()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to add budget", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `budget-set` subcommand.
fn cmd_budget_set<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    id: &BudgetId,
    update: &BudgetUpdate,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Updating budget...");
    let result = tracker.update_budget(id, update);
    spinner.finish_and_clear();
    match result {
        Ok(updated) => {
            writeln!(
                io::stdout().lock(),
                "{} {} at {:.2} per month",
                "Budget updated:".green().bold(),
                updated.category.bold(),
                updated.monthly_limit
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to update budget", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `notifications` subcommand.
fn cmd_notifications<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    match tracker.notifications(today) {
        Ok(items) => {
            print_notifications(&items)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to read transactions", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `export` subcommand.
fn cmd_export<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    output: Option<PathBuf>,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    let rows = match tracker.transactions() {
        Ok(rows) => rows,
        Err(err) => {
            report_error("failed to read transactions", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };
    if rows.is_empty() {
        writeln!(io::stdout().lock(), "{}", "No transactions to export.".dimmed())?;
        return Ok(ExitCode::SUCCESS);
    }

    let path = output.unwrap_or_else(|| PathBuf::from(format!("finance-data-{today}.csv")));
    let result = std::fs::File::create(&path)
        .map_err(csv::Error::from)
        .and_then(|file| write_transactions_csv(&rows, file));
    match result {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{} {} transactions to {}",
                "Exported".green().bold(),
                rows.len(),
                path.display()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("export failed", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Writes transactions as CSV with an [`EXPORT_HEADERS`] header row.
fn write_transactions_csv<W: io::Write>(rows: &[Transaction], writer: W) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(EXPORT_HEADERS)?;
    for row in rows {
        let date = row.date.to_string();
        let amount = row.amount.to_string();
        out.write_record([
            date.as_str(),
            row.kind.as_str(),
            row.category.as_str(),
            amount.as_str(),
            row.description.as_str(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Executes the `seed` subcommand.
fn cmd_seed<S: BlockingStorage>(
    tracker: &FinanceTrackerBlocking<S>,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Adding sample transactions...");
    let result = tracker.seed_practice_data(today);
    spinner.finish_and_clear();
    match result {
        Ok(created) => {
            writeln!(
                io::stdout().lock(),
                "{} {} sample transactions",
                "Added".green().bold(),
                created.len()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("failed to add sample transactions", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ── Output formatting ────────────────────────────────────────────────

/// Header cell in the common style.
fn header(title: &str) -> Cell {
    Cell::new(title).fg(Color::Cyan)
}

/// Right-aligned money cell, colored by sign.
fn money_cell(value: f64) -> Cell {
    let cell = Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right);
    if value < 0.0_f64 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

/// Color used for a transaction type.
const fn kind_color(kind: TransactionType) -> Color {
    match kind {
        TransactionType::Income => Color::Green,
        TransactionType::Expense => Color::Red,
        TransactionType::Investment => Color::Blue,
    }
}

/// Creates a table with the common preset and header.
fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(headers.iter().map(|&title| header(title)).collect::<Vec<_>>());
    table
}

/// Prints the result of a refresh.
fn print_refresh_summary(summary: RefreshSummary) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Refresh complete!".green().bold())?;
    writeln!(out)?;

    let mut table = new_table(&["Entity", "Count"]);
    for (name, count) in [
        ("Transactions", summary.transactions),
        ("Budgets", summary.budgets),
    ] {
        let count_cell = if count > 0 {
            Cell::new(count).fg(Color::Green)
        } else {
            Cell::new(count).fg(Color::DarkGrey)
        };
        _ = table.add_row(vec![Cell::new(name), count_cell]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints transactions in a table.
fn print_transactions_table(rows: &[Transaction]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if rows.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }

    let mut table = new_table(&["Date", "Type", "Category", "Amount", "Description", "ID"]);
    for row in rows {
        _ = table.add_row(vec![
            Cell::new(row.date),
            Cell::new(row.kind.label()).fg(kind_color(row.kind)),
            Cell::new(&row.category),
            money_cell(row.amount),
            Cell::new(&row.description),
            Cell::new(&row.id).fg(Color::DarkGrey),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Transactions".green().bold(),
        format_args!("({})", rows.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the month summary.
fn print_summary(summary: &MonthSummary) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {}",
        format_args!("Summary for {}", summary.month).green().bold(),
        format_args!("({} transactions)", summary.transaction_count).dimmed()
    )?;
    writeln!(out)?;

    let mut table = new_table(&["Metric", "Value"]);
    let totals = summary.totals;
    for (name, value) in [
        ("Income", totals.income),
        ("Expenses", totals.expenses),
        ("Investments", totals.investments),
        ("Net", summary.net),
    ] {
        _ = table.add_row(vec![Cell::new(name), money_cell(value)]);
    }
    _ = table.add_row(vec![
        Cell::new("Savings rate"),
        Cell::new(format!("{:.1}%", summary.savings_rate)).set_alignment(CellAlignment::Right),
    ]);
    _ = table.add_row(vec![
        Cell::new("Investment rate"),
        Cell::new(format!("{:.1}%", summary.investment_rate))
            .set_alignment(CellAlignment::Right),
    ]);
    writeln!(out, "{table}")?;

    if let Some(top) = summary.top_expense_category.as_ref() {
        writeln!(
            out,
            "  {} {} ({:.2}, {:.1}%)",
            "Top expense:".bold(),
            top.category,
            top.amount,
            top.percentage
        )?;
    }
    Ok(())
}

/// Prints category spending in a table.
fn print_categories_table(rows: &[CategorySpending]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if rows.is_empty() {
        writeln!(out, "{}", "No expenses this month.".dimmed())?;
        return Ok(());
    }

    let mut table = new_table(&["Category", "Amount", "Share"]);
    for row in rows {
        _ = table.add_row(vec![
            Cell::new(&row.category),
            money_cell(row.amount),
            Cell::new(format!("{:.1}%", row.percentage)).set_alignment(CellAlignment::Right),
        ]);
    }

    writeln!(out, "{}", "Spending by category".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints monthly aggregates in a table.
fn print_trends_table(rows: &[MonthlyAggregate]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut table = new_table(&["Month", "Income", "Expenses", "Investments", "Net"]);
    for row in rows {
        _ = table.add_row(vec![
            Cell::new(row.month),
            money_cell(row.income),
            money_cell(row.expenses),
            money_cell(row.investments),
            money_cell(row.net),
        ]);
    }

    writeln!(out, "{}", "Monthly trends".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the next-month forecast.
fn print_forecast(result: &ForecastResult) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if result.confidence == 0 {
        writeln!(
            out,
            "{}",
            "Not enough history to forecast next month.".dimmed()
        )?;
        return Ok(());
    }

    writeln!(out, "{}", "Next month forecast".green().bold())?;
    writeln!(out)?;
    writeln!(out, "  {} {}", "Income:  ".bold(), result.predicted_income)?;
    writeln!(out, "  {} {}", "Expenses:".bold(), result.predicted_expenses)?;
    if result.predicted_net < 0 {
        writeln!(out, "  {} {}", "Net:     ".bold(), result.predicted_net.red())?;
    } else {
        writeln!(out, "  {} {}", "Net:     ".bold(), result.predicted_net.green())?;
    }
    writeln!(out, "  {} {}%", "Confidence:".bold(), result.confidence)?;
    Ok(())
}

/// Table color for a budget status.
const fn status_color(status: BudgetStatus) -> Color {
    match status {
        BudgetStatus::OnTrack => Color::Green,
        BudgetStatus::NearLimit => Color::Yellow,
        BudgetStatus::Critical | BudgetStatus::Exceeded => Color::Red,
    }
}

/// Prints budget progress in a table.
fn print_budgets_table(rows: &[BudgetProgress]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if rows.is_empty() {
        writeln!(out, "{}", "No budgets set.".dimmed())?;
        return Ok(());
    }

    let mut table = new_table(&["Category", "Limit", "Spent", "Remaining", "Used", "Status", "ID"]);
    for row in rows {
        _ = table.add_row(vec![
            Cell::new(&row.category),
            money_cell(row.limit),
            money_cell(row.spent),
            money_cell(row.remaining),
            Cell::new(format!("{:.0}%", row.percent_used)).set_alignment(CellAlignment::Right),
            Cell::new(row.status.label()).fg(status_color(row.status)),
            Cell::new(&row.budget_id).fg(Color::DarkGrey),
        ]);
    }

    writeln!(out, "{}", "Budgets".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints notifications, one per line.
fn print_notifications(items: &[Notification]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for item in items {
        match item.level {
            NotificationLevel::Info => {
                writeln!(out, "{} {}", "info".cyan().bold(), item.title.bold())?;
            }
            NotificationLevel::Warning => {
                writeln!(out, "{} {}", "warning".yellow().bold(), item.title.bold())?;
            }
            NotificationLevel::Success => {
                writeln!(out, "{} {}", "success".green().bold(), item.title.bold())?;
            }
        }
        writeln!(out, "  {}", item.message)?;
    }
    Ok(())
}

/// Prints the suggested categories for a transaction type.
fn print_suggestions(kind: TransactionType) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{}",
        format_args!("Suggested {} categories", kind.as_str()).green().bold()
    )?;
    for category in kind.suggested_categories() {
        writeln!(out, "  {category}")?;
    }
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // stderr itself failed; nothing left to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::DateTime;
    use finance_tracker::models::{Budget, UserId};
    use finance_tracker::storage::InMemoryStorage;

    /// Shorthand for a calendar date.
    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Creates a test transaction in the `Food` category.
    fn test_transaction(id: &str, kind: TransactionType, amount: f64, date: NaiveDate) -> Transaction {
        Transaction {
            id: TransactionId::new(id.to_owned()),
            user_id: UserId::new("user-1".to_owned()),
            kind,
            category: "Food".to_owned(),
            amount,
            description: "Groceries".to_owned(),
            date,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    /// Creates a test budget.
    fn test_budget(id: &str, category: &str, limit: f64) -> Budget {
        Budget {
            id: BudgetId::new(id.to_owned()),
            user_id: UserId::new("user-1".to_owned()),
            category: category.to_owned(),
            monthly_limit: limit,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    /// Tracker over an empty in-memory cache, without a session.
    fn mock_tracker() -> FinanceTrackerBlocking<InMemoryStorage> {
        FinanceTrackerBlocking::builder()
            .base_url("http://localhost")
            .api_key("test-key")
            .storage(InMemoryStorage::new())
            .build()
            .unwrap()
    }

    /// Tracker whose cache holds two months of rows and one budget.
    fn seeded_tracker() -> FinanceTrackerBlocking<InMemoryStorage> {
        let tracker = mock_tracker();
        tracker
            .storage()
            .upsert_transactions(vec![
                test_transaction("t-1", TransactionType::Income, 5000.0, ymd(2024, 6, 1)),
                test_transaction("t-2", TransactionType::Expense, 120.0, ymd(2024, 6, 2)),
                test_transaction("t-3", TransactionType::Expense, 80.0, ymd(2024, 5, 20)),
            ])
            .unwrap();
        tracker
            .storage()
            .upsert_budgets(vec![test_budget("b-1", "Food", 150.0)])
            .unwrap();
        tracker
    }

    /// `transactions` arguments with no filters set.
    fn empty_args() -> TransactionArgs {
        TransactionArgs {
            from: None,
            to: None,
            kind: None,
            category: None,
            search: None,
            min_amount: None,
            max_amount: None,
        }
    }

    // ── argument parsing ────────────────────────────────────────────

    #[test]
    fn parse_date_valid() {
        assert_eq!(parse_date("2024-01-15").unwrap(), ymd(2024, 1, 15));
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("15/01/2024").is_err());
    }

    #[test]
    fn parse_kind_accepts_wire_names() {
        assert_eq!(parse_kind("expense").unwrap(), TransactionType::Expense);
        assert!(parse_kind("transfer").is_err());
    }

    #[test]
    fn cli_parses_global_date_and_trends() {
        let cli = Cli::try_parse_from(["fintrack", "--date", "2024-06-15", "trends", "--months", "3"])
            .unwrap();
        assert_eq!(cli.date, Some(ymd(2024, 6, 15)));
        assert!(matches!(cli.command, Command::Trends { months: 3 }));
    }

    #[test]
    fn cli_trends_defaults_to_forecast_window() {
        let cli = Cli::try_parse_from(["fintrack", "trends"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Trends { months } if months == FORECAST_WINDOW_MONTHS
        ));
    }

    #[test]
    fn cli_trends_rejects_out_of_range_months() {
        assert!(Cli::try_parse_from(["fintrack", "trends", "--months", "0"]).is_err());
        assert!(Cli::try_parse_from(["fintrack", "trends", "--months", "1201"]).is_err());
        assert!(Cli::try_parse_from(["fintrack", "trends", "--months", "4294967295"]).is_err());
        let cli = Cli::try_parse_from(["fintrack", "trends", "--months", "1200"]).unwrap();
        assert!(matches!(cli.command, Command::Trends { months: 1200 }));
    }

    #[test]
    fn cli_parses_add() {
        let cli = Cli::try_parse_from([
            "fintrack",
            "add",
            "expense",
            "12.5",
            "Food",
            "--description",
            "Lunch",
            "--on",
            "2024-06-03",
        ])
        .unwrap();
        let Command::Add(args) = cli.command else {
            unreachable!("expected add");
        };
        assert_eq!(args.kind, TransactionType::Expense);
        assert!((args.amount - 12.5).abs() < f64::EPSILON);
        assert_eq!(args.on, Some(ymd(2024, 6, 3)));
    }

    #[test]
    fn filter_from_args() {
        let args = TransactionArgs {
            from: Some(ymd(2024, 6, 1)),
            kind: Some(TransactionType::Expense),
            search: Some("groc".to_owned()),
            max_amount: Some(100.0),
            ..empty_args()
        };
        let filter = build_transaction_filter(&args);
        assert_eq!(filter.date_from, Some(ymd(2024, 6, 1)));
        assert_eq!(filter.date_to, None);
        assert_eq!(filter.kind, Some(TransactionType::Expense));
        assert_eq!(filter.description.as_deref(), Some("groc"));
        assert_eq!(filter.min_amount, None);
        assert_eq!(filter.max_amount, Some(100.0));
    }

    #[test]
    fn make_spinner_creates_spinner() {
        let spinner = make_spinner("Testing...");
        spinner.finish_and_clear();
    }

    // ── cmd_* tests ─────────────────────────────────────────────────

    #[test]
    fn cmd_transactions_empty() {
        let tracker = mock_tracker();
        assert_eq!(cmd_transactions(&tracker, &empty_args()).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn cmd_transactions_with_data() {
        let tracker = seeded_tracker();
        assert_eq!(cmd_transactions(&tracker, &empty_args()).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn read_only_commands_succeed_on_cache() {
        let tracker = seeded_tracker();
        let today = ymd(2024, 6, 15);
        assert_eq!(cmd_summary(&tracker, today).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_categories(&tracker, today).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_trends(&tracker, 6, today).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_forecast(&tracker, today).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_budgets(&tracker, today).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_notifications(&tracker, today).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn read_only_commands_succeed_on_empty_cache() {
        let tracker = mock_tracker();
        let today = ymd(2024, 6, 15);
        assert_eq!(cmd_categories(&tracker, today).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_budgets(&tracker, today).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_forecast(&tracker, today).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn network_commands_fail_without_session() {
        let tracker = mock_tracker();
        assert_eq!(cmd_refresh(&tracker).unwrap(), ExitCode::FAILURE);
        assert_eq!(
            cmd_delete(&tracker, TransactionId::new("t-1".to_owned())).unwrap(),
            ExitCode::FAILURE
        );
    }

    #[test]
    fn invalid_transaction_is_rejected_before_sending() {
        let tracker = mock_tracker();
        let args = AddArgs {
            kind: TransactionType::Expense,
            amount: -5.0,
            category: "Food".to_owned(),
            description: String::new(),
            on: None,
        };
        assert_eq!(cmd_add(&tracker, args, ymd(2024, 6, 1)).unwrap(), ExitCode::FAILURE);
        assert!(tracker.storage().transactions().unwrap().is_empty());
    }

    #[test]
    fn csv_quotes_fields_with_commas_and_quotes() {
        let mut row = test_transaction("t-1", TransactionType::Expense, 12.5, ymd(2024, 6, 2));
        row.description = "Dinner, drinks and a \"tip\"".to_owned();
        let mut buf = Vec::new();
        write_transactions_csv(&[row], &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Date,Type,Category,Amount,Description\n\
             2024-06-02,expense,Food,12.5,\"Dinner, drinks and a \"\"tip\"\"\"\n"
        );

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][4], "Dinner, drinks and a \"tip\"");
    }

    #[test]
    fn cmd_export_writes_cached_rows_newest_first() {
        let tracker = seeded_tracker();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        assert_eq!(
            cmd_export(&tracker, Some(path.clone()), ymd(2024, 6, 15)).unwrap(),
            ExitCode::SUCCESS
        );

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Date,Type,Category,Amount,Description");
        assert!(lines[1].starts_with("2024-06-02,expense,Food,120,"));
        assert!(lines[3].starts_with("2024-05-20,"));
    }

    #[test]
    fn cmd_export_skips_empty_cache() {
        let tracker = mock_tracker();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        assert_eq!(
            cmd_export(&tracker, Some(path.clone()), ymd(2024, 6, 15)).unwrap(),
            ExitCode::SUCCESS
        );
        assert!(!path.exists());
    }

    #[test]
    fn cli_parses_export_and_seed() {
        let cli = Cli::try_parse_from(["fintrack", "export", "--output", "out.csv"]).unwrap();
        let Command::Export { output } = cli.command else {
            unreachable!("expected export");
        };
        assert_eq!(output, Some(PathBuf::from("out.csv")));
        let cli = Cli::try_parse_from(["fintrack", "seed"]).unwrap();
        assert!(matches!(cli.command, Command::Seed));
    }

    #[test]
    fn seed_fails_without_session() {
        let tracker = mock_tracker();
        assert_eq!(cmd_seed(&tracker, ymd(2024, 6, 15)).unwrap(), ExitCode::FAILURE);
        assert!(tracker.storage().transactions().unwrap().is_empty());
    }

    #[test]
    fn print_suggestions_for_every_kind() {
        for kind in TransactionType::ALL {
            print_suggestions(kind).unwrap();
        }
    }

    #[test]
    fn print_forecast_without_history() {
        print_forecast(&ForecastResult::default()).unwrap();
    }
}
