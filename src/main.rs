use std::fs::File;
use std::io::{stderr, stdout, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use finance_tracker::api::{read_budgets, read_transactions, HttpApi};
use finance_tracker::config::{ClientConfig, DEFAULT_API_URL, DEFAULT_DATA_DIR, DEFAULT_TIMEOUT_MS};
use finance_tracker::models::{calculate_spending, BudgetStatus, FilterUpdate, NewBudget, NewTransaction, Registration, Transaction};
use finance_tracker::reports::{DateRange, GroupBy, Report, ReportFilter};
use finance_tracker::storage::LocalStorage;
use finance_tracker::stores::{AuthStore, BudgetStore, TransactionStore};
use finance_tracker::types::{display_name, TransactionType};

#[derive(Parser)]
#[command(name = "finance-tracker", version, about = "Track income, expenses and budgets from the terminal")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "FINANCE_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "FINANCE_API_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS, global = true)]
    timeout_ms: u64,

    /// Directory holding the persisted session
    #[arg(long, env = "FINANCE_DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,

    /// error, warn, info, debug or trace
    #[arg(long, default_value = "error", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command
}

#[derive(Subcommand)]
enum Command {
    Login {
        email: String,
        #[arg(long, env = "FINANCE_PASSWORD")]
        password: String
    },
    Register {
        name: String,
        email: String,
        #[arg(long, env = "FINANCE_PASSWORD")]
        password: String
    },
    Logout,
    ForgotPassword {
        email: String
    },
    ResetPassword {
        token: String,
        #[arg(long, env = "FINANCE_PASSWORD")]
        password: String
    },
    /// List transactions matching the given filters
    Transactions {
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,
        #[arg(long)]
        category: Option<String>,
        /// First day to include, YYYY-MM-DD
        #[arg(long, value_parser = parse_day)]
        from: Option<NaiveDate>,
        /// Last day to include, YYYY-MM-DD
        #[arg(long, value_parser = parse_day)]
        to: Option<NaiveDate>
    },
    AddTransaction(TransactionArgs),
    UpdateTransaction {
        id: String,
        #[command(flatten)]
        transaction: TransactionArgs
    },
    DeleteTransaction {
        id: String
    },
    /// List budgets with their current spending
    Budgets,
    AddBudget {
        category: String,
        amount: Decimal
    },
    DeleteBudget {
        id: String
    },
    /// Summarize transactions, online or from CSV files
    Report {
        #[arg(long, default_value = "all")]
        range: DateRange,
        #[arg(long, default_value = "category")]
        group_by: GroupBy,
        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,
        /// Read transactions from this CSV instead of the backend
        #[arg(long)]
        transactions: Option<PathBuf>,
        /// Budgets CSV used together with --transactions
        #[arg(long, requires = "transactions")]
        budgets: Option<PathBuf>
    }
}

#[derive(Args)]
struct TransactionArgs {
    #[arg(long = "type")]
    transaction_type: TransactionType,
    #[arg(long)]
    amount: Decimal,
    #[arg(long)]
    category: String,
    #[arg(long)]
    description: String,
    /// Defaults to today, YYYY-MM-DD
    #[arg(long, value_parser = parse_day)]
    date: Option<NaiveDate>
}

impl TransactionArgs {
    fn into_new_transaction(self) -> NewTransaction {
        NewTransaction {
            transaction_type: self.transaction_type,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date.map(start_of_day).unwrap_or_else(Utc::now)
        }
    }
}

type Api = HttpApi<LocalStorage>;

/// Stores wired to the HTTP backend and the persisted session.
struct Session {
    auth: AuthStore<Api, LocalStorage>,
    transactions: TransactionStore<Api>,
    budgets: BudgetStore<Api>
}

impl Session {
    fn open(config: &ClientConfig) -> Result<Self> {
        let storage = Arc::new(LocalStorage::open(config.storage_path())?);
        let api = Arc::new(HttpApi::new(config, storage.clone())?);

        let auth = AuthStore::new(api.clone(), storage);
        let transactions = TransactionStore::new(api.clone(), auth.subscribe());
        let budgets = BudgetStore::new(api, auth.subscribe(), transactions.subscribe());

        Ok(Self { auth, transactions, budgets })
    }

    /// Restores the stored session and loads both stores.
    async fn load(&self) -> Result<()> {
        if !self.auth.check_auth().await {
            bail!("Not logged in, run `finance-tracker login <email>` first");
        }

        self.transactions.fetch(false).await?;
        self.budgets.fetch(false).await?;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(parse_log_level(&cli.log_level));

    let config = ClientConfig::new(cli.api_url, Duration::from_millis(cli.timeout_ms), cli.data_dir);

    match cli.command {
        Command::Report { range, group_by, transaction_type, transactions: Some(path), budgets } => {
            let filter = ReportFilter { range, group_by, transaction_type };
            let transactions = read_transactions(open(&path)?);
            let budgets = match budgets {
                Some(path) => calculate_spending(&transactions, &read_budgets(open(&path)?)),
                None => Vec::new()
            };

            info!("Loaded {} transactions and {} budgets from CSV", transactions.len(), budgets.len());

            write_report(&Report::build(&transactions, &filter, Utc::now())?, &budgets)
        }
        command => run(command, &config).await
    }
}

async fn run(command: Command, config: &ClientConfig) -> Result<()> {
    let session = Session::open(config)?;

    match command {
        Command::Login { email, password } => {
            let user = session.auth.login(&email, &password).await?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        Command::Register { name, email, password } => {
            session.auth.register(&Registration { name, email, password }).await?;
            println!("{}", session.auth.success_message().unwrap_or_default());
        }
        Command::Logout => {
            session.auth.logout();
            println!("Logged out");
        }
        Command::ForgotPassword { email } => {
            session.auth.forgot_password(&email).await?;
            println!("{}", session.auth.success_message().unwrap_or_default());
        }
        Command::ResetPassword { token, password } => {
            session.auth.reset_password(&token, &password).await?;
            println!("{}", session.auth.success_message().unwrap_or_default());
        }
        Command::Transactions { search, transaction_type, category, from, to } => {
            session.load().await?;

            let mut update = FilterUpdate::new()
                .transaction_type(transaction_type)
                .category(category)
                .start_date(from.map(start_of_day))
                .end_date(to.map(end_of_day));

            if let Some(search) = search {
                update = update.search(search);
            }

            session.transactions.update_filters(update);
            write_transactions(&session.transactions.transactions())?;
        }
        Command::AddTransaction(transaction) => {
            session.load().await?;
            let created = session.transactions.add(&transaction.into_new_transaction()).await?;
            write_transactions(&[created])?;
        }
        Command::UpdateTransaction { id, transaction } => {
            session.load().await?;
            let updated = session.transactions.update(&id, &transaction.into_new_transaction()).await?;
            write_transactions(&[updated])?;
        }
        Command::DeleteTransaction { id } => {
            session.load().await?;
            session.transactions.delete(&id).await?;
            println!("Deleted transaction {id}");
        }
        Command::Budgets => {
            session.load().await?;
            write_budgets(&session.budgets.budgets())?;
        }
        Command::AddBudget { category, amount } => {
            session.load().await?;
            session.budgets.add(&NewBudget { category, amount }).await?;
            write_budgets(&session.budgets.budgets())?;
        }
        Command::DeleteBudget { id } => {
            session.load().await?;
            session.budgets.delete(&id).await?;
            println!("Deleted budget {id}");
        }
        Command::Report { range, group_by, transaction_type, .. } => {
            session.load().await?;

            let filter = ReportFilter { range, group_by, transaction_type };
            let report = Report::build(&session.transactions.all_transactions(), &filter, Utc::now())?;

            write_report(&report, &session.budgets.budgets())?;
        }
    }

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the CSV output, so logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn parse_day(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    day.and_time(last).and_utc()
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Error opening CSV at path: {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn write_transactions(transactions: &[Transaction]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(BufWriter::new(stdout().lock()));

    writer.write_record(["id", "type", "amount", "category", "description", "date"])?;

    for transaction in transactions {
        writer.write_record([
            transaction.id.as_str(),
            transaction.transaction_type.as_str(),
            &transaction.amount.round_dp(2).to_string(),
            &transaction.category,
            &transaction.description,
            &transaction.date.to_rfc3339()
        ])?;
    }

    writer.flush()?;

    Ok(())
}

fn write_budget_rows<W: Write>(writer: &mut csv::Writer<W>, budgets: &[BudgetStatus]) -> Result<()> {
    writer.write_record(["id", "category", "name", "amount", "spent", "percentage", "remaining", "status"])?;

    for status in budgets {
        writer.write_record([
            status.budget.id.as_str(),
            &status.budget.category,
            &display_name(&status.budget.category),
            &status.budget.amount.round_dp(2).to_string(),
            &status.spent.round_dp(2).to_string(),
            &status.percentage.round_dp(1).to_string(),
            &status.remaining.round_dp(2).to_string(),
            status.alert_status.as_str()
        ])?;
    }

    Ok(())
}

fn write_budgets(budgets: &[BudgetStatus]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(BufWriter::new(stdout().lock()));
    write_budget_rows(&mut writer, budgets)?;
    writer.flush()?;

    Ok(())
}

/// Writes the report as CSV sections separated by blank lines: stats, expense breakdown,
/// income versus expense and, when budgets are known, budget usage.
fn write_report(report: &Report, budgets: &[BudgetStatus]) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    {
        let mut writer = csv::Writer::from_writer(&mut output);
        writer.write_record(["income", "expenses", "balance", "savings_rate"])?;
        writer.write_record([
            report.stats.income.round_dp(2).to_string(),
            report.stats.expenses.round_dp(2).to_string(),
            report.stats.balance.round_dp(2).to_string(),
            report.stats.savings_rate.round_dp(1).to_string()
        ])?;
        writer.flush()?;
    }

    writeln!(output)?;

    {
        let mut writer = csv::Writer::from_writer(&mut output);
        writer.write_record(["group", "expense", "percentage"])?;

        for entry in &report.expense_breakdown {
            writer.write_record([
                entry.name.clone(),
                entry.value.round_dp(2).to_string(),
                entry.percentage.round_dp(1).to_string()
            ])?;
        }

        writer.flush()?;
    }

    writeln!(output)?;

    {
        let mut writer = csv::Writer::from_writer(&mut output);
        writer.write_record(["group", "income", "expense"])?;

        for entry in &report.income_vs_expense {
            writer.write_record([
                entry.name.clone(),
                entry.income.round_dp(2).to_string(),
                entry.expense.round_dp(2).to_string()
            ])?;
        }

        writer.flush()?;
    }

    if !budgets.is_empty() {
        writeln!(output)?;

        let mut writer = csv::Writer::from_writer(&mut output);
        write_budget_rows(&mut writer, budgets)?;
        writer.flush()?;
    }

    output.flush()?;

    Ok(())
}
