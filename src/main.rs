use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use loanbook::application::service::LoanService;
use loanbook::domain::amortization::{LoanRequest, compute_schedule};
use loanbook::domain::frequency::PaymentFrequency;
use loanbook::domain::ports::{LoanStoreBox, PaymentStoreBox};
use loanbook::error::LoanError;
use loanbook::infrastructure::in_memory::{InMemoryLoanStore, InMemoryPaymentStore};
use loanbook::interfaces::csv::application_reader::LoanApplicationReader;
use loanbook::interfaces::csv::loan_writer::LoanWriter;
use loanbook::interfaces::csv::payment_reader::PaymentReader;
use loanbook::interfaces::csv::payment_writer::PaymentWriter;
use loanbook::interfaces::csv::portfolio_writer::PortfolioWriter;
use loanbook::interfaces::csv::schedule_writer::ScheduleWriter;
use loanbook::telemetry;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Amortize a single loan and print its schedule
    Quote(QuoteArgs),
    /// Book loans from a CSV file, apply payments and print the loan book
    Book(BookArgs),
}

#[derive(Args)]
struct QuoteArgs {
    /// Amount borrowed
    #[arg(long, allow_negative_numbers = true)]
    principal: f64,

    /// Nominal annual interest rate in percent
    #[arg(long, allow_negative_numbers = true)]
    rate: f64,

    /// Loan term in months
    #[arg(long)]
    term_months: u32,

    /// weekly, biweekly, monthly or quarterly
    #[arg(long, default_value = "monthly")]
    frequency: PaymentFrequency,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Print the whole quote as JSON instead of the schedule CSV
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BookArgs {
    /// Loan applications CSV file
    input: PathBuf,

    /// Payments CSV file applied after booking
    #[arg(long)]
    payments: Option<PathBuf>,

    /// Date used for booking and overdue checks (defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// What to print once loans and payments are processed
    #[arg(long, value_enum, default_value_t = Report::Loans)]
    report: Report,

    /// Restrict the payments report to one loan
    #[arg(long)]
    loan: Option<u32>,

    /// Restrict the portfolio report to one lender
    #[arg(long)]
    lender: Option<u32>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "LOANBOOK_DB_PATH")]
    db_path: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Report {
    /// One summary row per loan, with repayment progress
    Loans,
    /// Every installment of every loan
    Schedules,
    /// Every recorded payment
    Payments,
    /// Counts and totals over the whole book
    Portfolio,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Quote(args) => quote(args),
        Command::Book(args) => book(args).await,
    }
}

fn quote(args: QuoteArgs) -> Result<()> {
    let request = LoanRequest::new(
        args.principal,
        args.rate,
        args.term_months,
        args.frequency,
        args.start,
    );
    let quote = compute_schedule(&request)
        .map_err(LoanError::from)
        .into_diagnostic()?;

    info!(
        payment = quote.payment_amount,
        periods = quote.total_periods,
        total_amount = quote.total_amount,
        total_interest = quote.total_interest,
        effective_rate = quote.effective_annual_rate,
        "quote computed"
    );

    let stdout = io::stdout();
    if args.json {
        serde_json::to_writer_pretty(stdout.lock(), &quote).into_diagnostic()?;
        println!();
    } else {
        let mut writer = ScheduleWriter::new(stdout.lock());
        writer.write_schedule(0, &quote.schedule).into_diagnostic()?;
        writer.flush().into_diagnostic()?;
    }
    Ok(())
}

async fn book(args: BookArgs) -> Result<()> {
    let as_of = args
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let (loan_store, payment_store) = open_stores(args.db_path)?;
    let service = LoanService::new(loan_store, payment_store);

    let file = File::open(&args.input).into_diagnostic()?;
    for application in LoanApplicationReader::new(file).applications() {
        match application {
            Ok(application) => {
                if let Err(e) = service.book_loan(application, as_of).await {
                    error!("Error booking loan: {}", e);
                }
            }
            Err(e) => error!("Error reading loan application: {}", e),
        }
    }

    if let Some(path) = args.payments {
        let file = File::open(path).into_diagnostic()?;
        for payment in PaymentReader::new(file).payments() {
            match payment {
                Ok(payment) => {
                    if let Err(e) = service.record_payment(payment).await {
                        error!("Error recording payment: {}", e);
                    }
                }
                Err(e) => error!("Error reading payment: {}", e),
            }
        }
    }

    let loans = service.refresh_statuses(as_of).await.into_diagnostic()?;

    let stdout = io::stdout();
    match args.report {
        Report::Loans => LoanWriter::new(stdout.lock())
            .write_loans(&loans)
            .into_diagnostic()?,
        Report::Schedules => {
            let mut writer = ScheduleWriter::new(stdout.lock());
            for loan in &loans {
                writer
                    .write_schedule(loan.id, &loan.schedule)
                    .into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        Report::Payments => {
            let payments = service.payment_history(args.loan).await.into_diagnostic()?;
            PaymentWriter::new(stdout.lock())
                .write_payments(&payments)
                .into_diagnostic()?;
        }
        Report::Portfolio => {
            let summary = service
                .portfolio_summary(args.lender)
                .await
                .into_diagnostic()?;
            PortfolioWriter::new(stdout.lock())
                .write_summary(&summary)
                .into_diagnostic()?;
        }
    }
    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(LoanStoreBox, PaymentStoreBox)> {
    use loanbook::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = db_path {
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        Ok((Box::new(store.clone()), Box::new(store)))
    } else {
        Ok(in_memory_stores())
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(LoanStoreBox, PaymentStoreBox)> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (LoanStoreBox, PaymentStoreBox) {
    (
        Box::new(InMemoryLoanStore::new()),
        Box::new(InMemoryPaymentStore::new()),
    )
}
