use clap::{Parser, ValueEnum};
use crossfee::application::analyzer::{GroupBy, aggregate};
use crossfee::application::engine::FeeEngine;
use crossfee::domain::ports::ScheduleSourceBox;
use crossfee::infrastructure::config::{BuiltinSchedule, TomlScheduleFile};
use crossfee::infrastructure::logging::init_tracing;
use crossfee::interfaces::csv::summary_writer::{OutputFormat, SummaryWriter};
use crossfee::interfaces::csv::transaction_reader::TransactionReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input transactions CSV file
    input: PathBuf,

    /// Channel schedule TOML file. Defaults to the built-in schedule.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to group the summary
    #[arg(long, value_enum, default_value_t = GroupByArg::Channel)]
    group_by: GroupByArg,

    /// Number of parallel pricing shards
    #[arg(long, default_value = "1")]
    shards: NonZeroUsize,

    /// Output encoding of the summary
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupByArg {
    Channel,
    Currency,
    Day,
    Week,
    Month,
}

impl From<GroupByArg> for GroupBy {
    fn from(arg: GroupByArg) -> Self {
        match arg {
            GroupByArg::Channel => GroupBy::Channel,
            GroupByArg::Currency => GroupBy::Currency,
            GroupByArg::Day => GroupBy::Day,
            GroupByArg::Week => GroupBy::Week,
            GroupByArg::Month => GroupBy::Month,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let source: ScheduleSourceBox = match &cli.config {
        Some(path) => Box::new(TomlScheduleFile::new(path)),
        None => Box::new(BuiltinSchedule),
    };
    let engine = FeeEngine::new(source.load()?);

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = TransactionReader::new(file);
    let mut transactions = Vec::new();
    for (row, tx_result) in reader.transactions().enumerate() {
        match tx_result {
            Ok(tx) => transactions.push(tx),
            Err(error) => warn!(row = row + 1, %error, "Error reading transaction"),
        }
    }

    let report = engine.process_sharded(transactions, cli.shards).await?;
    let group_by = GroupBy::from(cli.group_by);
    let summary = aggregate(&report.records, |tx, fee| group_by.key(tx, fee))?;

    let stdout = io::stdout();
    SummaryWriter::new(stdout.lock(), cli.format.into()).write_summary(&summary)?;

    Ok(())
}
