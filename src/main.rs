use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use banks_etl::models::Config;
use banks_etl::pipeline::Pipeline;

/// Largest banks ETL: scrape, convert and load the ranking table
#[derive(Parser)]
#[command(name = "banks-etl")]
#[command(version)]
#[command(about = "Extract the world's largest banks, convert market caps and load them into CSV and SQLite")]
#[command(long_about = "
Fetches the bank ranking page, takes the first ten banks from its first table,
converts each market capitalization from USD into GBP, EUR and INR using the
exchange-rate CSV, then writes the result to a CSV file and a SQLite table and
prints three report queries.

Every option can also be set through BANKS_* environment variables or a .env
file; command line flags take precedence.

Examples:
  banks-etl                                       # defaults
  banks-etl --source-url page.html --rates rates.csv --skip-queries
  banks-etl --db out/Banks.db --table Top_banks --limit 5
")]
struct Args {
    /// Page holding the bank ranking table (URL or local path)
    #[arg(long)]
    source_url: Option<String>,

    /// Exchange-rate CSV with Currency,Rate columns (URL or local path)
    #[arg(long)]
    rates: Option<String>,

    /// CSV output path
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// SQLite database path
    #[arg(long)]
    db: Option<PathBuf>,

    /// Table to replace in the database
    #[arg(long)]
    table: Option<String>,

    /// Progress log path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Maximum number of banks to keep
    #[arg(long)]
    limit: Option<usize>,

    /// Omit the leading row-index column from the CSV output
    #[arg(long)]
    no_csv_index: bool,

    /// Load the data but do not run the report queries
    #[arg(long)]
    skip_queries: bool,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(url) = self.source_url {
            config.source_url = url;
        }
        if let Some(rates) = self.rates {
            config.rates_source = rates;
        }
        if let Some(path) = self.csv_out {
            config.csv_path = path;
        }
        if let Some(path) = self.db {
            config.database_path = path;
        }
        if let Some(table) = self.table {
            config.table_name = table;
        }
        if let Some(path) = self.log_file {
            config.log_path = path;
        }
        if let Some(limit) = self.limit {
            config.row_limit = limit;
        }
        if self.no_csv_index {
            config.csv_index = false;
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("banks_etl=info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let skip_queries = args.skip_queries;

    let mut config = Config::from_env().context("Failed to load configuration")?;
    args.apply(&mut config);
    info!("📋 Configuration loaded: {:?}", config);

    let mut pipeline = Pipeline::new(config)
        .context("Failed to set up pipeline")?
        .with_queries(!skip_queries);

    let summary = {
        let mut out = std::io::stdout().lock();
        pipeline.run(&mut out).context("Pipeline run failed")?
    };

    println!(
        "\nSUCCESS! {} banks saved to {} and table {} in {}",
        summary.rows,
        summary.csv_path.display(),
        summary.table_name,
        summary.database_path.display()
    );
    Ok(())
}
