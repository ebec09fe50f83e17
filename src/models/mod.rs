use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EtlError, Result};
use crate::utils::is_plain_identifier;

/// Output columns, in the order both sinks persist them.
pub const COLUMNS: [&str; 5] = [
    "Name",
    "MC_USD_Billions",
    "MC_GBP_Billions",
    "MC_EUR_Billions",
    "MC_INR_Billions",
];

/// One bank scraped from the ranking table
#[derive(Debug, Clone, PartialEq)]
pub struct BankRecord {
    pub name: String,
    pub market_cap_usd: f64,
}

/// A bank with its market capitalization converted into every output currency.
///
/// Field order matches [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "MC_USD_Billions")]
    pub mc_usd_billions: f64,
    #[serde(rename = "MC_GBP_Billions")]
    pub mc_gbp_billions: f64,
    #[serde(rename = "MC_EUR_Billions")]
    pub mc_eur_billions: f64,
    #[serde(rename = "MC_INR_Billions")]
    pub mc_inr_billions: f64,
}

pub const DEFAULT_SOURCE_URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";
pub const DEFAULT_RATES_SOURCE: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBMSkillsNetwork-PY0221EN-Coursera/labs/v2/exchange_rate.csv";
pub const DEFAULT_TABLE_NAME: &str = "Largest_banks";
pub const DEFAULT_ROW_LIMIT: usize = 10;

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Page holding the bank ranking table
    pub source_url: String,
    /// CSV with `Currency,Rate` columns, either a URL or a local path
    pub rates_source: String,
    pub csv_path: PathBuf,
    pub database_path: PathBuf,
    pub table_name: String,
    /// Append-only progress log
    pub log_path: PathBuf,
    /// Maximum number of banks accepted from the table
    pub row_limit: usize,
    /// Write a leading row-index column to the CSV output
    pub csv_index: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            rates_source: DEFAULT_RATES_SOURCE.to_string(),
            csv_path: PathBuf::from("largest_bank_data.csv"),
            database_path: PathBuf::from("Banks.db"),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            log_path: PathBuf::from("code_log.txt"),
            row_limit: DEFAULT_ROW_LIMIT,
            csv_index: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from defaults overridden by whatever `lookup` returns.
    ///
    /// Only malformed values are rejected here. Range and identifier checks
    /// live in [`Config::validate`], which runs once all overrides are applied.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("BANKS_SOURCE_URL") {
            config.source_url = url;
        }
        if let Some(rates) = lookup("BANKS_RATES_SOURCE") {
            config.rates_source = rates;
        }
        if let Some(path) = lookup("BANKS_CSV_PATH") {
            config.csv_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("BANKS_DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(table) = lookup("BANKS_TABLE_NAME") {
            config.table_name = table;
        }
        if let Some(path) = lookup("BANKS_LOG_PATH") {
            config.log_path = PathBuf::from(path);
        }
        if let Some(limit) = lookup("BANKS_ROW_LIMIT") {
            config.row_limit = limit.trim().parse().map_err(|_| {
                EtlError::Config(format!("BANKS_ROW_LIMIT must be a positive integer, got {limit:?}"))
            })?;
        }
        if let Some(flag) = lookup("BANKS_CSV_INDEX") {
            config.csv_index = parse_flag(&flag).ok_or_else(|| {
                EtlError::Config(format!("BANKS_CSV_INDEX must be true or false, got {flag:?}"))
            })?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_plain_identifier(&self.table_name) {
            return Err(EtlError::Config(format!(
                "table name {:?} must be a plain SQL identifier",
                self.table_name
            )));
        }
        if self.row_limit == 0 {
            return Err(EtlError::Config("row limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
