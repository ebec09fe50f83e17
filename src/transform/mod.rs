use tracing::info;

use crate::error::{EtlError, Result};
use crate::fetch::Fetcher;
use crate::models::{BankRecord, BankRow};
use crate::progress_log::ProgressLog;
use crate::utils::round_to;

pub mod rates;
pub use rates::ExchangeRates;

/// Converts USD market caps into GBP, EUR and INR
#[derive(Debug)]
pub struct Transformer {
    fetcher: Fetcher,
    log: ProgressLog,
}

impl Transformer {
    pub fn new(fetcher: Fetcher, log: ProgressLog) -> Self {
        Self { fetcher, log }
    }

    /// Load the rate table from `rates_source`, a URL or a local path
    pub fn load_rates(&self, rates_source: &str) -> Result<ExchangeRates> {
        let text = self
            .fetcher
            .fetch_text(rates_source)
            .map_err(|e| EtlError::Load {
                resource: rates_source.to_string(),
                reason: error_chain(&e),
            })?;
        let rates = ExchangeRates::from_csv_str(&text, rates_source)?;
        info!("💱 Loaded {} exchange rates from {}", rates.len(), rates_source);
        Ok(rates)
    }

    pub fn transform(&self, records: &[BankRecord], rates_source: &str) -> Result<Vec<BankRow>> {
        let rates = self.load_rates(rates_source)?;
        let rows = apply_rates(records, &rates)?;

        self.log
            .log("Data transformation complete. Initiating Loading process")?;
        Ok(rows)
    }
}

/// Add the converted columns to every record, rounding each to two places.
///
/// All three currencies must be present even when `records` is empty.
pub fn apply_rates(records: &[BankRecord], rates: &ExchangeRates) -> Result<Vec<BankRow>> {
    let gbp = rates.get("GBP")?;
    let eur = rates.get("EUR")?;
    let inr = rates.get("INR")?;

    Ok(records
        .iter()
        .map(|record| BankRow {
            name: record.name.clone(),
            mc_usd_billions: record.market_cap_usd,
            mc_gbp_billions: round_to(record.market_cap_usd * gbp, 2),
            mc_eur_billions: round_to(record.market_cap_usd * eur, 2),
            mc_inr_billions: round_to(record.market_cap_usd * inr, 2),
        })
        .collect())
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
