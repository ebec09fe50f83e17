use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;

use crate::error::{EtlError, Result};

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: f64,
}

/// Currency code to USD multiplier, read-only once loaded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRates {
    rates: HashMap<String, f64>,
}

impl ExchangeRates {
    /// Parse a `Currency,Rate` CSV. Extra columns are ignored and a repeated
    /// currency keeps its last rate.
    pub fn from_csv_reader<R: Read>(reader: R, resource: &str) -> Result<Self> {
        let load_error = |reason: String| EtlError::Load {
            resource: resource.to_string(),
            reason,
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| load_error(e.to_string()))?
            .clone();
        for column in ["Currency", "Rate"] {
            if !headers.iter().any(|h| h == column) {
                return Err(load_error(format!("missing column {column:?}")));
            }
        }

        let mut rates = HashMap::new();
        for row in csv_reader.deserialize::<RateRow>() {
            let row = row.map_err(|e| load_error(e.to_string()))?;
            rates.insert(row.currency, row.rate);
        }

        Ok(Self { rates })
    }

    pub fn from_csv_str(text: &str, resource: &str) -> Result<Self> {
        Self::from_csv_reader(text.as_bytes(), resource)
    }

    /// Rate for `code`, failing if the table has no such currency
    pub fn get(&self, code: &str) -> Result<f64> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| EtlError::MissingCurrency(code.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(String, f64)> for ExchangeRates {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
