use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by any stage of the bank table pipeline.
///
/// None of these are recovered inside the pipeline; they propagate to the
/// caller and end the run.
#[derive(Debug, Error)]
pub enum EtlError {
    /// The HTTP request failed or returned a non-success status.
    #[error("failed to fetch {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The page did not have the expected table shape, or a cell was not numeric.
    #[error("parse error: {0}")]
    Parse(String),

    /// The exchange-rate resource could not be read or was malformed.
    #[error("failed to load exchange rates from {resource}: {reason}")]
    Load { resource: String, reason: String },

    /// A currency code required for conversion is absent from the rate table.
    #[error("exchange rate table has no entry for currency {0:?}")]
    MissingCurrency(String),

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV output")]
    Csv(#[from] csv::Error),

    #[error("database error")]
    Database(#[from] rusqlite::Error),

    #[error("failed to write query output")]
    Output(#[source] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EtlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EtlError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
