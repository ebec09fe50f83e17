pub mod csv_sink;
pub mod database;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod progress_log;
pub mod transform;
pub mod utils;

pub use error::{EtlError, Result};
