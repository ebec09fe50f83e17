use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{EtlError, Result};
use crate::models::{BankRow, COLUMNS};
use crate::progress_log::ProgressLog;

/// Writes the converted table to a CSV file, replacing any previous file
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    include_index: bool,
    log: ProgressLog,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>, include_index: bool, log: ProgressLog) -> Self {
        Self {
            path: path.into(),
            include_index,
            log,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, rows: &[BankRow]) -> Result<()> {
        let file = std::fs::File::create(&self.path).map_err(|e| EtlError::io(&self.path, e))?;
        write_rows(file, rows, self.include_index)?;
        info!("💾 Wrote {} rows to {}", rows.len(), self.path.display());

        self.log.log("Data saved to CSV file")?;
        Ok(())
    }
}

/// Serialize `rows` with a header. With `include_index` the header gains a
/// leading empty field and every row its zero-based position.
pub fn write_rows<W: std::io::Write>(out: W, rows: &[BankRow], include_index: bool) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    if include_index {
        writer.write_record(std::iter::once("").chain(COLUMNS))?;
        for (index, row) in rows.iter().enumerate() {
            writer.serialize((
                index,
                &row.name,
                row.mc_usd_billions,
                row.mc_gbp_billions,
                row.mc_eur_billions,
                row.mc_inr_billions,
            ))?;
        }
    } else {
        writer.write_record(COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
    }

    writer
        .flush()
        .map_err(|e| EtlError::Csv(csv::Error::from(e)))?;
    Ok(())
}
