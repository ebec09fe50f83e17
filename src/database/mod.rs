use std::path::Path;

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::models::BankRow;
use crate::progress_log::ProgressLog;
use crate::utils::is_plain_identifier;

pub mod query;
pub use query::{default_queries, Cell, ResultSet};

/// File-backed SQLite store for the converted bank table.
///
/// One connection is opened per run and shared by the loader and the query
/// runner. Call [`Database::close`] to release it explicitly.
pub struct Database {
    connection: Connection,
    log: ProgressLog,
}

impl Database {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>, log: ProgressLog) -> Result<Self> {
        let path = path.as_ref();
        let connection = Connection::open(path)?;
        info!("Database opened at {}", path.display());
        Ok(Self { connection, log })
    }

    /// Drop `table_name` if present, recreate it and insert every row.
    ///
    /// Runs in one transaction, so a failed insert leaves the previous table.
    pub fn replace_table(&mut self, rows: &[BankRow], table_name: &str) -> Result<()> {
        check_table_name(table_name)?;

        let tx = self.connection.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS \"{table_name}\""), [])?;
        tx.execute(
            &format!(
                "CREATE TABLE \"{table_name}\" (
                    Name TEXT,
                    MC_USD_Billions REAL,
                    MC_GBP_Billions REAL,
                    MC_EUR_Billions REAL,
                    MC_INR_Billions REAL
                )"
            ),
            [],
        )?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO \"{table_name}\" (
                    Name, MC_USD_Billions, MC_GBP_Billions, MC_EUR_Billions, MC_INR_Billions
                ) VALUES (?1, ?2, ?3, ?4, ?5)"
            ))?;
            for row in rows {
                stmt.execute(params![
                    row.name,
                    row.mc_usd_billions,
                    row.mc_gbp_billions,
                    row.mc_eur_billions,
                    row.mc_inr_billions
                ])?;
            }
        }
        tx.commit()?;
        info!("💾 Replaced table {} with {} rows", table_name, rows.len());

        self.log
            .log("Data loaded to Database as a table, Executing queries")?;
        Ok(())
    }

    /// Read every row of `table_name` back in insertion order
    pub fn read_table(&self, table_name: &str) -> Result<Vec<BankRow>> {
        check_table_name(table_name)?;

        let mut stmt = self.connection.prepare(&format!(
            "SELECT Name, MC_USD_Billions, MC_GBP_Billions, MC_EUR_Billions, MC_INR_Billions
             FROM \"{table_name}\" ORDER BY rowid"
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok(BankRow {
                name: row.get(0)?,
                mc_usd_billions: row.get(1)?,
                mc_gbp_billions: row.get(2)?,
                mc_eur_billions: row.get(3)?,
                mc_inr_billions: row.get(4)?,
            })
        })?;

        let mut banks = Vec::new();
        for row in rows {
            banks.push(row?);
        }
        Ok(banks)
    }

    /// Number of rows currently stored in `table_name`
    pub fn count_rows(&self, table_name: &str) -> Result<usize> {
        check_table_name(table_name)?;
        let count: i64 = self.connection.query_row(
            &format!("SELECT COUNT(*) FROM \"{table_name}\""),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Execute a read-only statement and collect every row
    pub fn query(&self, sql: &str) -> Result<ResultSet> {
        debug!("Executing query: {}", sql);
        let mut stmt = self.connection.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let cells = (0..columns.len())
                .map(|i| row.get_ref(i).map(Cell::from))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.push(cells);
        }

        Ok(ResultSet { columns, rows })
    }

    /// Release the connection
    pub fn close(self) -> Result<()> {
        self.connection.close().map_err(|(_, e)| EtlError::Database(e))?;
        info!("Database connection closed");
        Ok(())
    }
}

fn check_table_name(table_name: &str) -> Result<()> {
    if is_plain_identifier(table_name) {
        Ok(())
    } else {
        Err(EtlError::Config(format!(
            "table name {table_name:?} must be a plain SQL identifier"
        )))
    }
}
