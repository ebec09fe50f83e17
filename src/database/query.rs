use std::fmt;
use std::io::Write;

use rusqlite::types::ValueRef;

use super::Database;
use crate::error::{EtlError, Result};

/// The fixed report queries run after every load
pub fn default_queries(table_name: &str) -> [String; 3] {
    [
        format!("SELECT * FROM {table_name}"),
        format!("SELECT AVG(MC_GBP_Billions) FROM {table_name}"),
        format!("SELECT Name FROM {table_name} LIMIT 5"),
    ]
}

/// A single dynamically typed value from a result row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NULL"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Real(r) => write!(f, "{r:?}"),
            Cell::Text(t) => f.write_str(t),
            Cell::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// Column names plus every row returned by a query
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for ResultSet {
    /// Right-aligned text table with a leading row-index column
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            writeln!(f, "Empty result set")?;
            return write!(f, "Columns: [{}]", self.columns.join(", "));
        }

        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::to_string).collect())
            .collect();

        let index_width = (self.rows.len() - 1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                rendered
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (name, width) in self.columns.iter().zip(widths.iter().copied()) {
            write!(f, "  {name:>width$}")?;
        }

        for (index, row) in rendered.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{index:<index_width$}")?;
            for (cell, width) in row.iter().zip(widths.iter().copied()) {
                write!(f, "  {cell:>width$}")?;
            }
        }
        Ok(())
    }
}

/// Run `sql` against `db` and print it, prefixed by the query text, to `out`
pub fn run_query<W: Write>(db: &Database, sql: &str, out: &mut W) -> Result<ResultSet> {
    writeln!(out, "\nQuery: {sql}").map_err(EtlError::Output)?;
    let result = db.query(sql)?;
    writeln!(out, "{result}").map_err(EtlError::Output)?;
    Ok(result)
}
