use std::borrow::Cow;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::fetch::Fetcher;
use crate::models::BankRecord;
use crate::progress_log::ProgressLog;

/// Pulls the bank ranking table out of an HTML page
#[derive(Debug)]
pub struct Extractor {
    fetcher: Fetcher,
    row_limit: usize,
    log: ProgressLog,
}

impl Extractor {
    pub fn new(fetcher: Fetcher, row_limit: usize, log: ProgressLog) -> Self {
        Self {
            fetcher,
            row_limit,
            log,
        }
    }

    /// Fetch `source_url` and parse up to `row_limit` banks from its first table body
    pub fn extract(&self, source_url: &str) -> Result<Vec<BankRecord>> {
        info!("📊 Extracting bank table from {}", source_url);
        let html = self.fetcher.fetch_text(source_url)?;
        let records = parse_bank_table(&html, self.row_limit)?;
        info!("✅ Extracted {} banks", records.len());

        self.log
            .log("Data extraction complete. Initiating Transformation process")?;
        Ok(records)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::Parse(format!("invalid selector {css:?}: {e:?}")))
}

/// Attribute stamped on every `<tbody>` tag present in the page source.
const LITERAL_TBODY_ATTR: &str = "data-literal-tbody";

/// Mark the `<tbody>` tags written in `html` so they can be told apart from the
/// ones the HTML parser inserts into bare tables.
fn mark_literal_tbodies(html: &str) -> Result<Cow<'_, str>> {
    let pattern = Regex::new(r"(?i)<tbody(\s|>|/)")
        .map_err(|e| EtlError::Parse(format!("invalid tbody pattern: {e}")))?;
    Ok(pattern.replace_all(html, format!("<tbody {LITERAL_TBODY_ATTR}$1").as_str()))
}

/// Parse the first `<tbody>` written in `html` into bank records.
///
/// Tables without an explicit `<tbody>` are ignored. Rows without `<td>` cells (header rows) are skipped. Once `limit` banks are
/// accepted the remaining rows are walked but not converted. The bank name is
/// the second cell's text and the market cap is the third cell's text parsed
/// as a number.
pub fn parse_bank_table(html: &str, limit: usize) -> Result<Vec<BankRecord>> {
    let document = Html::parse_document(&mark_literal_tbodies(html)?);
    let tbody_sel = selector(&format!("tbody[{LITERAL_TBODY_ATTR}]"))?;
    let tr_sel = selector("tr")?;
    let td_sel = selector("td")?;

    let tbody = document
        .select(&tbody_sel)
        .next()
        .ok_or_else(|| EtlError::Parse("page has no <tbody> element".to_string()))?;

    let mut records = Vec::with_capacity(limit);
    for (row_index, row) in tbody.select(&tr_sel).enumerate() {
        let cells: Vec<ElementRef> = row.select(&td_sel).collect();
        if cells.is_empty() || records.len() >= limit {
            continue;
        }
        if cells.len() < 3 {
            return Err(EtlError::Parse(format!(
                "row {} has {} data cells, expected at least 3",
                row_index,
                cells.len()
            )));
        }

        let name = stripped_text(cells[1]);
        let market_cap = parse_market_cap(&stripped_text(cells[2]), row_index)?;
        debug!("Row {}: {} = {}", row_index, name, market_cap);

        records.push(BankRecord {
            name,
            market_cap_usd: market_cap,
        });
    }

    Ok(records)
}

/// Text of `element` with each fragment trimmed and empty fragments dropped.
fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn parse_market_cap(text: &str, row_index: usize) -> Result<f64> {
    let cleaned = text.replace('\n', "");
    cleaned.trim().parse::<f64>().map_err(|_| {
        EtlError::Parse(format!(
            "market cap {:?} in row {} is not numeric",
            cleaned, row_index
        ))
    })
}
