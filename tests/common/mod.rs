//! Common test utilities and fixtures

use banks_etl::models::Config;
use tempfile::TempDir;

/// Rates used by the end-to-end scenarios
pub const STANDARD_RATES: &str = "Currency,Rate\nEUR,0.9\nGBP,0.8\nINR,80.0\n";

/// One `<tr>` shaped like a row of the ranking table
pub fn bank_row(rank: usize, name: &str, market_cap: &str) -> String {
    format!(
        "<tr>\n<td>{rank}\n</td>\n<td><span class=\"flagicon\"><img src=\"flag.png\"></span> \
         <a href=\"/wiki/Bank_{rank}\" title=\"{name}\">{name}</a>\n</td>\n<td>{market_cap}\n</td>\n</tr>\n"
    )
}

/// `count` banks named "Bank 1".. with market caps 100.0, 99.0, ..
pub fn numbered_banks(count: usize) -> Vec<(String, String)> {
    (1..=count)
        .map(|i| (format!("Bank {i}"), format!("{}.0", 101 - i)))
        .collect()
}

/// Full page with a header row followed by one row per bank
pub fn html_page(banks: &[(String, String)]) -> String {
    let rows: String = banks
        .iter()
        .enumerate()
        .map(|(i, (name, cap))| bank_row(i + 1, name, cap))
        .collect();
    format!(
        "<!DOCTYPE html>\n<html><head><title>List of largest banks</title></head><body>\n\
         <h2>By market capitalization</h2>\n\
         <table class=\"wikitable\">\n<tbody>\n\
         <tr>\n<th>Rank\n</th>\n<th>Bank name\n</th>\n<th>Market cap<br>(US$ billion)\n</th></tr>\n\
         {rows}</tbody></table>\n\
         <h2>By total assets</h2>\n\
         <table class=\"wikitable\"><tbody>{}</tbody></table>\n\
         </body></html>",
        bank_row(1, "Somewhere Else", "1.0")
    )
}

/// Scratch directory holding a page, a rate table and a config pointing at both
pub struct Fixture {
    pub dir: TempDir,
    pub config: Config,
}

impl Fixture {
    pub fn new(html: &str, rates: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let html_path = dir.path().join("banks.html");
        let rates_path = dir.path().join("exchange_rate.csv");
        std::fs::write(&html_path, html).expect("Failed to write page");
        std::fs::write(&rates_path, rates).expect("Failed to write rates");

        let config = Config {
            source_url: html_path.to_string_lossy().into_owned(),
            rates_source: rates_path.to_string_lossy().into_owned(),
            csv_path: dir.path().join("largest_bank_data.csv"),
            database_path: dir.path().join("Banks.db"),
            log_path: dir.path().join("code_log.txt"),
            ..Config::default()
        };

        Self { dir, config }
    }

    pub fn read(&self, path: &std::path::Path) -> String {
        std::fs::read_to_string(path).expect("Failed to read output")
    }
}
