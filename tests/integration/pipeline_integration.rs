//! End-to-end runs against local fixtures

use assert_matches::assert_matches;
use banks_etl::database::Database;
use banks_etl::models::BankRow;
use banks_etl::pipeline::{Pipeline, PipelineStage};
use banks_etl::progress_log::ProgressLog;
use banks_etl::EtlError;
use pretty_assertions::assert_eq;
use test_log::test;

use crate::common::{html_page, numbered_banks, Fixture, STANDARD_RATES};

/// Twelve banks with "Acme Bank" third and a trailing newline in its cap cell
fn acme_page() -> String {
    let mut banks = numbered_banks(12);
    banks[2] = ("Acme Bank".to_string(), "123.45\n".to_string());
    html_page(&banks)
}

fn run(fixture: &Fixture) -> (banks_etl::pipeline::RunSummary, String) {
    let mut pipeline = Pipeline::new(fixture.config.clone()).expect("Failed to build pipeline");
    let mut out: Vec<u8> = Vec::new();
    let summary = pipeline.run(&mut out).expect("Pipeline run failed");
    assert_eq!(pipeline.stage(), PipelineStage::Closed);
    (summary, String::from_utf8(out).unwrap())
}

#[test]
fn test_acme_bank_scenario() {
    let fixture = Fixture::new(&acme_page(), STANDARD_RATES);
    let (summary, _) = run(&fixture);
    assert_eq!(summary.rows, 10);

    let db = Database::open(&fixture.config.database_path, ProgressLog::new(&fixture.config.log_path))
        .unwrap();
    let stored = db.read_table("Largest_banks").unwrap();
    assert_eq!(stored.len(), 10);
    assert_eq!(
        stored[2],
        BankRow {
            name: "Acme Bank".to_string(),
            mc_usd_billions: 123.45,
            mc_gbp_billions: 98.76,
            mc_eur_billions: 111.11,
            mc_inr_billions: 9876.0,
        }
    );
    assert!(stored.iter().all(|row| row.name != "Bank 11" && row.name != "Bank 12"));
    assert_eq!(stored[9].name, "Bank 10");

    let csv_text = fixture.read(&fixture.config.csv_path);
    assert!(csv_text.contains("\n2,Acme Bank,123.45,98.76,111.11,9876.0\n"));
}

#[test]
fn test_queries_are_printed_in_order() {
    let fixture = Fixture::new(&acme_page(), STANDARD_RATES);
    let (summary, printed) = run(&fixture);
    assert_eq!(summary.queries_run, 3);

    let first = printed.find("Query: SELECT * FROM Largest_banks").unwrap();
    let second = printed
        .find("Query: SELECT AVG(MC_GBP_Billions) FROM Largest_banks")
        .unwrap();
    let third = printed.find("Query: SELECT Name FROM Largest_banks LIMIT 5").unwrap();
    assert!(first < second && second < third);

    let limited = &printed[third..];
    assert!(limited.contains("Bank 5"));
    assert!(!limited.contains("Bank 6"));
}

#[test]
fn test_second_run_replaces_outputs() {
    let fixture = Fixture::new(&acme_page(), STANDARD_RATES);
    run(&fixture);
    let first_csv = fixture.read(&fixture.config.csv_path);
    run(&fixture);

    assert_eq!(fixture.read(&fixture.config.csv_path), first_csv);
    assert_eq!(first_csv.lines().count(), 11);

    let db = Database::open(&fixture.config.database_path, ProgressLog::new(&fixture.config.log_path))
        .unwrap();
    assert_eq!(db.count_rows("Largest_banks").unwrap(), 10);

    // The progress log is the only output that accumulates
    let log_text = fixture.read(&fixture.config.log_path);
    assert_eq!(log_text.lines().count(), 10);
}

#[test]
fn test_progress_log_messages() {
    let fixture = Fixture::new(&html_page(&numbered_banks(3)), STANDARD_RATES);
    run(&fixture);

    let log_text = fixture.read(&fixture.config.log_path);
    let messages: Vec<&str> = log_text
        .lines()
        .map(|line| line.split_once(" : ").expect("line without separator").1)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Data extraction complete. Initiating Transformation process",
            "Data transformation complete. Initiating Loading process",
            "Data saved to CSV file",
            "Data loaded to Database as a table, Executing queries",
            "Process Complete",
        ]
    );
}

#[test]
fn test_missing_inr_aborts_before_sinks() {
    let fixture = Fixture::new(&acme_page(), "Currency,Rate\nEUR,0.9\nGBP,0.8\n");
    let mut pipeline = Pipeline::new(fixture.config.clone()).unwrap();

    assert_matches!(
        pipeline.run(&mut Vec::<u8>::new()),
        Err(EtlError::MissingCurrency(code)) if code == "INR"
    );
    assert_eq!(pipeline.stage(), PipelineStage::Aborted);
    assert!(!fixture.config.csv_path.exists());
    assert!(!fixture.config.database_path.exists());
}

#[test]
fn test_custom_table_and_limit() {
    let mut fixture = Fixture::new(&acme_page(), STANDARD_RATES);
    fixture.config.table_name = "Top_banks".to_string();
    fixture.config.row_limit = 3;
    fixture.config.csv_index = false;

    let (summary, printed) = run(&fixture);
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.table_name, "Top_banks");
    assert!(printed.contains("Query: SELECT * FROM Top_banks"));

    let csv_text = fixture.read(&fixture.config.csv_path);
    assert!(csv_text.starts_with("Name,MC_USD_Billions"));
    assert_eq!(csv_text.lines().count(), 4);
}
