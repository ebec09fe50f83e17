use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use tracing::{error, info};

use crate::csv_sink::CsvSink;
use crate::database::{default_queries, query::run_query, Database};
use crate::error::Result;
use crate::extract::Extractor;
use crate::fetch::Fetcher;
use crate::models::Config;
use crate::progress_log::ProgressLog;
use crate::transform::Transformer;

/// Where a run currently is. Stages only move forward; any failure jumps to
/// `Aborted` without undoing outputs already written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Extracting,
    Transforming,
    WritingCsv,
    WritingDb,
    Querying,
    Closed,
    Aborted,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Transforming => "transforming",
            PipelineStage::WritingCsv => "writing CSV",
            PipelineStage::WritingDb => "writing database",
            PipelineStage::Querying => "querying",
            PipelineStage::Closed => "closed",
            PipelineStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub rows: usize,
    pub csv_path: PathBuf,
    pub database_path: PathBuf,
    pub table_name: String,
    pub queries_run: usize,
}

/// Extract, convert and load the largest-banks table in one pass
#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    log: ProgressLog,
    extractor: Extractor,
    transformer: Transformer,
    csv_sink: CsvSink,
    run_queries: bool,
    stage: PipelineStage,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let log = ProgressLog::new(&config.log_path);
        let fetcher = Fetcher::new()?;
        let extractor = Extractor::new(fetcher.clone(), config.row_limit, log.clone());
        let transformer = Transformer::new(fetcher, log.clone());
        let csv_sink = CsvSink::new(&config.csv_path, config.csv_index, log.clone());

        Ok(Self {
            config,
            log,
            extractor,
            transformer,
            csv_sink,
            run_queries: true,
            stage: PipelineStage::Idle,
        })
    }

    /// Whether to run the report queries after loading
    pub fn with_queries(mut self, run_queries: bool) -> Self {
        self.run_queries = run_queries;
        self
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage in order, printing query results to `out`
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        match self.run_stages(out) {
            Ok(summary) => Ok(summary),
            Err(e) => {
                error!("❌ Pipeline aborted while {}: {}", self.stage, e);
                self.stage = PipelineStage::Aborted;
                Err(e)
            }
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        info!("▶ {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    fn run_stages<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        self.enter(PipelineStage::Extracting);
        let records = self.extractor.extract(&self.config.source_url)?;

        self.enter(PipelineStage::Transforming);
        let rows = self
            .transformer
            .transform(&records, &self.config.rates_source)?;

        self.enter(PipelineStage::WritingCsv);
        self.csv_sink.write(&rows)?;

        self.enter(PipelineStage::WritingDb);
        let mut db = Database::open(&self.config.database_path, self.log.clone())?;
        db.replace_table(&rows, &self.config.table_name)?;

        let mut queries_run = 0;
        if self.run_queries {
            self.enter(PipelineStage::Querying);
            for sql in default_queries(&self.config.table_name) {
                run_query(&db, &sql, out)?;
                queries_run += 1;
            }
        }

        self.log.log("Process Complete")?;
        db.close()?;
        self.enter(PipelineStage::Closed);

        Ok(RunSummary {
            rows: rows.len(),
            csv_path: self.config.csv_path.clone(),
            database_path: self.config.database_path.clone(),
            table_name: self.config.table_name.clone(),
            queries_run,
        })
    }
}
