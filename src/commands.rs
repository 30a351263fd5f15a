//! Command execution for the binary
//!
//! Each command loads the ledger snapshot, runs one engine operation and
//! saves the resulting state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::cli::Command;
use crate::config::Config;
use crate::services::column_mapper::ColumnMapper;
use crate::services::ingestion::{finalize_import, prepare_import, Ingestor};
use crate::services::ledger::{delete_jobs, undo, undo_latest, LedgerState};
use crate::services::mapping_client::{HttpColumnMapper, MappingClientConfig};
use crate::services::pricing::{PriceLookup, PriceTable};
use crate::services::snapshot_store::LedgerStore;
use crate::services::tabular_reader::TabularFormat;
use crate::types::{
    DuplicateReport, FileOutcome, ImportIssueLevel, Job, Resolution, ResolutionMap, SourceFile,
};

/// Wire up the ingestor from configuration
pub fn build_ingestor(config: &Config, today: NaiveDate) -> Result<Ingestor> {
    let mapper = match &config.column_mapper_url {
        Some(url) => {
            let client_config = MappingClientConfig {
                url: url.clone(),
                timeout_seconds: config.column_mapper_timeout_secs,
            };
            info!("Column mapping service: {}", url);
            ColumnMapper::with_service(
                Box::new(HttpColumnMapper::new(client_config)?),
                Duration::from_secs(config.column_mapper_timeout_secs),
            )
        }
        None => {
            info!("No column mapping service configured, using header heuristics only");
            ColumnMapper::heuristics_only()
        }
    };

    let pricing: Arc<dyn PriceLookup> = match &config.price_table_path {
        Some(path) => Arc::new(PriceTable::load(path)?),
        None => {
            warn!("PRICE_TABLE_PATH not set, imported jobs will have zero prices");
            Arc::new(PriceTable::default())
        }
    };

    Ok(Ingestor::new(mapper, pricing, today))
}

/// Read tabular files from disk; other paths are dropped without reading
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for path in paths {
        if TabularFormat::from_path(path).is_none() {
            continue;
        }
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.push(SourceFile::new(name, bytes));
    }
    Ok(files)
}

/// Apply one decision to every candidate pair
pub fn blanket_decisions(report: &DuplicateReport, resolution: Resolution) -> ResolutionMap {
    report
        .conflicts
        .iter()
        .map(|pair| (pair.incoming.id.clone(), resolution))
        .collect()
}

fn format_job(job: &Job) -> String {
    format!(
        "{:>7}  {}  {:<20} {:<8} {:<6} {:<16} {:<12} {:>8.2}  {}",
        job.job_number.map(|n| n.to_string()).unwrap_or_default(),
        job.date,
        job.property,
        job.unit,
        job.size,
        job.service_type.label(),
        format!("{:?}", job.status),
        job.client_price,
        job.id
    )
}

/// Run one command against the configured ledger
pub async fn run(command: Command, config: &Config) -> Result<()> {
    let store = LedgerStore::new(&config.ledger_path);
    let state = store.load_or_default(config.history_capacity)?;

    let next = match command {
        Command::Import { files, on_conflict } => {
            let ingestor = build_ingestor(config, Local::now().date_naive())?;
            let sources = read_sources(&files)?;
            let report = ingestor.ingest(sources).await;

            for outcome in &report.files {
                match outcome {
                    FileOutcome::Imported {
                        file,
                        job_count,
                        skipped_rows,
                    } => println!("{file}: {job_count} jobs ({skipped_rows} rows skipped)"),
                    FileOutcome::Failed { file, error } => println!("{file}: FAILED {error}"),
                }
            }
            for issue in report.issues.iter().filter(|i| i.level != ImportIssueLevel::Info) {
                println!("[{:?}] {}: {}", issue.level, issue.file, issue.message);
            }
            if let Some(range) = report.date_range {
                println!("Dates: {} .. {}", range.start, range.end);
            }

            let duplicates = prepare_import(&state, report.jobs);
            let decisions = blanket_decisions(&duplicates, on_conflict.into());
            println!(
                "{} new, {} possible duplicates ({:?})",
                duplicates.new_jobs.len(),
                duplicates.conflicts.len(),
                on_conflict
            );
            Some(finalize_import(&state, duplicates, &decisions)?)
        }
        Command::List => {
            for job in &state.jobs {
                println!("{}", format_job(job));
            }
            println!("{} jobs", state.len());
            None
        }
        Command::History { limit } => {
            for entry in state.history.recent(limit) {
                println!(
                    "{}  {}  {:<12} {}",
                    entry.id,
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    format!("{:?}", entry.kind),
                    entry.description
                );
            }
            None
        }
        Command::Undo { entry_id } => {
            let next = match entry_id {
                Some(id) => undo(&state, id),
                None => undo_latest(&state),
            };
            if next == state {
                println!("Nothing to undo");
                None
            } else {
                Some(next)
            }
        }
        Command::Delete { job_ids } => {
            let next = delete_jobs(&state, &job_ids)?;
            println!("Deleted {} jobs", state.len() - next.len());
            Some(next)
        }
    };

    if let Some(next) = next {
        store.save(&next)?;
        info!("Ledger saved to {}", store.path().display());
        println!("{}", ledger_summary(&next));
    }

    Ok(())
}

pub fn ledger_summary(state: &LedgerState) -> String {
    format!("{} jobs, {} undoable actions", state.len(), state.history.len())
}
