//! Ingestion pipeline
//!
//! Files are processed one at a time: read → map columns → normalize.
//! A failing file is recorded in the report and the batch moves on to the
//! next one. The resulting jobs are then partitioned against the ledger
//! (`prepare_import`) and, once the user has decided every conflict,
//! admitted (`finalize_import`).

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{IngestError, LedgerError};
use crate::services::column_mapper::ColumnMapper;
use crate::services::duplicates::detect_duplicates;
use crate::services::ledger::{commit_import, LedgerState};
use crate::services::normalizer::{NormalizedBatch, RecordNormalizer};
use crate::services::pricing::PriceLookup;
use crate::services::resolver::resolve;
use crate::services::tabular_reader::{read_table, TabularFormat};
use crate::types::{
    DateRange, DuplicateReport, FileOutcome, ImportIssue, ImportIssueLevel, IngestionReport, Job,
    ResolutionMap, SourceFile,
};

/// Turns uploaded files into normalized, unnumbered jobs
pub struct Ingestor {
    mapper: ColumnMapper,
    pricing: Arc<dyn PriceLookup>,
    today: NaiveDate,
}

impl Ingestor {
    pub fn new(mapper: ColumnMapper, pricing: Arc<dyn PriceLookup>, today: NaiveDate) -> Self {
        Self { mapper, pricing, today }
    }

    /// Ingest a multi-file selection.
    ///
    /// Files without a tabular extension are skipped silently. Every other
    /// file ends up in `report.files` as imported or failed.
    pub async fn ingest(&self, files: Vec<SourceFile>) -> IngestionReport {
        let start = Instant::now();
        let mut report = IngestionReport::default();

        for file in files {
            if TabularFormat::from_name(&file.name).is_none() {
                debug!("Skipping {}: not a tabular file", file.name);
                continue;
            }

            match self.ingest_file(&file).await {
                Ok(batch) => {
                    info!(
                        "Ingested {}: {} jobs, {} rows skipped",
                        file.name,
                        batch.jobs.len(),
                        batch.skipped_rows
                    );
                    let mut issue = ImportIssue::new(
                        ImportIssueLevel::Info,
                        &file.name,
                        format!("Read {} jobs", batch.jobs.len()),
                    );
                    if batch.skipped_rows > 0 {
                        issue = issue.with_detail(format!(
                            "{} rows without property or unit were skipped",
                            batch.skipped_rows
                        ));
                    }
                    report.issues.push(issue);
                    report.files.push(FileOutcome::Imported {
                        file: file.name.clone(),
                        job_count: batch.jobs.len(),
                        skipped_rows: batch.skipped_rows,
                    });
                    report.date_range = DateRange::merge(report.date_range, batch.date_range);
                    report.jobs.extend(batch.jobs);
                }
                Err(e) => {
                    warn!("Failed to ingest {}: {}", file.name, e);
                    report.issues.push(ImportIssue::new(ImportIssueLevel::Error, &file.name, e.to_string()));
                    report.files.push(FileOutcome::Failed {
                        file: file.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Ingestion finished in {}ms: {} jobs from {} files",
            start.elapsed().as_millis(),
            report.jobs.len(),
            report.files.len()
        );
        report
    }

    async fn ingest_file(&self, file: &SourceFile) -> Result<NormalizedBatch, IngestError> {
        let table = read_table(file)?;

        let headers = &table[0];
        let sample_row = table.get(1).map(Vec::as_slice).unwrap_or_default();
        let mapping = self.mapper.map(headers, sample_row).await;

        let missing = mapping.missing_mandatory();
        if !missing.is_empty() {
            return Err(IngestError::MissingColumns {
                file: file.name.clone(),
                missing,
            });
        }

        let normalizer = RecordNormalizer::new(self.pricing.as_ref(), self.today);
        Ok(normalizer.normalize(&table, &mapping))
    }
}

/// Partition ingested jobs against the current ledger
pub fn prepare_import(state: &LedgerState, jobs: Vec<Job>) -> DuplicateReport {
    let report = detect_duplicates(&state.jobs, jobs);
    info!(
        "Import prepared: {} new, {} possible duplicates",
        report.new_jobs.len(),
        report.conflicts.len()
    );
    report
}

/// Apply the user's decisions and admit the result as one undoable import
pub fn finalize_import(
    state: &LedgerState,
    report: DuplicateReport,
    decisions: &ResolutionMap,
) -> Result<LedgerState, LedgerError> {
    commit_import(state, resolve(report, decisions))
}
