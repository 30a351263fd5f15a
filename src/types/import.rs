//! Import types for spreadsheet ingestion and duplicate reconciliation

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::job::Job;

// =============================================================================
// RAW TABLE
// =============================================================================

/// A single decoded spreadsheet cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Text rendering; whole numbers are printed without a fraction
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Decoded table: row 0 holds the headers, rows 1.. hold data
pub type Table = Vec<Vec<CellValue>>;

/// File handed to the ingestion pipeline
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

// =============================================================================
// ISSUES & REPORTS
// =============================================================================

/// Import issue level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportIssueLevel {
    Info,
    Warning,
    Error,
}

/// Structured log entry produced while ingesting files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportIssue {
    pub level: ImportIssueLevel,
    pub file: String,
    pub message: String,
    pub detail: Option<String>,
}

impl ImportIssue {
    pub fn new(level: ImportIssueLevel, file: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            file: file.to_string(),
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Inclusive range of parsed job dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn include(&mut self, date: NaiveDate) {
        if date < self.start {
            self.start = date;
        }
        if date > self.end {
            self.end = date;
        }
    }

    /// Merge two optional ranges
    pub fn merge(a: Option<DateRange>, b: Option<DateRange>) -> Option<DateRange> {
        match (a, b) {
            (Some(mut a), Some(b)) => {
                a.include(b.start);
                a.include(b.end);
                Some(a)
            }
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Per-file result of ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FileOutcome {
    #[serde(rename_all = "camelCase")]
    Imported {
        file: String,
        job_count: usize,
        skipped_rows: usize,
    },
    Failed {
        file: String,
        error: String,
    },
}

/// Result of ingesting one or more files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    /// Normalized jobs of all successful files, in file then row order
    pub jobs: Vec<Job>,
    pub files: Vec<FileOutcome>,
    pub issues: Vec<ImportIssue>,
    pub date_range: Option<DateRange>,
}

// =============================================================================
// DUPLICATES & RESOLUTION
// =============================================================================

/// Incoming job together with its position in the batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingJob {
    pub batch_index: usize,
    pub job: Job,
}

/// Incoming record whose signature matches an existing ledger job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePair {
    pub batch_index: usize,
    pub existing: Job,
    pub incoming: Job,
}

/// Partition of an incoming batch against the ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    pub new_jobs: Vec<IncomingJob>,
    pub conflicts: Vec<CandidatePair>,
}

impl DuplicateReport {
    pub fn incoming_count(&self) -> usize {
        self.new_jobs.len() + self.conflicts.len()
    }
}

/// User decision for one candidate pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    #[default]
    Skip,
    Overwrite,
    KeepBoth,
}

/// Decisions keyed by incoming job id
pub type ResolutionMap = HashMap<String, Resolution>;

/// Final insert/update sets after resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedImport {
    /// Jobs to admit, in batch order, without job numbers
    pub inserts: Vec<Job>,
    /// Incoming values carrying the existing job's id and number
    pub updates: Vec<Job>,
    pub skipped: usize,
}
