//! Engine error types

use thiserror::Error;

use crate::types::CanonicalField;

/// File-level ingestion failure. None of these abort a multi-file import;
/// they are recorded per file and the batch continues.
#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("unsupported file format: {file}")]
    UnsupportedFormat { file: String },

    #[error("no sheets found in {file}")]
    NoSheets { file: String },

    #[error("{file} has no data rows")]
    EmptyBody { file: String },

    #[error("failed to read {file}: {detail}")]
    Read { file: String, detail: String },

    #[error("{file}: could not map required columns: {}", join_fields(.missing))]
    MissingColumns {
        file: String,
        missing: Vec<CanonicalField>,
    },
}

fn join_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure of the external column-mapping service
#[derive(Debug, Error)]
pub enum MappingServiceError {
    #[error("mapping service timed out after {0}s")]
    Timeout(u64),

    #[error("mapping service unavailable: {0}")]
    Unavailable(String),

    #[error("mapping service could not map the columns")]
    Unmappable,
}

/// Ledger mutation failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("job numbers exhausted after {0}")]
    JobNumbersExhausted(u32),
}
