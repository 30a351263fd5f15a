//! Record normalizer
//!
//! Turns one raw spreadsheet row plus a column mapping into a typed `Job`.
//! Untyped cell values never leave this module.
//!
//! Duplicate rows are kept on purpose: duplicate handling happens later
//! against the ledger, and the user must see the true row count.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::defaults::spreadsheet_epoch;
use crate::services::pricing::PriceLookup;
use crate::types::{
    CellValue, ColumnMapping, DateRange, InvoiceStatus, Job, JobStatus, ServiceType, Table,
};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%m-%d-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"];

/// Largest serial that still maps to a four-digit year (9999-12-31)
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

const OCCUPANCY_KEYWORDS: &[&str] = &["occupied", "ocupado"];

/// Output of normalizing one table
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub jobs: Vec<Job>,
    /// Rows with neither property nor unit
    pub skipped_rows: usize,
    /// Min/max of successfully parsed dates
    pub date_range: Option<DateRange>,
}

/// Row-to-job converter with injected pricing and clock
pub struct RecordNormalizer<'a> {
    pricing: &'a dyn PriceLookup,
    today: NaiveDate,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(pricing: &'a dyn PriceLookup, today: NaiveDate) -> Self {
        Self { pricing, today }
    }

    /// Normalize every data row (rows 1..) of a table
    pub fn normalize(&self, table: &Table, mapping: &ColumnMapping) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();

        for row in table.iter().skip(1) {
            match self.normalize_row(row, mapping) {
                Some((job, parsed_date)) => {
                    if let Some(date) = parsed_date {
                        match batch.date_range.as_mut() {
                            Some(range) => range.include(date),
                            None => batch.date_range = Some(DateRange::single(date)),
                        }
                    }
                    batch.jobs.push(job);
                }
                None => batch.skipped_rows += 1,
            }
        }

        debug!(
            "Normalized {} jobs, skipped {} rows",
            batch.jobs.len(),
            batch.skipped_rows
        );
        batch
    }

    /// Convert one row. Returns the job and the date actually parsed from
    /// the row (`None` when the job fell back to today).
    fn normalize_row(&self, row: &[CellValue], mapping: &ColumnMapping) -> Option<(Job, Option<NaiveDate>)> {
        let text = |index: Option<usize>| -> String {
            index
                .and_then(|i| row.get(i))
                .map(CellValue::as_text)
                .unwrap_or_default()
        };

        let property = text(mapping.property);
        let unit_raw = text(mapping.unit);
        if property.is_empty() && unit_raw.is_empty() {
            return None;
        }

        let (unit, size) = split_unit_size(&unit_raw);
        let parsed_date = mapping.date.and_then(|i| row.get(i)).and_then(parse_date_cell);
        let date = parsed_date.unwrap_or(self.today);
        let service_type = classify_service(&text(mapping.service_type));
        let extras = text(mapping.extras);
        let notes = text(mapping.notes);
        let technician = text(mapping.technician)
            .split_whitespace()
            .next()
            .map(str::to_string);
        let status = if is_completed(&text(mapping.completed)) {
            JobStatus::Complete
        } else {
            JobStatus::InProgress
        };

        let price = self.pricing.price(&property, &size, &service_type);
        let invoice_note = generate_invoice_note(&service_type, &size, &extras, &notes);

        let job = Job {
            id: Uuid::new_v4().to_string(),
            job_number: None,
            date,
            property,
            unit,
            size,
            service_type,
            technician,
            status,
            invoice_status: InvoiceStatus::None,
            client_price: price.client,
            employee_price: price.employee,
            extras_price: 0.0,
            extras,
            notes,
            invoice_note,
            po_number: None,
            private: false,
        };

        Some((job, parsed_date))
    }
}

// =============================================================================
// FIELD PARSERS
// =============================================================================

/// Split a combined "unit - size" token. Without a separator the whole
/// token is the unit and the size is empty.
pub fn split_unit_size(raw: &str) -> (String, String) {
    let raw = raw.trim();
    match raw.split_once(['-', '–', '|', '/']) {
        Some((unit, size)) => (unit.trim().to_string(), normalize_size(size)),
        None => (raw.to_string(), String::new()),
    }
}

/// Uppercase a size label and normalize the "x" separator: `2 x 2` → `2X2`
pub fn normalize_size(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '×' { 'X' } else { c.to_ascii_uppercase() })
        .collect()
}

/// Parse a date cell: numbers are spreadsheet serial days, text is tried
/// against the known formats.
pub fn parse_date_cell(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Number(serial) => parse_serial_date(*serial),
        CellValue::Text(text) => parse_date_text(text),
        CellValue::Empty => None,
    }
}

fn parse_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL_DAY {
        return None;
    }
    spreadsheet_epoch().checked_add_days(chrono::Days::new(serial.floor() as u64))
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let plausible = |d: &NaiveDate| d.year() >= 1900;

    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .find(plausible)
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
                .find(plausible)
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
        // CSV exports carry spreadsheet serials as plain text
        .or_else(|| text.parse::<f64>().ok().and_then(parse_serial_date))
}

/// Classify a free-text service label
pub fn classify_service(raw: &str) -> ServiceType {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ServiceType::Other;
    }

    let lower = trimmed.to_lowercase();
    let touch = lower.contains("touch") || lower.contains("retoque");
    let paint = lower.contains("paint") || lower.contains("pint");
    let clean = lower.contains("clean") || lower.contains("limp");

    match (touch, paint, clean) {
        (true, true, _) => ServiceType::TouchUpPaint,
        (true, false, true) => ServiceType::TouchUpClean,
        (true, false, false) => ServiceType::TouchUp,
        (false, _, true) => ServiceType::Clean,
        (false, true, false) => ServiceType::Paint,
        (false, false, false) => ServiceType::Custom(trimmed.to_string()),
    }
}

/// Completion column: any digit, or the words "yes"/"done"
pub fn is_completed(raw: &str) -> bool {
    if raw.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }
    raw.split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case("yes") || word.eq_ignore_ascii_case("done"))
}

fn is_occupancy(text: &str) -> bool {
    let lower = text.to_lowercase();
    OCCUPANCY_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Build the invoice line for a job, e.g. `Occupied 2X2 Paint + Blinds`
pub fn generate_invoice_note(service_type: &ServiceType, size: &str, extras: &str, notes: &str) -> String {
    let occupancy = if is_occupancy(extras) || is_occupancy(notes) {
        "Occupied"
    } else {
        "Vacant"
    };

    let head = [occupancy, size.trim(), service_type.label().trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut parts = vec![head];
    parts.extend(
        extras
            .split([',', '+', ';', '/'])
            .map(str::trim)
            .filter(|token| !token.is_empty() && !is_occupancy(token))
            .map(str::to_string),
    );

    parts.join(" + ")
}
