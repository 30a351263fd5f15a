//! Job ledger types
//!
//! A `Job` is one unit of field work (a clean, a paint, a touch-up) at a
//! property unit. Jobs are created by manual entry, by duplication of an
//! existing job, or by spreadsheet import.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// First job number ever handed out is `JOB_NUMBER_FLOOR + 1`.
pub const JOB_NUMBER_FLOOR: u32 = 100_100;

// =============================================================================
// ENUMS
// =============================================================================

/// Service type of a job.
///
/// The known labels map to dedicated variants; anything else is kept
/// verbatim in `Custom` so that imported free text is never lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    Clean,
    Paint,
    TouchUpPaint,
    TouchUpClean,
    TouchUp,
    Other,
    Custom(String),
}

impl ServiceType {
    /// Human-readable label, also used as the serialized form
    pub fn label(&self) -> &str {
        match self {
            ServiceType::Clean => "Clean",
            ServiceType::Paint => "Paint",
            ServiceType::TouchUpPaint => "Touch-Up Paint",
            ServiceType::TouchUpClean => "Touch-Up Clean",
            ServiceType::TouchUp => "Touch-Up",
            ServiceType::Other => "Other",
            ServiceType::Custom(raw) => raw.as_str(),
        }
    }
}

impl Default for ServiceType {
    fn default() -> Self {
        ServiceType::Other
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for ServiceType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Clean" => ServiceType::Clean,
            "Paint" => ServiceType::Paint,
            "Touch-Up Paint" => ServiceType::TouchUpPaint,
            "Touch-Up Clean" => ServiceType::TouchUpClean,
            "Touch-Up" => ServiceType::TouchUp,
            "Other" => ServiceType::Other,
            _ => ServiceType::Custom(raw),
        }
    }
}

impl From<ServiceType> for String {
    fn from(service_type: ServiceType) -> Self {
        service_type.label().to_string()
    }
}

/// Work status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Complete,
    Paid,
    Cancel,
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Pending
    }
}

/// Invoice status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    None,
    Draft,
    Sent,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::None
    }
}

// =============================================================================
// JOB
// =============================================================================

/// Job entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Opaque identifier, assigned once
    pub id: String,
    /// Sequential number, `None` until the job is admitted to the ledger
    pub job_number: Option<u32>,
    pub date: NaiveDate,
    pub property: String,
    pub unit: String,
    pub size: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub technician: Option<String>,
    pub status: JobStatus,
    pub invoice_status: InvoiceStatus,
    pub client_price: f64,
    pub employee_price: f64,
    pub extras_price: f64,
    pub extras: String,
    pub notes: String,
    /// Derived from type/size/extras/notes, see `generate_invoice_note`
    pub invoice_note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(default)]
    pub private: bool,
}

/// Request to create a job by manual entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub date: Option<NaiveDate>,
    pub property: String,
    pub unit: String,
    #[serde(default)]
    pub size: String,
    #[serde(rename = "type", default)]
    pub service_type: ServiceType,
    pub technician: Option<String>,
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub client_price: f64,
    #[serde(default)]
    pub employee_price: f64,
    #[serde(default)]
    pub extras_price: f64,
    #[serde(default)]
    pub extras: String,
    #[serde(default)]
    pub notes: String,
    pub po_number: Option<String>,
    #[serde(default)]
    pub private: bool,
}

/// Partial update of a job. `None` fields are left untouched.
///
/// `job_number` is accepted on the wire but never applied to an existing
/// job with a different number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub job_number: Option<u32>,
    pub date: Option<NaiveDate>,
    pub property: Option<String>,
    pub unit: Option<String>,
    pub size: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<ServiceType>,
    pub technician: Option<String>,
    pub status: Option<JobStatus>,
    pub invoice_status: Option<InvoiceStatus>,
    pub client_price: Option<f64>,
    pub employee_price: Option<f64>,
    pub extras_price: Option<f64>,
    pub extras: Option<String>,
    pub notes: Option<String>,
    pub po_number: Option<String>,
    pub private: Option<bool>,
}

impl UpdateJobRequest {
    /// Whether applying this update may change the derived invoice note
    pub fn touches_invoice_note(&self) -> bool {
        self.service_type.is_some()
            || self.size.is_some()
            || self.extras.is_some()
            || self.notes.is_some()
    }
}
