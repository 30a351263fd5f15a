//! Ledger operations
//!
//! Every mutation is a pure function `(&LedgerState, input) -> LedgerState`:
//! the previous state is never modified, and the caller swaps in the new
//! value. Each mutation that changes something appends exactly one entry
//! to the action history so it can be undone.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::services::history::ActionHistory;
use crate::services::job_number::{in_reserved_block, JobNumberAllocator};
use crate::services::normalizer::generate_invoice_note;
use crate::types::{
    ActionKind, ActionLogEntry, ActionPayload, CreateJobRequest, InvoiceStatus, Job, JobStatus,
    ResolvedImport, UpdateJobRequest, JOB_NUMBER_FLOOR,
};

/// Complete engine state: the job ledger plus its action history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    /// Jobs ordered by job number
    pub jobs: Vec<Job>,
    pub history: ActionHistory,
    /// Highest job number ever handed out; numbers are never reissued
    #[serde(default = "default_watermark")]
    pub number_watermark: u32,
}

fn default_watermark() -> u32 {
    JOB_NUMBER_FLOOR
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_HISTORY_CAPACITY)
    }
}

impl LedgerState {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            jobs: Vec::new(),
            history: ActionHistory::new(history_capacity),
            number_watermark: JOB_NUMBER_FLOOR,
        }
    }

    /// Build a state from an externally loaded job list
    pub fn from_jobs(jobs: Vec<Job>, history_capacity: usize) -> Result<Self, LedgerError> {
        Self {
            jobs,
            history: ActionHistory::new(history_capacity),
            number_watermark: JOB_NUMBER_FLOOR,
        }
        .repair_job_numbers()
    }

    /// Re-establish the job number invariants on a loaded state.
    ///
    /// Missing and duplicate numbers are replaced with fresh ones. Numbers
    /// at or below the floor or inside a reserved block are kept as they
    /// are, since job numbers never change, but are logged. Jobs end up
    /// sorted and the watermark covers every number in use.
    pub fn repair_job_numbers(mut self) -> Result<Self, LedgerError> {
        let mut seen = HashSet::new();
        let mut renumber = Vec::new();
        for (i, job) in self.jobs.iter().enumerate() {
            match job.job_number {
                None => {
                    warn!("Job {} has no job number", job.id);
                    renumber.push(i);
                }
                Some(number) if !seen.insert(number) => {
                    warn!("Job {} repeats job number {}", job.id, number);
                    renumber.push(i);
                }
                Some(number) if number <= JOB_NUMBER_FLOOR || in_reserved_block(number) => {
                    warn!("Job {} has job number {} outside the allocatable range", job.id, number);
                }
                Some(_) => {}
            }
        }

        let mut allocator = self.allocator();
        for i in renumber {
            let number = allocator.next_number()?;
            warn!("Assigned job number {} to job {}", number, self.jobs[i].id);
            self.jobs[i].job_number = Some(number);
        }
        self.number_watermark = allocator.current();
        self.jobs.sort_by_key(|j| j.job_number);

        Ok(self)
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn allocator(&self) -> JobNumberAllocator {
        let max = self.jobs.iter().filter_map(|j| j.job_number).max().unwrap_or(JOB_NUMBER_FLOOR);
        JobNumberAllocator::starting_after(max.max(self.number_watermark))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.jobs.iter().position(|j| j.id == id)
    }

    fn insert_sorted(&mut self, job: Job) {
        let at = self.jobs.partition_point(|j| j.job_number <= job.job_number);
        self.jobs.insert(at, job);
    }

    /// Replace a job in place, or insert it if it is gone
    fn restore(&mut self, job: Job) {
        match self.position(&job.id) {
            Some(i) => self.jobs[i] = job,
            None => self.insert_sorted(job),
        }
    }

    fn remove(&mut self, id: &str) -> Option<Job> {
        self.position(id).map(|i| self.jobs.remove(i))
    }
}

fn job_label(job: &Job) -> String {
    match job.job_number {
        Some(n) => format!("#{} ({} {})", n, job.property, job.unit),
        None => format!("({} {})", job.property, job.unit),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// =============================================================================
// CREATE
// =============================================================================

/// Create a job by manual entry. Returns the new state and the created job.
pub fn create_job(
    state: &LedgerState,
    request: CreateJobRequest,
    today: NaiveDate,
) -> Result<(LedgerState, Job), LedgerError> {
    let mut next = state.clone();
    let mut allocator = next.allocator();

    let invoice_note = generate_invoice_note(&request.service_type, &request.size, &request.extras, &request.notes);
    let job = Job {
        id: Uuid::new_v4().to_string(),
        job_number: Some(allocator.next_number()?),
        date: request.date.unwrap_or(today),
        property: request.property.trim().to_string(),
        unit: request.unit.trim().to_string(),
        size: request.size.trim().to_string(),
        service_type: request.service_type,
        technician: request.technician.as_deref().and_then(non_blank),
        status: request.status.unwrap_or_default(),
        invoice_status: InvoiceStatus::None,
        client_price: request.client_price.max(0.0),
        employee_price: request.employee_price.max(0.0),
        extras_price: request.extras_price.max(0.0),
        extras: request.extras,
        notes: request.notes,
        invoice_note,
        po_number: request.po_number.as_deref().and_then(non_blank),
        private: request.private,
    };

    next.number_watermark = allocator.current();
    next.history.record(ActionLogEntry::new(
        ActionKind::Create,
        format!("Created job {}", job_label(&job)),
        ActionPayload::Created {
            job_ids: vec![job.id.clone()],
        },
    ));
    next.insert_sorted(job.clone());

    info!("Created job {}", job_label(&job));
    Ok((next, job))
}

/// Copy an existing job under a new id and number, reset to Pending
pub fn duplicate_job(state: &LedgerState, id: &str) -> Result<(LedgerState, Job), LedgerError> {
    let source = state.job(id).ok_or_else(|| LedgerError::JobNotFound(id.to_string()))?;

    let mut next = state.clone();
    let mut allocator = next.allocator();
    let job = Job {
        id: Uuid::new_v4().to_string(),
        job_number: Some(allocator.next_number()?),
        status: JobStatus::Pending,
        invoice_status: InvoiceStatus::None,
        ..source.clone()
    };

    next.number_watermark = allocator.current();
    next.history.record(ActionLogEntry::new(
        ActionKind::Create,
        format!("Duplicated job {} as {}", job_label(source), job_label(&job)),
        ActionPayload::Created {
            job_ids: vec![job.id.clone()],
        },
    ));
    next.insert_sorted(job.clone());

    info!("Duplicated job {} as {}", job_label(source), job_label(&job));
    Ok((next, job))
}

// =============================================================================
// UPDATE
// =============================================================================

/// Apply a partial update to a job. A differing `job_number` is dropped.
fn apply_update(job: &Job, update: &UpdateJobRequest) -> Job {
    if let Some(number) = update.job_number {
        if job.job_number != Some(number) {
            warn!(
                "Rejected job number change for job {}: {:?} -> {} (job numbers are immutable)",
                job.id, job.job_number, number
            );
        }
    }

    let mut next = job.clone();
    if let Some(date) = update.date {
        next.date = date;
    }
    if let Some(property) = &update.property {
        next.property = property.trim().to_string();
    }
    if let Some(unit) = &update.unit {
        next.unit = unit.trim().to_string();
    }
    if let Some(size) = &update.size {
        next.size = size.trim().to_string();
    }
    if let Some(service_type) = &update.service_type {
        next.service_type = service_type.clone();
    }
    if let Some(technician) = &update.technician {
        next.technician = non_blank(technician);
    }
    if let Some(status) = update.status {
        next.status = status;
    }
    if let Some(invoice_status) = update.invoice_status {
        next.invoice_status = invoice_status;
    }
    if let Some(price) = update.client_price {
        next.client_price = price.max(0.0);
    }
    if let Some(price) = update.employee_price {
        next.employee_price = price.max(0.0);
    }
    if let Some(price) = update.extras_price {
        next.extras_price = price.max(0.0);
    }
    if let Some(extras) = &update.extras {
        next.extras = extras.clone();
    }
    if let Some(notes) = &update.notes {
        next.notes = notes.clone();
    }
    if let Some(po_number) = &update.po_number {
        next.po_number = non_blank(po_number);
    }
    if let Some(private) = update.private {
        next.private = private;
    }

    if update.touches_invoice_note() {
        next.invoice_note = generate_invoice_note(&next.service_type, &next.size, &next.extras, &next.notes);
    }

    next
}

/// Update one job. No history entry is written when nothing changed.
pub fn update_job(state: &LedgerState, id: &str, update: &UpdateJobRequest) -> Result<LedgerState, LedgerError> {
    let before = state.job(id).ok_or_else(|| LedgerError::JobNotFound(id.to_string()))?;
    let after = apply_update(before, update);

    if &after == before {
        debug!("Update of job {} changed nothing", id);
        return Ok(state.clone());
    }

    let mut next = state.clone();
    next.history.record(ActionLogEntry::new(
        ActionKind::Update,
        format!("Updated job {}", job_label(before)),
        ActionPayload::Snapshot {
            before: vec![before.clone()],
        },
    ));
    next.restore(after);

    info!("Updated job {}", job_label(before));
    Ok(next)
}

/// Apply the same update to several jobs as one undoable action.
///
/// Fails without changes if any id is unknown.
pub fn batch_update(state: &LedgerState, ids: &[String], update: &UpdateJobRequest) -> Result<LedgerState, LedgerError> {
    let mut changed = Vec::new();
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            continue;
        }
        let before = state.job(id).ok_or_else(|| LedgerError::JobNotFound(id.clone()))?;
        let after = apply_update(before, update);
        if &after != before {
            changed.push((before.clone(), after));
        }
    }

    if changed.is_empty() {
        debug!("Batch update of {} jobs changed nothing", ids.len());
        return Ok(state.clone());
    }

    let mut next = state.clone();
    let count = changed.len();
    let (before, after): (Vec<Job>, Vec<Job>) = changed.into_iter().unzip();
    next.history.record(ActionLogEntry::new(
        ActionKind::BatchUpdate,
        format!("Updated {} jobs", count),
        ActionPayload::Snapshot { before },
    ));
    for job in after {
        next.restore(job);
    }

    info!("Batch updated {} jobs", count);
    Ok(next)
}

// =============================================================================
// DELETE
// =============================================================================

/// Delete jobs as one undoable action. Fails without changes if any id is
/// unknown.
pub fn delete_jobs(state: &LedgerState, ids: &[String]) -> Result<LedgerState, LedgerError> {
    let mut seen = HashSet::new();
    let mut removed = Vec::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            continue;
        }
        let job = state.job(id).ok_or_else(|| LedgerError::JobNotFound(id.clone()))?;
        removed.push(job.clone());
    }

    let mut next = state.clone();
    for job in &removed {
        next.remove(&job.id);
    }

    let description = match removed.as_slice() {
        [single] => format!("Deleted job {}", job_label(single)),
        many => format!("Deleted {} jobs", many.len()),
    };
    info!("{}", description);
    next.history.record(ActionLogEntry::new(
        ActionKind::Delete,
        description,
        ActionPayload::Snapshot { before: removed },
    ));

    Ok(next)
}

// =============================================================================
// IMPORT
// =============================================================================

/// Admit a resolved import: numbers are allocated to inserts in order,
/// overwrites replace their existing job. One Import entry covers both.
///
/// When several incoming records overwrite the same job, the last one wins
/// and the entry keeps the job as it was before the import.
pub fn commit_import(state: &LedgerState, resolved: ResolvedImport) -> Result<LedgerState, LedgerError> {
    let mut next = state.clone();

    let mut inserts = resolved.inserts;
    let mut allocator = next.allocator();
    allocator.assign(&mut inserts)?;
    next.number_watermark = allocator.current();

    let mut overwritten = Vec::new();
    for incoming in resolved.updates {
        let Some(existing) = next.job(&incoming.id).cloned() else {
            warn!("Overwrite target {} no longer exists, skipping", incoming.id);
            continue;
        };
        let replacement = Job {
            job_number: existing.job_number,
            ..incoming
        };
        if replacement != existing {
            if !overwritten.iter().any(|job: &Job| job.id == existing.id) {
                overwritten.push(existing);
            }
            next.restore(replacement);
        }
    }

    let job_ids: Vec<String> = inserts.iter().map(|j| j.id.clone()).collect();
    let description = format!("Imported {} jobs ({} overwritten)", job_ids.len(), overwritten.len());
    info!("{}", description);

    for job in inserts {
        next.insert_sorted(job);
    }
    next.history.record(ActionLogEntry::new(
        ActionKind::Import,
        description,
        ActionPayload::Imported { job_ids, overwritten },
    ));

    Ok(next)
}

// =============================================================================
// UNDO
// =============================================================================

/// Reverse one history entry and drop it from the ring.
///
/// Unknown or already reverted entries leave the state unchanged.
pub fn undo(state: &LedgerState, entry_id: Uuid) -> LedgerState {
    let mut next = state.clone();
    let Some(entry) = next.history.remove(entry_id) else {
        debug!("Undo of unknown entry {} ignored", entry_id);
        return state.clone();
    };

    match entry.payload {
        ActionPayload::Snapshot { before } => {
            for job in before {
                next.restore(job);
            }
        }
        ActionPayload::Created { job_ids } => {
            for id in &job_ids {
                next.remove(id);
            }
        }
        ActionPayload::Imported { job_ids, overwritten } => {
            for id in &job_ids {
                next.remove(id);
            }
            for job in overwritten {
                next.restore(job);
            }
        }
    }

    info!("Undid {:?}: {}", entry.kind, entry.description);
    next
}

/// Undo the most recent entry, if any
pub fn undo_latest(state: &LedgerState) -> LedgerState {
    match state.history.latest() {
        Some(entry) => undo(state, entry.id),
        None => state.clone(),
    }
}
