//! Duplicate detection against the live ledger
//!
//! Two jobs are candidate duplicates when they share a signature:
//! (property, unit, service type, date). Text parts compare trimmed and
//! case-insensitively.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::types::{CandidatePair, DuplicateReport, IncomingJob, Job};

/// Identity signature of a job; used for grouping only, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    property: String,
    unit: String,
    service_type: String,
    date: NaiveDate,
}

impl Signature {
    pub fn of(job: &Job) -> Self {
        Self {
            property: job.property.trim().to_lowercase(),
            unit: job.unit.trim().to_lowercase(),
            service_type: job.service_type.label().trim().to_lowercase(),
            date: job.date,
        }
    }
}

/// Partition an incoming batch into new jobs and candidate pairs.
///
/// The signature index over `existing` is built once, so the cost is
/// O(existing + incoming). When several ledger jobs share a signature the
/// first one in ledger order is paired.
pub fn detect_duplicates(existing: &[Job], incoming: Vec<Job>) -> DuplicateReport {
    let mut index: HashMap<Signature, &Job> = HashMap::with_capacity(existing.len());
    for job in existing {
        index.entry(Signature::of(job)).or_insert(job);
    }

    let mut report = DuplicateReport::default();
    for (batch_index, job) in incoming.into_iter().enumerate() {
        match index.get(&Signature::of(&job)) {
            Some(existing_job) => report.conflicts.push(CandidatePair {
                batch_index,
                existing: (*existing_job).clone(),
                incoming: job,
            }),
            None => report.new_jobs.push(IncomingJob { batch_index, job }),
        }
    }

    report
}
