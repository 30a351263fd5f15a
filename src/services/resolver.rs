//! Conflict resolution
//!
//! Applies one decision per candidate pair. Pairs without a decision are
//! skipped, so resolution is always total.

use tracing::debug;

use crate::types::{DuplicateReport, Job, Resolution, ResolutionMap, ResolvedImport};

/// Resolve a duplicate report into insert and update sets.
///
/// - `Skip` drops the incoming record.
/// - `Overwrite` keeps the existing job's id and number but takes every
///   other field from the incoming record.
/// - `KeepBoth` admits the incoming record as a new job.
///
/// Inserts come out in batch order so number allocation is deterministic.
pub fn resolve(report: DuplicateReport, decisions: &ResolutionMap) -> ResolvedImport {
    let mut inserts: Vec<(usize, Job)> = report
        .new_jobs
        .into_iter()
        .map(|incoming| (incoming.batch_index, incoming.job))
        .collect();
    let mut updates = Vec::new();
    let mut skipped = 0;

    for pair in report.conflicts {
        let decision = decisions.get(&pair.incoming.id).copied().unwrap_or_default();
        match decision {
            Resolution::Skip => skipped += 1,
            Resolution::Overwrite => updates.push(overwrite(&pair.existing, pair.incoming)),
            Resolution::KeepBoth => inserts.push((pair.batch_index, pair.incoming)),
        }
    }

    inserts.sort_by_key(|(batch_index, _)| *batch_index);

    debug!(
        "Resolved import: {} inserts, {} updates, {} skipped",
        inserts.len(),
        updates.len(),
        skipped
    );

    ResolvedImport {
        inserts: inserts.into_iter().map(|(_, job)| job).collect(),
        updates,
        skipped,
    }
}

fn overwrite(existing: &Job, incoming: Job) -> Job {
    Job {
        id: existing.id.clone(),
        job_number: existing.job_number,
        ..incoming
    }
}
