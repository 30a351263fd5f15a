//! Action log types for reversible ledger mutations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::job::Job;

/// Kind of ledger mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
    Import,
    BatchUpdate,
}

/// What is needed to reverse an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActionPayload {
    /// Jobs as they were before an update or delete
    #[serde(rename_all = "camelCase")]
    Snapshot { before: Vec<Job> },
    /// Ids of jobs created by the mutation
    #[serde(rename_all = "camelCase")]
    Created { job_ids: Vec<String> },
    /// Ids created by an import plus pre-overwrite snapshots
    #[serde(rename_all = "camelCase")]
    Imported {
        job_ids: Vec<String>,
        overwritten: Vec<Job>,
    },
}

/// Single entry of the action history ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: ActionKind,
    pub description: String,
    pub payload: ActionPayload,
}

impl ActionLogEntry {
    pub fn new(kind: ActionKind, description: impl Into<String>, payload: ActionPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            description: description.into(),
            payload,
        }
    }
}
