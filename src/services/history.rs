//! Action history ring
//!
//! Keeps the most recent reversible ledger mutations, newest first, up to a
//! fixed capacity. Entries leave the ring either by being undone or by
//! capacity eviction; evicted entries can no longer be reversed.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::defaults::DEFAULT_HISTORY_CAPACITY;
use crate::types::{ActionKind, ActionLogEntry};

fn deserialize_capacity<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(usize::deserialize(deserializer)?.max(1))
}

/// Bounded, most-recent-first log of reversible actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionHistory {
    #[serde(deserialize_with = "deserialize_capacity")]
    capacity: usize,
    entries: VecDeque<ActionLogEntry>,
}

impl ActionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an entry, evicting the oldest one when the ring is full
    pub fn record(&mut self, entry: ActionLogEntry) {
        let capacity = self.capacity.max(1);
        while self.entries.len() >= capacity {
            if let Some(evicted) = self.entries.pop_back() {
                debug!("History full, evicting {:?} entry {}", evicted.kind, evicted.id);
            }
        }
        self.entries.push_front(entry);
    }

    /// Remove an entry (used by undo)
    pub fn remove(&mut self, id: Uuid) -> Option<ActionLogEntry> {
        let position = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(position)
    }

    pub fn get(&self, id: Uuid) -> Option<&ActionLogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&ActionLogEntry> {
        self.entries.front()
    }

    /// Up to `limit` entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<&ActionLogEntry> {
        self.entries.iter().take(limit).collect()
    }

    pub fn by_kind(&self, kind: ActionKind) -> Vec<&ActionLogEntry> {
        self.entries.iter().filter(|e| e.kind == kind).collect()
    }

    /// Shrink or grow the ring; shrinking evicts the oldest entries
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.entries.truncate(self.capacity);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionPayload;

    fn entry(kind: ActionKind) -> ActionLogEntry {
        ActionLogEntry::new(kind, "test", ActionPayload::Created { job_ids: vec![] })
    }

    #[test]
    fn test_record_is_most_recent_first() {
        let mut history = ActionHistory::new(10);
        let first = entry(ActionKind::Create);
        let second = entry(ActionKind::Delete);
        let second_id = second.id;

        history.record(first);
        history.record(second);

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().map(|e| e.id), Some(second_id));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = ActionHistory::new(3);
        let oldest = entry(ActionKind::Create);
        let oldest_id = oldest.id;
        history.record(oldest);
        for _ in 0..3 {
            history.record(entry(ActionKind::Update));
        }

        assert_eq!(history.len(), 3);
        assert!(history.get(oldest_id).is_none());
    }

    #[test]
    fn test_remove_only_once() {
        let mut history = ActionHistory::new(5);
        let e = entry(ActionKind::Import);
        let id = e.id;
        history.record(e);

        assert!(history.remove(id).is_some());
        assert!(history.remove(id).is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_recent_and_by_kind() {
        let mut history = ActionHistory::new(10);
        history.record(entry(ActionKind::Create));
        history.record(entry(ActionKind::Update));
        history.record(entry(ActionKind::Create));

        assert_eq!(history.recent(2).len(), 2);
        assert_eq!(history.by_kind(ActionKind::Create).len(), 2);
        assert_eq!(history.by_kind(ActionKind::Delete).len(), 0);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = ActionHistory::new(0);
        history.record(entry(ActionKind::Create));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_zero_capacity_from_disk_is_clamped() {
        let mut history: ActionHistory =
            serde_json::from_str(r#"{"capacity":0,"entries":[]}"#).unwrap();
        assert_eq!(history.capacity(), 1);

        history.record(entry(ActionKind::Create));
        history.record(entry(ActionKind::Delete));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().map(|e| e.kind), Some(ActionKind::Delete));
    }

    #[test]
    fn test_shrinking_capacity_truncates() {
        let mut history = ActionHistory::new(5);
        for _ in 0..5 {
            history.record(entry(ActionKind::Update));
        }
        let newest = history.latest().map(|e| e.id);
        history.set_capacity(2);

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().map(|e| e.id), newest);
    }
}
