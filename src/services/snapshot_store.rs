//! JSON persistence of the ledger state
//!
//! The whole state (jobs, history, number watermark) is one pretty-printed
//! JSON document. Writes go to a sibling temp file first and are renamed
//! into place.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::services::ledger::LedgerState;

pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state.
    ///
    /// A missing file is `Ok(None)`. A file that cannot be read or parsed is
    /// an error, so a damaged ledger is never replaced by an empty one.
    /// Job-number invariants are checked and repaired on the way in.
    pub fn load(&self) -> Result<Option<LedgerState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger file {}", self.path.display()))?;
        let state: LedgerState = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse ledger file {}", self.path.display()))?;
        let state = state
            .repair_job_numbers()
            .with_context(|| format!("Invalid job numbers in {}", self.path.display()))?;

        info!(
            "Loaded {} jobs and {} history entries from {}",
            state.jobs.len(),
            state.history.len(),
            self.path.display()
        );
        Ok(Some(state))
    }

    /// Load the saved state, or start an empty ledger when there is none.
    ///
    /// The history ring is resized to `history_capacity` either way.
    pub fn load_or_default(&self, history_capacity: usize) -> Result<LedgerState> {
        Ok(match self.load()? {
            Some(mut state) => {
                state.history.set_capacity(history_capacity);
                state
            }
            None => {
                info!("No ledger at {}, starting empty", self.path.display());
                LedgerState::new(history_capacity)
            }
        })
    }

    pub fn save(&self, state: &LedgerState) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create ledger directory {}", dir.display()))?;
        }

        let json = serde_json::to_string_pretty(state).context("Failed to serialize ledger")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move ledger into place at {}", self.path.display()))?;

        Ok(())
    }
}
