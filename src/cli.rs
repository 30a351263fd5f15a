//! CLI argument parsing for the jobledger-worker binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::types::Resolution;

#[derive(Parser)]
#[command(name = "jobledger-worker", about = "Job ledger import and reconciliation worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import spreadsheet or CSV exports into the ledger
    Import {
        /// Files to import; non-tabular files are ignored
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Decision applied to every possible duplicate
        #[arg(long, value_enum, default_value_t = ConflictPolicy::Skip)]
        on_conflict: ConflictPolicy,
    },
    /// List jobs in the ledger
    List,
    /// Show undoable actions, newest first
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Undo an action (the latest one if no id is given)
    Undo { entry_id: Option<Uuid> },
    /// Delete jobs by id
    Delete {
        #[arg(required = true)]
        job_ids: Vec<String>,
    },
}

/// Blanket conflict decision for non-interactive imports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConflictPolicy {
    Skip,
    Overwrite,
    #[value(name = "keep_both")]
    KeepBoth,
}

impl From<ConflictPolicy> for Resolution {
    fn from(policy: ConflictPolicy) -> Self {
        match policy {
            ConflictPolicy::Skip => Resolution::Skip,
            ConflictPolicy::Overwrite => Resolution::Overwrite,
            ConflictPolicy::KeepBoth => Resolution::KeepBoth,
        }
    }
}
