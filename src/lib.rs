//! Jobledger worker - job ingestion and reconciliation engine
//!
//! Imports third-party spreadsheet exports into a job ledger, detects and
//! resolves duplicates, allocates sequential job numbers and keeps a
//! bounded, reversible action history.

pub mod cli;
pub mod commands;
pub mod config;
pub mod defaults;
pub mod error;
pub mod services;
pub mod types;
