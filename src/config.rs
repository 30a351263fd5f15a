//! Configuration management

use std::path::PathBuf;

use anyhow::{self, Context, Result};

use crate::defaults::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_LEDGER_PATH, DEFAULT_LOGS_DIR, DEFAULT_MAPPER_TIMEOUT_SECS,
};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Ledger snapshot file
    pub ledger_path: PathBuf,

    /// Maximum number of undoable actions kept
    pub history_capacity: usize,

    /// External column mapping endpoint (optional, heuristics only if unset)
    pub column_mapper_url: Option<String>,

    /// Column mapping request timeout in seconds
    pub column_mapper_timeout_secs: u64,

    /// JSON price table (optional, all prices zero if unset)
    pub price_table_path: Option<PathBuf>,

    /// Directory for daily rolling log files
    pub logs_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ledger_path = non_empty("LEDGER_PATH")
            .unwrap_or_else(|| DEFAULT_LEDGER_PATH.to_string())
            .into();

        let history_capacity = match non_empty("HISTORY_CAPACITY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("HISTORY_CAPACITY must be a positive integer, got '{}'", raw))?,
            None => DEFAULT_HISTORY_CAPACITY,
        };
        if history_capacity == 0 {
            anyhow::bail!("HISTORY_CAPACITY must be greater than 0");
        }

        let column_mapper_url = non_empty("COLUMN_MAPPER_URL");

        let column_mapper_timeout_secs = match non_empty("COLUMN_MAPPER_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("COLUMN_MAPPER_TIMEOUT_SECS must be an integer, got '{}'", raw))?,
            None => DEFAULT_MAPPER_TIMEOUT_SECS,
        };

        let price_table_path = non_empty("PRICE_TABLE_PATH").map(PathBuf::from);

        let logs_dir = non_empty("LOGS_DIR")
            .unwrap_or_else(|| DEFAULT_LOGS_DIR.to_string())
            .into();

        Ok(Self {
            ledger_path,
            history_capacity,
            column_mapper_url,
            column_mapper_timeout_secs,
            price_table_path,
            logs_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.ledger_path, PathBuf::from("data/ledger.json"));
        assert_eq!(config.history_capacity, 50);
        assert!(config.column_mapper_url.is_none());
        assert_eq!(config.column_mapper_timeout_secs, 10);
        assert!(config.price_table_path.is_none());
        assert_eq!(config.logs_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_config_column_mapper_url_some_when_set() {
        let config = config_from(&[("COLUMN_MAPPER_URL", "http://localhost:8090/map-columns")]).unwrap();
        assert_eq!(
            config.column_mapper_url,
            Some("http://localhost:8090/map-columns".to_string())
        );
    }

    #[test]
    fn test_config_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("COLUMN_MAPPER_URL", "  "), ("LEDGER_PATH", "")]).unwrap();
        assert!(config.column_mapper_url.is_none());
        assert_eq!(config.ledger_path, PathBuf::from("data/ledger.json"));
    }

    #[test]
    fn test_config_history_capacity_parsed() {
        let config = config_from(&[("HISTORY_CAPACITY", "200")]).unwrap();
        assert_eq!(config.history_capacity, 200);
    }

    #[test]
    fn test_config_rejects_zero_capacity() {
        assert!(config_from(&[("HISTORY_CAPACITY", "0")]).is_err());
    }

    #[test]
    fn test_config_rejects_non_numeric_timeout() {
        let err = config_from(&[("COLUMN_MAPPER_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("COLUMN_MAPPER_TIMEOUT_SECS"));
    }
}
