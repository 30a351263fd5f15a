use chrono::NaiveDate;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

pub const DEFAULT_MAPPER_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_LEDGER_PATH: &str = "data/ledger.json";

pub const DEFAULT_LOGS_DIR: &str = "logs";

/// Day zero of spreadsheet serial dates (1900 date system incl. the leap-year bug)
pub fn spreadsheet_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid static spreadsheet epoch")
}
