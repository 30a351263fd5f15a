//! Tabular file reader
//!
//! Decodes spreadsheet workbooks (via calamine) and comma-delimited text
//! (via csv) into a plain grid of `CellValue`s. Row 0 is the header row.
//! No business logic lives here.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use crate::error::IngestError;
use crate::types::{CellValue, SourceFile, Table};

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    /// XLSX/XLSM/XLSB/XLS/ODS
    Spreadsheet,
}

impl TabularFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_path(Path::new(name))
    }
}

/// Read a source file into a table.
///
/// Trailing blank rows are dropped; a table with a header row but no data
/// rows is reported as `EmptyBody`.
pub fn read_table(file: &SourceFile) -> Result<Table, IngestError> {
    let format = TabularFormat::from_name(&file.name).ok_or_else(|| IngestError::UnsupportedFormat {
        file: file.name.clone(),
    })?;

    let mut table = match format {
        TabularFormat::Csv => read_csv(file)?,
        TabularFormat::Spreadsheet => read_spreadsheet(file)?,
    };

    while table.last().is_some_and(|row| row.iter().all(CellValue::is_empty)) {
        table.pop();
    }

    if table.len() < 2 {
        return Err(IngestError::EmptyBody {
            file: file.name.clone(),
        });
    }

    debug!("Read {} data rows from {}", table.len() - 1, file.name);
    Ok(table)
}

fn read_csv(file: &SourceFile) -> Result<Table, IngestError> {
    let bytes = file.bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&file.bytes[..]);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut table = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::Read {
            file: file.name.clone(),
            detail: e.to_string(),
        })?;
        table.push(record.iter().map(csv_cell).collect());
    }

    Ok(table)
}

/// CSV has no cell types, so every non-blank cell stays text. Leading
/// zeros in unit labels survive; numeric dates are handled by the normalizer.
fn csv_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(trimmed.to_string())
    }
}

fn read_spreadsheet(file: &SourceFile) -> Result<Table, IngestError> {
    let cursor = Cursor::new(file.bytes.clone());
    let mut workbook = open_workbook_auto_from_rs(cursor).map_err(|e| IngestError::Read {
        file: file.name.clone(),
        detail: e.to_string(),
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::NoSheets {
            file: file.name.clone(),
        })?
        .map_err(|e| IngestError::Read {
            file: file.name.clone(),
            detail: e.to_string(),
        })?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect())
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.trim().to_string())
            }
        }
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::jobs_workbook;

    #[test]
    fn test_format_detection() {
        assert_eq!(TabularFormat::from_name("jobs.CSV"), Some(TabularFormat::Csv));
        assert_eq!(TabularFormat::from_name("export.xlsx"), Some(TabularFormat::Spreadsheet));
        assert_eq!(TabularFormat::from_name("legacy.xls"), Some(TabularFormat::Spreadsheet));
        assert_eq!(TabularFormat::from_name("notes.txt"), None);
        assert_eq!(TabularFormat::from_name("no_extension"), None);
    }

    #[test]
    fn test_read_csv_cells() {
        let file = SourceFile::new(
            "jobs.csv",
            "Property,Unit,Date\nOak,0101,45444\nPine,,2024-06-01\n",
        );
        let table = read_table(&file).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table[0][0], CellValue::Text("Property".to_string()));
        assert_eq!(table[1][1], CellValue::Text("0101".to_string()));
        assert_eq!(table[1][2], CellValue::Text("45444".to_string()));
        assert_eq!(table[2][1], CellValue::Empty);
        assert_eq!(table[2][2], CellValue::Text("2024-06-01".to_string()));
    }

    #[test]
    fn test_read_csv_strips_bom_and_trailing_blank_rows() {
        let file = SourceFile::new("jobs.csv", "\u{FEFF}Property,Unit\nOak,101\n,\n");
        let table = read_table(&file).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table[0][0], CellValue::Text("Property".to_string()));
    }

    #[test]
    fn test_header_only_is_empty_body() {
        let file = SourceFile::new("jobs.csv", "Property,Unit\n");
        let err = read_table(&file).unwrap_err();
        assert_eq!(err, IngestError::EmptyBody { file: "jobs.csv".to_string() });
    }

    #[test]
    fn test_unsupported_extension() {
        let file = SourceFile::new("jobs.pdf", "whatever");
        assert!(matches!(read_table(&file), Err(IngestError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_read_xlsx_first_sheet() {
        let file = SourceFile::new("june.xlsx", jobs_workbook());
        let table = read_table(&file).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table[0][3], CellValue::Text("Completed".to_string()));
        assert_eq!(table[1][0], CellValue::Text("Oak".to_string()));
        assert_eq!(table[1][1], CellValue::Number(101.0));
        assert_eq!(table[1][2], CellValue::Number(45444.0));
        assert_eq!(table[1][3], CellValue::Text("Done".to_string()));
        assert_eq!(table[2][1], CellValue::Text("7 - 1x1".to_string()));
        assert_eq!(table[2][2], CellValue::Number(45445.5));
        assert_eq!(table[2][3], CellValue::Text("false".to_string()));
        assert!(table.iter().flatten().all(|c| *c != CellValue::Text("Ignored".to_string())));
    }

    #[test]
    fn test_garbage_workbook_is_read_error() {
        let file = SourceFile::new("jobs.xlsx", b"not a zip archive".to_vec());
        assert!(matches!(read_table(&file), Err(IngestError::Read { .. })));
    }

    #[test]
    fn test_flexible_row_lengths() {
        let file = SourceFile::new("jobs.csv", "A,B,C\n1\n1,2,3,4\n");
        let table = read_table(&file).unwrap();
        assert_eq!(table[1].len(), 1);
        assert_eq!(table[2].len(), 4);
    }
}
