//! Shared fixtures for service tests

use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::{InvoiceStatus, Job, JobStatus, ServiceType};

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

/// Unnumbered Clean job at `property`/`unit` on `day`
pub fn job(property: &str, unit: &str, day: &str) -> Job {
    Job {
        id: Uuid::new_v4().to_string(),
        job_number: None,
        date: date(day),
        property: property.to_string(),
        unit: unit.to_string(),
        size: "2X2".to_string(),
        service_type: ServiceType::Clean,
        technician: None,
        status: JobStatus::Pending,
        invoice_status: InvoiceStatus::None,
        client_price: 0.0,
        employee_price: 0.0,
        extras_price: 0.0,
        extras: String::new(),
        notes: String::new(),
        invoice_note: "Vacant 2X2 Clean".to_string(),
        po_number: None,
        private: false,
    }
}

pub fn numbered(mut job: Job, number: u32) -> Job {
    job.job_number = Some(number);
    job
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
<sheet name="Jobs" sheetId="1" r:id="rId1"/>
<sheet name="Other" sheetId="2" r:id="rId2"/>
</sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

// xf 1 uses built-in number format 14 (m/d/yyyy), so its cells read as dates
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<cellXfs count="2">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
</cellXfs>
</styleSheet>"#;

const JOBS_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1">
<c r="A1" t="inlineStr"><is><t>Property</t></is></c>
<c r="B1" t="inlineStr"><is><t>Unit</t></is></c>
<c r="C1" t="inlineStr"><is><t>Date</t></is></c>
<c r="D1" t="inlineStr"><is><t>Completed</t></is></c>
</row>
<row r="2">
<c r="A2" t="inlineStr"><is><t>Oak</t></is></c>
<c r="B2"><v>101</v></c>
<c r="C2" s="1"><v>45444</v></c>
<c r="D2" t="inlineStr"><is><t>Done</t></is></c>
</row>
<row r="3">
<c r="A3" t="inlineStr"><is><t>Pine</t></is></c>
<c r="B3" t="inlineStr"><is><t>7 - 1x1</t></is></c>
<c r="C3"><v>45445.5</v></c>
<c r="D3" t="b"><v>0</v></c>
</row>
<row r="4">
<c r="A4" t="inlineStr"><is><t> </t></is></c>
</row>
</sheetData>
</worksheet>"#;

const OTHER_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Ignored</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>Elm</t></is></c></row>
</sheetData>
</worksheet>"#;

/// Minimal two-sheet XLSX workbook.
///
/// Sheet "Jobs": header row, `Oak | 101 | 2024-06-01 (date-styled serial) | Done`,
/// `Pine | 7 - 1x1 | 45445.5 (plain number) | FALSE`, then a blank trailing row.
pub fn jobs_workbook() -> Vec<u8> {
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/styles.xml", STYLES),
        ("xl/worksheets/sheet1.xml", JOBS_SHEET),
        ("xl/worksheets/sheet2.xml", OTHER_SHEET),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}
