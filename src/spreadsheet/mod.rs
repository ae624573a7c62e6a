//! # Spreadsheet Module
//!
//! Reads the first worksheet of an Excel 2007+ workbook (`.xlsx`, `.xlsm`)
//! into a row-major grid of display strings, and writes a grid back out as a
//! single-sheet `.xlsx` workbook. Formatting, formulas and additional sheets
//! are not carried.
use crate::error::RustyMarksError;
use crate::helpers::reader::WorkbookReader;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use thiserror::Error;
use tracing::debug;

pub(crate) mod cell;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod writer;
pub(crate) mod xlsx;

/// Errors raised while reading or writing workbooks.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing part '{0}' in workbook")]
    FileError(String),

    #[error("Workbook '{0}' contains no worksheet")]
    SpreadsheetEmptyError(String),

    #[error("Worksheet '{1}' in '{0}' is empty")]
    SheetEmptyError(String, String),

    #[error("Workbook '{0}' is password protected or in the legacy binary format; save it as .xlsx")]
    UnsupportedWorkbookError(String),
}

/// The first worksheet of a workbook, expanded to a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Worksheet {
    /// Worksheet name as shown on its tab
    pub name: String,
    /// Row-major cells starting at A1; rows keep their sheet position
    pub rows: Vec<Vec<String>>,
}

/// Reads the first worksheet from workbook bytes.
pub fn read_first_worksheet(name: &str, bytes: Vec<u8>) -> Result<Worksheet, RustyMarksError> {
    let mut workbook = XlsxWorkbook::open(name, WorkbookReader::new(bytes))?;
    let shared_strings = workbook.load_shared_strings()?;
    let sheet = workbook.read_first_sheet()?;
    let sheet_name = sheet.name.to_owned();
    let rows = sheet.into_rows(&shared_strings);
    debug!(workbook = name, sheet = %sheet_name, rows = rows.len(), "worksheet loaded");
    Ok(Worksheet { name: sheet_name, rows })
}

pub use writer::write_workbook;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::helpers::zip::ZipWriterHelper;
    use std::io::Cursor;
    use zip::ZipWriter;

    /// Builds a minimal workbook whose first sheet holds `sheet_data` rows.
    pub(crate) fn workbook(
        sheet_names: &[&str],
        sheet_data: &str,
        shared_strings: Option<&str>,
        styles: Option<&str>,
    ) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut sheets = String::new();
        let mut relationships = String::new();
        for (index, name) in sheet_names.iter().enumerate() {
            let id = index + 1;
            sheets.push_str(&format!(r#"<sheet name="{name}" sheetId="{id}" r:id="rId{id}"/>"#));
            relationships.push_str(&format!(
                r#"<Relationship Id="rId{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{id}.xml"/>"#
            ));
        }
        let workbook = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheets}</sheets></workbook>"#
        );
        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
        );
        zip.put("xl/workbook.xml", workbook.as_bytes()).unwrap();
        zip.put("xl/_rels/workbook.xml.rels", rels.as_bytes()).unwrap();
        for index in 0..sheet_names.len() {
            let data = if index == 0 { sheet_data } else { "" };
            let sheet = format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
            );
            zip.put(&format!("xl/worksheets/sheet{}.xml", index + 1), sheet.as_bytes()).unwrap();
        }
        if let Some(items) = shared_strings {
            let sst = format!(r#"<?xml version="1.0" encoding="UTF-8"?><sst>{items}</sst>"#);
            zip.put("xl/sharedStrings.xml", sst.as_bytes()).unwrap();
        }
        if let Some(styles) = styles {
            zip.put("xl/styles.xml", styles.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_only_the_first_sheet() {
        let bytes = workbook(
            &["Marks", "Summary"],
            r#"<row r="2"><c r="A2" t="inlineStr"><is><t>id</t></is></c></row>"#,
            None,
            None,
        );
        let worksheet = read_first_worksheet("template.xlsx", bytes).unwrap();
        assert_eq!(worksheet.name, "Marks");
        assert_eq!(worksheet.rows, vec![vec![], vec!["id".to_owned()]]);
    }

    #[test]
    fn rejects_non_workbooks() {
        assert!(read_first_worksheet("marks.csv", b"id,mark\n001,80".to_vec()).is_err());
    }

    #[test]
    fn workbook_without_sheets() {
        let bytes = workbook(&[], "", None, None);
        assert!(matches!(
            read_first_worksheet("empty.xlsx", bytes),
            Err(RustyMarksError::SpreadsheetError(SpreadsheetError::SpreadsheetEmptyError(_)))
        ));
    }
}
