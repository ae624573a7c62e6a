//! Single-sheet `.xlsx` output for exported tables.

use crate::error::RustyMarksError;
use crate::helpers::xml::XmlWriterHelper;
use crate::helpers::zip::ZipWriterHelper;
use crate::spreadsheet::reference::index_to_reference;
use quick_xml::events::BytesDecl;
use quick_xml::events::Event;
use quick_xml::Writer;
use std::io::Cursor;
use zip::ZipWriter;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

const WORKBOOK_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"</Relationships>"#,
);

/// Excel refuses sheet names longer than this
const SHEET_NAME_LIMIT: usize = 31;

/// Writes `rows` as the only worksheet of a new workbook.
///
/// Every row keeps its position, so metadata rows above the header survive.
/// Empty cells are omitted. Cells whose text is a canonical number are stored
/// as numbers, everything else as inline strings, so identifiers like `001`
/// keep their leading zeros.
pub fn write_workbook(sheet_name: &str, rows: &[Vec<String>]) -> Result<Vec<u8>, RustyMarksError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.put("[Content_Types].xml", CONTENT_TYPES.as_bytes())?;
    zip.put("_rels/.rels", PACKAGE_RELATIONSHIPS.as_bytes())?;
    zip.put("xl/workbook.xml", &workbook_part(&sanitize_sheet_name(sheet_name))?)?;
    zip.put("xl/_rels/workbook.xml.rels", WORKBOOK_RELATIONSHIPS.as_bytes())?;
    zip.put("xl/worksheets/sheet1.xml", &worksheet_part(rows)?)?;
    Ok(zip.finish()?.into_inner())
}

fn workbook_part(sheet_name: &str) -> Result<Vec<u8>, RustyMarksError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.open("workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)])?;
    writer.open("sheets", &[])?;
    writer.empty_element("sheet", &[("name", sheet_name), ("sheetId", "1"), ("r:id", "rId1")])?;
    writer.close("sheets")?;
    writer.close("workbook")?;
    Ok(writer.into_inner())
}

fn worksheet_part(rows: &[Vec<String>]) -> Result<Vec<u8>, RustyMarksError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.open("worksheet", &[("xmlns", NS_MAIN)])?;
    writer.open("sheetData", &[])?;
    for (row_index, row) in rows.iter().enumerate() {
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        let number = (row_index + 1).to_string();
        writer.open("row", &[("r", &number)])?;
        for (col_index, value) in row.iter().enumerate().filter(|(_, value)| !value.is_empty()) {
            let reference = index_to_reference(row_index, col_index);
            if is_canonical_number(value) {
                writer.open("c", &[("r", &reference)])?;
                writer.text_element("v", &[], value)?;
            } else {
                writer.open("c", &[("r", &reference), ("t", "inlineStr")])?;
                writer.open("is", &[])?;
                writer.text_element("t", &[("xml:space", "preserve")], value)?;
                writer.close("is")?;
            }
            writer.close("c")?;
        }
        writer.close("row")?;
    }
    writer.close("sheetData")?;
    writer.close("worksheet")?;
    Ok(writer.into_inner())
}

/// True when the text reads back unchanged after a trip through a float.
fn is_canonical_number(value: &str) -> bool {
    value
        .parse::<f64>()
        .map(|number| number.is_finite() && number.to_string() == value)
        .unwrap_or(false)
}

fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|character| !matches!(character, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(SHEET_NAME_LIMIT)
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').to_owned();
    if cleaned.is_empty() {
        "Sheet1".to_owned()
    } else {
        cleaned
    }
}
