//! Microsoft Office Excel Helpers
use crate::error::RustyMarksError;
use crate::helpers::reader::PayloadKind;
use crate::helpers::reader::WorkbookReader;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use zip::ZipArchive;

/// XML tag name for relationship elements in Excel files
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Opens an Excel workbook and loads its structure
///
/// # Arguments
/// * `name` - Display name of the workbook, used in error messages
/// * `reader` - Workbook bytes
/// * `load_workbook` - Function to load worksheet names and the date system
/// * `load_number_formats` - Function to load number formatting information
///
/// # Returns
/// Tuple containing:
/// - Zip archive handle
/// - Number format mappings
/// - List of sheet names and their paths
pub(super) fn open<W, F>(name: &str, reader: WorkbookReader, load_workbook: W, load_number_formats: F) -> Result<(
    ZipArchive<WorkbookReader>,
    Vec<CellType>,
    Vec<(String, String)>
), RustyMarksError>
where
    W: Fn(&mut ZipArchive<WorkbookReader>) -> Result<(Vec<(String, String)>, bool), RustyMarksError>,
    F: Fn(&mut ZipArchive<WorkbookReader>, bool) -> Result<Vec<CellType>, RustyMarksError>,
{
    // Password protected and legacy binary workbooks are compound files, not ZIP archives
    if is_compound_file(&reader) {
        Err(SpreadsheetError::UnsupportedWorkbookError(name.to_owned()))?;
    }

    let mut zip = ZipArchive::new(reader)?;
    let (sheets, is_1904) = load_workbook(&mut zip)?;
    if sheets.is_empty() {
        Err(SpreadsheetError::SpreadsheetEmptyError(name.to_owned()))?
    }

    let number_formats = load_number_formats(&mut zip, is_1904)?;
    Ok((zip, number_formats, sheets))
}

/// Loads worksheet relationships from an Excel file
///
/// # Returns
/// Mapping of relationship IDs to worksheet paths
pub(super) fn load_relationships(zip: &mut ZipArchive<WorkbookReader>, path: &str) -> Result<HashMap<String, String>, RustyMarksError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only process worksheet relationships
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Maps format indexes to cell types using custom and built-in formats
pub(super) fn load_number_formats(format_indexes: Vec<String>, custom_formats: HashMap<String, CellType>, is_1904: bool) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Normalizes a relationship target to its path inside the workbook archive
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(absolute) = path.strip_prefix("/xl/") {
        format!("xl/{absolute}")
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Checks the leading bytes for a compound file signature
fn is_compound_file(reader: &WorkbookReader) -> bool {
    PayloadKind::sniff(reader.get_ref()) == PayloadKind::CompoundFile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path(Cow::Borrowed("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("/xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn number_formats_prefer_custom() {
        let mut custom = HashMap::new();
        custom.insert("164".to_owned(), CellType::NumberDate1900);
        let formats = load_number_formats(
            vec!["0".to_owned(), "164".to_owned(), "14".to_owned()],
            custom,
            false,
        );
        assert_eq!(formats, vec![CellType::Number, CellType::NumberDate1900, CellType::NumberDate1900]);
    }

    #[test]
    fn compound_files_are_rejected() {
        let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        bytes.extend_from_slice(&[0u8; 64]);
        let result = open(
            "legacy.xls",
            WorkbookReader::new(bytes),
            |_| Ok((Vec::new(), false)),
            |_, _| Ok(Vec::new()),
        );
        assert!(matches!(
            result,
            Err(RustyMarksError::SpreadsheetError(SpreadsheetError::UnsupportedWorkbookError(_)))
        ));
    }
}
