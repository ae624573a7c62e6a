use crate::error::RustyMarksError;
use crate::helpers::reader::PayloadKind;
use crate::helpers::text::decode_text;
use crate::spreadsheet::read_first_worksheet;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Worksheet;
use crate::table::ParseError;
use crate::table::Table;
use csv::ReaderBuilder;
use csv::StringRecord;
use tracing::debug;

/// Non-blank lines inspected when guessing the delimiter
const DEFAULT_SNIFF_LINES: usize = 5;

/// Builds [`Table`]s from delimited text and workbooks.
#[derive(Clone, Debug)]
pub struct TableParser {
    /// Row holding the column names; templates with a metadata row use 1
    header_row: usize,
    /// Number of non-blank lines used for delimiter detection
    sniff_lines: usize,
}

impl Default for TableParser {
    fn default() -> Self {
        TableParser { header_row: 0, sniff_lines: DEFAULT_SNIFF_LINES }
    }
}

impl TableParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    pub fn with_sniff_lines(mut self, sniff_lines: usize) -> Self {
        self.sniff_lines = sniff_lines.max(1);
        self
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// Parses delimited text, detecting `,` or `;` from the leading lines.
    pub fn parse_delimited(&self, text: &str) -> Result<Table, RustyMarksError> {
        let delimiter = detect_delimiter(text, self.sniff_lines);
        self.parse_delimited_with(text, delimiter)
    }

    /// Parses delimited text split on a known delimiter.
    ///
    /// Lines that are blank after trimming are discarded. Quoted fields may
    /// contain the delimiter, doubled quotes and line breaks.
    pub fn parse_delimited_with(&self, text: &str, delimiter: u8) -> Result<Table, RustyMarksError> {
        if text.trim().is_empty() {
            Err(ParseError::EmptyInput)?;
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(text.as_bytes());
        let mut record = StringRecord::new();
        let mut rows = Vec::new();
        loop {
            let start = reader.position().byte() as usize;
            if !reader.read_record(&mut record)? {
                break;
            }
            let end = reader.position().byte() as usize;
            let blank = text.get(start..end).map(|raw| raw.trim().is_empty()).unwrap_or(false);
            if !blank {
                rows.push(record.iter().map(str::to_owned).collect::<Vec<_>>());
            }
        }
        if rows.is_empty() {
            Err(ParseError::EmptyInput)?;
        }

        let table = Table::new(rows, self.header_row)?;
        debug!(
            rows = table.rows().len(),
            columns = table.columns().len(),
            delimiter = %char::from(delimiter),
            "parsed delimited table"
        );
        Ok(table)
    }

    /// Parses the first worksheet of an `.xlsx` workbook.
    pub fn parse_spreadsheet(&self, bytes: Vec<u8>) -> Result<Table, RustyMarksError> {
        match PayloadKind::sniff(&bytes) {
            PayloadKind::Zip => {}
            PayloadKind::CompoundFile => Err(ParseError::UnsupportedFormat(
                "legacy or encrypted workbook, save it as .xlsx".to_owned(),
            ))?,
            PayloadKind::Text => Err(ParseError::UnsupportedFormat("not a workbook".to_owned()))?,
        }
        let worksheet = match read_first_worksheet("workbook", bytes) {
            Err(RustyMarksError::SpreadsheetError(SpreadsheetError::SheetEmptyError(..))) => {
                Err(ParseError::EmptySheet)?
            }
            result => result?,
        };
        self.parse_worksheet(worksheet)
    }

    /// Builds a table from an already loaded worksheet grid.
    pub fn parse_worksheet(&self, worksheet: Worksheet) -> Result<Table, RustyMarksError> {
        if worksheet.rows.iter().all(|row| row.iter().all(|cell| cell.trim().is_empty())) {
            Err(ParseError::EmptySheet)?;
        }
        let table = Table::new(worksheet.rows, self.header_row)?.with_sheet_name(worksheet.name);
        debug!(
            sheet = table.sheet_name().unwrap_or_default(),
            rows = table.rows().len(),
            columns = table.columns().len(),
            header_row = self.header_row,
            "parsed worksheet table"
        );
        Ok(table)
    }

    /// Parses raw input bytes, routing workbooks and text by their content.
    pub fn parse_bytes(&self, bytes: Vec<u8>) -> Result<Table, RustyMarksError> {
        match PayloadKind::sniff(&bytes) {
            PayloadKind::Text => self.parse_delimited(&decode_text(&bytes)),
            _ => self.parse_spreadsheet(bytes),
        }
    }
}

/// Picks `;` when it occurs more often than `,` across the first
/// `sniff_lines` non-blank lines, `,` otherwise.
pub fn detect_delimiter(text: &str, sniff_lines: usize) -> u8 {
    let (commas, semicolons) = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(sniff_lines)
        .fold((0usize, 0usize), |(commas, semicolons), line| {
            (
                commas + line.matches(',').count(),
                semicolons + line.matches(';').count(),
            )
        });
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::tests::workbook;

    fn rows(table: &Table) -> Vec<Vec<&str>> {
        table
            .rows()
            .iter()
            .map(|row| row.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn detects_semicolons_when_more_frequent() {
        let text = "a,b,c,d;e;f;g;h;i\n1,2,3,4;5;6;7;8;9\n";
        assert_eq!(detect_delimiter(text, 5), b';');
    }

    #[test]
    fn delimiter_tie_favours_comma() {
        assert_eq!(detect_delimiter("a,b;c\n", 5), b',');
        assert_eq!(detect_delimiter("", 5), b',');
    }

    #[test]
    fn detection_only_looks_at_leading_lines() {
        let text = "\n\na,b\n1,2\nx;y;z;w\n";
        assert_eq!(detect_delimiter(text, 2), b',');
        assert_eq!(detect_delimiter(text, 3), b';');
    }

    #[test]
    fn parses_semicolon_text() {
        let table = TableParser::new().parse_delimited("id;mark\n#001;80\n002;\n").unwrap();
        assert_eq!(rows(&table), vec![vec!["id", "mark"], vec!["#001", "80"], vec!["002", ""]]);
        assert_eq!(table.columns(), ["id", "mark"]);
    }

    #[test]
    fn skips_blank_lines_and_handles_line_endings() {
        let table = TableParser::new()
            .parse_delimited("id,mark\r\n\r\n   \r\n001,80\r002,75\n\n")
            .unwrap();
        assert_eq!(rows(&table), vec![vec!["id", "mark"], vec!["001", "80"], vec!["002", "75"]]);
    }

    #[test]
    fn keeps_quoted_fields() {
        let table = TableParser::new()
            .parse_delimited("id,comment\n001,\"late, \"\"resubmitted\"\"\"\n002,\"two\nlines\"\n")
            .unwrap();
        assert_eq!(table.cell(1, 1), "late, \"resubmitted\"");
        assert_eq!(table.cell(2, 1), "two\nlines");
    }

    #[test]
    fn ragged_rows_are_kept() {
        let table = TableParser::new().parse_delimited("id,a,b\n001\n002,1,2,3\n").unwrap();
        assert_eq!(table.rows()[1], ["001"]);
        assert_eq!(table.rows()[2], ["002", "1", "2", "3"]);
    }

    #[test]
    fn empty_text_is_rejected() {
        for text in ["", "  \n\r\n \n"] {
            let error = TableParser::new().parse_delimited(text).unwrap_err();
            assert!(matches!(error, RustyMarksError::ParseError(ParseError::EmptyInput)));
        }
    }

    #[test]
    fn header_row_beyond_input() {
        let error = TableParser::new().with_header_row(1).parse_delimited("id,mark\n").unwrap_err();
        assert!(matches!(
            error,
            RustyMarksError::ParseError(ParseError::MissingHeaderRow { index: 1, rows: 1 })
        ));
    }

    const TEMPLATE_WITH_METADATA: &str = concat!(
        r#"<row r="1"><c r="A1" t="inlineStr"><is><t>PROG6221 Term 2</t></is></c></row>"#,
        r#"<row r="2"><c r="A2" t="inlineStr"><is><t>Student Number</t></is></c>"#,
        r#"<c r="B2" t="inlineStr"><is><t>Final</t></is></c></row>"#,
        r#"<row r="3"><c r="A3" t="inlineStr"><is><t>001</t></is></c></row>"#,
    );

    #[test]
    fn workbook_with_header_on_second_row() {
        let bytes = workbook(&["Roll"], TEMPLATE_WITH_METADATA, None, None);
        let table = TableParser::new().with_header_row(1).parse_spreadsheet(bytes).unwrap();
        assert_eq!(table.sheet_name(), Some("Roll"));
        assert_eq!(table.columns(), ["Student Number", "Final"]);
        let record = table.records().next().unwrap();
        assert_eq!(record.index(), 2);
        assert_eq!(record.get("Student Number"), Some("001"));
        assert_eq!(table.rows()[0], ["PROG6221 Term 2"]);
    }

    #[test]
    fn workbook_with_header_on_first_row() {
        let data = concat!(
            r#"<row r="1"><c r="A1" t="inlineStr"><is><t>id</t></is></c>"#,
            r#"<c r="B1" t="inlineStr"><is><t>final</t></is></c></row>"#,
            r#"<row r="2"><c r="A2" t="inlineStr"><is><t>001</t></is></c><c r="B2"><v>75</v></c></row>"#,
        );
        let bytes = workbook(&["Roll"], data, None, None);
        let table = TableParser::new().parse_spreadsheet(bytes).unwrap();
        assert_eq!(table.columns(), ["id", "final"]);
        assert_eq!(table.cell(1, 1), "75");
    }

    #[test]
    fn same_template_read_with_wrong_header_row() {
        let bytes = workbook(&["Roll"], TEMPLATE_WITH_METADATA, None, None);
        let table = TableParser::new().parse_spreadsheet(bytes).unwrap();
        assert_eq!(table.columns(), ["PROG6221 Term 2"]);
        assert_eq!(table.column_index("Student Number"), None);
    }

    #[test]
    fn empty_worksheet() {
        let bytes = workbook(&["Roll"], "", None, None);
        let error = TableParser::new().parse_spreadsheet(bytes).unwrap_err();
        assert!(matches!(error, RustyMarksError::ParseError(ParseError::EmptySheet)));
    }

    #[test]
    fn header_row_beyond_worksheet() {
        let data = concat!(
            r#"<row r="1"><c r="A1" t="inlineStr"><is><t>id</t></is></c></row>"#,
            r#"<row r="2"><c r="A2" t="inlineStr"><is><t>001</t></is></c></row>"#,
        );
        let bytes = workbook(&["Roll"], data, None, None);
        let error = TableParser::new().with_header_row(5).parse_spreadsheet(bytes).unwrap_err();
        assert!(matches!(
            error,
            RustyMarksError::ParseError(ParseError::MissingHeaderRow { index: 5, rows: 2 })
        ));
    }

    #[test]
    fn huge_cell_reference_is_a_parse_error() {
        let data = r#"<row r="900000000000"><c r="A900000000000"><v>1</v></c></row>"#;
        let bytes = workbook(&["Roll"], data, None, None);
        let error = TableParser::new().parse_spreadsheet(bytes).unwrap_err();
        assert!(matches!(error, RustyMarksError::ParseError(ParseError::UnsupportedFormat(_))));
        assert_eq!(error.kind(), crate::error::ErrorKind::Parse);
    }

    #[test]
    fn text_is_not_a_workbook() {
        let error = TableParser::new().parse_spreadsheet(b"id,mark".to_vec()).unwrap_err();
        assert!(matches!(error, RustyMarksError::ParseError(ParseError::UnsupportedFormat(_))));
    }

    #[test]
    fn bytes_are_routed_by_content() {
        let parser = TableParser::new();
        let text = parser.parse_bytes(b"\xEF\xBB\xBFid;mark\n001;80\n".to_vec()).unwrap();
        assert_eq!(text.columns(), ["id", "mark"]);
        assert_eq!(text.sheet_name(), None);

        let bytes = workbook(&["Roll"], TEMPLATE_WITH_METADATA, None, None);
        let sheet = parser.with_header_row(1).parse_bytes(bytes).unwrap();
        assert_eq!(sheet.sheet_name(), Some("Roll"));
    }
}
