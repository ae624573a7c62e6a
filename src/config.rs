use crate::filename::DEFAULT_BASE_NAME;
use crate::table::LineTerminator;
use crate::table::TableParser;
use crate::transfer::Markers;

/// File format produced by [`crate::Session::export_table`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

/// Options for one marks-transfer session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Header row of the source marks list.
    pub source_header_row: usize,

    /// Header row of the destination template; 1 when row 1 holds metadata.
    pub destination_header_row: usize,

    /// Non-blank lines inspected to choose between `,` and `;`.
    pub sniff_lines: usize,

    /// Literals written for zero, full credit and no credit.
    pub markers: Markers,

    pub export_format: ExportFormat,

    /// Delimiter of exported CSV.
    pub export_delimiter: u8,

    pub line_terminator: LineTerminator,

    /// Export base name when neither a custom nor the destination file name is usable.
    pub fallback_base_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            source_header_row: 0,
            destination_header_row: 0,
            sniff_lines: 5,
            markers: Markers::default(),
            export_format: ExportFormat::default(),
            export_delimiter: b',',
            line_terminator: LineTerminator::default(),
            fallback_base_name: DEFAULT_BASE_NAME.to_owned(),
        }
    }
}

impl SessionConfig {
    pub fn with_source_header_row(mut self, row: usize) -> Self {
        self.source_header_row = row;
        self
    }

    pub fn with_destination_header_row(mut self, row: usize) -> Self {
        self.destination_header_row = row;
        self
    }

    pub fn with_sniff_lines(mut self, lines: usize) -> Self {
        self.sniff_lines = lines;
        self
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }

    pub fn with_export_delimiter(mut self, delimiter: u8) -> Self {
        self.export_delimiter = delimiter;
        self
    }

    pub fn with_line_terminator(mut self, terminator: LineTerminator) -> Self {
        self.line_terminator = terminator;
        self
    }

    pub fn with_fallback_base_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_base_name = name.into();
        self
    }

    pub(crate) fn source_parser(&self) -> TableParser {
        TableParser::new()
            .with_header_row(self.source_header_row)
            .with_sniff_lines(self.sniff_lines)
    }

    pub(crate) fn destination_parser(&self) -> TableParser {
        TableParser::new()
            .with_header_row(self.destination_header_row)
            .with_sniff_lines(self.sniff_lines)
    }
}
