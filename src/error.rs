use thiserror::Error;

/// Main error type for the Rusty Marks crate.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum RustyMarksError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    StringEncodingError(#[from] std::str::Utf8Error),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    CsvError(#[from] csv::Error),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Table module errors
    #[error("{0}")]
    ParseError(#[from] crate::table::ParseError),

    // Transfer module errors
    #[error("{0}")]
    TransferError(#[from] crate::transfer::TransferError),
}

/// The three failure kinds a caller has to react to differently.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input file is malformed or empty; reload a different file.
    Parse,
    /// A selected column is not in the table header; re-select.
    ColumnNotFound,
    /// A transfer was requested before both tables were loaded.
    EmptyTable,
}

impl RustyMarksError {
    /// Classifies the error for the calling layer.
    ///
    /// Everything that is not a column or load-order problem originates from
    /// reading an input file, so it is reported as a parse failure.
    pub fn kind(&self) -> ErrorKind {
        use crate::transfer::TransferError;
        match self {
            Self::TransferError(TransferError::ColumnNotFound { .. }) => ErrorKind::ColumnNotFound,
            Self::TransferError(TransferError::EmptyTable { .. }) => ErrorKind::EmptyTable,
            _ => ErrorKind::Parse,
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyMarksError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyMarksError::WithContextError(format!("{}: {}", message, e)))
    }
}
