//! # Session
//!
//! Holds the tables of one marks-transfer session for the UI layer: the
//! source marks list, the pristine destination template as parsed, and the
//! latest transfer result. Loading a file replaces its table wholesale and
//! discards any earlier result.
use crate::config::ExportFormat;
use crate::config::SessionConfig;
use crate::error::ResultMessage;
use crate::error::RustyMarksError;
use crate::filename;
use crate::spreadsheet::write_workbook;
use crate::table::to_delimited_text;
use crate::table::Table;
use crate::transfer::transfer;
use crate::transfer::ColumnSelection;
use crate::transfer::TableRole;
use crate::transfer::TransferError;
use crate::transfer::TransferPolicy;
use crate::transfer::TransferReport;
use chrono::NaiveDate;
use chrono::Utc;
use tracing::info;

/// Sheet name of exported workbooks when the destination was not a workbook
const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Bytes and file name of an exported table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    source: Option<Table>,
    destination: Option<Table>,
    destination_name: Option<String>,
    result: Option<(Table, TransferReport)>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session { config, ..Session::default() }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Loads the source marks list from CSV text or workbook bytes.
    pub fn load_source(&mut self, bytes: Vec<u8>) -> Result<&Table, RustyMarksError> {
        let table = self.config.source_parser().parse_bytes(bytes).with_prefix("Unable to read the marks list")?;
        Ok(self.replace_source(table))
    }

    /// Loads the source marks list from already decoded text.
    pub fn load_source_text(&mut self, text: &str) -> Result<&Table, RustyMarksError> {
        let table = self.config.source_parser().parse_delimited(text).with_prefix("Unable to read the marks list")?;
        Ok(self.replace_source(table))
    }

    fn replace_source(&mut self, table: Table) -> &Table {
        info!(rows = table.data_rows().len(), columns = table.columns().len(), "source loaded");
        self.result = None;
        self.source.insert(table)
    }

    /// Loads the destination template. `file_name` seeds the export name.
    pub fn load_destination(&mut self, bytes: Vec<u8>, file_name: Option<&str>) -> Result<&Table, RustyMarksError> {
        let table = self
            .config
            .destination_parser()
            .parse_bytes(bytes)
            .with_prefix("Unable to read the grading template")?;
        info!(
            rows = table.data_rows().len(),
            columns = table.columns().len(),
            file = file_name.unwrap_or_default(),
            "destination loaded"
        );
        self.result = None;
        self.destination_name = file_name.map(str::to_owned);
        Ok(self.destination.insert(table))
    }

    pub fn source(&self) -> Option<&Table> {
        self.source.as_ref()
    }

    /// The destination exactly as parsed, unaffected by transfers.
    pub fn destination(&self) -> Option<&Table> {
        self.destination.as_ref()
    }

    pub fn result(&self) -> Option<(&Table, &TransferReport)> {
        self.result.as_ref().map(|(table, report)| (table, report))
    }

    pub fn source_columns(&self) -> Result<&[String], RustyMarksError> {
        Ok(self.loaded_source()?.columns())
    }

    pub fn destination_columns(&self) -> Result<&[String], RustyMarksError> {
        Ok(self.loaded_destination()?.columns())
    }

    fn loaded_source(&self) -> Result<&Table, TransferError> {
        self.source.as_ref().ok_or(TransferError::EmptyTable { table: TableRole::Source })
    }

    fn loaded_destination(&self) -> Result<&Table, TransferError> {
        self.destination
            .as_ref()
            .ok_or(TransferError::EmptyTable { table: TableRole::Destination })
    }

    /// Transfers marks into a fresh copy of the pristine destination.
    ///
    /// Running again with another selection or policy starts over from the
    /// parsed destination, not from the previous result.
    pub fn run_transfer(
        &mut self,
        selection: &ColumnSelection,
        policy: TransferPolicy,
    ) -> Result<(&Table, &TransferReport), RustyMarksError> {
        let source = self.loaded_source()?;
        let destination = self.loaded_destination()?;
        let outcome = transfer(source, destination, selection, policy, &self.config.markers)?;
        let (table, report) = &*self.result.insert(outcome);
        Ok((table, report))
    }

    /// Serializes the transfer result, or the untouched destination when no
    /// transfer has run, in the configured export format.
    pub fn export_table(&self, custom_name: Option<&str>, date: NaiveDate) -> Result<Export, RustyMarksError> {
        let table = match &self.result {
            Some((table, _)) => table,
            None => self.loaded_destination()?,
        };
        let format = self.config.export_format;
        let bytes = match format {
            ExportFormat::Csv => {
                to_delimited_text(table, self.config.export_delimiter, self.config.line_terminator).into_bytes()
            }
            ExportFormat::Xlsx => {
                write_workbook(table.sheet_name().unwrap_or(DEFAULT_SHEET_NAME), table.rows())?
            }
        };
        let file_name = filename::compose(
            custom_name,
            self.destination_name.as_deref(),
            date,
            format.extension(),
            &self.config.fallback_base_name,
        );
        info!(file = %file_name, bytes = bytes.len(), "table exported");
        Ok(Export { bytes, file_name })
    }

    /// [`Session::export_table`] dated with the current UTC calendar day.
    pub fn export_today(&self, custom_name: Option<&str>) -> Result<Export, RustyMarksError> {
        self.export_table(custom_name, Utc::now().date_naive())
    }

    /// Drops the transfer result, keeping both loaded tables.
    pub fn revert(&mut self) {
        self.result = None;
    }

    /// Drops every table and file name, keeping the configuration.
    pub fn reset(&mut self) {
        *self = Session::new(self.config.clone());
    }
}
