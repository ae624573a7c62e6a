//! # Transfer Module
//!
//! Joins a source table of marks to a destination template on a normalized
//! student identifier and writes the matched marks into a destination column.
//!
//! The destination is cloned before it is written, and every destination
//! data row yields exactly one [`TransferRecord`] in row order. Unmatched and
//! blank rows are outcomes in the report, not errors; only an invalid column
//! selection fails the transfer.
use crate::table::Table;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

mod normalize;

pub use normalize::normalize;
pub use normalize::normalize_cell;

/// Which of the two session tables an error refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TableRole {
    Source,
    Destination,
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRole::Source => write!(f, "source"),
            TableRole::Destination => write!(f, "destination"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Column '{column}' not found in the {table} table")]
    ColumnNotFound { table: TableRole, column: String },

    #[error("Load the {table} table before transferring marks")]
    EmptyTable { table: TableRole },
}

/// Columns chosen by the user for one transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSelection {
    pub source_id: String,
    pub source_mark: String,
    pub destination_id: String,
    pub destination_write: String,
}

impl ColumnSelection {
    pub fn new(
        source_id: impl Into<String>,
        source_mark: impl Into<String>,
        destination_id: impl Into<String>,
        destination_write: impl Into<String>,
    ) -> Self {
        ColumnSelection {
            source_id: source_id.into(),
            source_mark: source_mark.into(),
            destination_id: destination_id.into(),
            destination_write: destination_write.into(),
        }
    }
}

/// How a matched source mark becomes the written value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TransferPolicy {
    /// Copy the mark verbatim; a blank mark becomes the zero marker.
    #[default]
    Direct,
    /// Full credit for any attempt, no credit for a blank or zero mark.
    AttemptBased,
}

/// Literal values written by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    /// Written for unknown students and blank direct marks
    pub zero: String,
    /// Written for an attempt under [`TransferPolicy::AttemptBased`]
    pub full_credit: String,
    /// Written for no attempt under [`TransferPolicy::AttemptBased`]
    pub no_credit: String,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            zero: "0".to_owned(),
            full_credit: "100".to_owned(),
            no_credit: "0".to_owned(),
        }
    }
}

impl Markers {
    fn assign(&self, policy: TransferPolicy, mark: &str) -> String {
        let mark_text = mark.trim();
        match policy {
            TransferPolicy::Direct if mark_text.is_empty() => self.zero.clone(),
            TransferPolicy::Direct => mark.to_owned(),
            TransferPolicy::AttemptBased if mark_text.is_empty() || mark_text == self.zero => {
                self.no_credit.clone()
            }
            TransferPolicy::AttemptBased => self.full_credit.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransferReason {
    Matched,
    NotFound,
    MissingIdentifier,
}

/// Outcome for one destination data row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    /// Row index in the destination table
    pub row: usize,
    /// Normalized identifier, empty for [`TransferReason::MissingIdentifier`]
    pub identifier: String,
    pub matched: bool,
    /// Value written into the destination, `None` when the row was left alone
    pub value: Option<String>,
    pub reason: TransferReason,
}

/// Ordered outcomes of one transfer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferReport {
    records: Vec<TransferRecord>,
    identifier_column: usize,
    write_column: usize,
}

impl TransferReport {
    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, reason: TransferReason) -> usize {
        self.records.iter().filter(|record| record.reason == reason).count()
    }

    /// Number of students whose mark was found in the source.
    pub fn transferred(&self) -> usize {
        self.count(TransferReason::Matched)
    }

    /// Identifier and written cell of every reported row, read from `table`.
    pub fn preview<'a>(&self, table: &'a Table) -> Vec<(&'a str, &'a str)> {
        self.records
            .iter()
            .map(|record| {
                (
                    table.cell(record.row, self.identifier_column),
                    table.cell(record.row, self.write_column),
                )
            })
            .collect()
    }
}

fn require_column(table: &Table, role: TableRole, column: &str) -> Result<usize, TransferError> {
    table.column_index(column).ok_or_else(|| TransferError::ColumnNotFound {
        table: role,
        column: column.to_owned(),
    })
}

/// Writes marks from `source` into a copy of `destination`.
///
/// Source rows are indexed by normalized identifier with later rows
/// overwriting earlier ones. Each destination data row is then resolved in
/// order: a blank identifier leaves the row untouched, an unknown identifier
/// gets the zero marker, and a known one gets the mark shaped by `policy`.
pub fn transfer(
    source: &Table,
    destination: &Table,
    selection: &ColumnSelection,
    policy: TransferPolicy,
    markers: &Markers,
) -> Result<(Table, TransferReport), TransferError> {
    let source_id = require_column(source, TableRole::Source, &selection.source_id)?;
    let source_mark = require_column(source, TableRole::Source, &selection.source_mark)?;
    let destination_id = require_column(destination, TableRole::Destination, &selection.destination_id)?;
    let write_column = require_column(destination, TableRole::Destination, &selection.destination_write)?;

    let mut marks: HashMap<String, &str> = HashMap::new();
    for record in source.records() {
        let identifier = normalize(record.at(source_id));
        if identifier.is_empty() {
            continue;
        }
        let mark = record.at(source_mark);
        if let Some(previous) = marks.insert(identifier.clone(), mark) {
            warn!(identifier = %identifier, previous, mark, row = record.index(), "duplicate source identifier, later row wins");
        }
    }

    let mut updated = destination.clone();
    let mut records = Vec::with_capacity(destination.data_rows().len());
    for record in destination.records() {
        let row = record.index();
        let identifier = normalize(record.at(destination_id));
        let outcome = if identifier.is_empty() {
            debug!(row, "no identifier, row left unchanged");
            TransferRecord {
                row,
                identifier,
                matched: false,
                value: None,
                reason: TransferReason::MissingIdentifier,
            }
        } else if let Some(mark) = marks.get(&identifier) {
            let value = markers.assign(policy, mark);
            debug!(row, identifier = %identifier, value = %value, "mark transferred");
            updated.set_cell(row, write_column, value.clone());
            TransferRecord {
                row,
                identifier,
                matched: true,
                value: Some(value),
                reason: TransferReason::Matched,
            }
        } else {
            debug!(row, identifier = %identifier, "identifier not found, assigned zero");
            updated.set_cell(row, write_column, markers.zero.clone());
            TransferRecord {
                row,
                identifier,
                matched: false,
                value: Some(markers.zero.clone()),
                reason: TransferReason::NotFound,
            }
        };
        records.push(outcome);
    }

    let report = TransferReport { records, identifier_column: destination_id, write_column };
    info!(
        rows = report.len(),
        matched = report.transferred(),
        not_found = report.count(TransferReason::NotFound),
        missing_identifier = report.count(TransferReason::MissingIdentifier),
        ?policy,
        "transfer finished"
    );
    Ok((updated, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Table {
        Table::from_rows([vec!["id", "mark"], vec!["#001", "80"], vec!["002", ""]]).unwrap()
    }

    fn destination() -> Table {
        Table::from_rows([vec!["id", "final"], vec!["001", ""], vec!["003", ""]]).unwrap()
    }

    fn selection() -> ColumnSelection {
        ColumnSelection::new("id", "mark", "id", "final")
    }

    fn run(source: &Table, destination: &Table, policy: TransferPolicy) -> (Table, TransferReport) {
        transfer(source, destination, &selection(), policy, &Markers::default()).unwrap()
    }

    #[test]
    fn direct_policy() {
        let (updated, report) = run(&source(), &destination(), TransferPolicy::Direct);
        assert_eq!(updated.cell(1, 1), "80");
        assert_eq!(updated.cell(2, 1), "0");
        let reasons: Vec<_> = report.records().iter().map(|record| record.reason).collect();
        assert_eq!(reasons, [TransferReason::Matched, TransferReason::NotFound]);
        assert_eq!(report.records()[0].identifier, "001");
        assert!(report.records()[0].matched);
        assert_eq!(report.records()[1].value.as_deref(), Some("0"));
    }

    #[test]
    fn attempt_based_policy() {
        let (updated, report) = run(&source(), &destination(), TransferPolicy::AttemptBased);
        assert_eq!(updated.cell(1, 1), "100");
        assert_eq!(updated.cell(2, 1), "0");
        assert_eq!(report.transferred(), 1);
    }

    #[test]
    fn blank_and_zero_marks() {
        let source = Table::from_rows([vec!["id", "mark"], vec!["001", " "], vec!["002", "0"]]).unwrap();
        let destination = Table::from_rows([vec!["id", "final"], vec!["001"], vec!["002"]]).unwrap();

        let (direct, _) = run(&source, &destination, TransferPolicy::Direct);
        assert_eq!(direct.cell(1, 1), "0");
        assert_eq!(direct.cell(2, 1), "0");

        let (attempt, report) = run(&source, &destination, TransferPolicy::AttemptBased);
        assert_eq!(attempt.cell(1, 1), "0");
        assert_eq!(attempt.cell(2, 1), "0");
        assert_eq!(report.transferred(), 2);
    }

    #[test]
    fn custom_markers() {
        let markers = Markers {
            zero: "-".to_owned(),
            full_credit: "P".to_owned(),
            no_credit: "F".to_owned(),
        };
        let source = Table::from_rows([vec!["id", "mark"], vec!["001", "-"], vec!["002", "45"]]).unwrap();
        let destination =
            Table::from_rows([vec!["id", "final"], vec!["001"], vec!["002"], vec!["003"]]).unwrap();
        let (updated, _) =
            transfer(&source, &destination, &selection(), TransferPolicy::AttemptBased, &markers).unwrap();
        assert_eq!(updated.cell(1, 1), "F");
        assert_eq!(updated.cell(2, 1), "P");
        assert_eq!(updated.cell(3, 1), "-");
    }

    #[test]
    fn duplicate_source_identifiers_last_wins() {
        let source =
            Table::from_rows([vec!["id", "mark"], vec!["001", "50"], vec!["#001", "90"]]).unwrap();
        let (updated, _) = run(&source, &destination(), TransferPolicy::Direct);
        assert_eq!(updated.cell(1, 1), "90");
    }

    #[test]
    fn missing_identifier_leaves_row_untouched() {
        let destination = Table::from_rows([
            vec!["id", "final"],
            vec!["", "keep"],
            vec![" # ", "also keep"],
            vec!["001", "old"],
        ])
        .unwrap();
        let (updated, report) = run(&source(), &destination, TransferPolicy::Direct);
        assert_eq!(updated.cell(1, 1), "keep");
        assert_eq!(updated.cell(2, 1), "also keep");
        assert_eq!(updated.cell(3, 1), "80");
        assert_eq!(report.count(TransferReason::MissingIdentifier), 2);
        assert_eq!(report.count(TransferReason::NotFound), 0);
        assert_eq!(report.records()[0].value, None);
    }

    #[test]
    fn empty_source_marks_everyone_not_found() {
        let source = Table::from_rows([vec!["id", "mark"]]).unwrap();
        let (updated, report) = run(&source, &destination(), TransferPolicy::Direct);
        assert_eq!(report.count(TransferReason::NotFound), 2);
        assert_eq!(report.transferred(), 0);
        assert_eq!(updated.cell(1, 1), "0");
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let selection = ColumnSelection::new("id", "score", "id", "final");
        let error = transfer(&source(), &destination(), &selection, TransferPolicy::Direct, &Markers::default())
            .unwrap_err();
        assert_eq!(
            error,
            TransferError::ColumnNotFound { table: TableRole::Source, column: "score".to_owned() }
        );

        let selection = ColumnSelection::new("id", "mark", "student", "final");
        let error = transfer(&source(), &destination(), &selection, TransferPolicy::Direct, &Markers::default())
            .unwrap_err();
        assert_eq!(error.to_string(), "Column 'student' not found in the destination table");
    }

    #[test]
    fn destination_is_not_modified() {
        let destination = destination();
        let before = destination.clone();
        let (updated, _) = run(&source(), &destination, TransferPolicy::Direct);
        assert_eq!(destination, before);
        assert_ne!(updated, before);
    }

    #[test]
    fn report_covers_every_data_row_in_order() {
        let destination = Table::new(
            vec![
                vec!["Term 2".to_owned()],
                vec!["id".to_owned(), "name".to_owned(), "final".to_owned()],
                vec!["003".to_owned(), "C".to_owned()],
                vec![],
                vec!["001".to_owned(), "A".to_owned(), "".to_owned()],
            ],
            1,
        )
        .unwrap();
        let (updated, report) = run(&source(), &destination, TransferPolicy::Direct);
        assert_eq!(report.len(), destination.data_rows().len());
        let total = report.transferred()
            + report.count(TransferReason::NotFound)
            + report.count(TransferReason::MissingIdentifier);
        assert_eq!(total, report.len());
        let rows: Vec<_> = report.records().iter().map(|record| record.row).collect();
        assert_eq!(rows, [2, 3, 4]);
        assert_eq!(updated.rows()[0], ["Term 2"]);
        assert_eq!(updated.rows()[2], ["003", "C", "0"]);
        assert_eq!(updated.rows()[3], Vec::<String>::new());
        assert_eq!(updated.rows()[4], ["001", "A", "80"]);
        assert_eq!(report.preview(&updated), [("003", "0"), ("", ""), ("001", "80")]);
    }

    #[test]
    fn same_inputs_same_outputs() {
        let first = run(&source(), &destination(), TransferPolicy::AttemptBased);
        let second = run(&source(), &destination(), TransferPolicy::AttemptBased);
        assert_eq!(first, second);
    }
}
