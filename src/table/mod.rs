//! # Table Module
//!
//! The uniform tabular representation shared by every input format: an
//! ordered list of rows, one of which (configurable) holds the column names.
//! Rows above the header are metadata and are carried through untouched.
//!
//! [`TableParser`] builds tables from delimited text or workbooks and
//! [`to_delimited_text`] renders them back.
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

mod parser;
mod serializer;

pub use parser::detect_delimiter;
pub use parser::TableParser;
pub use serializer::to_delimited_text;
pub use serializer::LineTerminator;

/// Errors raised while turning input into a [`Table`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Worksheet is empty")]
    EmptySheet,

    #[error("Header row {} is missing, the input has {rows} row(s)", .index + 1)]
    MissingHeaderRow { index: usize, rows: usize },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

/// Column names of a table and the lookup built from them.
#[derive(Clone, Debug, Default)]
struct Header {
    /// Display label per column, blank names replaced by `Column N`
    labels: Vec<String>,
    /// Label to column index, first occurrence wins
    positions: HashMap<String, usize>,
}

impl Header {
    fn new(cells: &[String]) -> Self {
        let mut header = Header::default();
        for (index, cell) in cells.iter().enumerate() {
            let label = column_label(cell, index);
            if header.positions.contains_key(&label) {
                warn!(column = %label, index, "duplicate column name, keeping the first one");
            } else {
                header.positions.insert(label.clone(), index);
            }
            header.labels.push(label);
        }
        header
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// Label shown for a header cell; blank header cells get a positional name.
fn column_label(cell: &str, index: usize) -> String {
    let name = cell.trim();
    if name.is_empty() {
        format!("Column {}", index + 1)
    } else {
        name.to_owned()
    }
}

/// Rows of cells with one header row.
///
/// Every row is conceptually as wide as the header: a missing trailing cell
/// reads as an empty string. Equality follows the same rule, so two tables
/// that differ only in trailing empty cells are equal.
#[derive(Clone, Debug)]
pub struct Table {
    rows: Vec<Vec<String>>,
    header_row: usize,
    header: Header,
    sheet_name: Option<String>,
}

impl Table {
    /// Builds a table whose column names are in row `header_row`.
    pub fn new(rows: Vec<Vec<String>>, header_row: usize) -> Result<Self, ParseError> {
        let Some(header_cells) = rows.get(header_row) else {
            return Err(ParseError::MissingHeaderRow { index: header_row, rows: rows.len() });
        };
        let header = Header::new(header_cells);
        Ok(Table { rows, header_row, header, sheet_name: None })
    }

    /// Convenience constructor from string literals, header in the first row.
    pub fn from_rows<R, C>(rows: R) -> Result<Self, ParseError>
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Table::new(rows, 0)
    }

    pub(crate) fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Name of the worksheet the table was read from, if any.
    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }

    /// Index of the header row.
    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// Column labels in header order.
    pub fn columns(&self) -> &[String] {
        &self.header.labels
    }

    /// Index of a column by label.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.position(name)
    }

    /// All rows, metadata and header included.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// Rows after the header.
    pub fn data_rows(&self) -> &[Vec<String>] {
        &self.rows[self.header_row + 1..]
    }

    /// Cell text, empty when the row is shorter than `col`.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Overwrites a cell, widening the row with empty cells when needed.
    ///
    /// Writing below the last row is ignored.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if let Some(cells) = self.rows.get_mut(row) {
            if cells.len() <= col {
                cells.resize(col + 1, String::new());
            }
            cells[col] = value.into();
        }
    }

    /// Data rows as records addressable by column name.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        self.rows
            .iter()
            .enumerate()
            .skip(self.header_row + 1)
            .map(move |(index, cells)| Record { index, cells, header: &self.header })
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.header_row == other.header_row
            && self.rows.len() == other.rows.len()
            && self
                .rows
                .iter()
                .zip(&other.rows)
                .all(|(left, right)| trim_trailing_empty(left) == trim_trailing_empty(right))
    }
}

fn trim_trailing_empty(cells: &[String]) -> &[String] {
    let width = cells.iter().rposition(|cell| !cell.is_empty()).map(|last| last + 1).unwrap_or(0);
    &cells[..width]
}

/// One data row viewed through the table header.
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    index: usize,
    cells: &'a [String],
    header: &'a Header,
}

impl<'a> Record<'a> {
    /// Row index within the table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell under `column`; `None` when the header has no such column.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let col = self.header.position(column)?;
        Some(self.at(col))
    }

    /// Cell at a column position, empty past the end of the row.
    pub fn at(&self, col: usize) -> &'a str {
        self.cells.get(col).map(String::as_str).unwrap_or("")
    }
}
