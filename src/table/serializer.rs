use crate::table::Table;

/// Row separator used when rendering delimited text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LineTerminator {
    #[default]
    CrLf,
    Lf,
}

impl LineTerminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::CrLf => "\r\n",
            LineTerminator::Lf => "\n",
        }
    }
}

/// Renders every row of `table`, metadata and header included.
///
/// A cell is quoted when it contains the delimiter, a quote, a semicolon or
/// a line break, or starts with a byte order mark; embedded quotes are doubled. A row that would render as a
/// blank line gets its first cell quoted so the parser does not drop it.
pub fn to_delimited_text(table: &Table, delimiter: u8, terminator: LineTerminator) -> String {
    let delimiter = char::from(delimiter);
    let separator = delimiter.to_string();
    let mut text = String::new();
    for row in table.rows() {
        let line = row
            .iter()
            .map(|cell| escape(cell, delimiter))
            .collect::<Vec<_>>()
            .join(separator.as_str());
        if line.trim().is_empty() {
            text.push_str(&blank_row(row, delimiter));
        } else {
            text.push_str(&line);
        }
        text.push_str(terminator.as_str());
    }
    text
}

fn escape(cell: &str, delimiter: char) -> String {
    // The reader drops a leading byte order mark unless it is quoted
    let needs_quotes = cell.starts_with('\u{feff}')
        || cell
            .chars()
            .any(|c| c == delimiter || matches!(c, '"' | ';' | '\r' | '\n'));
    if needs_quotes {
        quote(cell)
    } else {
        cell.to_owned()
    }
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Renders a row of whitespace-only cells with a quoted first cell.
fn blank_row(row: &[String], delimiter: char) -> String {
    let mut cells = row.iter();
    let first = cells.next().map(|cell| quote(cell)).unwrap_or_else(|| quote(""));
    cells.fold(first, |mut line, cell| {
        line.push(delimiter);
        line.push_str(cell);
        line
    })
}
