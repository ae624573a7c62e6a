use crate::error::RustyMarksError;
use chrono::Duration;
use chrono::NaiveDate;
use std::fmt::Display;

/// Types of cell data in a worksheet.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values such as `#N/A`
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Literals, escapes and bracketed sections (colors, locales) are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A single worksheet cell with position, type, and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the worksheet part
    pub(crate) value: String,
}

impl Cell {
    /// Resolves the cell to the text shown in the table.
    ///
    /// Shared strings are looked up by index; an out of range index keeps the raw value.
    pub(crate) fn text(&self, shared_strings: &[String]) -> String {
        if self.kind == CellType::SharedString {
            self.value
                .parse::<usize>()
                .ok()
                .and_then(|index| shared_strings.get(index))
                .cloned()
                .unwrap_or_else(|| self.value.to_owned())
        } else {
            self.to_string()
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let formatted = match self.kind {
            CellType::Boolean => Some(if self.value == "1" { "TRUE" } else { "FALSE" }.to_owned()),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false).ok(),
            CellType::NumberDate1900 => to_date_string(&self.value, false).ok(),
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true).ok(),
            CellType::NumberDate1904 => to_date_string(&self.value, true).ok(),
            CellType::NumberTime1900 | CellType::NumberTime1904 => to_time_string(&self.value).ok(),
            CellType::IsoDateTime => Some(self.value.replace('T', " ")),
            _ => None,
        };
        // A value the format does not fit is shown as stored
        write!(f, "{}", formatted.as_deref().unwrap_or(&self.value))
    }
}

/// Converts Excel numeric date to ISO date string.
/// Handles the Lotus 1-2-3 leap year bug for the 1900 epoch.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, RustyMarksError> {
    let days = value
        .parse::<f64>()
        .map_err(|_| RustyMarksError::WithContextError(format!("'{value}' is not a serial date")))?
        .trunc() as i64;
    let duration = Duration::days(
        days + if is_1904 {
            1462
        } else if days < 60 {
            1
        } else {
            0
        },
    );
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .ok_or_else(|| RustyMarksError::WithContextError("invalid epoch".to_owned()))?;
    let date = epoch
        .checked_add_signed(duration)
        .ok_or_else(|| RustyMarksError::WithContextError(format!("'{value}' is out of date range")))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Converts Excel numeric time (fraction of a day) to an ISO time string.
fn to_time_string(value: &str) -> Result<String, RustyMarksError> {
    let factor = value
        .parse::<f64>()
        .map_err(|_| RustyMarksError::WithContextError(format!("'{value}' is not a serial time")))?;
    let mut hours = (factor.fract().abs() * 86_400_000f64).round() as i64;
    let milliseconds = hours % 1_000; hours /= 1_000;
    let seconds = hours % 60; hours /= 60;
    let minutes = hours % 60; hours /= 60;
    let timestamp = if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    };
    Ok(timestamp)
}

/// Converts Excel numeric datetime to ISO datetime string.
fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, RustyMarksError> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Ok(format!("{date} {time}"))
}
