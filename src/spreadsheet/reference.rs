//! Conversion between Excel-style cell references ("B3") and 0-based indexes.

/// Number of rows in an Excel worksheet
pub(crate) const MAX_ROWS: usize = 1_048_576;
/// Number of columns in an Excel worksheet, A to XFD
pub(crate) const MAX_COLUMNS: usize = 16_384;

/// Converts 0-based row & column indexes to an Excel-style reference in upper case.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut reference = col_to_letters(col);
    reference.push_str(&(row + 1).to_string());
    reference
}

/// Converts a 0-based column index to column letters: 0 = A, 25 = Z, 26 = AA.
pub(crate) fn col_to_letters(col: usize) -> String {
    let mut column = col + 1;
    let mut letters = Vec::<u8>::new();
    while column > 0 {
        column -= 1;
        letters.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    letters.reverse();
    letters.into_iter().map(char::from).collect()
}

/// Converts column letters (case-insensitive) to a 0-based column index.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|letter| letter.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .try_fold(0usize, |index, letter| {
            index.checked_mul(26)?.checked_add((letter - b'A') as usize + 1)
        })
        .map(|column| column - 1)
        .filter(|col| *col < MAX_COLUMNS)
}

/// Converts a 1-based row number string to a 0-based row index.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number
        .parse::<usize>()
        .ok()
        .filter(|row| *row > 0 && *row <= MAX_ROWS)
        .map(|row| row - 1)
}

/// Splits a reference like "AB12" into its 0-based (row, column) indexes.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|character: char| character.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}
