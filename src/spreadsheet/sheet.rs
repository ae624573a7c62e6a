use crate::spreadsheet::cell::Cell;

/// A worksheet read from a workbook, kept as the sparse list of non-empty cells.
pub(crate) struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in document order
    pub(crate) cells: Vec<Cell>,
    /// Largest row index seen, `None` while the sheet is empty
    pub(crate) row_upper_bound: Option<usize>,
}

impl Sheet {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            row_upper_bound: None,
        }
    }

    /// Returns true if the sheet contains no cells.
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell, updating the row boundary.
    pub(crate) fn push(&mut self, cell: Cell) {
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < cell.row).unwrap_or(true) {
            self.row_upper_bound = Some(cell.row);
        }
        self.cells.push(cell);
    }

    /// Expands the sparse cells into a row-major grid anchored at A1.
    ///
    /// Row `n` of the grid is sheet row `n + 1`, so blank rows above or between
    /// data stay in place. Each row is as wide as its right-most non-empty cell;
    /// gaps inside a row become empty strings.
    pub(crate) fn into_rows(self, shared_strings: &[String]) -> Vec<Vec<String>> {
        let height = self.row_upper_bound.map(|row| row + 1).unwrap_or(0);
        let mut rows = vec![Vec::<String>::new(); height];
        for cell in self.cells {
            let text = cell.text(shared_strings);
            let row = &mut rows[cell.row];
            if row.len() <= cell.col {
                row.resize(cell.col + 1, String::new());
            }
            row[cell.col] = text;
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellType;

    fn push(sheet: &mut Sheet, row: usize, col: usize, value: &str) {
        sheet.push(Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: value.to_owned(),
        });
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("Roll");
        assert!(sheet.is_empty());
        assert_eq!(sheet.row_upper_bound, None);
        assert!(sheet.into_rows(&[]).is_empty());
    }

    #[test]
    fn sheet_grid_keeps_positions() {
        let mut sheet = Sheet::new("Roll");
        push(&mut sheet, 1, 0, "id");
        push(&mut sheet, 1, 2, "final");
        push(&mut sheet, 3, 1, "x");

        assert_eq!(sheet.row_upper_bound, Some(3));
        let rows = sheet.into_rows(&[]);
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1], vec!["id", "", "final"]);
        assert!(rows[2].is_empty());
        assert_eq!(rows[3], vec!["", "x"]);
    }

    #[test]
    fn sheet_resolves_shared_strings() {
        let mut sheet = Sheet::new("Roll");
        sheet.push(Cell { row: 0, col: 0, kind: CellType::SharedString, value: "0".to_owned() });
        sheet.push(Cell { row: 0, col: 1, kind: CellType::Number, value: "75".to_owned() });
        let rows = sheet.into_rows(&["#001".to_owned()]);
        assert_eq!(rows, vec![vec!["#001", "75"]]);
    }
}
