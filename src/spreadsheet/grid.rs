/// Ordered rows of cell text extracted from one sheet.
///
/// Rows may have different lengths. A grid built through [`Grid::from_rows`]
/// never contains a row whose cells are all empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Builds a grid from raw sheet rows, dropping every fully empty row.
    /// The relative order of the remaining rows is preserved.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        Grid {
            rows: rows.into_iter().filter(|row| !is_blank_row(row)).collect(),
        }
    }

    /// Wraps rows as they are, without the blank row filter.
    /// Used for projections, which keep every source row.
    pub(crate) fn from_projected_rows(rows: Vec<Vec<String>>) -> Self {
        Grid { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of the longest row, 0 for an empty grid.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// A row is blank when every cell is the empty string. Whitespace counts as content.
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(String::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn blank_rows_are_dropped_in_order() {
        let grid = Grid::from_rows(vec![
            row(&["a", "1"]),
            row(&["", ""]),
            row(&["b", "2"]),
            row(&[]),
            row(&["", "3"]),
        ]);

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.rows(), &[row(&["a", "1"]), row(&["b", "2"]), row(&["", "3"])]);
    }

    #[test]
    fn whitespace_is_content() {
        let grid = Grid::from_rows(vec![row(&[" ", ""])]);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn blank_row_filter_is_idempotent() {
        let grid = Grid::from_rows(vec![row(&["x"]), row(&[""]), row(&["y", "z"])]);
        let again = Grid::from_rows(grid.clone().into_rows());
        assert_eq!(again, grid);
    }

    #[test]
    fn width_of_ragged_rows() {
        let grid = Grid::from_rows(vec![row(&["a"]), row(&["b", "c", "d"]), row(&["e", "f"])]);
        assert_eq!(grid.width(), 3);
        assert_eq!(Grid::default().width(), 0);
    }
}
