use crate::spreadsheet::reference::column_to_index;
use crate::spreadsheet::Grid;
use regex::Regex;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to column selection parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid column selection '{0}', expected 'ALL' or comma separated column letters")]
    FormatError(String),

    #[error("Invalid column letters '{0}'")]
    ColumnError(String),
}

/// Which columns of a sheet end up in the output, and in which order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ColumnSelection {
    /// Column B only
    #[default]
    Default,
    /// Columns by letter, in the given order; duplicates are kept
    Explicit(Vec<String>),
    /// Every column of the grid
    All,
}

impl ColumnSelection {
    /// Column letter used by [`ColumnSelection::Default`].
    pub const DEFAULT_COLUMN: &'static str = "B";

    /// Builds an explicit selection from column letters.
    pub fn explicit<I, S>(letters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnSelection::Explicit(letters.into_iter().map(Into::into).collect())
    }

    /// Parses the column selection surface: `"B"`, `"ALL"` or a comma separated list
    /// such as `"A, c,AA"`. Letters are case-insensitive and any `ALL` entry selects
    /// every column.
    pub fn parse(value: &str) -> Result<Self, SelectionError> {
        let pattern =
            Regex::new(r"^\s*[A-Za-z]+\s*(,\s*[A-Za-z]+\s*)*$").expect("Hardcode regex pattern");
        if !pattern.is_match(value) {
            return Err(SelectionError::FormatError(value.to_owned()));
        }
        let letters: Vec<String> = value
            .split(',')
            .map(|letters| letters.trim().to_ascii_uppercase())
            .collect();
        if letters.iter().any(|letters| letters == "ALL") {
            Ok(ColumnSelection::All)
        } else if letters.len() == 1 && letters[0] == Self::DEFAULT_COLUMN {
            Ok(ColumnSelection::Default)
        } else if let Some(invalid) = letters
            .iter()
            .find(|letters| column_to_index(letters).is_none())
        {
            Err(SelectionError::ColumnError(invalid.to_owned()))
        } else {
            Ok(ColumnSelection::Explicit(letters))
        }
    }

    /// Resolves the selection to 0-based column indices.
    ///
    /// Indices are not checked against `grid_width`: columns past the end of the
    /// grid are projected as empty cells.
    pub fn resolve(&self, grid_width: usize) -> Result<Vec<usize>, SelectionError> {
        match self {
            ColumnSelection::All => Ok((0..grid_width).collect()),
            ColumnSelection::Default => Ok(vec![1]),
            ColumnSelection::Explicit(letters) => letters
                .iter()
                .map(|letters| {
                    column_to_index(letters.trim())
                        .ok_or_else(|| SelectionError::ColumnError(letters.to_owned()))
                })
                .collect(),
        }
    }
}

impl FromStr for ColumnSelection {
    type Err = SelectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Projects every row of the grid onto the given column indices, in order.
/// An index outside a row yields an empty cell. Never fails and never drops rows.
pub fn project(grid: &Grid, indices: &[usize]) -> Grid {
    let rows = grid
        .rows()
        .iter()
        .map(|row| {
            indices
                .iter()
                .map(|index| row.get(*index).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    Grid::from_projected_rows(rows)
}
