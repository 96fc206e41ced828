//! # Spreadsheet Reading Module
//!
//! Opens Excel workbooks (.xlsx, .xlsm, .xls) and extracts one sheet at a time into a
//! [`Grid`] of cell text. Container decoding is delegated to calamine; this module
//! owns format detection, sheet lookup, value normalization and the blank row rule.
pub(crate) mod cell;
pub(crate) mod criteria;
pub mod grid;
pub mod reference;

pub use grid::Grid;

use crate::error::ConvertError;
use calamine::{open_workbook, Data, Range, Reader, Xls, Xlsx};
use std::ffi::OsStr;
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Type alias for buffered file reader
pub type FileReader = BufReader<File>;

/// File extensions recognized as spreadsheets (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "xls"];

/// Wrapper enum for the calamine readers of each supported container.
enum Spreadsheet {
    /// Excel 2007+ format reader (.xlsx, .xlsm)
    Xlsx(Xlsx<FileReader>),
    /// Legacy Excel format reader (.xls)
    Xls(Xls<FileReader>),
}

/// An opened workbook, read-only.
///
/// The underlying file handle is released when the value is dropped, so every
/// exit path of a conversion closes the source.
pub struct Workbook {
    path: PathBuf,
    spreadsheet: Spreadsheet,
    sheet_names: Vec<String>,
}

impl Workbook {
    /// Opens a spreadsheet file, choosing the reader from the file extension.
    ///
    /// # Errors
    ///
    /// * `SourceNotFound` - the path does not exist
    /// * `UnsupportedFormat` - the extension is not one of [`SUPPORTED_EXTENSIONS`]
    /// * `SourceReadError` - the container cannot be opened or decoded
    pub fn open<P>(path: P) -> Result<Workbook, ConvertError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConvertError::SourceNotFound(path.to_path_buf()));
        }
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .filter(|extension| SUPPORTED_EXTENSIONS.contains(&extension.as_str()))
            .ok_or_else(|| ConvertError::UnsupportedFormat(path.to_path_buf()))?;
        let spreadsheet = match extension.as_str() {
            "xls" => Spreadsheet::Xls(
                open_workbook::<Xls<_>, _>(path).map_err(|error| read_error(path, error))?,
            ),
            _ => Spreadsheet::Xlsx(
                open_workbook::<Xlsx<_>, _>(path).map_err(|error| read_error(path, error))?,
            ),
        };
        let sheet_names = match &spreadsheet {
            Spreadsheet::Xlsx(xlsx) => xlsx.sheet_names(),
            Spreadsheet::Xls(xls) => xls.sheet_names(),
        };
        debug!(path = %path.display(), sheets = sheet_names.len(), "opened workbook");
        Ok(Workbook {
            path: path.to_path_buf(),
            spreadsheet,
            sheet_names,
        })
    }

    /// Source path of the workbook.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the names of all sheets in workbook order.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Checks whether a sheet with exactly this name exists.
    pub fn contains(&self, sheet_name: &str) -> bool {
        self.sheet_names.iter().any(|name| name == sheet_name)
    }

    /// Extracts one sheet into a [`Grid`].
    ///
    /// Each cell's resolved value is converted to text, absent cells become empty
    /// strings and fully empty rows are dropped. Column positions are absolute: a
    /// sheet whose data starts in column C still has empty cells for A and B.
    ///
    /// # Errors
    ///
    /// * `SheetNotFound` - no sheet with this name
    /// * `SourceReadError` - the sheet data cannot be decoded
    pub fn extract(&mut self, sheet_name: &str) -> Result<Grid, ConvertError> {
        if !self.contains(sheet_name) {
            return Err(ConvertError::SheetNotFound {
                path: self.path.to_path_buf(),
                sheet: sheet_name.to_owned(),
            });
        }
        let path = &self.path;
        let range = match &mut self.spreadsheet {
            Spreadsheet::Xlsx(xlsx) => xlsx
                .worksheet_range(sheet_name)
                .map_err(|error| read_error(path, error))?,
            Spreadsheet::Xls(xls) => xls
                .worksheet_range(sheet_name)
                .map_err(|error| read_error(path, error))?,
        };
        let grid = range_to_grid(&range);
        debug!(sheet = sheet_name, rows = grid.len(), columns = grid.width(), "extracted sheet");
        Ok(grid)
    }
}

/// Converts a calamine range into a grid, restoring the columns left of the used range.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let column_offset = range
        .start()
        .map(|(_, column)| column as usize)
        .unwrap_or(0);
    Grid::from_rows(range.rows().map(|cells| {
        let mut row = vec![String::new(); column_offset];
        row.extend(cells.iter().map(cell::to_text));
        row
    }))
}

fn read_error<E: Display>(path: &Path, error: E) -> ConvertError {
    ConvertError::SourceReadError {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::Workbook as XlsxWriter;
    use tempfile::TempDir;

    fn texts(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn write_fixture(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("people.xlsx");
        let mut workbook = XlsxWriter::new();
        let sheet = workbook.add_worksheet().set_name("People").unwrap();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 1, "Age").unwrap();
        sheet.write_string(1, 0, "Ann").unwrap();
        sheet.write_number(1, 1, 30).unwrap();
        // row 3 left empty
        sheet.write_string(3, 0, "Bo").unwrap();
        sheet.write_number(3, 1, 25.5).unwrap();
        sheet.write_boolean(4, 0, true).unwrap();
        let offset = workbook.add_worksheet().set_name("Offset").unwrap();
        offset.write_string(2, 2, "C3").unwrap();
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn open_missing_file() {
        let result = Workbook::open("does/not/exist.xlsx");
        assert!(matches!(result, Err(ConvertError::SourceNotFound(_))));
    }

    #[test]
    fn open_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n").unwrap();
        let result = Workbook::open(&path);
        assert!(matches!(result, Err(ConvertError::UnsupportedFormat(_))));
    }

    #[test]
    fn open_corrupt_container() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        let result = Workbook::open(&path);
        assert!(matches!(result, Err(ConvertError::SourceReadError { .. })));
    }

    #[test]
    fn sheet_names_keep_workbook_order() {
        let dir = TempDir::new().unwrap();
        let workbook = Workbook::open(write_fixture(&dir)).unwrap();
        assert_eq!(workbook.sheet_names(), &["People".to_owned(), "Offset".to_owned()]);
        assert!(workbook.contains("Offset"));
        assert!(!workbook.contains("offset"));
    }

    #[test]
    fn extract_normalizes_values_and_drops_blank_rows() {
        let dir = TempDir::new().unwrap();
        let mut workbook = Workbook::open(write_fixture(&dir)).unwrap();
        let grid = workbook.extract("People").unwrap();
        assert_eq!(
            grid.into_rows(),
            texts(&[&["Name", "Age"], &["Ann", "30"], &["Bo", "25.5"], &["TRUE", ""]])
        );
    }

    #[test]
    fn extract_keeps_absolute_columns() {
        let dir = TempDir::new().unwrap();
        let mut workbook = Workbook::open(write_fixture(&dir)).unwrap();
        let grid = workbook.extract("Offset").unwrap();
        assert_eq!(grid.into_rows(), texts(&[&["", "", "C3"]]));
    }

    #[test]
    fn extract_unknown_sheet() {
        let dir = TempDir::new().unwrap();
        let mut workbook = Workbook::open(write_fixture(&dir)).unwrap();
        let result = workbook.extract("Missing");
        assert!(matches!(
            result,
            Err(ConvertError::SheetNotFound { sheet, .. }) if sheet == "Missing"
        ));
    }
}
