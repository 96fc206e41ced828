use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sheet conversion.
/// Aggregates errors from the pipeline stages and from the libraries used to write the outputs.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{0}")]
    WithContextError(String),

    // Source errors
    #[error("Spreadsheet file not found: '{}'", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Unsupported spreadsheet format '{}' (expected .xlsx, .xlsm or .xls)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Read spreadsheet '{}' failed: {}", .path.display(), .message)]
    SourceReadError { path: PathBuf, message: String },

    #[error("Sheet '{}' not found in '{}'", .sheet, .path.display())]
    SheetNotFound { path: PathBuf, sheet: String },

    // Pipeline errors
    #[error("{0}")]
    InvalidColumnSelection(#[from] crate::table::selection::SelectionError),

    #[error("Render sheet '{sheet}' failed: {source}")]
    RenderError {
        sheet: String,
        source: crate::render::RenderError,
    },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Third-party library errors
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, ConvertError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| ConvertError::WithContextError(format!("{}: {}", message, e)))
    }
}
