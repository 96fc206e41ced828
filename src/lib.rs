//! # Spreadsheet to PDF Table Converter
//!
//! Renders the sheets of Excel workbooks as paginated PDF tables, writing an
//! intermediate word processing document (`.docx`) alongside each PDF.
//!
//! ## Pipeline
//!
//! 1. [`spreadsheet`] - Open a workbook and extract a sheet into a [`Grid`] of cell text,
//!    dropping fully empty rows
//! 2. [`table::selection`] - Keep the selected columns (`B` by default, `ALL`, or a list
//!    such as `A,C,AA`)
//! 3. [`table::model`] - Pad rows to equal width and attach text-only or decorated styling
//! 4. [`render`] - Pick a font, wrap cell text, paginate rows and serialize the PDF
//! 5. [`document`] - Write the same table as a `.docx`
//! 6. [`convert`] - Orchestrate one sheet or a whole workbook and write the outputs
//!
//! ## Example
//!
//! ```no_run
//! use rusty_sheet_pdf::{convert, ColumnSelection, ConversionRequest, StyleMode};
//!
//! let request = ConversionRequest::new("sales.xlsx")
//!     .sheet("Q1")
//!     .columns(ColumnSelection::parse("A,B,D")?)
//!     .style(StyleMode::Decorated);
//! let report = convert(&request)?;
//! for output in report.outputs() {
//!     println!("{} pages -> {}", output.pages, output.pdf_path.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod convert;
pub mod document;
pub mod error;
pub mod render;
pub mod spreadsheet;
pub mod table;

pub use convert::{
    convert, list_sheets, ConversionOutput, ConversionReport, ConversionRequest, SheetOutcome,
};
pub use error::ConvertError;
pub use render::{FontSource, PageSpec, DEFAULT_TITLE};
pub use spreadsheet::{Grid, Workbook};
pub use table::{ColumnSelection, StyleMode, TableModel};
