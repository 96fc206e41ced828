//! # PDF Rendering Module
//!
//! Turns a [`TableModel`] into a paginated PDF document:
//!
//! - [`page`] - Page geometry and title styling
//! - [`font`] - Font selection, metrics and glyph encoding
//! - [`wrap`] - Line breaking of cell text within a column
//! - [`layout`] - Row placement across pages
//! - [`pdf`] - Serialization of a layout with lopdf
pub mod font;
pub mod layout;
pub mod page;
pub mod pdf;
pub mod wrap;

pub use font::{Font, FontSource};
pub use layout::Layout;
pub use page::{PageSpec, DEFAULT_TITLE};

use crate::table::TableModel;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(
        "Row {} needs {:.1}pt but a page holds {:.1}pt ({} columns, {:.1}pt each)",
        .row + 1, .height, .available, .columns, .column_width
    )]
    RowTooTall {
        /// 0-based index of the table row
        row: usize,
        height: f32,
        available: f32,
        columns: usize,
        column_width: f32,
    },

    #[error("{0}")]
    PdfError(#[from] lopdf::Error),

    #[error("{0}")]
    IoError(#[from] std::io::Error),
}

/// A fully rendered PDF, not yet written anywhere.
#[derive(Debug)]
pub struct RenderedTable {
    pub layout: Layout,
    pub pdf: Vec<u8>,
}

impl RenderedTable {
    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }
}

/// Lays out and serializes a table.
pub fn render(
    model: &TableModel,
    page: &PageSpec,
    font: &Font,
    title: &str,
) -> Result<RenderedTable, RenderError> {
    let layout = layout::paginate(model, page, font, title)?;
    let pdf = pdf::write_pdf(&layout, font, title)?;
    Ok(RenderedTable { layout, pdf })
}
