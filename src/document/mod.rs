//! Intermediate word processing document (`.docx`) written next to each PDF.
pub mod docx;
mod xml;
mod zip;

pub use docx::write_docx;
