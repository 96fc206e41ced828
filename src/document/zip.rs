//! ZIP archive helper utilities for Office Open XML packages
//! Provides a convenient method for adding parts to a package

use crate::error::ConvertError;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Helper trait for writing package parts
pub(crate) trait ZipHelper {
    /// Adds a deflated part. Every part gets the same fixed timestamp so equal
    /// content yields an identical archive.
    fn add_part(&mut self, name: &str, content: &[u8]) -> Result<(), ConvertError>;
}

impl<W: Write + Seek> ZipHelper for ZipWriter<W> {
    fn add_part(&mut self, name: &str, content: &[u8]) -> Result<(), ConvertError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        self.start_file(name, options)?;
        self.write_all(content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    #[test]
    fn parts_can_be_read_back() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.add_part("word/document.xml", b"<w:document/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<w:document/>");
    }
}
