//! XML writing utilities for WordprocessingML parts
//! Provides a writer wrapper with element helpers

use crate::error::ConvertError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// XML writer producing one in-memory part
pub(crate) struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Creates a writer and emits the standalone UTF-8 declaration
    pub(crate) fn new() -> Result<XmlWriter, ConvertError> {
        let mut writer = Writer::new(Vec::with_capacity(4096));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(XmlWriter { writer })
    }

    /// Opens an element
    pub(crate) fn start(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> Result<&mut Self, ConvertError> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(element))?;
        Ok(self)
    }

    /// Writes an element without content
    pub(crate) fn empty(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> Result<&mut Self, ConvertError> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Empty(element))?;
        Ok(self)
    }

    /// Writes escaped text, dropping characters XML 1.0 cannot carry
    pub(crate) fn text(&mut self, text: &str) -> Result<&mut Self, ConvertError> {
        let text: String = text.chars().filter(|c| is_xml_char(*c)).collect();
        self.writer.write_event(Event::Text(BytesText::new(&text)))?;
        Ok(self)
    }

    /// Closes an element
    pub(crate) fn end(&mut self, name: &str) -> Result<&mut Self, ConvertError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(self)
    }

    /// Writes `<name attributes>text</name>`
    pub(crate) fn element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<&mut Self, ConvertError> {
        self.start(name, attributes)?.text(text)?.end(name)
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || !c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(build: impl FnOnce(&mut XmlWriter) -> Result<(), ConvertError>) -> String {
        let mut writer = XmlWriter::new().unwrap();
        build(&mut writer).unwrap();
        String::from_utf8(writer.into_bytes()).unwrap()
    }

    #[test]
    fn writes_declaration_and_elements() {
        let xml = render(|writer| {
            writer
                .start("w:p", &[])?
                .empty("w:br", &[])?
                .element("w:t", &[("xml:space", "preserve")], " a ")?
                .end("w:p")?;
            Ok(())
        });
        assert_eq!(
            xml,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<w:p><w:br/><w:t xml:space="preserve"> a </w:t></w:p>"#
            )
        );
    }

    #[test]
    fn escapes_markup_characters() {
        let xml = render(|writer| {
            writer.element("t", &[], "<b>&\"")?;
            Ok(())
        });
        assert!(xml.ends_with("<t>&lt;b&gt;&amp;&quot;</t>"));
    }

    #[test]
    fn drops_control_characters() {
        let xml = render(|writer| {
            writer.element("t", &[], "a\u{1}b\tc")?;
            Ok(())
        });
        assert!(xml.ends_with("<t>ab\tc</t>"));
    }
}
