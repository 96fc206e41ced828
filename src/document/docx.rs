use super::xml::XmlWriter;
use super::zip::ZipHelper;
use crate::error::ConvertError;
use crate::render::page::TitleStyle;
use crate::table::{RowStyle, StyleMode, TableModel};
use std::io::Cursor;
use zip::ZipWriter;

const WORDML_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A4 portrait in twentieths of a point.
const PAGE_WIDTH: u32 = 11906;
const PAGE_HEIGHT: u32 = 16838;
/// One inch.
const PAGE_MARGIN: u32 = 1440;
const CONTENT_WIDTH: u32 = PAGE_WIDTH - 2 * PAGE_MARGIN;

const CONTENT_TYPES_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";
const OFFICE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CORE_PROPERTIES_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

const CONTENT_TYPES: &[(&str, &str)] = &[
    (
        "/word/document.xml",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
    ),
    (
        "/word/styles.xml",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
    ),
    (
        "/docProps/core.xml",
        "application/vnd.openxmlformats-package.core-properties+xml",
    ),
];

/// Builds the intermediate word processing document holding the title and the table.
///
/// The table mirrors the PDF: same cells, same row styles, borders and cell
/// shading only in decorated mode.
pub fn write_docx(model: &TableModel, title: &str) -> Result<Vec<u8>, ConvertError> {
    let mut package = ZipWriter::new(Cursor::new(Vec::new()));
    package.add_part("[Content_Types].xml", &content_types()?)?;
    package.add_part("_rels/.rels", &package_relationships()?)?;
    package.add_part("docProps/core.xml", &core_properties(title)?)?;
    package.add_part("word/_rels/document.xml.rels", &document_relationships()?)?;
    package.add_part("word/styles.xml", &styles()?)?;
    package.add_part("word/document.xml", &document(model, title)?)?;
    Ok(package.finish()?.into_inner())
}

fn content_types() -> Result<Vec<u8>, ConvertError> {
    let mut xml = XmlWriter::new()?;
    xml.start("Types", &[("xmlns", CONTENT_TYPES_NAMESPACE)])?
        .empty(
            "Default",
            &[
                ("Extension", "rels"),
                ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
            ],
        )?
        .empty(
            "Default",
            &[("Extension", "xml"), ("ContentType", "application/xml")],
        )?;
    for &(part, content_type) in CONTENT_TYPES {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    xml.end("Types")?;
    Ok(xml.into_bytes())
}

fn package_relationships() -> Result<Vec<u8>, ConvertError> {
    let office_document = format!("{OFFICE_RELATIONSHIPS}/officeDocument");
    let core_properties = format!("{PACKAGE_RELATIONSHIPS}/metadata/core-properties");
    let mut xml = XmlWriter::new()?;
    xml.start("Relationships", &[("xmlns", PACKAGE_RELATIONSHIPS)])?
        .empty(
            "Relationship",
            &[
                ("Id", "rId1"),
                ("Type", office_document.as_str()),
                ("Target", "word/document.xml"),
            ],
        )?
        .empty(
            "Relationship",
            &[
                ("Id", "rId2"),
                ("Type", core_properties.as_str()),
                ("Target", "docProps/core.xml"),
            ],
        )?
        .end("Relationships")?;
    Ok(xml.into_bytes())
}

fn document_relationships() -> Result<Vec<u8>, ConvertError> {
    let styles = format!("{OFFICE_RELATIONSHIPS}/styles");
    let mut xml = XmlWriter::new()?;
    xml.start("Relationships", &[("xmlns", PACKAGE_RELATIONSHIPS)])?
        .empty(
            "Relationship",
            &[
                ("Id", "rId1"),
                ("Type", styles.as_str()),
                ("Target", "styles.xml"),
            ],
        )?
        .end("Relationships")?;
    Ok(xml.into_bytes())
}

fn core_properties(title: &str) -> Result<Vec<u8>, ConvertError> {
    let mut xml = XmlWriter::new()?;
    xml.start(
        "cp:coreProperties",
        &[
            ("xmlns:cp", CORE_PROPERTIES_NAMESPACE),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
        ],
    )?
    .element("dc:title", &[], title)?
    .end("cp:coreProperties")?;
    Ok(xml.into_bytes())
}

fn styles() -> Result<Vec<u8>, ConvertError> {
    let title = TitleStyle::DEFAULT;
    let title_size = half_points(title.font_size);
    let title_after = twips(title.space_after);
    let title_line = twips(title.leading);
    let title_color = title.color.to_hex();

    let mut xml = XmlWriter::new()?;
    xml.start("w:styles", &[("xmlns:w", WORDML_NAMESPACE)])?
        .start("w:docDefaults", &[])?
        .start("w:rPrDefault", &[])?
        .start("w:rPr", &[])?
        .empty(
            "w:rFonts",
            &[
                ("w:ascii", "Helvetica"),
                ("w:hAnsi", "Helvetica"),
                ("w:eastAsia", "IPAexGothic"),
            ],
        )?
        .empty("w:sz", &[("w:val", "20")])?
        .end("w:rPr")?
        .end("w:rPrDefault")?
        .end("w:docDefaults")?;

    xml.start(
        "w:style",
        &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
    )?
        .empty("w:name", &[("w:val", "Normal")])?
        .start("w:pPr", &[])?
        .empty("w:spacing", &[("w:before", "0"), ("w:after", "0")])?
        .end("w:pPr")?
        .end("w:style")?;

    xml.start("w:style", &[("w:type", "paragraph"), ("w:styleId", "Title")])?
        .empty("w:name", &[("w:val", "Title")])?
        .empty("w:basedOn", &[("w:val", "Normal")])?
        .start("w:pPr", &[])?
        .empty(
            "w:spacing",
            &[
                ("w:after", title_after.as_str()),
                ("w:line", title_line.as_str()),
                ("w:lineRule", "exact"),
            ],
        )?
        .empty("w:jc", &[("w:val", "center")])?
        .end("w:pPr")?
        .start("w:rPr", &[])?;
    if title.bold {
        xml.empty("w:b", &[])?;
    }
    xml.empty("w:color", &[("w:val", title_color.as_str())])?
        .empty("w:sz", &[("w:val", title_size.as_str())])?
        .end("w:rPr")?
        .end("w:style")?;

    xml.start(
        "w:style",
        &[("w:type", "table"), ("w:default", "1"), ("w:styleId", "TableNormal")],
    )?
        .empty("w:name", &[("w:val", "Normal Table")])?
        .end("w:style")?
        .end("w:styles")?;
    Ok(xml.into_bytes())
}

fn document(model: &TableModel, title: &str) -> Result<Vec<u8>, ConvertError> {
    let mut xml = XmlWriter::new()?;
    xml.start("w:document", &[("xmlns:w", WORDML_NAMESPACE)])?
        .start("w:body", &[])?;

    xml.start("w:p", &[])?
        .start("w:pPr", &[])?
        .empty("w:pStyle", &[("w:val", "Title")])?
        .end("w:pPr")?;
    write_run(&mut xml, title, None)?;
    xml.end("w:p")?;

    if !model.is_empty() {
        write_table(&mut xml, model)?;
        // a body may not end with a table
        xml.empty("w:p", &[])?;
    }

    let width = PAGE_WIDTH.to_string();
    let height = PAGE_HEIGHT.to_string();
    let margin = PAGE_MARGIN.to_string();
    xml.start("w:sectPr", &[])?
        .empty("w:pgSz", &[("w:w", width.as_str()), ("w:h", height.as_str())])?
        .empty(
            "w:pgMar",
            &[
                ("w:top", margin.as_str()),
                ("w:right", margin.as_str()),
                ("w:bottom", margin.as_str()),
                ("w:left", margin.as_str()),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?
        .end("w:sectPr")?
        .end("w:body")?
        .end("w:document")?;
    Ok(xml.into_bytes())
}

fn write_table(xml: &mut XmlWriter, model: &TableModel) -> Result<(), ConvertError> {
    let column_width = (CONTENT_WIDTH / model.max_cols().max(1) as u32).to_string();
    let table_width = CONTENT_WIDTH.to_string();

    // CT_TblPr order: tblW, tblBorders, tblLayout, tblCellMar
    xml.start("w:tbl", &[])?
        .start("w:tblPr", &[])?
        .empty("w:tblW", &[("w:w", table_width.as_str()), ("w:type", "dxa")])?;
    if model.mode() == StyleMode::Decorated {
        xml.start("w:tblBorders", &[])?;
        for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
            xml.empty(
                edge,
                &[
                    ("w:val", "single"),
                    ("w:sz", "8"),
                    ("w:space", "0"),
                    ("w:color", "000000"),
                ],
            )?;
        }
        xml.end("w:tblBorders")?;
    }
    xml.empty("w:tblLayout", &[("w:type", "fixed")])?
        .start("w:tblCellMar", &[])?
        .empty("w:top", &[("w:w", "60"), ("w:type", "dxa")])?
        .empty("w:left", &[("w:w", "120"), ("w:type", "dxa")])?
        .empty("w:bottom", &[("w:w", "60"), ("w:type", "dxa")])?
        .empty("w:right", &[("w:w", "120"), ("w:type", "dxa")])?
        .end("w:tblCellMar")?
        .end("w:tblPr")?;

    xml.start("w:tblGrid", &[])?;
    for _ in 0..model.max_cols() {
        xml.empty("w:gridCol", &[("w:w", column_width.as_str())])?;
    }
    xml.end("w:tblGrid")?;

    for row in model.rows() {
        xml.start("w:tr", &[])?;
        for cell in &row.cells {
            xml.start("w:tc", &[])?
                .start("w:tcPr", &[])?
                .empty("w:tcW", &[("w:w", column_width.as_str()), ("w:type", "dxa")])?;
            if let Some(background) = row.style.background {
                let fill = background.to_hex();
                xml.empty(
                    "w:shd",
                    &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", fill.as_str())],
                )?;
            }
            xml.empty("w:vAlign", &[("w:val", "top")])?
                .end("w:tcPr")?
                .start("w:p", &[])?;
            write_run(xml, cell, Some(&row.style))?;
            xml.end("w:p")?.end("w:tc")?;
        }
        xml.end("w:tr")?;
    }
    xml.end("w:tbl")?;
    Ok(())
}

/// Writes a run for the text, newlines become line breaks. Empty text writes nothing.
fn write_run(
    xml: &mut XmlWriter,
    text: &str,
    style: Option<&RowStyle>,
) -> Result<(), ConvertError> {
    if text.is_empty() {
        return Ok(());
    }
    xml.start("w:r", &[])?;
    if let Some(style) = style {
        xml.start("w:rPr", &[])?;
        if style.bold {
            xml.empty("w:b", &[])?;
        }
        xml.empty("w:color", &[("w:val", style.foreground.to_hex().as_str())])?
            .empty("w:sz", &[("w:val", half_points(style.font_size).as_str())])?
            .end("w:rPr")?;
    }
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            xml.empty("w:br", &[])?;
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        xml.element("w:t", &[("xml:space", "preserve")], line)?;
    }
    xml.end("w:r")?;
    Ok(())
}

fn half_points(points: f32) -> String {
    ((points * 2.0).round() as u32).to_string()
}

fn twips(points: f32) -> String {
    ((points * 20.0).round() as u32).to_string()
}
