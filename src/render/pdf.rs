use super::font::{EmbeddedFont, Font, BUILTIN_FONT_NAME};
use super::layout::{Element, Layout, Page, RectBox, TextRun};
use super::RenderError;
use crate::table::Color;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;

/// Resource name of the single font every page uses.
const FONT_RESOURCE: &str = "F1";

/// Subset tag prefixed to embedded font names.
const SUBSET_TAG: &str = "RSHEET";

const PRODUCER: &str = concat!("rusty-sheet-pdf ", env!("CARGO_PKG_VERSION"));

/// Maximum entries per bfchar block in a ToUnicode CMap.
const BFCHAR_BLOCK: usize = 100;

/// Serializes a layout into PDF bytes.
///
/// The document carries no timestamps, so the same layout and font always
/// produce the same bytes.
pub fn write_pdf(layout: &Layout, font: &Font, title: &str) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = match font {
        Font::Builtin => add_builtin_font(&mut doc),
        Font::Embedded(embedded) => add_embedded_font(&mut doc, embedded),
    };
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = page_content(page, font);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            real(layout.page.width),
            real(layout.page.height),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => text_string(title),
        "Producer" => text_string(PRODUCER),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    doc.compress();
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn add_builtin_font(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => BUILTIN_FONT_NAME,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Adds a Type0 font with Identity-H encoding: content streams address glyphs
/// directly by their 2-byte id.
fn add_embedded_font(doc: &mut Document, font: &EmbeddedFont) -> ObjectId {
    let base_font = Object::Name(format!("{}+{}", SUBSET_TAG, font.name()).into_bytes());
    let metrics = font.metrics();

    let program = font.program().to_vec();
    let file_id = doc.add_object(Stream::new(
        dictionary! {
            "Length1" => program.len() as i64,
        },
        program,
    ));
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.clone(),
        "Flags" => 32i64,
        "FontBBox" => metrics.bounding_box.iter().copied().map(real).collect::<Vec<_>>(),
        "ItalicAngle" => 0i64,
        "Ascent" => real(metrics.ascent),
        "Descent" => real(metrics.descent),
        "CapHeight" => real(metrics.cap_height),
        "StemV" => 80i64,
        "FontFile2" => file_id,
    });
    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => base_font.clone(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0i64,
        },
        "FontDescriptor" => descriptor_id,
        "W" => width_array(&font.widths()),
        "CIDToGIDMap" => "Identity",
    });
    let to_unicode_id = doc.add_object(Stream::new(
        dictionary! {},
        to_unicode_cmap(&font.to_unicode()).into_bytes(),
    ));
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(descendant_id)],
        "ToUnicode" => to_unicode_id,
    })
}

/// Groups consecutive glyph ids: `[first [w1 w2 ...] first [w ...] ...]`.
fn width_array(widths: &BTreeMap<u16, f32>) -> Vec<Object> {
    let mut array = Vec::new();
    let mut run: Vec<Object> = Vec::new();
    let mut run_start = 0u16;
    let mut previous: Option<u16> = None;
    for (id, width) in widths {
        if previous.and_then(|previous| previous.checked_add(1)) != Some(*id) {
            if !run.is_empty() {
                array.push(Object::Integer(run_start as i64));
                array.push(Object::Array(std::mem::take(&mut run)));
            }
            run_start = *id;
        }
        run.push(real(width.round()));
        previous = Some(*id);
    }
    if !run.is_empty() {
        array.push(Object::Integer(run_start as i64));
        array.push(Object::Array(run));
    }
    array
}

fn to_unicode_cmap(mapping: &BTreeMap<u16, char>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    let entries: Vec<(&u16, &char)> = mapping.iter().collect();
    for block in entries.chunks(BFCHAR_BLOCK) {
        cmap.push_str(&format!("{} beginbfchar\n", block.len()));
        for (id, c) in block {
            let mut units = [0u16; 2];
            let utf16: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            cmap.push_str(&format!("<{id:04X}> <{utf16}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}

fn page_content(page: &Page, font: &Font) -> Content {
    let mut operations = Vec::new();
    for element in &page.elements {
        match element {
            Element::Rect(rect) => rect_operations(rect, &mut operations),
            Element::Text(run) => text_operations(run, font, &mut operations),
        }
    }
    Content { operations }
}

fn rect_operations(rect: &RectBox, operations: &mut Vec<Operation>) {
    let paint = match (rect.fill, rect.stroke) {
        (Some(_), Some(_)) => "B",
        (Some(_), None) => "f",
        (None, Some(_)) => "S",
        (None, None) => return,
    };
    operations.push(Operation::new("q", vec![]));
    if let Some(fill) = rect.fill {
        operations.push(Operation::new("rg", color_operands(fill)));
    }
    if let Some(stroke) = rect.stroke {
        operations.push(Operation::new("RG", color_operands(stroke.color)));
        operations.push(Operation::new("w", vec![real(stroke.width)]));
    }
    operations.push(Operation::new(
        "re",
        vec![real(rect.x), real(rect.y), real(rect.width), real(rect.height)],
    ));
    operations.push(Operation::new(paint, vec![]));
    operations.push(Operation::new("Q", vec![]));
}

/// Bold runs are drawn with fill and stroke (render mode 2), a stroke width of
/// 1/30 of the font size thickens the glyphs of any font.
fn text_operations(run: &TextRun, font: &Font, operations: &mut Vec<Operation>) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new(
        "Tf",
        vec![Object::Name(FONT_RESOURCE.as_bytes().to_vec()), real(run.size)],
    ));
    operations.push(Operation::new("rg", color_operands(run.color)));
    if run.bold {
        operations.push(Operation::new("Tr", vec![Object::Integer(2)]));
        operations.push(Operation::new("RG", color_operands(run.color)));
        operations.push(Operation::new("w", vec![real(run.size / 30.0)]));
    }
    operations.push(Operation::new("Td", vec![real(run.x), real(run.y)]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::String(font.encode(&run.text), StringFormat::Hexadecimal)],
    ));
    operations.push(Operation::new("ET", vec![]));
}

fn color_operands(color: Color) -> Vec<Object> {
    vec![real(color.r), real(color.g), real(color.b)]
}

fn real(value: f32) -> Object {
    Object::from(value)
}

/// PDF text string: literal for ASCII, UTF-16BE with byte order mark otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::string_literal(text)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::paginate;
    use crate::render::page::PageSpec;
    use crate::spreadsheet::Grid;
    use crate::table::{StyleMode, TableModel};

    fn layout(rows: usize, mode: StyleMode) -> Layout {
        let grid = Grid::from_rows(
            (0..rows).map(|index| vec![format!("row {index}"), "x".to_owned()]),
        );
        let model = TableModel::build(grid, mode);
        paginate(&model, &PageSpec::a4(), &Font::Builtin, "Excel Data Export").unwrap()
    }

    #[test]
    fn writes_one_pdf_page_per_layout_page() {
        let layout = layout(120, StyleMode::Decorated);
        let bytes = write_pdf(&layout, &Font::Builtin, "Excel Data Export").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let document = Document::load_mem(&bytes).unwrap();
        assert_eq!(document.get_pages().len(), layout.pages.len());
    }

    #[test]
    fn output_is_deterministic() {
        let layout = layout(10, StyleMode::TextOnly);
        let first = write_pdf(&layout, &Font::Builtin, "Excel Data Export").unwrap();
        let second = write_pdf(&layout, &Font::Builtin, "Excel Data Export").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn page_shows_cell_text() {
        let layout = layout(2, StyleMode::TextOnly);
        let bytes = write_pdf(&layout, &Font::Builtin, "Excel Data Export").unwrap();
        let document = Document::load_mem(&bytes).unwrap();
        let page_id = document.get_pages()[&1];
        let content = Content::decode(&document.get_page_content(page_id).unwrap()).unwrap();
        let shown: Vec<Vec<u8>> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            shown,
            vec![
                b"Excel Data Export".to_vec(),
                b"row 0".to_vec(),
                b"x".to_vec(),
                b"row 1".to_vec(),
                b"x".to_vec(),
            ]
        );
    }

    #[test]
    fn decorated_rects_fill_and_stroke() {
        let mut operations = Vec::new();
        rect_operations(
            &RectBox {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 5.0,
                fill: Some(Color::BEIGE),
                stroke: Some(crate::table::model::Border {
                    width: 1.0,
                    color: Color::BLACK,
                }),
            },
            &mut operations,
        );
        let operators: Vec<&str> = operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators, vec!["q", "rg", "RG", "w", "re", "B", "Q"]);
    }

    #[test]
    fn width_array_groups_consecutive_ids() {
        let widths = BTreeMap::from([(0, 500.0), (1, 600.0), (2, 700.0), (5, 250.0)]);
        let array = width_array(&widths);
        assert_eq!(array.len(), 4);
        assert!(matches!(array[0], Object::Integer(0)));
        assert!(matches!(&array[1], Object::Array(run) if run.len() == 3));
        assert!(matches!(array[2], Object::Integer(5)));
    }

    #[test]
    fn to_unicode_uses_utf16() {
        let cmap = to_unicode_cmap(&BTreeMap::from([(1, 'A'), (2, '日'), (3, '😀')]));
        assert!(cmap.contains("1 begincodespacerange"));
        assert!(cmap.contains("3 beginbfchar"));
        assert!(cmap.contains("<0001> <0041>"));
        assert!(cmap.contains("<0002> <65E5>"));
        assert!(cmap.contains("<0003> <D83DDE00>"));
    }

    #[test]
    fn non_ascii_titles_are_utf16() {
        match text_string("日") {
            Object::String(bytes, _) => assert_eq!(bytes, vec![0xFE, 0xFF, 0x65, 0xE5]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn embedded_font_round_trips() {
        let Some((data, index)) = crate::render::font::installed_truetype() else {
            return;
        };
        let grid = Grid::from_rows([vec!["Привет".to_owned()], vec!["日本語".to_owned()]]);
        let model = TableModel::build(grid, StyleMode::TextOnly);
        let mut chars = model.characters();
        chars.insert('T');
        let embedded = EmbeddedFont::from_bytes("installed", data, index, &chars).unwrap();
        let program = embedded.program().to_vec();
        let font = Font::Embedded(embedded);

        let layout = paginate(&model, &PageSpec::a4(), &font, "T").unwrap();
        let bytes = write_pdf(&layout, &font, "T").unwrap();
        let document = Document::load_mem(&bytes).unwrap();

        let dictionaries: Vec<&lopdf::Dictionary> = document
            .objects
            .values()
            .filter_map(|object| object.as_dict().ok())
            .collect();
        fn subtype(dictionary: &lopdf::Dictionary, expected: &[u8]) -> bool {
            matches!(
                dictionary.get(b"Subtype"),
                Ok(Object::Name(name)) if name.as_slice() == expected
            )
        }
        let type0 = dictionaries
            .iter()
            .find(|dictionary| subtype(dictionary, b"Type0"))
            .unwrap();
        assert!(matches!(
            type0.get(b"Encoding"),
            Ok(Object::Name(name)) if name.as_slice() == b"Identity-H"
        ));
        assert!(dictionaries
            .iter()
            .any(|dictionary| subtype(dictionary, b"CIDFontType2")));

        let descriptor = dictionaries
            .iter()
            .find(|dictionary| dictionary.has(b"FontFile2"))
            .unwrap();
        let file_id = descriptor.get(b"FontFile2").unwrap().as_reference().unwrap();
        let stream = document.get_object(file_id).unwrap().as_stream().unwrap();
        let embedded_program = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        assert_eq!(embedded_program, program);

        let page_id = document.get_pages()[&1];
        let content = Content::decode(&document.get_page_content(page_id).unwrap()).unwrap();
        let shown: Vec<Vec<u8>> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            shown,
            vec![font.encode("T"), font.encode("Привет"), font.encode("日本語")]
        );
    }
}
