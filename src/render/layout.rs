use super::font::Font;
use super::page::{PageSpec, TitleStyle};
use super::wrap::wrap_text;
use super::RenderError;
use crate::table::model::Border;
use crate::table::{Color, TableModel};

/// Positioned drawing instructions for a whole document.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub page: PageSpec,
    pub pages: Vec<Page>,
}

impl Layout {
    /// Number of table rows placed on each page, in page order.
    pub fn rows_per_page(&self) -> Vec<usize> {
        self.pages.iter().map(|page| page.rows.len()).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// Drawing order: later elements paint over earlier ones
    pub elements: Vec<Element>,
    /// Indices of the table rows placed on this page
    pub rows: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Rect(RectBox),
    Text(TextRun),
}

/// Cell box, coordinates of the bottom left corner in points.
#[derive(Clone, Debug, PartialEq)]
pub struct RectBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Option<Color>,
    pub stroke: Option<Border>,
}

/// One line of text, `y` is the baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
    pub bold: bool,
    pub text: String,
}

/// Lays out the title and the table rows over as many pages as needed.
///
/// Columns share the content width evenly. A row is never split: when it does
/// not fit in the space left on a page it moves to the next one.
///
/// # Arguments
///
/// * `model` - The styled table
/// * `page` - Page geometry
/// * `font` - Font used to measure text
/// * `title` - Title drawn centered at the top of the first page; empty for none
///
/// # Returns
///
/// * `Ok(Layout)` - At least one page, the first starting with the title
/// * `Err(RenderError::RowTooTall)` - A row is taller than a whole page
pub fn paginate(
    model: &TableModel,
    page: &PageSpec,
    font: &Font,
    title: &str,
) -> Result<Layout, RenderError> {
    let mut pages = Vec::new();
    let mut current = Page::default();
    let mut cursor = page.content_top();

    let title_style = TitleStyle::DEFAULT;
    let title_lines = wrap_text(title, font, title_style.font_size, page.content_width());
    if !title_lines.is_empty() {
        for (index, line) in title_lines.iter().enumerate() {
            let width = font.text_width(line, title_style.font_size);
            current.elements.push(Element::Text(TextRun {
                x: page.margin_left + (page.content_width() - width) / 2.0,
                y: cursor - title_style.font_size - index as f32 * title_style.leading,
                size: title_style.font_size,
                color: title_style.color,
                bold: title_style.bold,
                text: line.to_owned(),
            }));
        }
        cursor -= title_lines.len() as f32 * title_style.leading + title_style.space_after;
    }

    let column_width = page.content_width() / model.max_cols().max(1) as f32;
    for (index, row) in model.rows().iter().enumerate() {
        let style = &row.style;
        let text_width = (column_width - style.padding.horizontal()).max(0.0);
        let cells: Vec<Vec<String>> = row
            .cells
            .iter()
            .map(|cell| wrap_text(cell, font, style.font_size, text_width))
            .collect();
        let lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let height = lines as f32 * style.leading + style.padding.vertical();
        if height > page.content_height() {
            return Err(RenderError::RowTooTall {
                row: index,
                height,
                available: page.content_height(),
                columns: model.max_cols(),
                column_width,
            });
        }
        if cursor - height < page.margin_bottom {
            pages.push(std::mem::take(&mut current));
            cursor = page.content_top();
        }

        let top = cursor;
        for (column, lines) in cells.into_iter().enumerate() {
            let x = page.margin_left + column as f32 * column_width;
            if style.background.is_some() || style.border.is_some() {
                current.elements.push(Element::Rect(RectBox {
                    x,
                    y: top - height,
                    width: column_width,
                    height,
                    fill: style.background,
                    stroke: style.border,
                }));
            }
            for (line_index, text) in lines.into_iter().enumerate() {
                if text.is_empty() {
                    continue;
                }
                current.elements.push(Element::Text(TextRun {
                    x: x + style.padding.left,
                    y: top
                        - style.padding.top
                        - style.font_size
                        - line_index as f32 * style.leading,
                    size: style.font_size,
                    color: style.foreground,
                    bold: style.bold,
                    text,
                }));
            }
        }
        current.rows.push(index);
        cursor -= height;
    }

    pages.push(current);
    Ok(Layout { page: *page, pages })
}
