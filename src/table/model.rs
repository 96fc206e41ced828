use crate::spreadsheet::Grid;
use std::collections::BTreeSet;

/// Styling mode of the produced table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StyleMode {
    /// Plain text rows, no borders or backgrounds
    #[default]
    TextOnly,
    /// Header row highlight, body background and a 1pt black grid
    Decorated,
}

impl StyleMode {
    pub fn from_text_only(text_only: bool) -> Self {
        if text_only {
            StyleMode::TextOnly
        } else {
            StyleMode::Decorated
        }
    }
}

/// RGB color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const GREY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const WHITESMOKE: Color = Color::rgb(0.96, 0.96, 0.96);
    pub const BEIGE: Color = Color::rgb(0.96, 0.96, 0.86);
    pub const NAVY: Color = Color::rgb(0.0, 0.0, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    /// Hex form used by WordprocessingML, e.g. `000080`.
    pub fn to_hex(self) -> String {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("{:02X}{:02X}{:02X}", channel(self.r), channel(self.g), channel(self.b))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowRole {
    Header,
    Body,
}

/// Cell grid line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    /// Cell padding shared by every row: 6pt left and right, 3pt top and bottom.
    pub const CELL: Padding = Padding {
        top: 3.0,
        right: 6.0,
        bottom: 3.0,
        left: 6.0,
    };

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Visual attributes applied to every cell of a row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowStyle {
    pub role: RowRole,
    pub bold: bool,
    pub font_size: f32,
    pub leading: f32,
    pub foreground: Color,
    pub background: Option<Color>,
    pub border: Option<Border>,
    pub padding: Padding,
}

impl RowStyle {
    /// Style of a row at position `index` for the given mode.
    /// In decorated mode the first row is the header.
    pub fn for_row(mode: StyleMode, index: usize) -> Self {
        let body = RowStyle {
            role: RowRole::Body,
            bold: false,
            font_size: 10.0,
            leading: 12.0,
            foreground: Color::BLACK,
            background: None,
            border: None,
            padding: Padding::CELL,
        };
        match mode {
            StyleMode::TextOnly => body,
            StyleMode::Decorated if index == 0 => RowStyle {
                role: RowRole::Header,
                bold: true,
                font_size: 12.0,
                leading: 14.4,
                foreground: Color::WHITESMOKE,
                background: Some(Color::GREY),
                border: Some(Border {
                    width: 1.0,
                    color: Color::BLACK,
                }),
                padding: Padding {
                    bottom: 12.0,
                    ..Padding::CELL
                },
            },
            StyleMode::Decorated => RowStyle {
                background: Some(Color::BEIGE),
                border: Some(Border {
                    width: 1.0,
                    color: Color::BLACK,
                }),
                ..body
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub style: RowStyle,
}

/// Styled table ready for layout: every row padded to the same number of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct TableModel {
    mode: StyleMode,
    max_cols: usize,
    rows: Vec<TableRow>,
}

impl TableModel {
    /// Builds the table from a projected grid.
    ///
    /// Rows shorter than the widest row are padded with empty cells. Cell text is
    /// kept verbatim: no escaping, markup interpretation or trimming.
    pub fn build(grid: Grid, mode: StyleMode) -> Self {
        let max_cols = grid.width();
        let rows = grid
            .into_rows()
            .into_iter()
            .enumerate()
            .map(|(index, mut cells)| {
                cells.resize(max_cols, String::new());
                TableRow {
                    cells,
                    style: RowStyle::for_row(mode, index),
                }
            })
            .collect();
        TableModel { mode, max_cols, rows }
    }

    pub fn mode(&self) -> StyleMode {
        self.mode
    }

    pub fn max_cols(&self) -> usize {
        self.max_cols
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every character that appears in a cell, used to pick and subset a font.
    pub fn characters(&self) -> BTreeSet<char> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .flat_map(|cell| cell.chars())
            .filter(|c| !c.is_control())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>()),
        )
    }

    #[test]
    fn rows_are_padded_to_the_widest_row() {
        let model = TableModel::build(grid(&[&["a"], &["b", "c", "d"]]), StyleMode::TextOnly);
        assert_eq!(model.max_cols(), 3);
        assert_eq!(model.rows()[0].cells, vec!["a", "", ""]);
        assert_eq!(model.rows()[1].cells, vec!["b", "c", "d"]);
    }

    #[test]
    fn text_only_rows_share_the_body_style() {
        let model = TableModel::build(grid(&[&["h"], &["v"]]), StyleMode::TextOnly);
        for row in model.rows() {
            assert_eq!(row.style.role, RowRole::Body);
            assert_eq!(row.style.font_size, 10.0);
            assert_eq!(row.style.leading, 12.0);
            assert_eq!(row.style.background, None);
            assert_eq!(row.style.border, None);
        }
    }

    #[test]
    fn decorated_header_and_body() {
        let model = TableModel::build(grid(&[&["h"], &["v"]]), StyleMode::Decorated);
        let header = &model.rows()[0].style;
        assert_eq!(header.role, RowRole::Header);
        assert!(header.bold);
        assert_eq!(header.font_size, 12.0);
        assert_eq!(header.background, Some(Color::GREY));
        assert_eq!(header.foreground, Color::WHITESMOKE);
        assert_eq!(header.padding.bottom, 12.0);

        let body = &model.rows()[1].style;
        assert_eq!(body.role, RowRole::Body);
        assert_eq!(body.background, Some(Color::BEIGE));
        assert_eq!(body.border.map(|border| border.width), Some(1.0));
    }

    #[test]
    fn markup_like_text_is_kept_verbatim() {
        let model = TableModel::build(grid(&[&["<b>x</b> & y"]]), StyleMode::TextOnly);
        assert_eq!(model.rows()[0].cells[0], "<b>x</b> & y");
    }

    #[test]
    fn empty_grid_builds_an_empty_table() {
        let model = TableModel::build(Grid::default(), StyleMode::Decorated);
        assert!(model.is_empty());
        assert_eq!(model.max_cols(), 0);
    }

    #[test]
    fn color_hex() {
        assert_eq!(Color::NAVY.to_hex(), "000080");
        assert_eq!(Color::GREY.to_hex(), "808080");
        assert_eq!(Color::BEIGE.to_hex(), "F5F5DB");
    }
}
