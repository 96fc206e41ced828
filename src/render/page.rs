use crate::table::Color;

/// Title used when none is given.
pub const DEFAULT_TITLE: &str = "Excel Data Export";

/// Page geometry in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSpec {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
}

impl PageSpec {
    /// Portrait A4 with 72pt margins on every side.
    pub const fn a4() -> Self {
        PageSpec {
            width: 595.2756,
            height: 841.8898,
            margin_top: 72.0,
            margin_right: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Y coordinate of the top edge of the content area (PDF origin is bottom left).
    pub fn content_top(&self) -> f32 {
        self.height - self.margin_top
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::a4()
    }
}

/// Styling of the title block on the first page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TitleStyle {
    pub font_size: f32,
    pub leading: f32,
    /// Gap between the last title line and the table
    pub space_after: f32,
    pub color: Color,
    pub bold: bool,
}

impl TitleStyle {
    pub const DEFAULT: TitleStyle = TitleStyle {
        font_size: 16.0,
        leading: 22.0,
        space_after: 42.0,
        color: Color::NAVY,
        bold: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_content_area() {
        let page = PageSpec::a4();
        assert!((page.content_width() - 451.2756).abs() < 1e-3);
        assert!((page.content_height() - 697.8898).abs() < 1e-3);
        assert!((page.content_top() - 769.8898).abs() < 1e-3);
    }
}
