//! Font selection, measurement and glyph encoding.
//!
//! A conversion uses exactly one [`Font`]. Selection prefers an installed TrueType
//! font covering every character of the table (Japanese-capable families first) and
//! falls back to the standard Helvetica font, which never fails to load but can only
//! draw WinAnsi characters.
use allsorts::binary::read::ReadScope;
use allsorts::font_data::FontData;
use allsorts::subset::{subset, CmapTarget, SubsetProfile};
use allsorts::tables::FontTableProvider;
use allsorts::tag;
use font_kit::family_name::FamilyName;
use font_kit::handle::Handle;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Installed font families tried in order when no font file is given.
pub const SYSTEM_FAMILIES: [&str; 13] = [
    "IPAexGothic",
    "IPAGothic",
    "Noto Sans JP",
    "Noto Sans CJK JP",
    "Source Han Sans JP",
    "Yu Gothic",
    "Meiryo",
    "MS Gothic",
    "Hiragino Sans",
    "Arial Unicode MS",
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
];

/// Name of the standard font used as last resort.
pub const BUILTIN_FONT_NAME: &str = "Helvetica";

/// Character substituted for text the built-in font cannot encode.
const REPLACEMENT: u8 = b'?';

#[derive(Error, Debug)]
pub enum FontError {
    #[error("Font unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid font data in '{0}': {1}")]
    InvalidData(String, String),

    #[error("Font '{0}' has no TrueType outlines")]
    UnsupportedOutlines(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Where the font comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FontSource {
    /// Search installed fonts
    #[default]
    System,
    /// A TrueType file, falling back to the system search when it cannot be used
    File(PathBuf),
    /// Standard Helvetica, never embedded
    Builtin,
}

/// The font used to measure and draw every text run of a document.
#[derive(Clone, Debug)]
pub enum Font {
    Builtin,
    Embedded(EmbeddedFont),
}

impl Font {
    /// Resolves a font for the given characters. Never fails: every problem along
    /// the way is logged and the next candidate is tried.
    pub fn load(source: &FontSource, chars: &BTreeSet<char>) -> Font {
        let font = match source {
            FontSource::Builtin => Font::Builtin,
            FontSource::File(path) => match EmbeddedFont::from_file(path, chars) {
                Ok(font) => Font::Embedded(font),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        %error,
                        "font file unusable, searching installed fonts"
                    );
                    Self::from_system(chars)
                }
            },
            FontSource::System => Self::from_system(chars),
        };
        debug!(font = font.name(), "selected font");
        font
    }

    /// Tries [`SYSTEM_FAMILIES`] and then the generic sans-serif family. The first
    /// font covering every character wins, otherwise the one covering the most.
    fn from_system(chars: &BTreeSet<char>) -> Font {
        let source = SystemSource::new();
        let families = SYSTEM_FAMILIES
            .iter()
            .map(|family| FamilyName::Title(family.to_string()))
            .chain(std::iter::once(FamilyName::SansSerif));

        let mut best: Option<EmbeddedFont> = None;
        for family in families {
            let font = match load_family(&source, &family, chars) {
                Ok(font) => font,
                Err(error) => {
                    debug!(?family, %error, "skip font family");
                    continue;
                }
            };
            if font.missing(chars).is_empty() {
                return Font::Embedded(font);
            }
            let better = best
                .as_ref()
                .map_or(true, |best| font.coverage(chars) > best.coverage(chars));
            if better {
                best = Some(font);
            }
        }

        match best {
            Some(font) if font.coverage(chars) > 0 => {
                warn!(
                    font = font.name(),
                    missing = font.missing(chars).len(),
                    "no installed font covers every character"
                );
                Font::Embedded(font)
            }
            _ => {
                warn!("no usable installed font, falling back to {}", BUILTIN_FONT_NAME);
                Font::Builtin
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Font::Builtin => BUILTIN_FONT_NAME,
            Font::Embedded(font) => font.name(),
        }
    }

    /// Checks whether the character is drawn with its own glyph.
    pub fn covers(&self, c: char) -> bool {
        match self {
            Font::Builtin => win_ansi_byte(c).is_some(),
            Font::Embedded(font) => font.glyphs.contains_key(&c),
        }
    }

    /// Advance width of one character in points.
    pub fn char_width(&self, c: char, size: f32) -> f32 {
        match self {
            Font::Builtin => builtin_width(c) * size / 1000.0,
            Font::Embedded(font) => font.advance(c) * size / 1000.0,
        }
    }

    /// Advance width of a text run in points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c, size)).sum()
    }

    /// Encodes text for a PDF show-text operator: WinAnsi bytes for the built-in
    /// font, big-endian glyph ids for an embedded one.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Font::Builtin => text
                .chars()
                .map(|c| win_ansi_byte(c).unwrap_or(REPLACEMENT))
                .collect(),
            Font::Embedded(font) => text
                .chars()
                .flat_map(|c| font.glyph_id(c).to_be_bytes())
                .collect(),
        }
    }
}

fn load_family(
    source: &SystemSource,
    family: &FamilyName,
    chars: &BTreeSet<char>,
) -> Result<EmbeddedFont, FontError> {
    let label = format!("{family:?}");
    let handle = source
        .select_best_match(std::slice::from_ref(family), &Properties::new())
        .map_err(|_| FontError::Unavailable(label.clone()))?;
    match handle {
        Handle::Path { path, font_index } => {
            let data = std::fs::read(&path)?;
            EmbeddedFont::from_bytes(&path.display().to_string(), data, font_index, chars)
        }
        Handle::Memory { bytes, font_index } => {
            EmbeddedFont::from_bytes(&label, bytes.to_vec(), font_index, chars)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Glyph {
    /// Glyph id in [`EmbeddedFont::program`]
    id: u16,
    /// Advance in 1/1000 em
    advance: f32,
}

/// Font metrics in 1/1000 em, as PDF font descriptors expect them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: f32,
    pub bounding_box: [f32; 4],
}

/// A TrueType font reduced to the glyphs a document needs.
#[derive(Clone, Debug)]
pub struct EmbeddedFont {
    name: String,
    program: Vec<u8>,
    metrics: FontMetrics,
    glyphs: BTreeMap<char, Glyph>,
    notdef_advance: f32,
}

impl EmbeddedFont {
    pub fn from_file(path: &Path, chars: &BTreeSet<char>) -> Result<Self, FontError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&path.display().to_string(), data, 0, chars)
    }

    /// Parses a font and keeps the glyphs of `chars`, subsetting the program when possible.
    ///
    /// # Arguments
    ///
    /// * `label` - Font origin for messages
    /// * `data` - Raw font file
    /// * `index` - Face index inside a collection
    /// * `chars` - Characters the document will draw
    pub fn from_bytes(
        label: &str,
        data: Vec<u8>,
        index: u32,
        chars: &BTreeSet<char>,
    ) -> Result<Self, FontError> {
        if !has_glyf_outlines(&data, index) {
            return Err(FontError::UnsupportedOutlines(label.to_owned()));
        }
        let data = Arc::new(data);
        let font = font_kit::font::Font::from_bytes(Arc::clone(&data), index)
            .map_err(|error| FontError::InvalidData(label.to_owned(), error.to_string()))?;

        let raw = font.metrics();
        let units_per_em = raw.units_per_em as f32;
        if units_per_em <= 0.0 {
            return Err(FontError::InvalidData(label.to_owned(), "units per em is zero".to_owned()));
        }
        let scale = |value: f32| value * 1000.0 / units_per_em;
        let metrics = FontMetrics {
            ascent: scale(raw.ascent),
            descent: scale(raw.descent),
            cap_height: scale(raw.cap_height),
            bounding_box: [
                scale(raw.bounding_box.min_x()),
                scale(raw.bounding_box.min_y()),
                scale(raw.bounding_box.max_x()),
                scale(raw.bounding_box.max_y()),
            ],
        };
        let advance = |id: u32| {
            font.advance(id)
                .map(|advance| scale(advance.x()))
                .unwrap_or(0.0)
        };

        let mut glyphs = BTreeMap::new();
        for c in chars {
            let Some(id) = font.glyph_for_char(*c).filter(|id| *id != 0) else {
                continue;
            };
            let Ok(id) = u16::try_from(id) else {
                continue;
            };
            glyphs.insert(*c, Glyph { id, advance: advance(id as u32) });
        }

        let name = sanitize_postscript_name(
            &font.postscript_name().unwrap_or_else(|| font.family_name()),
        );
        let mut embedded = EmbeddedFont {
            name,
            program: data.to_vec(),
            metrics,
            glyphs,
            notdef_advance: advance(0),
        };
        embedded.subset_program(index);
        Ok(embedded)
    }

    /// Replaces the program with a subset holding `.notdef` plus the used glyphs,
    /// renumbering glyph ids in that order. Keeps the full program if subsetting fails.
    fn subset_program(&mut self, index: u32) {
        let mut ids: Vec<u16> = self.glyphs.values().map(|glyph| glyph.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.insert(0, 0);

        let program = ReadScope::new(&self.program)
            .read::<FontData>()
            .map_err(|error| error.to_string())
            .and_then(|font_data| {
                let provider = font_data
                    .table_provider(index as usize)
                    .map_err(|error| error.to_string())?;
                subset(&provider, &ids, &SubsetProfile::Pdf, CmapTarget::default())
                    .map_err(|error| error.to_string())
            });
        match program {
            Ok(program) => {
                let renumbered: BTreeMap<u16, u16> = ids
                    .iter()
                    .enumerate()
                    .map(|(new_id, old_id)| (*old_id, new_id as u16))
                    .collect();
                for glyph in self.glyphs.values_mut() {
                    glyph.id = renumbered.get(&glyph.id).copied().unwrap_or(0);
                }
                debug!(font = %self.name, glyphs = ids.len(), bytes = program.len(), "subset font");
                self.program = program;
            }
            Err(error) => {
                debug!(font = %self.name, %error, "subsetting failed, embedding the whole font");
            }
        }
    }

    /// PostScript name of the face.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// TrueType program to embed.
    pub fn program(&self) -> &[u8] {
        &self.program
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Glyph id used to draw the character, `0` (.notdef) when it is not covered.
    pub fn glyph_id(&self, c: char) -> u16 {
        self.glyphs.get(&c).map(|glyph| glyph.id).unwrap_or(0)
    }

    fn advance(&self, c: char) -> f32 {
        self.glyphs
            .get(&c)
            .map(|glyph| glyph.advance)
            .unwrap_or(self.notdef_advance)
    }

    /// Glyph advances in 1/1000 em, ordered by glyph id.
    pub fn widths(&self) -> BTreeMap<u16, f32> {
        let mut widths = BTreeMap::from([(0, self.notdef_advance)]);
        for glyph in self.glyphs.values() {
            widths.insert(glyph.id, glyph.advance);
        }
        widths
    }

    /// Unicode text of each glyph, for copy and search in viewers.
    /// When several characters share a glyph the smallest one is kept.
    pub fn to_unicode(&self) -> BTreeMap<u16, char> {
        let mut mapping = BTreeMap::new();
        for (c, glyph) in &self.glyphs {
            mapping.entry(glyph.id).or_insert(*c);
        }
        mapping
    }

    fn coverage(&self, chars: &BTreeSet<char>) -> usize {
        chars.iter().filter(|c| self.glyphs.contains_key(*c)).count()
    }

    fn missing(&self, chars: &BTreeSet<char>) -> Vec<char> {
        chars
            .iter()
            .filter(|c| !self.glyphs.contains_key(*c))
            .copied()
            .collect()
    }
}

/// Only TrueType outlines can be embedded as a CIDFontType2 font.
fn has_glyf_outlines(data: &[u8], index: u32) -> bool {
    let Ok(font_data) = ReadScope::new(data).read::<FontData>() else {
        return false;
    };
    let Ok(provider) = font_data.table_provider(index as usize) else {
        return false;
    };
    matches!(provider.table_data(tag::GLYF), Ok(Some(_)))
}

/// PDF names allow no whitespace or delimiters.
fn sanitize_postscript_name(name: &str) -> String {
    let name: String = name
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect();
    if name.is_empty() {
        "EmbeddedFont".to_owned()
    } else {
        name
    }
}

/// Maps a character to its WinAnsiEncoding byte.
pub(crate) fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => {
            let byte = match c {
                '€' => 0x80,
                '‚' => 0x82,
                'ƒ' => 0x83,
                '„' => 0x84,
                '…' => 0x85,
                '†' => 0x86,
                '‡' => 0x87,
                'ˆ' => 0x88,
                '‰' => 0x89,
                'Š' => 0x8A,
                '‹' => 0x8B,
                'Œ' => 0x8C,
                'Ž' => 0x8E,
                '\u{2018}' => 0x91,
                '\u{2019}' => 0x92,
                '\u{201C}' => 0x93,
                '\u{201D}' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '˜' => 0x98,
                '™' => 0x99,
                'š' => 0x9A,
                '›' => 0x9B,
                'œ' => 0x9C,
                'ž' => 0x9E,
                'Ÿ' => 0x9F,
                _ => return None,
            };
            Some(byte)
        }
    }
}

/// Helvetica advance widths for 0x20..=0x7E, in 1/1000 em.
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

/// Width of the glyph Helvetica draws for the character.
/// Characters outside ASCII are approximated by an average letter width.
fn builtin_width(c: char) -> f32 {
    let width = match win_ansi_byte(c) {
        Some(byte @ 0x20..=0x7E) => HELVETICA_ASCII_WIDTHS[(byte - 0x20) as usize],
        Some(0xA0) => 278,
        Some(_) => 556,
        None => HELVETICA_ASCII_WIDTHS[(REPLACEMENT - 0x20) as usize],
    };
    width as f32
}

/// First installed TrueType face found among [`SYSTEM_FAMILIES`] and the generic
/// sans-serif family, with its face index.
#[cfg(test)]
pub(crate) fn installed_truetype() -> Option<(Vec<u8>, u32)> {
    let source = SystemSource::new();
    SYSTEM_FAMILIES
        .iter()
        .map(|family| FamilyName::Title(family.to_string()))
        .chain(std::iter::once(FamilyName::SansSerif))
        .find_map(|family| {
            let handle = source.select_best_match(&[family], &Properties::new()).ok()?;
            let (data, index) = match handle {
                Handle::Path { path, font_index } => (std::fs::read(path).ok()?, font_index),
                Handle::Memory { bytes, font_index } => (bytes.to_vec(), font_index),
            };
            has_glyf_outlines(&data, index).then_some((data, index))
        })
}
