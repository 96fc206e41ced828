use super::font::Font;
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use textwrap::WordSeparator;

/// A measured piece of a line: a word (or part of one) and the whitespace after it.
#[derive(Debug)]
struct Piece<'a> {
    word: &'a str,
    whitespace: &'a str,
    width: f64,
    whitespace_width: f64,
}

impl Fragment for Piece<'_> {
    fn width(&self) -> f64 {
        self.width
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace_width
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Breaks cell text into lines no wider than `width` points.
///
/// Explicit newlines always start a new line. Lines break at Unicode line break
/// opportunities, and a word wider than the column is split between characters,
/// keeping at least one character per line. Empty text has no lines.
pub fn wrap_text(text: &str, font: &Font, size: f32, width: f32) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .flat_map(|line| wrap_line(line, font, size, width))
        .collect()
}

fn wrap_line(line: &str, font: &Font, size: f32, width: f32) -> Vec<String> {
    let measure = |text: &str| font.text_width(text, size) as f64;
    let mut pieces = Vec::new();
    for word in WordSeparator::UnicodeBreakProperties.find_words(line) {
        let word_width = measure(word.word);
        if word_width <= width as f64 {
            pieces.push(Piece {
                word: word.word,
                whitespace: word.whitespace,
                width: word_width,
                whitespace_width: measure(word.whitespace),
            });
            continue;
        }
        let mut chunks = split_word(word.word, font, size, width).peekable();
        while let Some(chunk) = chunks.next() {
            let whitespace = if chunks.peek().is_none() { word.whitespace } else { "" };
            pieces.push(Piece {
                word: chunk,
                whitespace,
                width: measure(chunk),
                whitespace_width: measure(whitespace),
            });
        }
    }
    if pieces.is_empty() {
        return vec![String::new()];
    }

    wrap_first_fit(&pieces, &[width as f64])
        .into_iter()
        .map(|pieces| {
            let mut line = String::new();
            for (index, piece) in pieces.iter().enumerate() {
                line.push_str(piece.word);
                if index + 1 < pieces.len() {
                    line.push_str(piece.whitespace);
                }
            }
            line
        })
        .collect()
}

/// Splits a word into the longest runs of characters that fit the width.
fn split_word<'a>(
    word: &'a str,
    font: &Font,
    size: f32,
    width: f32,
) -> impl Iterator<Item = &'a str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut current = 0.0;
    for (offset, c) in word.char_indices() {
        let char_width = font.char_width(c, size);
        if offset > start && current + char_width > width {
            chunks.push(&word[start..offset]);
            start = offset;
            current = 0.0;
        }
        current += char_width;
    }
    if start < word.len() {
        chunks.push(&word[start..]);
    }
    chunks.into_iter()
}
