//! Page layout for printable exports
//!
//! Text is wrapped to a fixed character width and split into pages with a
//! fixed line budget, the way a simple PDF writer places one line every 7mm
//! between the 20mm and 280mm marks.

/// Lines placed on one page
pub const LINES_PER_PAGE: usize = 38;

/// Default page width in characters
pub const DEFAULT_PAGE_WIDTH: usize = 80;

/// Characters dropped from markdown before it is laid out as plain text
const MARKUP_CHARS: &[char] = &['#', '*', '`', '_', '~'];

/// Breaks plain text into lines that fit a page
pub trait PageLayout {
    fn layout(&self, plain_text: &str, page_width: usize) -> Vec<String>;
}

/// Greedy word wrap. Words longer than a line are split.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordWrap;

impl PageLayout for WordWrap {
    fn layout(&self, plain_text: &str, page_width: usize) -> Vec<String> {
        let width = page_width.max(1);
        let mut lines = Vec::new();

        for paragraph in plain_text.lines() {
            let mut line = String::new();
            let mut line_chars = 0;

            for word in paragraph.split_whitespace() {
                let mut word_chars = word.chars().count();
                let mut word = word;

                let needed = if line_chars == 0 { word_chars } else { line_chars + 1 + word_chars };
                if needed > width && line_chars > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_chars = 0;
                }

                // Hard-split words wider than the page
                while word_chars > width {
                    let cut = word
                        .char_indices()
                        .nth(width)
                        .map_or(word.len(), |(idx, _)| idx);
                    lines.push(word[..cut].to_string());
                    word = &word[cut..];
                    word_chars -= width;
                }

                if line_chars > 0 {
                    line.push(' ');
                    line_chars += 1;
                }
                line.push_str(word);
                line_chars += word_chars;
            }

            lines.push(line);
        }

        lines
    }
}

/// Remove markdown emphasis, heading and code markers
pub fn strip_markup(text: &str) -> String {
    text.chars().filter(|c| !MARKUP_CHARS.contains(c)).collect()
}

/// Split lines into pages of at most `per_page` lines. Always yields one page.
pub fn paginate(lines: Vec<String>, per_page: usize) -> Vec<Vec<String>> {
    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines
        .chunks(per_page.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}
