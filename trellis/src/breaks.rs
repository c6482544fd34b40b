//! Text boundary queries: line breaks, grapheme clusters, words and codepoints.
//!
//! All indices are byte offsets into UTF-8 text. Callers may pass any offset;
//! it is clamped to the text and snapped back to a character boundary first.

use unicode_segmentation::UnicodeSegmentation;

/// A line break opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBreak {
    /// Byte index where the next line would begin.
    pub index: usize,
    /// Required by the text itself (a newline, or the end of the text).
    pub mandatory: bool,
}

/// Boundary detection consumed by the typesetter and the text editor.
pub trait BreakService {
    /// First line break strictly after `from`. Returns the end of the text,
    /// flagged mandatory, when there is none.
    fn next_line_break(&self, text: &str, from: usize) -> LineBreak;

    /// First mandatory break strictly after `from`, or the end of the text.
    fn next_mandatory_break(&self, text: &str, from: usize) -> usize {
        let mut at = from;
        loop {
            let brk = self.next_line_break(text, at);
            if brk.mandatory || brk.index >= text.len() {
                return brk.index;
            }
            at = brk.index;
        }
    }

    fn prior_grapheme_boundary(&self, text: &str, from: usize) -> usize;
    fn next_grapheme_boundary(&self, text: &str, from: usize) -> usize;

    /// Start of the word at or before `from`.
    fn prior_word_boundary(&self, text: &str, from: usize) -> usize;

    /// End of the word at or after `from`.
    fn next_word_boundary(&self, text: &str, from: usize) -> usize;
}

/// Boundary detection backed by `unicode-segmentation`.
///
/// Line breaking is a compact subset of UAX #14: newlines are mandatory,
/// breaks are allowed after a run of spaces, after a hyphen inside a word,
/// and around wide ideographs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeBreaks;

impl BreakService for UnicodeBreaks {
    fn next_line_break(&self, text: &str, from: usize) -> LineBreak {
        let from = clamp_to_char_boundary(text, from);
        let end = LineBreak {
            index: text.len(),
            mandatory: true,
        };

        let mut chars = text[from..].char_indices().peekable();
        while let Some((offset, current)) = chars.next() {
            let Some(&(_, next)) = chars.peek() else {
                return end;
            };
            let index = from + offset + current.len_utf8();

            if is_newline(current) {
                if current == '\r' && next == '\n' {
                    continue;
                }
                return LineBreak {
                    index,
                    mandatory: true,
                };
            }

            let next_starts_word = !is_break_space(next) && !is_newline(next);
            let opportunity = (is_break_space(current) && next_starts_word)
                || (current == '-' && next.is_alphanumeric())
                || ((is_wide(current) || is_wide(next)) && next_starts_word);
            if opportunity {
                return LineBreak {
                    index,
                    mandatory: false,
                };
            }
        }
        end
    }

    fn prior_grapheme_boundary(&self, text: &str, from: usize) -> usize {
        let from = clamp_to_char_boundary(text, from);
        text[..from]
            .grapheme_indices(true)
            .next_back()
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    fn next_grapheme_boundary(&self, text: &str, from: usize) -> usize {
        let from = clamp_to_char_boundary(text, from);
        text[from..]
            .graphemes(true)
            .next()
            .map(|grapheme| from + grapheme.len())
            .unwrap_or(text.len())
    }

    fn prior_word_boundary(&self, text: &str, from: usize) -> usize {
        let from = clamp_to_char_boundary(text, from);
        text.unicode_word_indices()
            .map(|(index, _)| index)
            .take_while(|&index| index < from)
            .last()
            .unwrap_or(0)
    }

    fn next_word_boundary(&self, text: &str, from: usize) -> usize {
        let from = clamp_to_char_boundary(text, from);
        text.unicode_word_indices()
            .map(|(index, word)| index + word.len())
            .find(|&end| end > from)
            .unwrap_or(text.len())
    }
}

/// Clamp an arbitrary byte index to a character boundary, moving backward.
#[inline]
pub fn clamp_to_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Start of the codepoint before `index`, or 0.
pub fn prior_codepoint(text: &str, index: usize) -> usize {
    let index = clamp_to_char_boundary(text, index);
    text[..index]
        .char_indices()
        .next_back()
        .map(|(at, _)| at)
        .unwrap_or(0)
}

/// Start of the codepoint after the one at `index`, or the text length.
pub fn next_codepoint(text: &str, index: usize) -> usize {
    let index = clamp_to_char_boundary(text, index);
    text[index..]
        .chars()
        .next()
        .map(|c| index + c.len_utf8())
        .unwrap_or(text.len())
}

/// Characters that end a line.
pub fn is_newline(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn is_break_space(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t'
            | '\u{1680}'
            | '\u{2000}'..='\u{2006}'
            | '\u{2008}'..='\u{200A}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

fn is_wide(c: char) -> bool {
    matches!(
        c,
        '\u{2E80}'..='\u{303E}'
            | '\u{3041}'..='\u{33FF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{AC00}'..='\u{D7A3}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{20000}'..='\u{2FFFD}'
    )
}

/// Codepoints that have no visible rendering and never advance the pen.
pub fn is_default_ignorable(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{034F}'
            | '\u{061C}'
            | '\u{115F}'..='\u{1160}'
            | '\u{17B4}'..='\u{17B5}'
            | '\u{180B}'..='\u{180F}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{206F}'
            | '\u{3164}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FEFF}'
            | '\u{FFA0}'
            | '\u{FFF0}'..='\u{FFF8}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0000}'..='\u{E0FFF}'
    )
}
