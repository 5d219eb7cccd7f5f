//! Physical line cursor
//!
//! Splits text on `\n` without copying. The cursor keeps only a byte offset,
//! so it can live next to the text it walks. A final line without a
//! trailing newline is still produced.

/// One physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'t> {
    /// 1-based line number
    pub number: usize,
    /// Line content without the `\n`
    pub text: &'t str,
}

/// Position within a text buffer.
#[derive(Debug, Clone, Default)]
pub struct LineCursor {
    pos: usize,
    number: usize,
}

impl LineCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next line of `text`, or `None` at the end.
    ///
    /// `text` must be the same buffer on every call.
    pub fn next_line<'t>(&mut self, text: &'t str) -> Option<Line<'t>> {
        if self.pos >= text.len() {
            return None;
        }

        let rest = &text[self.pos..];
        let (line, advance) = match rest.find('\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };

        self.pos += advance;
        self.number += 1;

        Some(Line {
            number: self.number,
            text: line,
        })
    }
}
