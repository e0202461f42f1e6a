//! Line tokenizer with ATX heading recognition
//!
//! Splits a document into lines, keeping byte offsets so callers can splice
//! the original text, and marks which lines are headings. Lines inside fenced
//! code blocks are never headings. Setext headings are not recognised.

/// A heading: `#` count and trimmed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading<'a> {
    pub level: u8,
    pub text: &'a str,
}

/// One line of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// Byte offset of the first character of the line
    pub start: usize,
    /// Line content without the line terminator
    pub text: &'a str,
    /// Set when the line is an ATX heading outside a code fence
    pub heading: Option<Heading<'a>>,
}

impl Line<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn is_heading_at_most(&self, level: u8) -> bool {
        self.heading.is_some_and(|h| h.level <= level)
    }
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: u8,
    len: usize,
}

/// Split `doc` into lines and classify headings
pub fn tokenize(doc: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut fence: Option<Fence> = None;
    let mut start = 0;

    for raw in doc.split_inclusive('\n') {
        let text = raw
            .strip_suffix('\n')
            .map(|t| t.strip_suffix('\r').unwrap_or(t))
            .unwrap_or(raw);

        let heading = match fence {
            Some(open) => {
                if closes_fence(text, open) {
                    fence = None;
                }
                None
            }
            None => {
                if let Some(open) = opening_fence(text) {
                    fence = Some(open);
                    None
                } else {
                    parse_heading(text)
                }
            }
        };

        lines.push(Line {
            start,
            text,
            heading,
        });
        start += raw.len();
    }

    lines
}

/// Parse an ATX heading line (`### text`)
///
/// Up to three spaces of indentation, one to six `#`, then whitespace or end
/// of line. A closing `#` run preceded by whitespace is dropped.
pub fn parse_heading(line: &str) -> Option<Heading<'_>> {
    let rest = strip_indent(line)?;
    let level = rest.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }

    let after = &rest[level..];
    if !after.is_empty() && !after.starts_with([' ', '\t']) {
        return None;
    }

    let text = after.trim();
    let unclosed = text.trim_end_matches('#');
    let text = if unclosed.is_empty() {
        ""
    } else if unclosed.ends_with([' ', '\t']) {
        unclosed.trim_end()
    } else {
        text
    };

    Some(Heading {
        level: level as u8,
        text,
    })
}

fn strip_indent(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(' ');
    if line.len() - rest.len() > 3 {
        None
    } else {
        Some(rest)
    }
}

fn fence_run(line: &str) -> Option<(u8, usize, &str)> {
    let rest = strip_indent(line)?;
    let marker = *rest.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let len = rest.bytes().take_while(|&b| b == marker).count();
    if len < 3 {
        return None;
    }
    Some((marker, len, &rest[len..]))
}

fn opening_fence(line: &str) -> Option<Fence> {
    let (marker, len, info) = fence_run(line)?;
    // A backtick fence's info string may not contain backticks
    if marker == b'`' && info.contains('`') {
        return None;
    }
    Some(Fence { marker, len })
}

fn closes_fence(line: &str, open: Fence) -> bool {
    matches!(
        fence_run(line),
        Some((marker, len, rest)) if marker == open.marker && len >= open.len && rest.trim().is_empty()
    )
}
