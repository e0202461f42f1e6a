//! Section-aware entry splicing
//!
//! `merge` places one rendered block into an existing document:
//!
//! 1. Find the kind's section heading (level 1). If there is none, append a new
//!    section at the end of the document.
//! 2. The section runs to the next heading of level 1 or the end of the text.
//! 3. Within the section, find the entry's boundary marker. An existing block
//!    (marker up to the next marker, section end or end of text) is replaced
//!    whole. A new entry goes in front of the section's existing entries.
//! 4. Exactly one blank line separates the entry from what precedes and
//!    follows it, so repeated merges do not drift.
//!
//! Everything outside the spliced span is copied through unchanged.

use tracing::debug;

use super::tokenizer::{tokenize, Line};
use crate::models::Kind;
use crate::render::{identify, is_section_title, section_heading, ENTRY_LEVEL, SECTION_LEVEL};

/// Splice `block` for `(kind, name)` into `document`
pub fn merge(document: &str, kind: Kind, name: &str, block: &str) -> String {
    let block = trim_blank_lines(block);
    let lines = tokenize(document);

    let Some(section) = lines.iter().position(|line| {
        line.heading
            .is_some_and(|h| h.level == SECTION_LEVEL && is_section_title(h.text, kind))
    }) else {
        debug!("No {} section, appending one", kind.section_title());
        return append_section(document, kind, &block);
    };

    let section_end = (section + 1..lines.len())
        .find(|&i| lines[i].is_heading_at_most(SECTION_LEVEL))
        .unwrap_or(lines.len());

    let markers: Vec<usize> = (section + 1..section_end)
        .filter(|&i| marker_identity(&lines[i]).is_some())
        .collect();

    let existing = markers
        .iter()
        .position(|&i| marker_identity(&lines[i]) == Some((kind, name)));

    if let Some(pos) = existing {
        let duplicates: Vec<(usize, usize)> = (pos + 1..markers.len())
            .filter(|&j| marker_identity(&lines[markers[j]]) == Some((kind, name)))
            .map(|j| (markers[j], markers.get(j + 1).copied().unwrap_or(section_end)))
            .collect();
        if !duplicates.is_empty() {
            debug!("Dropping {} duplicate {} '{}' blocks", duplicates.len(), kind, name);
            let deduped = remove_spans(document, &lines, &duplicates);
            return merge(&deduped, kind, name, &block);
        }
    }

    let (from, to) = match existing {
        Some(pos) => {
            let end = markers.get(pos + 1).copied().unwrap_or(section_end);
            debug!("Replacing {} '{}' (lines {}..{})", kind, name, markers[pos], end);
            (markers[pos], end)
        }
        None => {
            let at = markers.first().copied().unwrap_or(section_end);
            debug!("Inserting {} '{}' at line {}", kind, name, at);
            (at, at)
        }
    };

    splice(document, &lines, section, from, to, &block)
}

fn marker_identity<'a>(line: &Line<'a>) -> Option<(Kind, &'a str)> {
    line.heading
        .filter(|h| h.level == ENTRY_LEVEL)
        .and_then(|h| identify(h.text))
}

/// Replace lines `from..to` with `block`, normalizing surrounding blank lines
///
/// Blank lines directly above `from` (but below the section heading) are
/// folded into the replaced span.
fn splice(
    document: &str,
    lines: &[Line<'_>],
    section: usize,
    from: usize,
    to: usize,
    block: &str,
) -> String {
    let mut start = from;
    while start > section + 1 && lines[start - 1].is_blank() {
        start -= 1;
    }

    let offset = |i: usize| lines.get(i).map_or(document.len(), |l| l.start);
    let (head, tail) = (&document[..offset(start)], &document[offset(to)..]);

    let mut out = String::with_capacity(document.len() + block.len() + 2);
    out.push_str(head);
    if !head.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(block);
    if !tail.is_empty() {
        out.push('\n');
    }
    out.push_str(tail);
    out
}

/// Cut the line spans `from..to` out of `document`
fn remove_spans(document: &str, lines: &[Line<'_>], spans: &[(usize, usize)]) -> String {
    let offset = |i: usize| lines.get(i).map_or(document.len(), |l| l.start);
    let mut out = String::with_capacity(document.len());
    let mut kept_from = 0;
    for &(from, to) in spans {
        out.push_str(&document[kept_from..offset(from)]);
        kept_from = offset(to);
    }
    out.push_str(&document[kept_from..]);
    out
}

fn append_section(document: &str, kind: Kind, block: &str) -> String {
    let mut out = String::with_capacity(document.len() + block.len() + 32);
    out.push_str(document);
    if !out.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        if !ends_with_blank_line(&out) {
            out.push('\n');
        }
    }
    out.push_str(&section_heading(kind));
    out.push_str("\n\n");
    out.push_str(block);
    out
}

fn ends_with_blank_line(text: &str) -> bool {
    text.ends_with("\n\n") || text.ends_with("\n\r\n")
}

/// Drop leading and trailing blank lines; the result ends in one newline
fn trim_blank_lines(block: &str) -> String {
    let lines: Vec<&str> = block.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());

    match (first, last) {
        (Some(first), Some(last)) => {
            let mut out = lines[first..=last].join("\n");
            out.push('\n');
            out
        }
        _ => String::new(),
    }
}
