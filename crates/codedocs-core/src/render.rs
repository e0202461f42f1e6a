//! Markdown rendering of entries
//!
//! An entry renders to a block that starts with its boundary marker, a level-3
//! heading such as `### **add()**` or `### **Button.jsx**`, followed by the
//! description, the attribute list and the usage snippet. The block contains
//! no other headings: usage is fenced, and description or attribute lines that
//! would parse as a heading or open a fence are escaped with a backslash.

use std::borrow::Cow;

use crate::catalog::Catalog;
use crate::markdown::parse_heading;
use crate::models::{Entry, Kind};

/// Heading level of top-level sections
pub const SECTION_LEVEL: u8 = 1;

/// Heading level of entry boundary markers
pub const ENTRY_LEVEL: u8 = 3;

/// Section heading line for a kind, e.g. `# **Functions**`
pub fn section_heading(kind: Kind) -> String {
    format!("{} **{}**", "#".repeat(SECTION_LEVEL as usize), kind.section_title())
}

/// Boundary marker line for an entry, e.g. `### **add()**`
pub fn marker(kind: Kind, name: &str) -> String {
    format!(
        "{} **{}{}**",
        "#".repeat(ENTRY_LEVEL as usize),
        name,
        kind.heading_suffix()
    )
}

/// Render one entry as a Markdown block ending in a single newline
pub fn render(entry: &Entry) -> String {
    let mut out = String::new();

    out.push_str(&marker(entry.kind, &entry.name));
    out.push_str("\n\n");

    out.push_str("<u>**Description:**</u>\n");
    push_escaped(&mut out, &entry.description);
    out.push('\n');

    if !entry.attributes.is_empty() {
        out.push_str(&format!("<u>**{}:**</u>\n", entry.kind.attributes_label()));
        for (key, value) in &entry.attributes {
            push_escaped(&mut out, &format!("- **{}**: {}", key, value));
        }
        out.push('\n');
    }

    out.push_str("<u>**Usage:**</u>\n");
    let fence = "`".repeat(fence_len(&entry.usage));
    out.push_str(&fence);
    out.push('\n');
    push_text(&mut out, &entry.usage);
    out.push_str(&fence);
    out.push('\n');

    out
}

/// Render the whole document from the catalog
///
/// Sections in kind order, entries in catalog order, empty kinds omitted.
pub fn render_document(catalog: &Catalog) -> String {
    let sections: Vec<String> = Kind::ALL
        .into_iter()
        .filter(|&kind| catalog.count(kind) > 0)
        .map(|kind| {
            let blocks: Vec<String> = catalog.entries(kind).into_iter().map(render).collect();
            format!("{}\n\n{}", section_heading(kind), blocks.join("\n"))
        })
        .collect();

    sections.join("\n")
}

/// Recover `(kind, name)` from a boundary marker line
pub fn parse_marker(line: &str) -> Option<(Kind, String)> {
    let heading = parse_heading(line)?;
    if heading.level != ENTRY_LEVEL {
        return None;
    }
    identify(heading.text).map(|(kind, name)| (kind, name.to_string()))
}

/// Identify an entry from marker heading text such as `**add()**`
pub fn identify(heading_text: &str) -> Option<(Kind, &str)> {
    let inner = heading_text.strip_prefix("**")?.strip_suffix("**")?;
    Kind::ALL.into_iter().find_map(|kind| {
        inner
            .strip_suffix(kind.heading_suffix())
            .filter(|name| !name.trim().is_empty())
            .map(|name| (kind, name))
    })
}

/// Whether heading text names the section for `kind`
///
/// Accepts `**Functions**` as rendered and a plain `Functions`.
pub fn is_section_title(heading_text: &str, kind: Kind) -> bool {
    let title = heading_text
        .strip_prefix("**")
        .and_then(|t| t.strip_suffix("**"))
        .unwrap_or(heading_text);
    title == kind.section_title()
}

/// Append free text verbatim, terminated by exactly one newline
fn push_text(out: &mut String, text: &str) {
    let text = text.trim_end_matches(['\n', '\r']);
    if !text.is_empty() {
        out.push_str(text);
        out.push('\n');
    }
}

/// Append free text outside a fence, terminated by exactly one newline
fn push_escaped(out: &mut String, text: &str) {
    let text = text.trim_end_matches(['\n', '\r']);
    for line in text.lines() {
        out.push_str(&escape_line(line));
        out.push('\n');
    }
}

/// Backslash-escape a line that would read back as a heading or fence opener
///
/// Markdown shows `\#` and `` \` `` as the literal character.
fn escape_line(line: &str) -> Cow<'_, str> {
    let rest = line.trim_start_matches(' ');
    let indent = line.len() - rest.len();
    let structural = indent <= 3
        && (parse_heading(line).is_some() || rest.starts_with("```") || rest.starts_with("~~~"));

    if structural {
        Cow::Owned(format!("{}\\{}", &line[..indent], rest))
    } else {
        Cow::Borrowed(line)
    }
}

/// Fence length longer than any backtick run in `text`, at least three
fn fence_len(text: &str) -> usize {
    let longest = text
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    (longest + 1).max(3)
}
