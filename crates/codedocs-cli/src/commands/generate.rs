//! Generate command handler

use std::io::Read;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use tracing::debug;

use codedocs_core::{ClassifierClient, Language, Store};

use crate::output::Output;

/// Inclusive, 1-based line range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for LineRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("expected START:END, got '{}'", s))?;
        let start: usize = start
            .trim()
            .parse()
            .map_err(|_| format!("invalid start line '{}'", start))?;
        let end: usize = end
            .trim()
            .parse()
            .map_err(|_| format!("invalid end line '{}'", end))?;
        if start == 0 || end < start {
            return Err(format!("invalid line range {}:{}", start, end));
        }
        Ok(Self { start, end })
    }
}

impl LineRange {
    /// The lines of `text` within the range
    pub fn select(&self, text: &str) -> Result<String> {
        let lines: Vec<&str> = text.lines().collect();
        if self.start > lines.len() {
            bail!(
                "Line range {}:{} is past the end of the input ({} lines)",
                self.start,
                self.end,
                lines.len()
            );
        }
        let end = self.end.min(lines.len());
        Ok(lines[self.start - 1..end].join("\n"))
    }
}

/// Classify source text and apply the resulting entry
pub async fn run(
    store: &mut Store,
    source: &str,
    lines: Option<LineRange>,
    language: Option<Language>,
    output: &Output,
) -> Result<()> {
    let text = read_source(source)?;
    let selection = match lines {
        Some(range) => range.select(&text)?,
        None => text,
    };

    let mut client = ClassifierClient::from_config(store.config())?;
    if let Some(language) = language {
        client = client.with_language(language);
    }

    debug!("Sending {} bytes from {}", selection.len(), source);
    let entry = client
        .classify(&selection)
        .await
        .context("Failed to generate documentation")?;

    let outcome = store.apply(entry).context("Failed to add entry")?;
    output.print_outcome(&outcome);
    Ok(())
}

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read source from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read source file: {}", source))
    }
}
