//! Add command handler

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use codedocs_core::{Entry, EntryFields, Kind, Store};

use crate::output::Output;

/// Entry fields collected from the command line
pub struct EntryInput {
    pub kind: Kind,
    pub name: Option<String>,
    pub description: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub usage: Option<String>,
    /// JSON record to start from; flags override its fields
    pub from: Option<PathBuf>,
}

impl EntryInput {
    /// Build the entry, reading the JSON record first if one was given
    pub fn into_entry(self) -> Result<Entry> {
        let fields = match self.from {
            Some(ref path) => read_record(path)?,
            None => EntryFields::default(),
        };

        let mut entry = fields.into_entry(self.kind);
        if let Some(name) = self.name {
            entry.name = name;
        }
        if let Some(description) = self.description {
            entry.description = description;
        }
        for (key, value) in self.attributes {
            entry.attributes.insert(key, value);
        }
        if let Some(usage) = self.usage {
            entry.usage = usage;
        }
        Ok(entry)
    }
}

/// Add or update an entry
pub fn run(store: &mut Store, input: EntryInput, output: &Output) -> Result<()> {
    let entry = input.into_entry()?;
    let outcome = store.apply(entry).context("Failed to add entry")?;

    output.print_outcome(&outcome);
    Ok(())
}

/// Parse a `key=value` attribute argument
pub fn parse_attr(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("attribute name is empty in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn read_record(path: &Path) -> Result<EntryFields> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read entry from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read entry file: {:?}", path))?
    };

    serde_json::from_str(&content).with_context(|| format!("Invalid entry record: {:?}", path))
}
