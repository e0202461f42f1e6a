//! Show command handler

use anyhow::{anyhow, Result};

use codedocs_core::{Kind, Store};

use crate::output::Output;

/// Print one entry
pub fn run(store: &Store, kind: Kind, name: &str, output: &Output) -> Result<()> {
    let entry = store
        .get(kind, name)
        .ok_or_else(|| anyhow!("{} not found: {}", kind, name))?;

    output.print_entry(entry);
    Ok(())
}
