//! List command handler

use anyhow::Result;

use codedocs_core::{Kind, Store};

use crate::output::Output;

/// List entries, optionally only one kind
pub fn run(store: &Store, kind: Option<Kind>, output: &Output) -> Result<()> {
    let entries: Vec<_> = match kind {
        Some(kind) => store.entries(kind),
        None => store.catalog().iter().collect(),
    };

    output.print_entries(&entries);
    Ok(())
}
