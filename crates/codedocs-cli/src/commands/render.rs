//! Render command handler

use anyhow::{Context, Result};

use codedocs_core::Store;

use crate::output::Output;

/// Rebuild the document from the catalog
pub fn run(store: &Store, output: &Output) -> Result<()> {
    let changed = store
        .regenerate_document()
        .context("Failed to render document")?;

    let path = store.document_path().display();
    if changed {
        output.success(&format!("Rendered {}", path));
    } else {
        output.success(&format!("{} is already up to date", path));
    }
    Ok(())
}
