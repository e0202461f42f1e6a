//! Status command handler

use anyhow::Result;

use codedocs_core::Store;

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let stats = store.stats();
    let config = store.config();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "strategy": config.strategy.to_string(),
                    "classifier_url": config.classifier_url,
                    "language": config.language.to_string(),
                    "catalog": {
                        "path": store.catalog_path(),
                        "exists": stats.catalog_exists
                    },
                    "document": {
                        "path": store.document_path(),
                        "exists": stats.document_exists
                    },
                    "counts": {
                        "functions": stats.functions,
                        "components": stats.components
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", stats.functions + stats.components);
        }
        OutputFormat::Human => {
            println!("codedocs Status");
            println!("===============");
            println!();
            println!("Files:");
            println!(
                "  Catalog:  {}{}",
                store.catalog_path().display(),
                if stats.catalog_exists { "" } else { " (missing)" }
            );
            println!(
                "  Document: {}{}",
                store.document_path().display(),
                if stats.document_exists { "" } else { " (missing)" }
            );
            println!();
            println!("Updates:");
            println!("  Strategy:   {}", config.strategy);
            println!(
                "  Classifier: {}",
                config.classifier_url.as_deref().unwrap_or("(not set)")
            );
            println!("  Language:   {}", config.language);
            println!();
            println!("Contents:");
            println!("  Functions:  {}", stats.functions);
            println!("  Components: {}", stats.components);
        }
    }

    Ok(())
}
