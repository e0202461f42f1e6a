//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use codedocs_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "root": config.root,
                    "catalog_file": config.catalog_file,
                    "document_file": config.document_file,
                    "strategy": config.strategy,
                    "classifier_url": config.classifier_url,
                    "language": config.language,
                    "request_timeout_secs": config.request_timeout_secs,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.root.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  root:                 {}", config.root.display());
            println!("  catalog_file:         {}", config.catalog_file.display());
            println!("  document_file:        {}", config.document_file.display());
            println!("  strategy:             {}", config.strategy);
            println!(
                "  classifier_url:       {}",
                config.classifier_url.as_deref().unwrap_or("(not set)")
            );
            println!("  language:             {}", config.language);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!(
                "  log_file:             {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "root" => {
            config.root = value.into();
        }
        "catalog_file" => {
            config.catalog_file = value.into();
        }
        "document_file" => {
            config.document_file = value.into();
        }
        "strategy" => {
            config.strategy = value.parse()?;
        }
        "classifier_url" => {
            config.classifier_url = optional(value);
        }
        "language" => {
            config.language = value.parse()?;
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = value
                .parse()
                .context("Invalid value for request_timeout_secs. Use a whole number of seconds.")?;
        }
        "log_file" => {
            config.log_file = optional(value).map(PathBuf::from);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: root, catalog_file, document_file, strategy, classifier_url, \
                 language, request_timeout_secs, log_file",
                key
            );
        }
    }
    Ok(())
}

/// Empty or "none" clears an optional setting
fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codedocs_core::{Language, Strategy};

    #[test]
    fn test_apply_setting() {
        let mut config = Config::default();

        apply_setting(&mut config, "strategy", "regenerate").unwrap();
        apply_setting(&mut config, "language", "ro").unwrap();
        apply_setting(&mut config, "classifier_url", "http://localhost:8080/rpc").unwrap();
        apply_setting(&mut config, "request_timeout_secs", "5").unwrap();
        apply_setting(&mut config, "document_file", "docs/API.md").unwrap();

        assert_eq!(config.strategy, Strategy::Regenerate);
        assert_eq!(config.language, Language::Ro);
        assert_eq!(config.classifier_url.as_deref(), Some("http://localhost:8080/rpc"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.document_file, PathBuf::from("docs/API.md"));

        apply_setting(&mut config, "classifier_url", "none").unwrap();
        assert_eq!(config.classifier_url, None);
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let mut config = Config::default();

        assert!(apply_setting(&mut config, "strategy", "rewrite").is_err());
        assert!(apply_setting(&mut config, "language", "de").is_err());
        assert!(apply_setting(&mut config, "request_timeout_secs", "soon").is_err());
        assert!(apply_setting(&mut config, "sync_url", "x").is_err());
        assert_eq!(config, Config::default());
    }
}
