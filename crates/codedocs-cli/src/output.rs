//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use codedocs_core::{ApplyOutcome, Entry};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single entry as its rendered Markdown block
    pub fn print_entry(&self, entry: &Entry) {
        match self.format {
            OutputFormat::Human => {
                print!("{}", codedocs_core::render::render(entry));
            }
            OutputFormat::Json => {
                println!("{}", pretty(&entry_json(entry)));
            }
            OutputFormat::Quiet => {
                println!("{}", entry.name);
            }
        }
    }

    /// Print a list of entries
    pub fn print_entries(&self, entries: &[&Entry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No entries found.");
                    return;
                }
                for entry in entries {
                    println!(
                        "{:<9} | {} | {}",
                        entry.kind,
                        truncate(&entry.name, 30),
                        truncate_line(&entry.description, 45)
                    );
                }
                println!("\n{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
            }
            OutputFormat::Json => {
                let json: Vec<_> = entries.iter().map(|e| entry_json(e)).collect();
                println!("{}", pretty(&json));
            }
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.name);
                }
            }
        }
    }

    /// Report the result of applying an entry
    pub fn print_outcome(&self, outcome: &ApplyOutcome) {
        match self.format {
            OutputFormat::Human => {
                let verb = if outcome.created { "Added" } else { "Updated" };
                let document = if outcome.document_changed {
                    ""
                } else {
                    " (document unchanged)"
                };
                println!("✓ {} {} '{}'{}", verb, outcome.kind, outcome.name, document);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "success",
                        "kind": outcome.kind,
                        "name": outcome.name,
                        "created": outcome.created,
                        "document_changed": outcome.document_changed
                    })
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Entry as JSON, with its kind alongside the persisted fields
fn entry_json(entry: &Entry) -> serde_json::Value {
    let mut value = serde_json::to_value(entry).unwrap_or_default();
    if let Some(object) = value.as_object_mut() {
        object.insert("kind".to_string(), serde_json::json!(entry.kind));
    }
    value
}

fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
