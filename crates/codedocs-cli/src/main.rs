//! codedocs CLI
//!
//! Command-line interface for codedocs - keeps a Markdown reference of
//! functions and components in step with its JSON catalog.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use codedocs_core::{Config, Kind, Language, StorageError, Store};

mod commands;
mod output;

use commands::add::EntryInput;
use commands::generate::LineRange;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "codedocs")]
#[command(about = "codedocs - Markdown reference docs for functions and components")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add or update an entry and splice it into the document
    Add {
        /// Entry kind (function or component)
        #[arg(short, long)]
        kind: Kind,
        /// Entry name
        #[arg(short, long)]
        name: Option<String>,
        /// Description text
        #[arg(short, long)]
        description: Option<String>,
        /// Parameter or prop, as key=value (repeatable)
        #[arg(short, long = "attr", value_name = "KEY=VALUE", value_parser = commands::add::parse_attr)]
        attr: Vec<(String, String)>,
        /// Usage snippet
        #[arg(short, long)]
        usage: Option<String>,
        /// Read entry fields from a JSON record ("-" for stdin)
        #[arg(short, long, value_name = "FILE")]
        from: Option<PathBuf>,
    },
    /// Classify source text with the documentation service and add the result
    Generate {
        /// Source file ("-" for stdin)
        source: String,
        /// Only use these lines (1-based, inclusive)
        #[arg(short, long, value_name = "START:END")]
        lines: Option<LineRange>,
        /// Documentation language (en or ro)
        #[arg(long)]
        language: Option<Language>,
    },
    /// List catalog entries
    #[command(alias = "ls")]
    List {
        /// Only list this kind
        #[arg(short, long)]
        kind: Option<Kind>,
    },
    /// Show an entry's rendered block
    Show {
        /// Entry kind (function or component)
        kind: Kind,
        /// Entry name
        name: String,
    },
    /// Rebuild the whole document from the catalog
    Render,
    /// Show file locations and entry counts
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (root, catalog_file, document_file, strategy, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands work without opening the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    let mut store = Store::open_with_config(config)?;

    match cli.command {
        Commands::Add {
            kind,
            name,
            description,
            attr,
            usage,
            from,
        } => {
            let input = EntryInput {
                kind,
                name,
                description,
                attributes: attr,
                usage,
                from,
            };
            commands::add::run(&mut store, input, output)
        }
        Commands::Generate {
            source,
            lines,
            language,
        } => commands::generate::run(&mut store, &source, lines, language, output).await,
        Commands::List { kind } => commands::list::run(&store, kind, output),
        Commands::Show { kind, name } => commands::show::run(&store, kind, &name, output),
        Commands::Render => commands::render::run(&store, output),
        Commands::Status => commands::status::show(&store, output),
        Commands::Config { .. } => Ok(()),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging to stderr, or to the configured log file
///
/// `RUST_LOG` wins over the verbosity flag.
fn init_logging(config: &Config, verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("codedocs_core={},codedocs={}", log_level, log_level))
    });

    if let Some(ref log_path) = config.log_file {
        match OpenOptions::new().create(true).append(true).open(log_path) {
            Ok(log_file) => {
                // Ignore error if already initialized
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(log_file)
                    .try_init();
                return;
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Print the error chain, plus a hint for storage errors
fn report_error(err: &anyhow::Error) {
    eprintln!("Error: {}", err);
    for cause in err.chain().skip(1) {
        eprintln!("  Caused by: {}", cause);
    }

    let suggestion = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<StorageError>())
        .and_then(StorageError::recovery_suggestion);
    if let Some(suggestion) = suggestion {
        eprintln!();
        eprintln!("Hint: {}", suggestion);
    }
}
